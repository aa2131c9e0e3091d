//! Splits SII plaintext into statements.
//!
//! The lexer works on a window of bytes that may not hold the whole document.
//! When a statement runs off the end of the window and more input may follow,
//! the lexer reports that nothing is complete yet so the caller can refill and
//! retry from the same starting point. Both the slice parser and the streaming
//! reader drive this one function, which keeps their output identical.

use crate::data::{is_boundary, is_inline_whitespace, is_whitespace};
use crate::{Malformed, Scalar};

/// The magic that starts every plaintext SII document
pub const SIGNATURE: &[u8; 8] = b"SiiNunit";

/// The bracketed part of an array element assignment
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArrayIndex {
    /// `key[]: value`
    Append,

    /// `key[3]: value`
    At(usize),
}

/// A value as it appears in the text, before interpretation
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RawValue<'a> {
    /// Bare token: numbers, booleans, references, hex floats
    Unquoted(Scalar<'a>),

    /// Contents between double quotes with escapes left intact
    Quoted(Scalar<'a>),

    /// Contents between parentheses, eg: `(1, 2, 3)`
    Tuple(Scalar<'a>),
}

/// One syntactic statement of an SII document
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Statement<'a> {
    Signature,
    Open,
    Close,
    UnitStart {
        class: Scalar<'a>,
        name: Scalar<'a>,
    },
    Field {
        key: Scalar<'a>,
        index: Option<ArrayIndex>,
        value: RawValue<'a>,
    },
}

/// A statement along with where it starts and where lexing stopped
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Lexed<'a> {
    pub statement: Statement<'a>,
    pub start: usize,
    pub end: usize,
}

/// A lexing failure at an offset relative to the lexed window
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LexError {
    pub offset: usize,
    pub reason: Malformed,
}

enum Stop {
    Incomplete,
    Invalid(LexError),
}

/// Lex the next statement out of `data`.
///
/// Returns `Ok(None)` when `data` holds no complete statement. When `eof` is
/// true this means only whitespace and comments remain, otherwise more input
/// is needed.
pub fn next_statement(data: &[u8], eof: bool) -> Result<Option<Lexed<'_>>, LexError> {
    let mut cursor = Cursor { data, pos: 0, eof };
    match cursor.statement() {
        Ok(x) => Ok(x),
        Err(Stop::Incomplete) => Ok(None),
        Err(Stop::Invalid(e)) => Err(e),
    }
}

/// A comment still open at the end of a window
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum OpenComment {
    Line,
    Block,
}

/// The complete whitespace and comments that lead a window
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Trivia {
    pub len: usize,

    /// A comment that starts at `len` and runs past the end of the window
    pub open: Option<OpenComment>,
}

/// Measure the leading trivia of a window that more input may follow, so a
/// caller can drop it before refilling.
pub(crate) fn leading_trivia(data: &[u8]) -> Trivia {
    let mut cursor = Cursor {
        data,
        pos: 0,
        eof: false,
    };

    let open = match cursor.skip_trivia() {
        Ok(()) => None,
        Err(_) => match (cursor.peek(), cursor.peek_at(1)) {
            (Some(b'#'), _) | (Some(b'/'), Some(b'/')) => Some(OpenComment::Line),
            (Some(b'/'), Some(b'*')) => Some(OpenComment::Block),
            _ => None,
        },
    };

    Trivia {
        len: cursor.pos,
        open,
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    eof: bool,
}

impl<'a> Cursor<'a> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.pos + ahead).copied()
    }

    #[inline]
    fn invalid(&self, offset: usize, reason: Malformed) -> Stop {
        Stop::Invalid(LexError { offset, reason })
    }

    /// Ran out of bytes while something started at `offset` was still open
    #[inline]
    fn exhausted(&self, offset: usize) -> Stop {
        if self.eof {
            self.invalid(offset, Malformed::UnexpectedEof)
        } else {
            Stop::Incomplete
        }
    }

    #[inline]
    fn find_from(&self, from: usize, needle: u8) -> Option<usize> {
        self.data
            .get(from..)
            .and_then(|rest| rest.iter().position(|&x| x == needle))
            .map(|i| from + i)
    }

    fn skip_trivia(&mut self) -> Result<(), Stop> {
        loop {
            match self.peek() {
                Some(b) if is_whitespace(b) => self.pos += 1,
                Some(b'#') => self.skip_line_comment(self.pos + 1)?,
                Some(b'/') => match self.peek_at(1) {
                    Some(b'/') => self.skip_line_comment(self.pos + 2)?,
                    Some(b'*') => self.skip_block_comment()?,
                    None if !self.eof => return Err(Stop::Incomplete),
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self, from: usize) -> Result<(), Stop> {
        match self.find_from(from, b'\n') {
            Some(newline) => {
                self.pos = newline + 1;
                Ok(())
            }
            None if self.eof => {
                self.pos = self.data.len();
                Ok(())
            }
            None => Err(Stop::Incomplete),
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), Stop> {
        let start = self.pos;
        let mut from = self.pos + 2;
        loop {
            match self.find_from(from, b'*') {
                Some(star) if self.data.get(star + 1) == Some(&b'/') => {
                    self.pos = star + 2;
                    return Ok(());
                }
                Some(star) => from = star + 1,
                None => return Err(self.exhausted(start)),
            }
        }
    }

    fn skip_inline(&mut self) {
        while let Some(b) = self.peek() {
            if !is_inline_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
    }

    fn statement(&mut self) -> Result<Option<Lexed<'a>>, Stop> {
        self.skip_trivia()?;
        let start = self.pos;
        let first = match self.peek() {
            Some(x) => x,
            None => return Ok(None),
        };

        let statement = match first {
            b'{' => {
                self.pos += 1;
                Statement::Open
            }
            b'}' => {
                self.pos += 1;
                Statement::Close
            }
            b if is_boundary(b) => return Err(self.invalid(start, Malformed::UnexpectedCharacter)),
            _ => self.keyed()?,
        };

        Ok(Some(Lexed {
            statement,
            start,
            end: self.pos,
        }))
    }

    /// A statement that starts with a bare word: the signature, a field, or
    /// a unit declaration
    fn keyed(&mut self) -> Result<Statement<'a>, Stop> {
        let key = self.unquoted()?;
        if key.as_bytes() == SIGNATURE {
            self.end_of_statement()?;
            return Ok(Statement::Signature);
        }

        self.skip_inline();
        let index = match self.peek() {
            Some(b'[') => Some(self.index()?),
            _ => None,
        };

        self.skip_inline();
        match self.peek() {
            Some(b':') => self.pos += 1,
            None => return Err(self.exhausted(self.pos)),
            Some(_) => return Err(self.invalid(self.pos, Malformed::ExpectedColon)),
        }

        self.skip_inline();
        let value_start = self.pos;
        let value = self.value()?;
        if !self.end_of_statement()? {
            return Ok(Statement::Field { key, index, value });
        }

        match (index, value) {
            (None, RawValue::Unquoted(name)) => {
                self.pos += 1;
                Ok(Statement::UnitStart { class: key, name })
            }
            _ => Err(self.invalid(value_start, Malformed::InvalidUnitName)),
        }
    }

    fn index(&mut self) -> Result<ArrayIndex, Stop> {
        let open = self.pos;
        let close = match self.find_from(open + 1, b']') {
            Some(x) => x,
            None => {
                // an index is a handful of digits, a missing bracket on the
                // same line is an error rather than a short window
                return match self.find_from(open + 1, b'\n') {
                    Some(_) => Err(self.invalid(open + 1, Malformed::InvalidIndex)),
                    None => Err(self.exhausted(open)),
                };
            }
        };

        let inner = Scalar::new(&self.data[open + 1..close]);
        self.pos = close + 1;
        if inner.as_bytes().is_empty() {
            return Ok(ArrayIndex::Append);
        }

        inner
            .to_u64()
            .ok()
            .and_then(|x| usize::try_from(x).ok())
            .map(ArrayIndex::At)
            .ok_or_else(|| self.invalid(open + 1, Malformed::InvalidIndex))
    }

    fn value(&mut self) -> Result<RawValue<'a>, Stop> {
        match self.peek() {
            None => Err(self.exhausted(self.pos)),
            Some(b'"') => self.quoted().map(RawValue::Quoted),
            Some(b'(') => self.tuple().map(RawValue::Tuple),
            Some(b) if is_boundary(b) => Err(self.invalid(self.pos, Malformed::MissingValue)),
            Some(_) => self.unquoted().map(RawValue::Unquoted),
        }
    }

    fn quoted(&mut self) -> Result<Scalar<'a>, Stop> {
        let open = self.pos;
        let mut pos = open + 1;
        while pos < self.data.len() {
            match self.data[pos] {
                b'\\' => pos += 2,
                b'"' => {
                    self.pos = pos + 1;
                    return Ok(Scalar::new(&self.data[open + 1..pos]));
                }
                _ => pos += 1,
            }
        }

        Err(self.exhausted(open))
    }

    fn tuple(&mut self) -> Result<Scalar<'a>, Stop> {
        let open = self.pos;
        match self.find_from(open + 1, b')') {
            Some(close) => {
                self.pos = close + 1;
                Ok(Scalar::new(&self.data[open + 1..close]))
            }
            None => Err(self.exhausted(open)),
        }
    }

    fn unquoted(&mut self) -> Result<Scalar<'a>, Stop> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_boundary(b) {
                return Ok(Scalar::new(&self.data[start..self.pos]));
            }
            self.pos += 1;
        }

        if self.eof {
            Ok(Scalar::new(&self.data[start..]))
        } else {
            Err(Stop::Incomplete)
        }
    }

    /// Checks what follows a value on the same line. Returns true when an
    /// opening brace follows (left unconsumed).
    fn end_of_statement(&mut self) -> Result<bool, Stop> {
        self.skip_inline();
        match self.peek() {
            None if self.eof => Ok(false),
            None => Err(Stop::Incomplete),
            Some(b'{') => Ok(true),
            Some(b'\n' | b'\r' | b'#' | b'}') => Ok(false),
            Some(b'/') => match self.peek_at(1) {
                Some(b'/' | b'*') => Ok(false),
                None if !self.eof => Err(Stop::Incomplete),
                _ => Err(self.invalid(self.pos, Malformed::TrailingContent)),
            },
            Some(_) => Err(self.invalid(self.pos, Malformed::TrailingContent)),
        }
    }
}
