use super::document::{SiiDocument, Unit, UnitAssembler};
use super::grammar::{Grammar, SiiEvent};
use super::lexer::{leading_trivia, next_statement, OpenComment};
use crate::buffer::{BufferError, BufferWindow, BufferWindowBuilder};
use crate::{Error, Malformed};
use std::io::Read;

/// Parses SII plaintext from any [Read] implementation while holding only a
/// bounded window of the input in memory.
///
/// The window starts at the initial buffer length and grows, up to the
/// maximum buffer length, only when a single statement does not fit. Callers
/// that consume one unit at a time with [next_unit](SiiReader::next_unit)
/// never hold more than the current unit.
///
/// ```
/// use siikit::text::SiiReader;
///
/// let data = b"SiiNunit\n{\njob : job.0 {\n cargo: wood\n}\njob : job.1 {\n cargo: coal\n}\n}";
/// let mut reader = SiiReader::builder().init_buffer_len(16).build(&data[..]);
/// let mut cargo = Vec::new();
/// while let Some(unit) = reader.next_unit()? {
///     cargo.push(unit.get("cargo").and_then(|x| x.as_str()).unwrap_or("").to_string());
/// }
/// assert_eq!(cargo, vec!["wood", "coal"]);
/// # Ok::<(), siikit::Error>(())
/// ```
///
/// Producing the same result as parsing the whole slice at once is a hard
/// guarantee: both use the same statement lexer and structural validation.
/// Whitespace and comments are dropped as they are read, so they never need
/// to fit in the buffer.
#[derive(Debug)]
pub struct SiiReader<R> {
    reader: R,
    buf: BufferWindow,
    grammar: Grammar,
    comment: Option<Comment>,
    eof: bool,
    finished: bool,
}

/// A comment being skipped across refills
#[derive(Debug, Clone, Copy)]
enum Comment {
    Line,

    /// Absolute offset of the opening `/*`
    Block { start: usize },
}

impl<R> SiiReader<R>
where
    R: Read,
{
    /// Convenience method for constructing the default reader
    #[inline]
    pub fn new(reader: R) -> Self {
        SiiReader::builder().build(reader)
    }

    /// Returns the byte position of the data stream that has been processed.
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.position()
    }

    /// Returns the next event, or `None` once the document has been fully and
    /// validly consumed.
    pub fn next_event(&mut self) -> Result<Option<SiiEvent<'_>>, Error> {
        if self.finished {
            return Ok(None);
        }

        if !self.fill_statement()? {
            self.buf.start = self.buf.end;
            self.grammar.finish(self.buf.position())?;
            self.finished = true;
            return Ok(None);
        }

        let position = self.buf.position();
        let window = &self.buf.buf[self.buf.start..self.buf.end];
        let lexed = match next_statement(window, self.eof) {
            Ok(Some(lexed)) => lexed,
            Ok(None) => return Ok(None),
            Err(e) => return Err(Error::malformed(position + e.offset, e.reason)),
        };

        self.buf.start += lexed.end;
        self.grammar
            .accept(lexed.statement, position + lexed.start)
            .map(Some)
    }

    /// Returns the next complete unit as an owned value
    pub fn next_unit(&mut self) -> Result<Option<Unit>, Error> {
        let mut assembler = UnitAssembler::default();
        while let Some(event) = self.next_event()? {
            if let Some(unit) = assembler.accept(event)? {
                return Ok(Some(unit));
            }
        }

        Ok(None)
    }

    /// Consume the rest of the input into a document
    pub fn read_document(mut self) -> Result<SiiDocument, Error> {
        let mut units = Vec::new();
        while let Some(unit) = self.next_unit()? {
            units.push(unit);
        }

        Ok(SiiDocument::from_units(units))
    }

    /// Refills until the window holds a complete statement. Returns false when
    /// the input is exhausted with nothing but trivia left.
    fn fill_statement(&mut self) -> Result<bool, Error> {
        loop {
            if self.comment.is_none() {
                match next_statement(self.buf.window(), self.eof) {
                    Ok(Some(_)) => return Ok(true),
                    Ok(None) if self.eof => return Ok(false),
                    Ok(None) => self.consume_trivia(),
                    Err(e) => {
                        return Err(Error::malformed(self.buf.position() + e.offset, e.reason))
                    }
                }
            }

            if let Some(comment) = self.comment {
                self.consume_comment(comment)?;
                if self.comment.is_none() {
                    continue;
                }
            }

            match self.buf.fill_buf(&mut self.reader) {
                Ok(0) => self.eof = true,
                Ok(_) => {}
                Err(BufferError::BufferFull) => {
                    return Err(Error::malformed(self.buf.position(), Malformed::BufferFull))
                }
                Err(BufferError::Io(e)) => return Err(Error::from(e)),
            }
        }
    }

    fn consume_trivia(&mut self) {
        let trivia = leading_trivia(self.buf.window());
        self.buf.start += trivia.len;
        match trivia.open {
            Some(OpenComment::Line) => self.comment = Some(Comment::Line),
            Some(OpenComment::Block) => {
                self.comment = Some(Comment::Block {
                    start: self.buf.position(),
                });
                self.buf.start += 2;
            }
            None => {}
        }
    }

    fn consume_comment(&mut self, comment: Comment) -> Result<(), Error> {
        let window = self.buf.window();
        let closed = match comment {
            Comment::Line => window.iter().position(|&x| x == b'\n').map(|x| x + 1),
            Comment::Block { .. } => window.windows(2).position(|x| x == b"*/").map(|x| x + 2),
        };

        // a trailing star may be the first half of the terminator
        let keep = usize::from(window.last() == Some(&b'*'));

        match (closed, comment) {
            (Some(len), _) => {
                self.buf.start += len;
                self.comment = None;
            }
            (None, Comment::Block { start }) if self.eof => {
                return Err(Error::malformed(start, Malformed::UnexpectedEof));
            }
            (None, Comment::Block { .. }) => self.buf.start = self.buf.end - keep,
            (None, Comment::Line) => {
                self.buf.start = self.buf.end;
                if self.eof {
                    self.comment = None;
                }
            }
        }

        Ok(())
    }
}

impl SiiReader<()> {
    /// Initializes a default [SiiReaderBuilder]
    pub fn builder() -> SiiReaderBuilder {
        SiiReaderBuilder::default()
    }
}

/// Creates a streaming SII reader
#[derive(Debug, Default)]
pub struct SiiReaderBuilder {
    buffer: BufferWindowBuilder,
}

impl SiiReaderBuilder {
    /// Set the length of the buffer initially allocated (default 32 KiB)
    #[inline]
    pub fn init_buffer_len(mut self, val: usize) -> SiiReaderBuilder {
        self.buffer = self.buffer.buffer_len(val);
        self
    }

    /// Set the length the buffer may grow to (default 1 MiB).
    ///
    /// A single statement, including a long quoted string, must fit in this
    /// length or reading fails with [Malformed::BufferFull].
    #[inline]
    pub fn max_buffer_len(mut self, val: usize) -> SiiReaderBuilder {
        self.buffer = self.buffer.max_len(val);
        self
    }

    /// Create a streaming reader around a given reader.
    #[inline]
    pub fn build<R>(self, reader: R) -> SiiReader<R> {
        SiiReader {
            reader,
            buf: self.buffer.build(),
            grammar: Grammar::default(),
            comment: None,
            eof: false,
            finished: false,
        }
    }
}
