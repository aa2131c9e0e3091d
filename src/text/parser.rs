use super::document::{Unit, UnitAssembler};
use super::grammar::{Grammar, SiiEvent};
use super::lexer::next_statement;
use crate::Error;

/// Parses SII plaintext held entirely in memory into a sequence of events.
///
/// Events borrow from the input, so no data is copied until a caller asks for
/// owned units.
///
/// ```
/// use siikit::text::{SiiEvent, SiiParser};
///
/// let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n}\n}";
/// let mut parser = SiiParser::new(&data[..]);
/// let mut classes = Vec::new();
/// while let Some(event) = parser.next_event()? {
///     if let SiiEvent::UnitStart { class, .. } = event {
///         classes.push(class.to_string());
///     }
/// }
/// assert_eq!(classes, vec![String::from("user_profile")]);
/// # Ok::<(), siikit::Error>(())
/// ```
#[derive(Debug)]
pub struct SiiParser<'a> {
    data: &'a [u8],
    position: usize,
    grammar: Grammar,
    finished: bool,
}

impl<'a> SiiParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SiiParser {
            data,
            position: 0,
            grammar: Grammar::default(),
            finished: false,
        }
    }

    /// Byte offset of the data that has been consumed
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the next event, or `None` once the document has been fully and
    /// validly consumed.
    pub fn next_event(&mut self) -> Result<Option<SiiEvent<'a>>, Error> {
        if self.finished {
            return Ok(None);
        }

        let rest = &self.data[self.position..];
        let lexed = next_statement(rest, true)
            .map_err(|e| Error::malformed(self.position + e.offset, e.reason))?;

        match lexed {
            Some(lexed) => {
                let offset = self.position + lexed.start;
                self.position += lexed.end;
                self.grammar.accept(lexed.statement, offset).map(Some)
            }
            None => {
                self.grammar.finish(self.data.len())?;
                self.position = self.data.len();
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// Returns the next complete unit
    pub fn next_unit(&mut self) -> Result<Option<Unit>, Error> {
        let mut assembler = UnitAssembler::default();
        while let Some(event) = self.next_event()? {
            if let Some(unit) = assembler.accept(event)? {
                return Ok(Some(unit));
            }
        }

        Ok(None)
    }
}
