use super::lexer::{ArrayIndex, RawValue, Statement};
use crate::{Error, Malformed, Scalar};

/// A structural event in an SII document.
///
/// Events are produced in document order and already validated against the
/// document structure: a signature, a root block, and a flat list of units
/// that each contain fields.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SiiEvent<'a> {
    /// The `SiiNunit` signature
    Signature,

    /// The opening brace of the root container
    Begin,

    /// `class : name {`
    UnitStart {
        class: Scalar<'a>,
        name: Scalar<'a>,
        offset: usize,
    },

    /// A key value assignment within a unit
    Field(Field<'a>),

    /// The closing brace of a unit
    UnitEnd,

    /// The closing brace of the root container
    End,
}

/// A key value assignment within a unit
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Field<'a> {
    pub key: Scalar<'a>,
    pub index: Option<ArrayIndex>,
    pub value: RawValue<'a>,

    /// Byte offset of the start of the assignment
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Signature,
    RootOpen,
    Root,
    Unit,
    Done,
}

/// Validates statement order and turns statements into events
#[derive(Debug, Default)]
pub(crate) struct Grammar {
    state: State,
}

impl Grammar {
    pub(crate) fn accept<'a>(
        &mut self,
        statement: Statement<'a>,
        offset: usize,
    ) -> Result<SiiEvent<'a>, Error> {
        let (next, event) = match (self.state, statement) {
            (State::Signature, Statement::Signature) => (State::RootOpen, SiiEvent::Signature),
            (State::Signature, _) => return Err(Error::malformed(offset, Malformed::MissingSignature)),
            (State::RootOpen, Statement::Open) => (State::Root, SiiEvent::Begin),
            (State::RootOpen, _) => return Err(Error::malformed(offset, Malformed::MissingRootOpen)),
            (State::Root, Statement::UnitStart { class, name }) => {
                (State::Unit, SiiEvent::UnitStart { class, name, offset })
            }
            (State::Root, Statement::Close) => (State::Done, SiiEvent::End),
            (State::Unit, Statement::Field { key, index, value }) => (
                State::Unit,
                SiiEvent::Field(Field {
                    key,
                    index,
                    value,
                    offset,
                }),
            ),
            (State::Unit, Statement::Close) => (State::Root, SiiEvent::UnitEnd),
            (State::Root | State::Unit, _) => {
                return Err(Error::malformed(offset, Malformed::UnexpectedStatement))
            }
            (State::Done, Statement::Close) => {
                return Err(Error::malformed(offset, Malformed::UnexpectedClose))
            }
            (State::Done, _) => return Err(Error::malformed(offset, Malformed::TrailingContent)),
        };

        self.state = next;
        Ok(event)
    }

    /// Called once input is exhausted, `offset` being the length of the input
    pub(crate) fn finish(&self, offset: usize) -> Result<(), Error> {
        let reason = match self.state {
            State::Done => return Ok(()),
            State::Signature => Malformed::MissingSignature,
            State::RootOpen => Malformed::MissingRootOpen,
            State::Root | State::Unit => Malformed::UnclosedBlock,
        };

        Err(Error::malformed(offset, reason))
    }
}
