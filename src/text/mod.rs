//! Types for parsing SII plaintext input
//!
//! One statement lexer and one structural grammar sit underneath three ways
//! of consuming a document:
//!
//! - [SiiDocument] builds a schema-less tree of units (auto mode)
//! - [SiiReader] streams units out of any [Read](std::io::Read) while holding
//!   a bounded window of input
//! - [SiiDeserializer] maps a document onto user defined types (typed mode)
#[cfg(feature = "derive")]
mod de;
mod document;
mod grammar;
mod lexer;
mod parser;
mod reader;

#[cfg(feature = "derive")]
pub use self::de::SiiDeserializer;
pub use self::document::{SiiDocument, Unit, Value};
pub use self::grammar::{Field, SiiEvent};
pub use self::lexer::{next_statement, ArrayIndex, LexError, Lexed, RawValue, Statement, SIGNATURE};
pub use self::parser::SiiParser;
pub use self::reader::{SiiReader, SiiReaderBuilder};
