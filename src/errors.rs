use crate::ScalarError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error that can occur when locating, decrypting, or parsing SII data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn malformed(offset: usize, reason: Malformed) -> Error {
        Error::new(ErrorKind::Malformed { offset, reason })
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume self and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the byte offset that the error occurs (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }

    /// Returns true if the document was structurally invalid
    pub fn is_malformed(&self) -> bool {
        matches!(*self.0, ErrorKind::Malformed { .. })
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// The external decryption executable was not found at its expected location
    ToolMissing { path: PathBuf },

    /// The external decryption executable ran but did not yield plaintext
    DecryptionFailed { path: PathBuf, diagnostic: String },

    /// The plaintext could not be parsed past the given byte offset
    Malformed { offset: usize, reason: Malformed },

    /// The directory holding a game's profiles does not exist
    ProfilesNotFound { path: PathBuf },

    /// The user's home directory could not be determined
    HomeDirUnavailable,

    /// Reading a requested file failed
    Io(io::Error),

    /// An error occurred when deserializing the data
    Deserialize(DeserializeError),

    /// Writing JSON output failed
    #[cfg(feature = "json")]
    Json(serde_json::Error),
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match *self {
            ErrorKind::Malformed { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

/// What made a document malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The document did not start with `SiiNunit`
    MissingSignature,

    /// The signature was not followed by an opening brace
    MissingRootOpen,

    /// A closing brace had no matching block
    UnexpectedClose,

    /// Input ended with blocks still open
    UnclosedBlock,

    /// Input ended inside a quoted string, tuple, or comment
    UnexpectedEof,

    /// A hex float or a `\x` escape was not valid hex
    InvalidHex,

    /// An unquoted value could not be interpreted
    InvalidScalar,

    /// An array index was not a number or was out of sequence
    InvalidIndex,

    /// A key was not followed by a colon
    ExpectedColon,

    /// A colon was not followed by a value
    MissingValue,

    /// A unit was declared inside another unit or a field appeared outside one
    UnexpectedStatement,

    /// Extra characters after a complete statement or after the document end
    TrailingContent,

    /// A byte that cannot start a statement
    UnexpectedCharacter,

    /// A unit name was quoted
    InvalidUnitName,

    /// An array index was applied to a field that is not an array
    IndexedScalar,

    /// The number of array elements differs from the count declared ahead
    /// of them
    CountMismatch,

    /// A single statement exceeded the maximum reader buffer
    BufferFull,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            Malformed::MissingSignature => "missing SiiNunit signature",
            Malformed::MissingRootOpen => "expected an opening brace after the signature",
            Malformed::UnexpectedClose => "closing brace without a matching block",
            Malformed::UnclosedBlock => "unterminated block",
            Malformed::UnexpectedEof => "unexpected end of input",
            Malformed::InvalidHex => "invalid hex digits",
            Malformed::InvalidScalar => "invalid scalar value",
            Malformed::InvalidIndex => "invalid array index",
            Malformed::ExpectedColon => "expected a colon after key",
            Malformed::MissingValue => "expected a value after colon",
            Malformed::UnexpectedStatement => "statement not allowed here",
            Malformed::TrailingContent => "unexpected trailing content",
            Malformed::UnexpectedCharacter => "unexpected character",
            Malformed::InvalidUnitName => "unit name must be unquoted",
            Malformed::IndexedScalar => "array index applied to a non-array field",
            Malformed::CountMismatch => "array length differs from its declared count",
            Malformed::BufferFull => "statement larger than the maximum buffer",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Deserialize(ref err) => Some(err),
            #[cfg(feature = "json")]
            ErrorKind::Json(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::ToolMissing { ref path } => {
                write!(f, "decryption tool not found at: {}", path.display())
            }
            ErrorKind::DecryptionFailed {
                ref path,
                ref diagnostic,
            } => write!(
                f,
                "failed to decrypt {}: {}",
                path.display(),
                diagnostic
            ),
            ErrorKind::Malformed { offset, reason } => {
                write!(f, "malformed document: {} (offset: {})", reason, offset)
            }
            ErrorKind::ProfilesNotFound { ref path } => {
                write!(f, "profiles not found at: {}", path.display())
            }
            ErrorKind::HomeDirUnavailable => write!(f, "unable to determine home directory"),
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
            ErrorKind::Deserialize(ref err) => write!(f, "deserialize error: {}", err),
            #[cfg(feature = "json")]
            ErrorKind::Json(ref err) => write!(f, "json error: {}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::new(ErrorKind::Json(error))
    }
}

impl From<ScalarError> for Error {
    fn from(error: ScalarError) -> Self {
        Error::from(DeserializeError::from(error))
    }
}

impl From<DeserializeError> for Error {
    fn from(error: DeserializeError) -> Self {
        Error::new(ErrorKind::Deserialize(error))
    }
}

/// A Serde deserialization error.
#[derive(Debug)]
pub struct DeserializeError {
    pub(crate) kind: DeserializeErrorKind,
}

impl DeserializeError {
    /// Return the underlying error kind.
    pub fn kind(&self) -> &DeserializeErrorKind {
        &self.kind
    }
}

/// The type of a Serde deserialization error.
#[derive(Debug)]
pub enum DeserializeErrorKind {
    /// A generic Serde deserialization error
    Message(String),

    /// Requested serde operation is unsupported
    Unsupported(String),

    /// Error converting underlying data to desired format
    Scalar(ScalarError),
}

impl std::error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            DeserializeErrorKind::Scalar(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            DeserializeErrorKind::Message(ref msg) => write!(f, "{}", msg),
            DeserializeErrorKind::Unsupported(ref msg) => {
                write!(f, "unsupported deserializer method: {}", msg)
            }
            DeserializeErrorKind::Scalar(ref e) => e.fmt(f),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::de::Error for DeserializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeserializeError {
            kind: DeserializeErrorKind::Message(msg.to_string()),
        }
    }
}

impl From<ScalarError> for DeserializeError {
    fn from(error: ScalarError) -> Self {
        DeserializeError {
            kind: DeserializeErrorKind::Scalar(error),
        }
    }
}
