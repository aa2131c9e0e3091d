//! Turn encrypted SII files into plaintext.
//!
//! The transform itself is an opaque executable. [Decryptor] owns the policy
//! around it: check the header before doing anything, refuse to run a tool
//! that isn't there, and verify that the tool left plaintext behind.

use crate::config::Config;
use crate::detect::is_decrypted;
use crate::text::SiiDocument;
use crate::{Error, ErrorKind};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Why a transform did not complete
#[derive(Debug)]
pub enum TransformError {
    /// The transform could not be started
    Launch(io::Error),

    /// The transform ran and exited unsuccessfully
    Exit {
        code: Option<i32>,
        diagnostic: String,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransformError::Launch(e) => write!(f, "unable to launch: {}", e),
            TransformError::Exit { diagnostic, .. } => f.write_str(diagnostic),
        }
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransformError::Launch(e) => Some(e),
            TransformError::Exit { .. } => None,
        }
    }
}

/// Something that rewrites an encrypted file as plaintext.
///
/// With no destination the source is rewritten in place.
pub trait PlaintextTransform {
    /// Where the transform lives
    fn location(&self) -> &Path;

    /// Whether the transform can be invoked at all
    fn is_available(&self) -> bool {
        self.location().is_file()
    }

    /// Run the transform, blocking until it completes
    fn transform(&self, source: &Path, destination: Option<&Path>) -> Result<(), TransformError>;
}

impl<T: PlaintextTransform + ?Sized> PlaintextTransform for &T {
    fn location(&self) -> &Path {
        (**self).location()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn transform(&self, source: &Path, destination: Option<&Path>) -> Result<(), TransformError> {
        (**self).transform(source, destination)
    }
}

/// Runs an external decryption executable as `tool <source> [destination]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    program: PathBuf,
}

impl ExternalTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ExternalTool {
            program: program.into(),
        }
    }

    /// The tool found in the configured asset directory
    pub fn from_config(config: &Config) -> Self {
        ExternalTool::new(config.tool_path())
    }
}

impl PlaintextTransform for ExternalTool {
    fn location(&self) -> &Path {
        &self.program
    }

    fn transform(&self, source: &Path, destination: Option<&Path>) -> Result<(), TransformError> {
        let mut command = Command::new(&self.program);
        command.arg(source);
        if let Some(destination) = destination {
            command.arg(destination);
        }

        debug!(tool = %self.program.display(), source = %source.display(), "running decryption tool");
        let output = command.output().map_err(TransformError::Launch)?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostic = match (stderr.trim(), stdout.trim()) {
            ("", "") => output.status.to_string(),
            ("", out) => out.to_string(),
            (err, _) => err.to_string(),
        };

        Err(TransformError::Exit {
            code: output.status.code(),
            diagnostic,
        })
    }
}

/// The outcome of making a file's plaintext available
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionResult {
    /// The file already started with the plaintext signature
    AlreadyPlaintext,

    /// Plaintext was written to the path
    Transformed(PathBuf),
}

/// Applies the decryption policy around a [PlaintextTransform].
///
/// Every call re-checks the file header; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Decryptor<T> {
    transform: T,
}

impl Decryptor<ExternalTool> {
    /// A decryptor that runs the tool found in the configured asset directory
    pub fn from_config(config: &Config) -> Self {
        Decryptor::new(ExternalTool::from_config(config))
    }
}

impl<T> Decryptor<T>
where
    T: PlaintextTransform,
{
    pub fn new(transform: T) -> Self {
        Decryptor { transform }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    fn ensure_available(&self) -> Result<(), Error> {
        if self.transform.is_available() {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::ToolMissing {
                path: self.transform.location().to_path_buf(),
            }))
        }
    }

    fn run(&self, source: &Path, destination: Option<&Path>) -> Result<(), Error> {
        self.transform.transform(source, destination).map_err(|e| {
            warn!(source = %source.display(), error = %e, "decryption failed");
            Error::new(ErrorKind::DecryptionFailed {
                path: source.to_path_buf(),
                diagnostic: e.to_string(),
            })
        })
    }

    /// Make the file at `path` plaintext, rewriting it in place if needed.
    ///
    /// A file that already starts with the plaintext signature is left
    /// untouched, so calling this repeatedly is harmless.
    pub fn decrypt_in_place<P: AsRef<Path>>(&self, path: P) -> Result<DecryptionResult, Error> {
        let path = path.as_ref();
        if is_decrypted(path) {
            debug!(path = %path.display(), "already plaintext");
            return Ok(DecryptionResult::AlreadyPlaintext);
        }

        self.ensure_available()?;
        self.run(path, None)?;

        if !is_decrypted(path) {
            return Err(Error::new(ErrorKind::DecryptionFailed {
                path: path.to_path_buf(),
                diagnostic: String::from("file is still not plaintext"),
            }));
        }

        Ok(DecryptionResult::Transformed(path.to_path_buf()))
    }

    /// Write the plaintext of `source` to `destination`, leaving the source
    /// untouched. Returns the destination path.
    pub fn decrypt_to_file<P, Q>(&self, source: P, destination: Q) -> Result<PathBuf, Error>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let source = source.as_ref();
        let destination = destination.as_ref();
        self.ensure_available()?;
        self.run(source, Some(destination))?;

        if !destination.exists() {
            return Err(Error::new(ErrorKind::DecryptionFailed {
                path: source.to_path_buf(),
                diagnostic: String::from("no output produced"),
            }));
        }

        Ok(destination.to_path_buf())
    }

    /// Decrypt the file in place when needed, then parse it
    pub fn open_document<P: AsRef<Path>>(&self, path: P) -> Result<SiiDocument, Error> {
        let path = path.as_ref();
        self.decrypt_in_place(path)?;
        SiiDocument::from_path(path)
    }

    /// Decrypt the file in place when needed, then deserialize it
    #[cfg(feature = "derive")]
    pub fn open_as<D, P>(&self, path: P) -> Result<D, Error>
    where
        D: serde::de::DeserializeOwned,
        P: AsRef<Path>,
    {
        let doc = self.open_document(path)?;
        crate::text::SiiDeserializer::from_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;

    struct Rewrite {
        calls: Cell<usize>,
        output: &'static [u8],
    }

    impl PlaintextTransform for Rewrite {
        fn location(&self) -> &Path {
            Path::new("fake-tool")
        }

        fn is_available(&self) -> bool {
            true
        }

        fn transform(&self, source: &Path, destination: Option<&Path>) -> Result<(), TransformError> {
            self.calls.set(self.calls.get() + 1);
            fs::write(destination.unwrap_or(source), self.output).map_err(TransformError::Launch)
        }
    }

    #[test]
    fn tool_missing_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.sii");
        fs::write(&path, b"ScsC\x00\x00").unwrap();

        let decryptor = Decryptor::new(ExternalTool::new(dir.path().join("missing.exe")));
        let err = decryptor.decrypt_in_place(&path).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ToolMissing { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"ScsC\x00\x00");
    }

    #[test]
    fn verifies_plaintext_after_transform() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.sii");
        fs::write(&path, b"ScsC\x00\x00").unwrap();

        let fake = Rewrite {
            calls: Cell::new(0),
            output: b"still garbage",
        };
        let err = Decryptor::new(&fake).decrypt_in_place(&path).unwrap_err();
        match err.kind() {
            ErrorKind::DecryptionFailed { diagnostic, .. } => {
                assert_eq!(diagnostic, "file is still not plaintext")
            }
            x => panic!("unexpected error: {:?}", x),
        }
    }

    #[test]
    fn exit_diagnostic_is_displayed() {
        let err = TransformError::Exit {
            code: Some(1),
            diagnostic: String::from("bad file"),
        };
        assert_eq!(err.to_string(), "bad file");
    }
}
