use siikit::text::Value;
use siikit::{
    DecryptionResult, Decryptor, ErrorKind, ExternalTool, PlaintextTransform, TransformError,
};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

const ENCRYPTED: &[u8] = b"ScsC\x01\x02\x03\x04\x05\x06";
const PLAINTEXT: &[u8] = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n}\n}\n";

/// Writes canned output and counts its invocations
struct FakeTool {
    available: bool,
    output: Option<&'static [u8]>,
    calls: Cell<usize>,
}

impl FakeTool {
    fn writing(output: &'static [u8]) -> Self {
        FakeTool {
            available: true,
            output: Some(output),
            calls: Cell::new(0),
        }
    }
}

impl PlaintextTransform for FakeTool {
    fn location(&self) -> &Path {
        Path::new("/fake/SII_Decrypt.exe")
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn transform(&self, source: &Path, destination: Option<&Path>) -> Result<(), TransformError> {
        self.calls.set(self.calls.get() + 1);
        match self.output {
            Some(output) => {
                fs::write(destination.unwrap_or(source), output).map_err(TransformError::Launch)
            }
            None => Ok(()),
        }
    }
}

fn encrypted_file(dir: &Path) -> PathBuf {
    let path = dir.join("profile.sii");
    fs::write(&path, ENCRYPTED).unwrap();
    path
}

#[test]
fn decrypt_in_place_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let tool = FakeTool::writing(PLAINTEXT);
    let decryptor = Decryptor::new(&tool);

    let first = decryptor.decrypt_in_place(&path).unwrap();
    assert_eq!(first, DecryptionResult::Transformed(path.clone()));
    assert_eq!(tool.calls.get(), 1);

    let second = decryptor.decrypt_in_place(&path).unwrap();
    assert_eq!(second, DecryptionResult::AlreadyPlaintext);
    assert_eq!(tool.calls.get(), 1);
    assert_eq!(fs::read(&path).unwrap(), PLAINTEXT);
}

#[test]
fn missing_tool_is_never_invoked() {
    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let tool = FakeTool {
        available: false,
        output: Some(PLAINTEXT),
        calls: Cell::new(0),
    };

    let err = Decryptor::new(&tool).decrypt_in_place(&path).unwrap_err();
    match err.kind() {
        ErrorKind::ToolMissing { path } => {
            assert_eq!(path, Path::new("/fake/SII_Decrypt.exe"))
        }
        x => panic!("unexpected error: {:?}", x),
    }
    assert_eq!(tool.calls.get(), 0);
    assert_eq!(fs::read(&path).unwrap(), ENCRYPTED);
}

#[test]
fn missing_tool_on_plaintext_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.sii");
    fs::write(&path, PLAINTEXT).unwrap();

    let decryptor = Decryptor::new(ExternalTool::new(dir.path().join("missing.exe")));
    let doc = decryptor.open_document(&path).unwrap();
    assert_eq!(doc.units().len(), 1);
}

#[test]
fn decrypt_to_file_leaves_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let out = dir.path().join("out.sii");
    let tool = FakeTool::writing(PLAINTEXT);

    let written = Decryptor::new(&tool).decrypt_to_file(&path, &out).unwrap();
    assert_eq!(written, out);
    assert_eq!(fs::read(&out).unwrap(), PLAINTEXT);
    assert_eq!(fs::read(&path).unwrap(), ENCRYPTED);
}

#[test]
fn decrypt_to_file_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let tool = FakeTool {
        available: true,
        output: None,
        calls: Cell::new(0),
    };

    let err = Decryptor::new(&tool)
        .decrypt_to_file(&path, dir.path().join("out.sii"))
        .unwrap_err();
    match err.kind() {
        ErrorKind::DecryptionFailed { diagnostic, .. } => {
            assert_eq!(diagnostic, "no output produced")
        }
        x => panic!("unexpected error: {:?}", x),
    }
    assert_eq!(tool.calls.get(), 1);
}

#[test]
fn open_document_decrypts_then_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let tool = FakeTool::writing(PLAINTEXT);

    let doc = Decryptor::new(&tool).open_document(&path).unwrap();
    let unit = doc.unit("user_profile", 0).unwrap();
    assert_eq!(
        unit.get("company_name"),
        Some(&Value::String(String::from("Acme")))
    );
}

#[test]
fn failing_tool_reports_diagnostic() {
    struct Failing;

    impl PlaintextTransform for Failing {
        fn location(&self) -> &Path {
            Path::new("failing")
        }

        fn is_available(&self) -> bool {
            true
        }

        fn transform(&self, _: &Path, _: Option<&Path>) -> Result<(), TransformError> {
            Err(TransformError::Exit {
                code: Some(2),
                diagnostic: String::from("unsupported file format"),
            })
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let err = Decryptor::new(Failing).decrypt_in_place(&path).unwrap_err();
    match err.kind() {
        ErrorKind::DecryptionFailed {
            path: failed,
            diagnostic,
        } => {
            assert_eq!(failed, &path);
            assert_eq!(diagnostic, "unsupported file format");
        }
        x => panic!("unexpected error: {:?}", x),
    }
}

#[cfg(unix)]
#[test]
fn external_tool_that_cannot_launch() {
    let dir = tempfile::tempdir().unwrap();
    let path = encrypted_file(dir.path());
    let tool = ExternalTool::new(dir.path().join("not-a-program"));
    assert!(!tool.is_available());

    let err = tool.transform(&path, None).unwrap_err();
    assert!(matches!(err, TransformError::Launch(_)));
}

/// A shell script standing in for the decryption tool. It logs its
/// arguments, fails when asked to decrypt in place and writes plaintext to a
/// second argument.
#[cfg(unix)]
fn shell_tool(dir: &Path) -> (ExternalTool, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join("calls.log");
    let script = dir.join("decrypt.sh");
    let body = format!(
        r#"#!/bin/sh
echo "$#:$1:$2" >> "{log}"
if [ "$#" -eq 1 ]; then
    echo "boom on stderr" >&2
    exit 3
fi
printf 'SiiNunit\n{{\n}}\n' > "$2"
"#,
        log = log.display()
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    (ExternalTool::new(script), log)
}

#[cfg(unix)]
#[test]
fn external_tool_arguments_and_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let source = encrypted_file(dir.path());
    let destination = dir.path().join("plain.sii");
    let (tool, log) = shell_tool(dir.path());
    assert!(tool.is_available());

    match tool.transform(&source, None).unwrap_err() {
        TransformError::Exit { code, diagnostic } => {
            assert_eq!(code, Some(3));
            assert_eq!(diagnostic, "boom on stderr");
        }
        x => panic!("unexpected error: {:?}", x),
    }

    let decryptor = Decryptor::new(tool);
    let err = decryptor.decrypt_in_place(&source).unwrap_err();
    match err.kind() {
        ErrorKind::DecryptionFailed {
            path: failed,
            diagnostic,
        } => {
            assert_eq!(failed, &source);
            assert_eq!(diagnostic, "boom on stderr");
        }
        x => panic!("unexpected error: {:?}", x),
    }
    assert_eq!(fs::read(&source).unwrap(), ENCRYPTED);

    let written = decryptor.decrypt_to_file(&source, &destination).unwrap();
    assert_eq!(written, destination);
    assert_eq!(fs::read(&destination).unwrap(), b"SiiNunit\n{\n}\n");
    assert_eq!(fs::read(&source).unwrap(), ENCRYPTED);

    let calls = fs::read_to_string(&log).unwrap();
    let source = source.display();
    assert_eq!(
        calls,
        format!(
            "1:{source}:\n1:{source}:\n2:{source}:{}\n",
            destination.display()
        )
    );
}
