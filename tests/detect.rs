use siikit::{is_decrypted, is_valid_sii_path, SiiFormat};
use std::fs;

#[test]
fn decrypted_signature_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exact.sii");
    fs::write(&path, b"SiiNunit").unwrap();
    assert!(is_decrypted(&path));
}

#[test]
fn decrypted_full_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.sii");
    fs::write(&path, include_bytes!("fixtures/profile.sii")).unwrap();
    assert!(is_decrypted(&path));
    assert_eq!(SiiFormat::sniff_path(&path), SiiFormat::Plaintext);
}

#[test]
fn short_file_is_not_decrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.sii");
    fs::write(&path, b"SiiNun").unwrap();
    assert!(!is_decrypted(&path));
    assert_eq!(SiiFormat::sniff_path(&path), SiiFormat::Unknown);
}

#[test]
fn missing_file_is_not_decrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.sii");
    assert!(!is_decrypted(&path));
    assert!(!is_valid_sii_path(&path));
    assert_eq!(SiiFormat::sniff_path(&path), SiiFormat::Unknown);
}

#[test]
fn encrypted_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.SII");
    fs::write(&path, b"ScsC\x9f\x12\x00\x00\x01").unwrap();
    assert!(!is_decrypted(&path));
    assert!(is_valid_sii_path(&path));
    assert_eq!(SiiFormat::sniff_path(&path), SiiFormat::Encrypted);
}

#[test]
fn directory_is_not_a_sii_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folder.sii");
    fs::create_dir(&path).unwrap();
    assert!(!is_valid_sii_path(&path));
    assert!(!is_decrypted(&path));
}
