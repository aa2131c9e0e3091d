//! Classify SII files by their leading bytes.
//!
//! Only the plaintext signature matters for deciding whether decryption is
//! needed. The other magics are recognized so tooling can say what a file is.

use crate::text::SIGNATURE;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Magic of the encrypted container the games write by default
const ENCRYPTED: &[u8; 4] = b"ScsC";

/// Magic of the binary serialization of the same data
const BINARY: &[u8; 4] = b"BSII";

/// Magic of the lightly scrambled text variant
const OBFUSCATED: &[u8; 4] = &[0x33, 0x6e, 0x4b, 0x01];

/// The kind of SII file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiiFormat {
    /// Starts with `SiiNunit`, ready to parse
    Plaintext,

    /// An encrypted `ScsC` container
    Encrypted,

    /// A `BSII` binary document
    Binary,

    /// A scrambled text document
    Obfuscated,

    /// Too short or not a recognized magic
    Unknown,
}

impl SiiFormat {
    /// Classify data by its leading bytes
    ///
    /// ```
    /// use siikit::SiiFormat;
    ///
    /// assert_eq!(SiiFormat::sniff(b"SiiNunit\n{\n}"), SiiFormat::Plaintext);
    /// assert_eq!(SiiFormat::sniff(b"ScsC\x01\x02"), SiiFormat::Encrypted);
    /// assert_eq!(SiiFormat::sniff(b"Sii"), SiiFormat::Unknown);
    /// ```
    pub fn sniff(data: &[u8]) -> SiiFormat {
        if data.starts_with(SIGNATURE) {
            SiiFormat::Plaintext
        } else if data.starts_with(ENCRYPTED) {
            SiiFormat::Encrypted
        } else if data.starts_with(BINARY) {
            SiiFormat::Binary
        } else if data.starts_with(OBFUSCATED) {
            SiiFormat::Obfuscated
        } else {
            SiiFormat::Unknown
        }
    }

    /// Classify the file at the given path by reading at most its first 8
    /// bytes. Files that can't be read are `Unknown`.
    pub fn sniff_path<P: AsRef<Path>>(path: P) -> SiiFormat {
        let mut header = [0u8; SIGNATURE.len()];
        let read = File::open(path).and_then(|mut file| read_prefix(&mut file, &mut header));
        match read {
            Ok(len) => SiiFormat::sniff(&header[..len]),
            Err(_) => SiiFormat::Unknown,
        }
    }

    /// Whether the sniffed header was the plaintext signature. Unlike the
    /// free `is_plaintext` function this does not look at any data itself.
    pub fn is_plaintext(&self) -> bool {
        matches!(self, SiiFormat::Plaintext)
    }
}

fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Returns true if the data starts with the plaintext signature
pub fn is_plaintext(data: &[u8]) -> bool {
    data.starts_with(SIGNATURE)
}

/// Returns true if the file at the path is already decrypted.
///
/// Exactly the first 8 bytes are read and compared against `SiiNunit`. Any
/// failure to open or read, including a file shorter than 8 bytes, reports
/// false so that callers fall back to decryption, which then surfaces a
/// clearer error.
pub fn is_decrypted<P: AsRef<Path>>(path: P) -> bool {
    let mut header = [0u8; SIGNATURE.len()];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .map(|_| &header == SIGNATURE)
        .unwrap_or(false)
}

/// Returns true if the path names an existing file with an `.sii` extension
/// (compared case insensitively)
pub fn is_valid_sii_path<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let is_sii = path
        .extension()
        .and_then(|x| x.to_str())
        .map_or(false, |x| x.eq_ignore_ascii_case("sii"));
    is_sii && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::*;

    #[rstest]
    #[case(b"SiiNunit", SiiFormat::Plaintext)]
    #[case(b"SiiNunit\r\n{", SiiFormat::Plaintext)]
    #[case(b"ScsC\x00\x00\x00\x00", SiiFormat::Encrypted)]
    #[case(b"BSII\x02\x00\x00\x00", SiiFormat::Binary)]
    #[case(b"\x33\x6e\x4b\x01\x00", SiiFormat::Obfuscated)]
    #[case(b"SiiNunix", SiiFormat::Unknown)]
    #[case(b"siinunit", SiiFormat::Unknown)]
    #[case(b"", SiiFormat::Unknown)]
    fn sniff_formats(#[case] data: &[u8], #[case] expected: SiiFormat) {
        assert_eq!(SiiFormat::sniff(data), expected);
    }

    #[quickcheck]
    fn plaintext_only_with_signature(data: Vec<u8>) -> bool {
        is_plaintext(&data) == (data.len() >= 8 && &data[..8] == SIGNATURE)
    }

    #[quickcheck]
    fn sniffed_plaintext_agrees_with_header_check(data: Vec<u8>) -> bool {
        SiiFormat::sniff(&data).is_plaintext() == is_plaintext(&data)
    }

    #[test]
    fn read_prefix_stops_at_end() {
        let mut buf = [0u8; 8];
        assert_eq!(read_prefix(&mut &b"abc"[..], &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
    }
}
