//! Profile directories are named after the hex encoding of the profile's
//! display name. This module converts between the two.
//!
//! ```
//! use siikit::{decode_hex_name, HexNameError};
//!
//! assert_eq!(decode_hex_name("4A6F686E").as_deref(), Ok("John"));
//! assert_eq!(decode_hex_name("0x4A6F686E").as_deref(), Ok("John"));
//! assert_eq!(decode_hex_name("4A6F686"), Err(HexNameError::OddLength));
//! ```

use std::error;
use std::fmt;

/// Marker that may precede the hex digits of a name
const PREFIX: &str = "0x";

/// The reason a directory name is not a decodable profile name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexNameError {
    /// Nothing remained after the optional prefix was stripped
    Empty,

    /// A character that is not a hex digit was found at the given byte position
    NonHex { position: usize },

    /// The hex digits do not pair up into whole bytes
    OddLength,
}

impl fmt::Display for HexNameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HexNameError::Empty => write!(f, "hex name is empty"),
            HexNameError::NonHex { position } => {
                write!(f, "hex name has a non hex digit at position {}", position)
            }
            HexNameError::OddLength => write!(f, "hex name has an odd number of digits"),
        }
    }
}

impl error::Error for HexNameError {}

/// Decode a hex encoded profile directory name into its display name.
///
/// An optional `0x` prefix is stripped, then the remainder must be a non-empty,
/// even length run of hex digits. The decoded bytes are read as utf-8, with
/// invalid sequences replaced by U+FFFD rather than rejected.
pub fn decode_hex_name(name: &str) -> Result<String, HexNameError> {
    let bytes = decode_hex_bytes(name)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a hex encoded name into raw bytes without interpreting them as text
pub fn decode_hex_bytes(name: &str) -> Result<Vec<u8>, HexNameError> {
    let digits = name.strip_prefix(PREFIX).unwrap_or(name).as_bytes();
    if digits.is_empty() {
        return Err(HexNameError::Empty);
    }

    if let Some(position) = digits.iter().position(|x| !x.is_ascii_hexdigit()) {
        return Err(HexNameError::NonHex { position });
    }

    if digits.len() % 2 != 0 {
        return Err(HexNameError::OddLength);
    }

    Ok(digits
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

/// Encode bytes the way the games name profile directories (uppercase hex)
pub fn encode_hex_name(data: impl AsRef<[u8]>) -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let data = data.as_ref();
    let mut out = String::with_capacity(data.len() * 2);
    for &b in data {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0xf)]));
    }
    out
}

#[inline]
fn nibble(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use rstest::*;

    #[rstest]
    #[case("4A6F686E", "John")]
    #[case("4a6f686e", "John")]
    #[case("0x4A6F686E", "John")]
    #[case("C5A06B6F6461", "Škoda")]
    #[case("20", " ")]
    fn decodes_names(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decode_hex_name(input).as_deref(), Ok(expected));
    }

    #[rstest]
    #[case("", HexNameError::Empty)]
    #[case("0x", HexNameError::Empty)]
    #[case("4A6", HexNameError::OddLength)]
    #[case("4G", HexNameError::NonHex { position: 1 })]
    #[case("0x4A 6F", HexNameError::NonHex { position: 2 })]
    #[case("profiles", HexNameError::NonHex { position: 0 })]
    fn rejects_names(#[case] input: &str, #[case] expected: HexNameError) {
        assert_eq!(decode_hex_name(input), Err(expected));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(decode_hex_name("41FF42").as_deref(), Ok("A\u{fffd}B"));
    }

    #[quickcheck]
    fn byte_layer_round_trip(data: Vec<u8>) -> TestResult {
        if data.is_empty() {
            return TestResult::discard();
        }

        let hex = encode_hex_name(&data);
        TestResult::from_bool(
            decode_hex_bytes(&hex).map(encode_hex_name).as_deref() == Ok(hex.as_str()),
        )
    }

    #[quickcheck]
    fn lowercase_round_trip(data: Vec<u8>) -> TestResult {
        if data.is_empty() {
            return TestResult::discard();
        }

        let hex = encode_hex_name(&data).to_lowercase();
        let decoded = decode_hex_bytes(&hex).map(encode_hex_name);
        TestResult::from_bool(decoded.map(|x| x.to_lowercase()).as_deref() == Ok(hex.as_str()))
    }

    #[quickcheck]
    fn never_panics(input: String) -> bool {
        let _ = decode_hex_name(&input);
        true
    }

    #[quickcheck]
    fn odd_or_non_hex_is_invalid(input: String) -> TestResult {
        let digits = input.strip_prefix(PREFIX).unwrap_or(&input);
        let valid = !digits.is_empty()
            && digits.bytes().all(|x| x.is_ascii_hexdigit())
            && digits.len() % 2 == 0;
        if valid {
            return TestResult::discard();
        }

        TestResult::from_bool(decode_hex_name(&input).is_err())
    }
}
