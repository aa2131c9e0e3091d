use crate::data::is_whitespace;
use std::borrow::Cow;
use std::error;
use std::fmt;

/// An error that can occur when converting a scalar into the requested type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarError {
    /// The value was not a decimal number
    AllDigits(String),

    /// The number does not fit the requested type
    Overflow(String),

    /// The value was neither `true` nor `false`
    InvalidBool(String),

    /// The given string was not an `&` prefixed, 8 digit hex float
    InvalidHex(String),
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarError::AllDigits(x) => write!(f, "did not contain all digits: {}", x),
            ScalarError::InvalidBool(x) => write!(f, "is not a valid bool: {}", x),
            ScalarError::Overflow(x) => write!(f, "caused an overflow: {}", x),
            ScalarError::InvalidHex(x) => write!(f, "is not a valid hex float: {}", x),
        }
    }
}

impl error::Error for ScalarError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Single value borrowed from the underlying SII data.
///
/// SII text is utf-8, so conversion to a string is lossy only for invalid
/// sequences, which are replaced rather than rejected.
///
/// ```
/// use siikit::Scalar;
///
/// let v1 = Scalar::new(b"a");
/// assert_eq!(v1.to_utf8(), "a");
/// ```
#[derive(PartialEq, Eq, Copy, Clone)]
pub struct Scalar<'a> {
    data: &'a [u8],
}

impl<'a> Scalar<'a> {
    /// Create a new scalar backed by the byte slice
    pub fn new(data: &'a [u8]) -> Scalar<'a> {
        Scalar { data }
    }

    /// View the underlying data
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Try converting the scalar to f64
    pub fn to_f64(&self) -> Result<f64, ScalarError> {
        to_f64(self.data)
    }

    /// Try converting the scalar to a bool (`true` or `false`)
    pub fn to_bool(&self) -> Result<bool, ScalarError> {
        to_bool(self.data)
    }

    /// Try converting the scalar to i64
    pub fn to_i64(&self) -> Result<i64, ScalarError> {
        to_i64(self.data)
    }

    /// Try converting the scalar to u64
    pub fn to_u64(&self) -> Result<u64, ScalarError> {
        to_u64(self.data)
    }

    /// Decode the binary representation of a single precision float that SII
    /// writes as `&` followed by 8 hex digits.
    ///
    /// ```
    /// use siikit::Scalar;
    ///
    /// assert_eq!(Scalar::new(b"&3f800000").to_hex_f32(), Ok(1.0));
    /// assert!(Scalar::new(b"&3f80").to_hex_f32().is_err());
    /// ```
    pub fn to_hex_f32(&self) -> Result<f32, ScalarError> {
        to_hex_f32(self.data)
    }

    /// Convert scalar data into utf8, trimming trailing whitespace. Will
    /// allocate only if the data contains invalid utf-8.
    ///
    /// ```
    /// use siikit::Scalar;
    ///
    /// let v1 = Scalar::new(b"a");
    /// assert_eq!(v1.to_utf8(), "a");
    ///
    /// let v2 = Scalar::new(&[0xff][..]);
    /// assert_eq!(v2.to_utf8(), "\u{fffd}");
    /// ```
    pub fn to_utf8(&self) -> Cow<'a, str> {
        to_utf8(self.data)
    }

    /// Convert scalar data into an owned string
    pub fn to_utf8_owned(&self) -> String {
        to_utf8_owned(self.data)
    }

    /// Returns if the scalar contains only ascii values
    pub fn is_ascii(&self) -> bool {
        self.data.is_ascii()
    }
}

impl<'a> fmt::Debug for Scalar<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar {{ {} }}", self)
    }
}

impl<'a> fmt::Display for Scalar<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_utf8())
    }
}

#[inline]
fn to_utf8_owned(d: &[u8]) -> String {
    to_utf8(d).into_owned()
}

#[inline]
fn to_utf8(mut d: &[u8]) -> Cow<str> {
    if !d.is_empty() && is_whitespace(d[d.len() - 1]) {
        let ind = d
            .iter()
            .rev()
            .position(|x| !is_whitespace(*x))
            .unwrap_or(d.len());
        d = &d[0..d.len() - ind];
    }

    String::from_utf8_lossy(d)
}

#[inline]
fn to_bool(d: &[u8]) -> Result<bool, ScalarError> {
    match d {
        b"true" => Ok(true),
        b"false" => Ok(false),
        x => Err(ScalarError::InvalidBool(to_utf8_owned(x))),
    }
}

#[inline]
pub(crate) fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn to_hex_f32(d: &[u8]) -> Result<f32, ScalarError> {
    let digits = match d {
        [b'&', rest @ ..] if rest.len() == 8 => rest,
        _ => return Err(ScalarError::InvalidHex(to_utf8_owned(d))),
    };

    let mut bits = 0u32;
    for &x in digits {
        let nibble = hex_digit(x).ok_or_else(|| ScalarError::InvalidHex(to_utf8_owned(d)))?;
        bits = (bits << 4) | u32::from(nibble);
    }

    Ok(f32::from_bits(bits))
}

fn is_digits(d: &[u8]) -> bool {
    d.iter().all(|x| x.is_ascii_digit())
}

#[inline]
fn to_f64(d: &[u8]) -> Result<f64, ScalarError> {
    let unsigned = match d {
        [b'-' | b'+', rest @ ..] => rest,
        _ => d,
    };

    let (mantissa, exponent) = match unsigned.iter().position(|&x| x == b'e' || x == b'E') {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };

    let (lead, trail) = match mantissa.iter().position(|&x| x == b'.') {
        Some(idx) => (&mantissa[..idx], &mantissa[idx + 1..]),
        None => (mantissa, &b""[..]),
    };

    let exponent_ok = exponent.map_or(true, |e| {
        let e = match e {
            [b'-' | b'+', rest @ ..] => rest,
            _ => e,
        };
        !e.is_empty() && is_digits(e)
    });

    if lead.len() + trail.len() == 0 || !is_digits(lead) || !is_digits(trail) || !exponent_ok {
        return Err(ScalarError::AllDigits(to_utf8_owned(d)));
    }

    // Validated above as an ascii float literal
    let text = String::from_utf8_lossy(d);
    let result = text
        .parse::<f64>()
        .map_err(|_| ScalarError::AllDigits(to_utf8_owned(d)))?;

    if result.is_finite() {
        Ok(result)
    } else {
        Err(ScalarError::Overflow(to_utf8_owned(d)))
    }
}

#[inline]
fn to_i64(d: &[u8]) -> Result<i64, ScalarError> {
    match d {
        [b'-', rest @ ..] => {
            let val = to_u64(rest)?;
            if val <= i64::MAX as u64 {
                Ok(-(val as i64))
            } else if val == i64::MAX as u64 + 1 {
                Ok(i64::MIN)
            } else {
                Err(ScalarError::Overflow(to_utf8_owned(d)))
            }
        }
        _ => {
            let val = to_u64(d.strip_prefix(b"+").unwrap_or(d))?;
            i64::try_from(val).map_err(|_| ScalarError::Overflow(to_utf8_owned(d)))
        }
    }
}

#[inline]
fn to_u64(d: &[u8]) -> Result<u64, ScalarError> {
    if d.is_empty() || !is_digits(d) {
        return Err(ScalarError::AllDigits(to_utf8_owned(d)));
    }

    let mut result: u64 = 0;
    for &x in d {
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(u64::from(x - b'0')))
            .ok_or_else(|| ScalarError::Overflow(to_utf8_owned(d)))?;
    }

    Ok(result)
}
