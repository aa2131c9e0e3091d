use super::grammar::{Field, SiiEvent};
use super::lexer::{ArrayIndex, RawValue};
use super::parser::SiiParser;
use super::reader::SiiReader;
use crate::scalar::hex_digit;
use crate::{Error, Malformed, Scalar, ScalarError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// An interpreted SII value.
///
/// Unquoted scalars are classified in a fixed order: `true` and `false` are
/// booleans, `nil` and `null` are nil, `&` prefixed hex is a single precision
/// float, then integers, then decimal floats. Remaining tokens that contain a
/// `.` name another unit and are references; anything else is a plain token.
///
/// ```
/// use siikit::text::SiiDocument;
///
/// let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n cached_experience: 1500\n}\n}";
/// let doc = SiiDocument::from_slice(&data[..])?;
/// let profile = doc.unit("user_profile", 0).unwrap();
/// assert_eq!(profile.get("company_name").and_then(|x| x.as_str()), Some("Acme"));
/// assert_eq!(profile.get("cached_experience").and_then(|x| x.as_i64()), Some(1500));
/// # Ok::<(), siikit::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),

    /// A quoted string with escapes resolved
    String(String),

    /// An unquoted word that is neither a number nor a reference
    Token(String),

    /// An unquoted name of another unit, eg: `_nameless.1f2.3a4`
    Reference(String),

    /// `(a, b, c)`
    Tuple(Vec<Value>),

    /// Values gathered from indexed or repeated keys
    Array(Vec<Value>),
}

impl Value {
    /// Interpret a value as it appeared in the text
    pub fn from_raw(raw: RawValue) -> Result<Value, ScalarError> {
        match raw {
            RawValue::Quoted(x) => unescape(x).map(Value::String),
            RawValue::Unquoted(x) => Value::from_unquoted(x.as_bytes()),
            RawValue::Tuple(x) => {
                let inner = x.as_bytes();
                if inner.iter().all(|x| x.is_ascii_whitespace()) {
                    return Ok(Value::Tuple(Vec::new()));
                }

                inner
                    .split(|&x| x == b',')
                    .map(|elem| Value::from_tuple_element(trim(elem)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Tuple)
            }
        }
    }

    fn from_tuple_element(data: &[u8]) -> Result<Value, ScalarError> {
        match data {
            [] => Err(ScalarError::AllDigits(String::new())),
            [b'"', inner @ .., b'"'] => unescape(Scalar::new(inner)).map(Value::String),
            _ => Value::from_unquoted(data),
        }
    }

    fn from_unquoted(data: &[u8]) -> Result<Value, ScalarError> {
        let scalar = Scalar::new(data);
        let value = match data {
            b"true" => Value::Bool(true),
            b"false" => Value::Bool(false),
            b"nil" | b"null" => Value::Nil,
            [b'&', ..] => Value::Float(f64::from(scalar.to_hex_f32()?)),
            _ => {
                if let Ok(x) = scalar.to_i64() {
                    Value::Integer(x)
                } else if let Ok(x) = scalar.to_f64() {
                    Value::Float(x)
                } else if data.contains(&b'.') {
                    Value::Reference(scalar.to_utf8_owned())
                } else {
                    Value::Token(scalar.to_utf8_owned())
                }
            }
        };

        Ok(value)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Integer(x) => Some(x),
            _ => None,
        }
    }

    /// Floats, or integers widened to floats
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(x) => Some(x),
            Value::Integer(x) => Some(x as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(x) => Some(x),
            _ => None,
        }
    }

    /// The text of strings, tokens, and references
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(x) | Value::Token(x) | Value::Reference(x) => Some(x.as_str()),
            _ => None,
        }
    }

    /// The elements of arrays and tuples
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(x) | Value::Tuple(x) => Some(x.as_slice()),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    fn append(&mut self, value: Value) {
        match self {
            Value::Array(x) => x.push(value),
            _ => {
                let first = std::mem::replace(self, Value::Nil);
                *self = Value::Array(vec![first, value]);
            }
        }
    }
}

fn trim(mut data: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = data {
        if !first.is_ascii_whitespace() {
            break;
        }
        data = rest;
    }

    while let [rest @ .., last] = data {
        if !last.is_ascii_whitespace() {
            break;
        }
        data = rest;
    }

    data
}

fn unescape(scalar: Scalar) -> Result<String, ScalarError> {
    let data = scalar.as_bytes();
    if !data.contains(&b'\\') {
        return Ok(String::from_utf8_lossy(data).into_owned());
    }

    let invalid = || ScalarError::InvalidHex(String::from_utf8_lossy(data).into_owned());
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }

        match iter.next() {
            Some(b'n') => out.push(b'\n'),
            Some(b't') => out.push(b'\t'),
            Some(b'r') => out.push(b'\r'),
            Some(b'x') => {
                let hi = iter.next().and_then(hex_digit).ok_or_else(invalid)?;
                let lo = iter.next().and_then(hex_digit).ok_or_else(invalid)?;
                out.push((hi << 4) | lo);
            }
            Some(x) => out.push(x),
            None => out.push(b'\\'),
        }
    }

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// A named, class typed block of fields
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    class: String,
    name: String,
    fields: Vec<(String, Value)>,
}

impl Unit {
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        Unit {
            class: class.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// The unit's instance identifier, eg: `profile.0` or `_nameless.1f2.3a4`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in the order of their first appearance
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Adds a field, returning true when a declared element count was just
    /// replaced by the first of its elements
    fn push(&mut self, field: Field) -> Result<bool, Error> {
        let value = Value::from_raw(field.value).map_err(|e| {
            let reason = match e {
                ScalarError::InvalidHex(_) => Malformed::InvalidHex,
                _ => Malformed::InvalidScalar,
            };
            Error::malformed(field.offset, reason)
        })?;

        let key = field.key.to_utf8();
        let existing = self.fields.iter_mut().find(|(k, _)| *k == key);
        let (index, prior) = match (field.index, existing) {
            (None, Some((_, prior))) => {
                prior.append(value);
                return Ok(false);
            }
            (None, None) => {
                self.fields.push((key.into_owned(), value));
                return Ok(false);
            }
            (Some(index), None) => {
                if !matches!(index, ArrayIndex::Append | ArrayIndex::At(0)) {
                    return Err(Error::malformed(field.offset, Malformed::InvalidIndex));
                }

                self.fields.push((key.into_owned(), Value::Array(vec![value])));
                return Ok(false);
            }
            (Some(index), Some((_, prior))) => (index, prior),
        };

        // the element count declared before the elements themselves
        let replaced = matches!(prior, Value::Integer(_));
        if replaced {
            *prior = Value::Array(Vec::new());
        }

        match prior {
            Value::Array(elements) => match index {
                ArrayIndex::At(i) if i != elements.len() => {
                    Err(Error::malformed(field.offset, Malformed::InvalidIndex))
                }
                _ => {
                    elements.push(value);
                    Ok(replaced)
                }
            },
            _ => Err(Error::malformed(field.offset, Malformed::IndexedScalar)),
        }
    }
}

/// A plain integer field that may turn out to be an element count, eg:
/// `mods: 2` ahead of `mods[0]` and `mods[1]`
#[derive(Debug)]
struct DeclaredCount {
    key: String,
    count: i64,
    offset: usize,
    has_elements: bool,
}

/// Assembles events into owned units
#[derive(Debug, Default)]
pub(crate) struct UnitAssembler {
    current: Option<Unit>,
    counts: Vec<DeclaredCount>,
}

impl UnitAssembler {
    /// Returns a unit once its closing brace is seen
    pub(crate) fn accept(&mut self, event: SiiEvent) -> Result<Option<Unit>, Error> {
        match event {
            SiiEvent::UnitStart { class, name, .. } => {
                self.current = Some(Unit::new(class.to_utf8(), name.to_utf8()));
                self.counts.clear();
                Ok(None)
            }
            SiiEvent::Field(field) => {
                let unit = match self.current.as_mut() {
                    Some(x) => x,
                    None => return Ok(None),
                };

                let key = field.key.to_utf8();
                if field.index.is_none() && unit.get(&key).is_none() {
                    if let RawValue::Unquoted(x) = field.value {
                        if let Ok(count) = x.to_i64() {
                            self.counts.push(DeclaredCount {
                                key: key.to_string(),
                                count,
                                offset: field.offset,
                                has_elements: false,
                            });
                        }
                    }
                }

                if unit.push(field)? {
                    if let Some(declared) = self.counts.iter_mut().find(|x| x.key == key) {
                        declared.has_elements = true;
                    }
                }

                Ok(None)
            }
            SiiEvent::UnitEnd => {
                let unit = match self.current.take() {
                    Some(x) => x,
                    None => return Ok(None),
                };

                for declared in self.counts.drain(..).filter(|x| x.has_elements) {
                    let len = unit
                        .get(&declared.key)
                        .and_then(|x| x.as_array())
                        .map_or(0, |x| x.len());
                    if i64::try_from(len).ok() != Some(declared.count) {
                        return Err(Error::malformed(declared.offset, Malformed::CountMismatch));
                    }
                }

                Ok(Some(unit))
            }
            SiiEvent::Signature | SiiEvent::Begin | SiiEvent::End => Ok(None),
        }
    }
}

/// A whole SII document without any prior knowledge of its schema.
///
/// Units keep document order. Units of one class are addressed by their
/// position among units of that class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiiDocument {
    units: Vec<Unit>,
}

impl SiiDocument {
    /// Parse a document held in memory
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let mut parser = SiiParser::new(data);
        let mut units = Vec::new();
        while let Some(unit) = parser.next_unit()? {
            units.push(unit);
        }

        Ok(SiiDocument::from_units(units))
    }

    /// Parse a document through the streaming reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        SiiReader::new(reader).read_document()
    }

    /// Parse a plaintext file through the streaming reader
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        SiiDocument::from_reader(file)
    }

    pub fn from_units(units: Vec<Unit>) -> Self {
        SiiDocument { units }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn into_units(self) -> Vec<Unit> {
        self.units
    }

    /// Units of the given class, in document order
    pub fn units_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units.iter().filter(move |x| x.class == class)
    }

    /// The `index`-th unit of the given class
    pub fn unit(&self, class: &str, index: usize) -> Option<&Unit> {
        self.units.iter().filter(|x| x.class == class).nth(index)
    }

    /// Distinct unit classes in order of first appearance
    pub fn classes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for unit in &self.units {
            if !out.contains(&unit.class.as_str()) {
                out.push(&unit.class);
            }
        }
        out
    }

    /// Look up a unit by its name, eg: to resolve a reference
    pub fn find(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|x| x.name == name)
    }
}

#[cfg(feature = "serde")]
mod ser {
    use super::{SiiDocument, Unit, Value};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    const ROOT: &str = "SiiNunit";

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Nil => serializer.serialize_unit(),
                Value::Bool(x) => serializer.serialize_bool(*x),
                Value::Integer(x) => serializer.serialize_i64(*x),
                Value::Float(x) => serializer.serialize_f64(*x),
                Value::String(x) | Value::Token(x) | Value::Reference(x) => {
                    serializer.serialize_str(x)
                }
                Value::Tuple(x) | Value::Array(x) => {
                    let mut seq = serializer.serialize_seq(Some(x.len()))?;
                    for elem in x {
                        seq.serialize_element(elem)?;
                    }
                    seq.end()
                }
            }
        }
    }

    impl Serialize for Unit {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
            map.serialize_entry("_name", &self.name)?;
            for (key, value) in &self.fields {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }

    struct Classes<'a>(&'a SiiDocument);

    struct ClassUnits<'a> {
        doc: &'a SiiDocument,
        class: &'a str,
    }

    impl<'a> Serialize for ClassUnits<'a> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.doc.units_of(self.class))
        }
    }

    impl<'a> Serialize for Classes<'a> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let classes = self.0.classes();
            let mut map = serializer.serialize_map(Some(classes.len()))?;
            for class in classes {
                map.serialize_entry(class, &ClassUnits { doc: self.0, class })?;
            }
            map.end()
        }
    }

    impl Serialize for SiiDocument {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(ROOT, &Classes(self))?;
            map.end()
        }
    }
}
