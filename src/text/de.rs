use super::document::{SiiDocument, Unit, Value};
use crate::{DeserializeError, DeserializeErrorKind, Error};
use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, Deserialize, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use std::io::Read;

/// A structure to deserialize SII data into Rust values.
///
/// The root of a document deserializes as a map from unit class to a sequence
/// of units, and each unit as a map of its fields plus its name under
/// `_name`. Classes the target type does not name are ignored.
///
/// ```
/// use siikit::text::SiiDeserializer;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Save {
///     job: Vec<Job>,
/// }
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Job {
///     #[serde(rename = "_name")]
///     id: String,
///     cargo: String,
///     urgency: Option<u32>,
///     stops: Vec<String>,
/// }
///
/// let data = b"SiiNunit\n{\njob : job.0 {\n cargo: wood\n urgency: nil\n stops: 2\n stops[0]: \"a\"\n stops[1]: \"b\"\n}\n}";
/// let save: Save = SiiDeserializer::from_slice(&data[..])?;
/// assert_eq!(save.job, vec![Job {
///     id: String::from("job.0"),
///     cargo: String::from("wood"),
///     urgency: None,
///     stops: vec![String::from("a"), String::from("b")],
/// }]);
/// # Ok::<(), siikit::Error>(())
/// ```
pub struct SiiDeserializer;

impl SiiDeserializer {
    /// Parse the data and deserialize it in one step
    pub fn from_slice<T>(data: &[u8]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let doc = SiiDocument::from_slice(data)?;
        SiiDeserializer::from_document(&doc)
    }

    /// Parse the data through the streaming reader and deserialize it
    pub fn from_reader<T, R>(reader: R) -> Result<T, Error>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let doc = SiiDocument::from_reader(reader)?;
        SiiDeserializer::from_document(&doc)
    }

    /// Deserialize an already parsed document. Strings may borrow from it.
    pub fn from_document<'de, T>(doc: &'de SiiDocument) -> Result<T, Error>
    where
        T: Deserialize<'de>,
    {
        Ok(T::deserialize(DocumentDeserializer { doc })?)
    }
}

#[derive(Clone, Copy)]
struct DocumentDeserializer<'de> {
    doc: &'de SiiDocument,
}

impl<'de> de::Deserializer<'de> for DocumentDeserializer<'de> {
    type Error = DeserializeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(ClassesAccess {
            doc: self.doc,
            classes: self.doc.classes().into_iter(),
            current: None,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct ClassesAccess<'de> {
    doc: &'de SiiDocument,
    classes: std::vec::IntoIter<&'de str>,
    current: Option<&'de str>,
}

impl<'de> de::MapAccess<'de> for ClassesAccess<'de> {
    type Error = DeserializeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.classes.next() {
            Some(class) => {
                self.current = Some(class);
                seed.deserialize(BorrowedStrDeserializer::new(class)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let class = self.current.take().ok_or_else(|| DeserializeError {
            kind: DeserializeErrorKind::Message(String::from("value requested before key")),
        })?;

        let units: Vec<&'de Unit> = self.doc.units_of(class).collect();
        seed.deserialize(de::value::SeqDeserializer::new(
            units.into_iter().map(UnitDeserializer),
        ))
    }
}

struct UnitDeserializer<'de>(&'de Unit);

impl<'de> IntoDeserializer<'de, DeserializeError> for UnitDeserializer<'de> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

impl<'de> de::Deserializer<'de> for UnitDeserializer<'de> {
    type Error = DeserializeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(UnitAccess {
            unit: self.0,
            index: None,
            value: None,
        })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// The unit name comes first, followed by the fields
struct UnitAccess<'de> {
    unit: &'de Unit,
    index: Option<usize>,
    value: Option<UnitValue<'de>>,
}

enum UnitValue<'de> {
    Name(&'de str),
    Field(&'de Value),
}

impl<'de> de::MapAccess<'de> for UnitAccess<'de> {
    type Error = DeserializeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let next = self.index.map_or(0, |x| x + 1);
        self.index = Some(next);
        if next == 0 {
            self.value = Some(UnitValue::Name(self.unit.name()));
            return seed
                .deserialize(BorrowedStrDeserializer::new("_name"))
                .map(Some);
        }

        match self.unit.fields().get(next - 1) {
            Some((key, value)) => {
                self.value = Some(UnitValue::Field(value));
                seed.deserialize(BorrowedStrDeserializer::new(key.as_str()))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(UnitValue::Name(name)) => seed.deserialize(BorrowedStrDeserializer::new(name)),
            Some(UnitValue::Field(value)) => seed.deserialize(ValueDeserializer(value)),
            None => Err(DeserializeError {
                kind: DeserializeErrorKind::Message(String::from("value requested before key")),
            }),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.unit.len() + 1)
    }
}

struct ValueDeserializer<'de>(&'de Value);

impl<'de> IntoDeserializer<'de, DeserializeError> for ValueDeserializer<'de> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

impl<'de> ValueDeserializer<'de> {
    fn visit_elements<V>(elements: &'de [Value], visitor: V) -> Result<V::Value, DeserializeError>
    where
        V: Visitor<'de>,
    {
        let mut seq = de::value::SeqDeserializer::<_, DeserializeError>::new(
            elements.iter().map(ValueDeserializer),
        );
        let result = visitor.visit_seq(&mut seq)?;
        seq.end()?;
        Ok(result)
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = DeserializeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Nil => visitor.visit_unit(),
            Value::Bool(x) => visitor.visit_bool(*x),
            Value::Integer(x) => visitor.visit_i64(*x),
            Value::Float(x) => visitor.visit_f64(*x),
            Value::String(x) | Value::Token(x) | Value::Reference(x) => {
                visitor.visit_borrowed_str(x.as_str())
            }
            Value::Tuple(x) | Value::Array(x) => Self::visit_elements(x, visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Nil => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Integer(x) => visitor.visit_string(x.to_string()),
            Value::Float(x) => visitor.visit_string(x.to_string()),
            Value::Bool(x) => visitor.visit_borrowed_str(if *x { "true" } else { "false" }),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0 {
            Value::Tuple(x) | Value::Array(x) => Self::visit_elements(x, visitor),

            // a declared element count with no elements following it
            Value::Integer(0) | Value::Nil => Self::visit_elements(&[], visitor),
            Value::Integer(x) => Err(DeserializeError {
                kind: DeserializeErrorKind::Message(format!(
                    "declared {} elements but none followed",
                    x
                )),
            }),
            _ => Self::visit_elements(std::slice::from_ref(self.0), visitor),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.0.as_str() {
            Some(x) => visitor.visit_enum(BorrowedStrDeserializer::new(x)),
            None => Err(DeserializeError {
                kind: DeserializeErrorKind::Unsupported(String::from(
                    "enums must be strings or tokens",
                )),
            }),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf unit unit_struct map struct identifier ignored_any
    }
}
