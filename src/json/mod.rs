//! Converts a parsed SII document to JSON
//!
//! Units are grouped by class under the `SiiNunit` root, in the order each
//! class first appears, and every unit carries its name under `_name`.
//!
//! ```
//! use siikit::{text::SiiDocument, json::JsonOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n cached_experience: 1500\n}\n}";
//! let doc = SiiDocument::from_slice(&data[..])?;
//!
//! let options = JsonOptions::new().with_prettyprint(false);
//!
//! // These are the default options
//! assert_eq!(options, JsonOptions::default());
//!
//! let actual = doc.json().with_options(options).to_string()?;
//! assert_eq!(
//!     actual,
//!     r#"{"SiiNunit":{"user_profile":[{"_name":"profile.0","company_name":"Acme","cached_experience":1500}]}}"#
//! );
//! # Ok(())
//! # }
//! ```

use crate::text::{SiiDocument, Unit};
use crate::Error;
use serde::Serialize;
use std::io::Write;

/// Customizes the JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Controls if the JSON should be pretty printed
    pretty: bool,
}

impl JsonOptions {
    /// Creates the structure with default options
    pub fn new() -> Self {
        JsonOptions::default()
    }

    /// Sets if the JSON should be pretty printed or minified
    pub fn with_prettyprint(mut self, pretty: bool) -> JsonOptions {
        self.pretty = pretty;
        self
    }
}

fn writer_json<W, S>(writer: W, pretty: bool, ser: S) -> Result<(), Error>
where
    W: Write,
    S: Serialize,
{
    let result = if pretty {
        serde_json::to_writer_pretty(writer, &ser)
    } else {
        serde_json::to_writer(writer, &ser)
    };

    Ok(result?)
}

/// Creates JSON from a document
pub struct JsonDocumentBuilder<'a> {
    doc: &'a SiiDocument,
    options: JsonOptions,
}

impl<'a> JsonDocumentBuilder<'a> {
    /// Output JSON with the set of options
    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Output JSON to the given writer
    pub fn to_writer<W: Write>(self, writer: W) -> Result<(), Error> {
        writer_json(writer, self.options.pretty, self.doc)
    }

    /// Output JSON to vec that contains UTF-8 data
    pub fn to_vec(self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        writer_json(&mut out, self.options.pretty, self.doc)?;
        Ok(out)
    }

    /// Output JSON to a string
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(self) -> Result<String, Error> {
        let result = if self.options.pretty {
            serde_json::to_string_pretty(self.doc)
        } else {
            serde_json::to_string(self.doc)
        };

        Ok(result?)
    }
}

/// Creates JSON from a single unit
pub struct JsonUnitBuilder<'a> {
    unit: &'a Unit,
    options: JsonOptions,
}

impl<'a> JsonUnitBuilder<'a> {
    /// Output JSON with the set of options
    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Output JSON to the given writer
    pub fn to_writer<W: Write>(self, writer: W) -> Result<(), Error> {
        writer_json(writer, self.options.pretty, self.unit)
    }

    /// Output JSON to a string
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(self) -> Result<String, Error> {
        let result = if self.options.pretty {
            serde_json::to_string_pretty(self.unit)
        } else {
            serde_json::to_string(self.unit)
        };

        Ok(result?)
    }
}

impl SiiDocument {
    /// Converts the document to its JSON representation
    pub fn json(&self) -> JsonDocumentBuilder<'_> {
        JsonDocumentBuilder {
            doc: self,
            options: JsonOptions::default(),
        }
    }
}

impl Unit {
    /// Converts the unit to its JSON representation
    pub fn json(&self) -> JsonUnitBuilder<'_> {
        JsonUnitBuilder {
            unit: self,
            options: JsonOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(data: &[u8]) -> String {
        SiiDocument::from_slice(data)
            .unwrap()
            .json()
            .to_string()
            .unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(serialize(b"SiiNunit\n{\n}"), r#"{"SiiNunit":{}}"#);
    }

    #[test]
    fn test_scalar_kinds() {
        let data = b"SiiNunit\n{\na : a.0 {\n b: true\n c: nil\n d: &3f800000\n e: _nameless.1\n f: (1, 2)\n g: \"x\"\n h: token\n}\n}";
        assert_eq!(
            serialize(&data[..]),
            r#"{"SiiNunit":{"a":[{"_name":"a.0","b":true,"c":null,"d":1.0,"e":"_nameless.1","f":[1,2],"g":"x","h":"token"}]}}"#
        );
    }

    #[test]
    fn test_classes_group_in_first_appearance_order() {
        let data = b"SiiNunit\n{\nz : z.0 {\n}\na : a.0 {\n}\nz : z.1 {\n}\n}";
        assert_eq!(
            serialize(&data[..]),
            r#"{"SiiNunit":{"z":[{"_name":"z.0"},{"_name":"z.1"}],"a":[{"_name":"a.0"}]}}"#
        );
    }

    #[test]
    fn test_arrays() {
        let data = b"SiiNunit\n{\na : a.0 {\n m: 2\n m[0]: \"x\"\n m[1]: \"y\"\n n: 0\n}\n}";
        assert_eq!(
            serialize(&data[..]),
            r#"{"SiiNunit":{"a":[{"_name":"a.0","m":["x","y"],"n":0}]}}"#
        );
    }

    #[test]
    fn test_pretty_print() {
        let doc = SiiDocument::from_slice(b"SiiNunit\n{\na : a.0 {\n}\n}").unwrap();
        let actual = doc
            .json()
            .with_options(JsonOptions::new().with_prettyprint(true))
            .to_string()
            .unwrap();
        assert!(actual.contains('\n'));
        let reparsed: serde_json::Value = serde_json::from_str(&actual).unwrap();
        assert_eq!(reparsed["SiiNunit"]["a"][0]["_name"], "a.0");
    }

    #[test]
    fn test_unit_json() {
        let doc = SiiDocument::from_slice(b"SiiNunit\n{\na : a.0 {\n x: 1\n}\n}").unwrap();
        let actual = doc.units()[0].json().to_string().unwrap();
        assert_eq!(actual, r#"{"_name":"a.0","x":1}"#);
    }
}
