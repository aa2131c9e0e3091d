/*!

Locate, decrypt, and parse the SII save data written by
[American Truck Simulator](https://americantrucksimulator.com/) and
[Euro Truck Simulator 2](https://eurotrucksimulator2.com/).

## Features

- ✔ One grammar, three consumers: schema-less documents, streaming units, and serde types
- ✔ Bounded memory: stream units from any `Read` with a capped buffer
- ✔ Safe: no silent recovery, malformed input reports the byte offset where parsing stopped
- ✔ Pluggable decryption: the external decryption executable sits behind a trait

## Quick Start

Parsing plaintext without any prior knowledge of its schema:

```rust
use siikit::text::{SiiDocument, Value};

let data = br#"SiiNunit
{
user_profile : profile.0 {
 company_name: "Acme"
 cached_experience: 1500
}
}"#;

let doc = SiiDocument::from_slice(&data[..])?;
let profile = doc.unit("user_profile", 0).unwrap();
assert_eq!(profile.get("company_name"), Some(&Value::String(String::from("Acme"))));
assert_eq!(profile.get("cached_experience"), Some(&Value::Integer(1500)));
# Ok::<(), siikit::Error>(())
```

## Typed Parsing

When the shape is known ahead of time, deserialize straight into it. Units of
a class become a sequence keyed by the class, and a unit's name is available
under `_name`.

```rust
# #[cfg(feature = "derive")] {
use serde::Deserialize;
use siikit::text::SiiDeserializer;

#[derive(Deserialize, PartialEq, Debug)]
struct Save {
    user_profile: Vec<Profile>,
}

#[derive(Deserialize, PartialEq, Debug)]
struct Profile {
    company_name: String,
    cached_experience: u64,
}

let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n cached_experience: 1500\n}\n}";
let save: Save = SiiDeserializer::from_slice(&data[..]).unwrap();
assert_eq!(save.user_profile[0].cached_experience, 1500);
# }
```

## Encrypted Files

Files written by the games start encrypted. A [Decryptor] checks the header
and, only when needed, runs the external decryption tool from the configured
asset directory before parsing.

```rust,no_run
use siikit::{Config, Decryptor};

let config = Config::from_env("/path/to/assets")?;
let decryptor = Decryptor::from_config(&config);
let doc = decryptor.open_document("/path/to/profile.sii")?;
println!("{}", doc.units().len());
# Ok::<(), siikit::Error>(())
```

## One Level Lower

[SiiParser](text::SiiParser) and [SiiReader](text::SiiReader) yield the
structural events that every higher level API is built from.

```rust
use siikit::text::{SiiEvent, SiiParser};

let mut parser = SiiParser::new(b"SiiNunit\n{\n}");
assert_eq!(parser.next_event()?, Some(SiiEvent::Signature));
assert_eq!(parser.next_event()?, Some(SiiEvent::Begin));
assert_eq!(parser.next_event()?, Some(SiiEvent::End));
assert_eq!(parser.next_event()?, None);
# Ok::<(), siikit::Error>(())
```

*/

mod buffer;
mod config;
mod data;
mod decrypt;
mod detect;
mod errors;
mod hex_name;
#[cfg(feature = "json")]
pub mod json;
pub mod profile;
mod scalar;
pub mod text;

pub use self::config::{Config, Game, UnknownGame, DEFAULT_TOOL_NAME};
pub use self::decrypt::{
    DecryptionResult, Decryptor, ExternalTool, PlaintextTransform, TransformError,
};
pub use self::detect::{is_decrypted, is_plaintext, is_valid_sii_path, SiiFormat};
pub use self::errors::*;
pub use self::hex_name::{decode_hex_bytes, decode_hex_name, encode_hex_name, HexNameError};
pub use self::scalar::{Scalar, ScalarError};
