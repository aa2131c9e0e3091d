#![no_main]
use libfuzzer_sys::fuzz_target;
use serde::Deserialize;
use siikit::text::{SiiDeserializer, SiiDocument, SiiParser, SiiReader};

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct Save {
    #[serde(default)]
    user_profile: Vec<Profile>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct Profile {
    company_name: Option<String>,
    cached_experience: Option<u64>,
    active_mods: Option<Vec<String>>,
    truck_position: Option<(f32, f32, f32)>,
}

fuzz_target!(|data: &[u8]| {
    let mut parser = SiiParser::new(data);
    while let Ok(Some(_)) = parser.next_event() {}

    let doc = SiiDocument::from_slice(data);
    let streamed = SiiReader::builder()
        .init_buffer_len(7)
        .max_buffer_len(4096)
        .build(data)
        .read_document();

    if let (Ok(doc), Ok(streamed)) = (&doc, &streamed) {
        assert_eq!(doc, streamed);
        let _: Result<Save, _> = SiiDeserializer::from_document(doc);

        #[cfg(feature = "json")]
        let _ = doc.json().to_string();
    }
});
