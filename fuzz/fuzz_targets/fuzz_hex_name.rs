#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let encoded = siikit::encode_hex_name(data);
    assert_eq!(siikit::decode_hex_bytes(&encoded).ok().as_deref(), Some(data).filter(|x| !x.is_empty()));

    if let Ok(s) = std::str::from_utf8(data) {
        let _ = siikit::decode_hex_name(s);
    }
});
