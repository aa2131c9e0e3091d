use siikit::text::{SiiDocument, SiiParser, SiiReader, Value};
use siikit::{ErrorKind, Malformed};

const PROFILE: &[u8] = include_bytes!("fixtures/profile.sii");

fn malformed(data: &[u8]) -> (usize, Malformed) {
    match SiiDocument::from_slice(data).unwrap_err().into_kind() {
        ErrorKind::Malformed { offset, reason } => (offset, reason),
        x => panic!("unexpected error: {:?}", x),
    }
}

#[test]
fn minimal_document() {
    let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n cached_experience: 1500\n}\n}";
    let doc = SiiDocument::from_slice(&data[..]).unwrap();
    let unit = doc.unit("user_profile", 0).unwrap();
    assert_eq!(unit.class(), "user_profile");
    assert_eq!(unit.name(), "profile.0");
    assert_eq!(
        unit.get("company_name"),
        Some(&Value::String(String::from("Acme")))
    );
    assert_eq!(unit.get("cached_experience"), Some(&Value::Integer(1500)));
}

#[test]
fn profile_fixture() {
    let doc = SiiDocument::from_slice(PROFILE).unwrap();
    assert_eq!(doc.classes(), vec!["user_profile", "job_info"]);

    let profile = doc.unit("user_profile", 0).unwrap();
    assert_eq!(profile.get("male").and_then(|x| x.as_bool()), Some(true));
    assert_eq!(
        profile.get("brand"),
        Some(&Value::Token(String::from("scania_r")))
    );
    assert_eq!(profile.get("cached_stats"), Some(&Value::Integer(0)));
    assert!(profile.get("hidden").map_or(false, |x| x.is_nil()));

    let discovery = profile
        .get("cached_discovery")
        .and_then(|x| x.as_array())
        .unwrap();
    assert_eq!(
        discovery,
        &[
            Value::Integer(0),
            Value::Integer(25),
            Value::Integer(118),
            Value::Float(1.0)
        ][..]
    );

    let user_data = profile.get("user_data").and_then(|x| x.as_array()).unwrap();
    assert_eq!(user_data[0], Value::String(String::new()));

    let position = profile
        .get("truck_position")
        .and_then(|x| x.as_array())
        .unwrap();
    assert_eq!(position.len(), 3);
    assert_eq!(position[1], Value::Float(12.5));
    assert_eq!(position[2], Value::Integer(-4810));

    let job = profile
        .get("last_job")
        .and_then(|x| x.as_str())
        .and_then(|x| doc.find(x))
        .unwrap();
    assert_eq!(job.class(), "job_info");
    assert_eq!(
        job.get("source_company"),
        Some(&Value::Reference(String::from(
            "company.volatile.wal_food_str.sacramento"
        )))
    );
}

#[test]
fn missing_closing_brace() {
    let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n}\n";
    assert_eq!(malformed(&data[..]), (data.len(), Malformed::UnclosedBlock));
}

#[test]
fn missing_unit_closing_brace() {
    let data = b"SiiNunit\n{\nuser_profile : profile.0 {\n company_name: \"Acme\"\n";
    assert_eq!(malformed(&data[..]), (data.len(), Malformed::UnclosedBlock));
}

#[test]
fn encrypted_bytes_are_not_parsed() {
    let data = b"ScsC\x01\x02\x03\x04";
    assert!(SiiDocument::from_slice(&data[..]).unwrap_err().is_malformed());
}

#[test]
fn crlf_and_comments() {
    let data = b"SiiNunit\r\n{\r\n// header\r\na : a.0 { # trailing\r\n x: 1 /* inline */\r\n}\r\n}\r\n";
    let doc = SiiDocument::from_slice(&data[..]).unwrap();
    assert_eq!(doc.unit("a", 0).and_then(|x| x.get("x")), Some(&Value::Integer(1)));
}

#[test]
fn unit_after_close_on_same_line() {
    let data = b"SiiNunit\n{\na : a.0 {\n x: 1 }\n}";
    let doc = SiiDocument::from_slice(&data[..]).unwrap();
    assert_eq!(doc.units().len(), 1);
}

#[test]
fn errors_carry_offsets() {
    let data = b"SiiNunit\n{\na : a.0 {\n x: &zz\n}\n}";
    let (offset, reason) = malformed(&data[..]);
    assert_eq!(reason, Malformed::InvalidHex);
    assert_eq!(offset, 22);
}

#[test]
fn streaming_matches_slice_for_fixture() {
    let from_slice = SiiDocument::from_slice(PROFILE).unwrap();
    for len in [1, 5, 16, 100, 4096] {
        let reader = SiiReader::builder().init_buffer_len(len).build(PROFILE);
        assert_eq!(reader.read_document().unwrap(), from_slice);
    }
}

#[test]
fn parser_consumes_all_input() {
    let mut parser = SiiParser::new(PROFILE);
    while parser.next_event().unwrap().is_some() {}
    assert_eq!(parser.position(), PROFILE.len());
}
