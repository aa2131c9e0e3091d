use quickcheck_macros::quickcheck;
use siikit::text::{SiiDocument, SiiEvent, SiiReader};
use siikit::{ErrorKind, Malformed};
use std::io::{self, Read};

const PROFILE: &[u8] = include_bytes!("fixtures/profile.sii");

/// Hands out at most one byte per read
struct Trickle<'a>(&'a [u8]);

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match (self.0.split_first(), buf.first_mut()) {
            (Some((&head, rest)), Some(out)) => {
                *out = head;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

/// Interrupts every other read and fails once its data runs out
struct Flaky<'a> {
    data: &'a [u8],
    interrupt: bool,
}

impl Read for Flaky<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "again"));
        }

        if self.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        }

        let len = buf.len().min(self.data.len());
        buf[..len].copy_from_slice(&self.data[..len]);
        self.data = &self.data[len..];
        Ok(len)
    }
}

#[test]
fn trickle_reader_matches_slice() {
    let expected = SiiDocument::from_slice(PROFILE).unwrap();
    let reader = SiiReader::builder()
        .init_buffer_len(4)
        .build(Trickle(PROFILE));
    let actual = reader.read_document().unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn io_errors_surface() {
    let reader = Flaky {
        data: &PROFILE[..40],
        interrupt: false,
    };
    let err = SiiReader::new(reader).read_document().unwrap_err();
    match err.kind() {
        ErrorKind::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        x => panic!("unexpected error: {:?}", x),
    }
}

#[test]
fn long_string_grows_buffer() {
    let text = "x".repeat(5000);
    let data = format!(
        "SiiNunit\n{{\nnote : note.0 {{\n text: \"{}\"\n}}\n}}\n",
        text
    );

    let mut reader = SiiReader::builder()
        .init_buffer_len(16)
        .max_buffer_len(8 * 1024)
        .build(data.as_bytes());
    let unit = reader.next_unit().unwrap().unwrap();
    assert_eq!(unit.get("text").and_then(|x| x.as_str()), Some(text.as_str()));
    assert_eq!(reader.next_unit().unwrap(), None);
    assert_eq!(reader.position(), data.len());
}

#[test]
fn long_string_exceeds_max_buffer() {
    let data = format!(
        "SiiNunit\n{{\nnote : note.0 {{\n text: \"{}\"\n}}\n}}\n",
        "x".repeat(5000)
    );

    let err = SiiReader::builder()
        .init_buffer_len(16)
        .max_buffer_len(1024)
        .build(data.as_bytes())
        .read_document()
        .unwrap_err();
    match err.kind() {
        ErrorKind::Malformed { reason, .. } => assert_eq!(*reason, Malformed::BufferFull),
        x => panic!("unexpected error: {:?}", x),
    }
}

#[test]
fn events_then_none() {
    let mut reader = SiiReader::new(&b"SiiNunit\n{\n}\n"[..]);
    assert_eq!(reader.next_event().unwrap(), Some(SiiEvent::Signature));
    assert_eq!(reader.next_event().unwrap(), Some(SiiEvent::Begin));
    assert_eq!(reader.next_event().unwrap(), Some(SiiEvent::End));
    assert_eq!(reader.next_event().unwrap(), None);
    assert_eq!(reader.next_event().unwrap(), None);
}

#[quickcheck]
fn streaming_equals_slice(init: u8, values: Vec<(u32, i16)>) -> bool {
    let mut data = String::from("SiiNunit\n{\n");
    for (i, (id, value)) in values.iter().enumerate() {
        data.push_str(&format!(
            "item : item.{} {{\n id: {}\n value: {}\n pos: ({}, {}, 0)\n label: \"item {}\"\n}}\n",
            i, id, value, value, id, i
        ));
    }
    data.push_str("}\n");

    let expected = SiiDocument::from_slice(data.as_bytes()).unwrap();
    let actual = SiiReader::builder()
        .init_buffer_len(usize::from(init))
        .build(data.as_bytes())
        .read_document()
        .unwrap();
    actual == expected
}
