use pretty_assertions::assert_eq;
use tdm_tlv::{ContainerType, Tag, TlvError, TlvWriter};
use tdm_types::ProfileId;

fn encode(f: impl FnOnce(&mut TlvWriter)) -> Vec<u8> {
    let mut w = TlvWriter::new();
    f(&mut w);
    w.finish().unwrap()
}

// ── Scalars ──────────────────────────────────────────────────────

#[test]
fn anonymous_bool() {
    assert_eq!(encode(|w| w.put_bool(Tag::Anonymous, false).unwrap()), vec![0x08]);
    assert_eq!(encode(|w| w.put_bool(Tag::Anonymous, true).unwrap()), vec![0x09]);
}

#[test]
fn unsigned_uses_narrowest_width() {
    assert_eq!(encode(|w| w.put_u64(Tag::Anonymous, 7).unwrap()), vec![0x04, 0x07]);
    assert_eq!(
        encode(|w| w.put_u64(Tag::Anonymous, 256).unwrap()),
        vec![0x05, 0x00, 0x01]
    );
    assert_eq!(
        encode(|w| w.put_u64(Tag::Anonymous, 0x1_0000).unwrap()),
        vec![0x06, 0x00, 0x00, 0x01, 0x00]
    );
    assert_eq!(encode(|w| w.put_u64(Tag::Anonymous, u64::MAX).unwrap()).len(), 9);
}

#[test]
fn signed_uses_narrowest_width() {
    assert_eq!(encode(|w| w.put_i64(Tag::Anonymous, -1).unwrap()), vec![0x00, 0xFF]);
    assert_eq!(
        encode(|w| w.put_i64(Tag::Anonymous, -129).unwrap()),
        vec![0x01, 0x7F, 0xFF]
    );
}

#[test]
fn context_tagged_string() {
    let bytes = encode(|w| w.put_str(Tag::Context(1), "en_gb").unwrap());
    assert_eq!(bytes, vec![0x2C, 0x01, 0x05, b'e', b'n', b'_', b'g', b'b']);
}

#[test]
fn long_byte_string_uses_two_byte_length() {
    let data = vec![0xAB; 300];
    let bytes = encode(|w| w.put_bytes(Tag::Anonymous, &data).unwrap());
    assert_eq!(&bytes[..3], &[0x11, 0x2C, 0x01]);
    assert_eq!(bytes.len(), 3 + 300);
}

#[test]
fn null_and_float() {
    assert_eq!(encode(|w| w.put_null(Tag::Context(4)).unwrap()), vec![0x34, 0x04]);
    let bytes = encode(|w| w.put_f64(Tag::Anonymous, 1.5).unwrap());
    assert_eq!(bytes[0], 0x0B);
    assert_eq!(&bytes[1..], &1.5f64.to_le_bytes());
}

// ── Tags ─────────────────────────────────────────────────────────

#[test]
fn common_profile_tags() {
    assert_eq!(
        encode(|w| w.put_bool(Tag::CommonProfile(1), true).unwrap()),
        vec![0x49, 0x01, 0x00]
    );
    assert_eq!(
        encode(|w| w.put_bool(Tag::CommonProfile(0x1_0000), true).unwrap()),
        vec![0x69, 0x00, 0x00, 0x01, 0x00]
    );
}

#[test]
fn fully_qualified_tag() {
    let tag = Tag::FullyQualified {
        profile: ProfileId::new(0x235A, 0x0001),
        tag: 1,
    };
    assert_eq!(
        encode(|w| w.put_bool(tag, true).unwrap()),
        vec![0xC9, 0x5A, 0x23, 0x01, 0x00, 0x01, 0x00]
    );
}

#[test]
fn property_tag_must_fit_context_byte() {
    assert_eq!(Tag::for_property(3).unwrap(), Tag::Context(3));
    assert!(matches!(Tag::for_property(256), Err(TlvError::InvalidTag(_))));
}

// ── Containers ───────────────────────────────────────────────────

#[test]
fn argument_structure() {
    let bytes = encode(|w| {
        w.start_container(Tag::Context(2), ContainerType::Structure).unwrap();
        w.put_u64(Tag::Context(1), 7).unwrap();
        w.put_bool(Tag::Context(2), false).unwrap();
        w.end_container(ContainerType::Structure).unwrap();
    });
    assert_eq!(bytes, vec![0x35, 0x02, 0x24, 0x01, 0x07, 0x28, 0x02, 0x18]);
}

#[test]
fn structure_members_must_be_tagged() {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Structure).unwrap();
    assert!(matches!(
        w.put_u64(Tag::Anonymous, 1),
        Err(TlvError::InvalidTag(_))
    ));
}

#[test]
fn array_members_must_be_anonymous() {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Array).unwrap();
    assert!(w.put_u64(Tag::Context(1), 1).is_err());
    w.put_u64(Tag::Anonymous, 1).unwrap();
    w.end_container(ContainerType::Array).unwrap();
    assert_eq!(w.finish().unwrap(), vec![0x16, 0x04, 0x01, 0x18]);
}

#[test]
fn mismatched_end_container() {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Array).unwrap();
    assert!(matches!(
        w.end_container(ContainerType::Structure),
        Err(TlvError::ContainerMismatch(_))
    ));
}

#[test]
fn end_without_open_container() {
    let mut w = TlvWriter::new();
    assert!(w.end_container(ContainerType::Structure).is_err());
}

#[test]
fn finish_with_open_container_fails() {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Structure).unwrap();
    assert_eq!(w.depth(), 1);
    assert!(matches!(w.finish(), Err(TlvError::ContainerMismatch(_))));
}

// ── Capacity ─────────────────────────────────────────────────────

#[test]
fn limit_rejects_whole_element() {
    let mut w = TlvWriter::with_limit(4);
    w.put_u64(Tag::Context(1), 7).unwrap();
    assert_eq!(w.len(), 3);
    let err = w.put_str(Tag::Context(2), "x").unwrap_err();
    assert_eq!(err, TlvError::BufferTooSmall { needed: 4, available: 1 });
    assert_eq!(w.len(), 3, "failed put must not write a partial element");
}

#[test]
fn limit_applies_to_end_container() {
    let mut w = TlvWriter::with_limit(1);
    w.start_container(Tag::Anonymous, ContainerType::Structure).unwrap();
    assert!(matches!(
        w.end_container(ContainerType::Structure),
        Err(TlvError::BufferTooSmall { .. })
    ));
}
