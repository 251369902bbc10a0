use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;
use tdm_types::{
    Error, InstanceId, ProfileId, PropertyHandle, ResourceId, TraitDataHandle, TraitPath,
};

// ── ProfileId ─────────────────────────────────────────────────────

#[test]
fn profile_id_composes_vendor_and_trait() {
    let id = ProfileId::new(0x0, 0x1401);
    assert_eq!(id.as_u32(), 0x0000_1401);
    assert_eq!(id.vendor_id(), 0);
    assert_eq!(id.trait_id(), 0x1401);
}

#[test]
fn profile_id_vendor_in_upper_bits() {
    let id = ProfileId::new(0x235A, 0x0002);
    assert_eq!(id.as_u32(), 0x235A_0002);
    assert_eq!(id, ProfileId::from_raw(0x235A_0002));
}

#[test]
fn profile_id_display_is_padded_hex() {
    assert_eq!(ProfileId::new(0, 0x1401).to_string(), "0x00001401");
}

#[test]
fn profile_id_parse_forms() {
    let expected = ProfileId::new(0, 0x1401);
    assert_eq!(ProfileId::from_str("0x1401").unwrap(), expected);
    assert_eq!(ProfileId::from_str("5121").unwrap(), expected);
    assert_eq!(ProfileId::from_str("0:1401").unwrap(), expected);
    assert_eq!(ProfileId::from_str(" 0x00001401 ").unwrap(), expected);
}

#[test]
fn profile_id_parse_invalid() {
    assert!(matches!(
        ProfileId::from_str("trait"),
        Err(Error::InvalidProfileId(_))
    ));
    assert!(ProfileId::from_str("0xZZ").is_err());
    assert!(ProfileId::from_str("1:2:3").is_err());
}

#[test]
fn profile_id_serde_is_transparent() {
    let id = ProfileId::new(0, 0x1401);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "5121");
    let parsed: ProfileId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

// ── PropertyHandle ───────────────────────────────────────────────

#[test]
fn handle_constants() {
    assert!(PropertyHandle::NULL.is_null());
    assert!(PropertyHandle::ROOT.is_root());
    assert!(!PropertyHandle::FIRST_PROPERTY.is_root());
    assert_eq!(PropertyHandle::FIRST_PROPERTY.as_u32(), 2);
}

#[test]
fn handle_property_index() {
    assert_eq!(PropertyHandle::NULL.property_index(), None);
    assert_eq!(PropertyHandle::ROOT.property_index(), None);
    assert_eq!(PropertyHandle::new(2).property_index(), Some(0));
    assert_eq!(PropertyHandle::new(5).property_index(), Some(3));
    assert_eq!(PropertyHandle::from_property_index(3), PropertyHandle::new(5));
}

#[test]
fn handle_parse() {
    assert_eq!("7".parse::<PropertyHandle>().unwrap(), PropertyHandle::new(7));
    assert!("-1".parse::<PropertyHandle>().is_err());
}

#[test]
fn handle_hash_eq() {
    let mut set = HashSet::new();
    set.insert(PropertyHandle::ROOT);
    set.insert(PropertyHandle::new(1));
    assert_eq!(set.len(), 1);
}

// ── Other identifiers ─────────────────────────────────────────────

#[test]
fn resource_id_self_node() {
    assert!(ResourceId::SELF_NODE.is_self());
    assert_eq!(ResourceId::SELF_NODE.to_string(), "self");
    assert_eq!(ResourceId::new(0x18B4_3000_0000_0001).to_string(), "18B4300000000001");
}

#[test]
fn instance_id_default_is_zero() {
    assert_eq!(InstanceId::default().as_u64(), 0);
}

#[test]
fn trait_path_root_and_display() {
    let path = TraitPath::root(TraitDataHandle::new(3));
    assert!(path.property_handle.is_root());
    assert_eq!(path.to_string(), "3/1");
}

proptest! {
    #[test]
    fn profile_id_fields_roundtrip(vendor in any::<u16>(), trait_id in any::<u16>()) {
        let id = ProfileId::new(vendor, trait_id);
        prop_assert_eq!(id.vendor_id(), vendor);
        prop_assert_eq!(id.trait_id(), trait_id);
        prop_assert_eq!(ProfileId::from_str(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn property_index_roundtrip(index in 0usize..100_000) {
        let handle = PropertyHandle::from_property_index(index);
        prop_assert_eq!(handle.property_index(), Some(index));
    }
}
