use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tdm_tlv::{Tag, TlvValue};
use tdm_tool::commands;
use tdm_tool::json::{plain_from_json, tlv_from_json, tlv_to_json};
use tdm_traits::{builtin_directory, low_power_heartbeat_settings, network_interface, user_nfc_token_metadata};
use tdm_types::PropertyHandle;
use tdm_update::{Message, UpdateClientConfig};

// ── Lookup ───────────────────────────────────────────────────────

#[test]
fn traits_are_found_by_name_or_profile_id() {
    let directory = builtin_directory().unwrap();
    let by_name = commands::find_trait(&directory, "ConfigurationDoneTrait").unwrap();
    let by_hex = commands::find_trait(&directory, "0x00001401").unwrap();
    let by_pair = commands::find_trait(&directory, "0:1401").unwrap();
    assert_eq!(by_name.profile_id(), by_hex.profile_id());
    assert_eq!(by_name.profile_id(), by_pair.profile_id());
    assert!(commands::find_trait(&directory, "NoSuchTrait").is_err());
    assert!(commands::find_trait(&directory, "0x0000FFFF").is_err());
}

#[test]
fn list_names_every_trait() {
    let directory = builtin_directory().unwrap();
    let out = commands::list(&directory);
    assert_eq!(out.lines().count(), directory.len());
    assert!(out.contains("NetworkInterfaceTrait"));
}

#[test]
fn show_marks_attributes() {
    let directory = builtin_directory().unwrap();
    let out = commands::show(&directory, "NetworkInterfaceTrait").unwrap();
    let mac = out.lines().find(|l| l.contains("mac_address")).unwrap();
    assert!(mac.contains("optional"), "{mac}");
    let online = out.lines().find(|l| l.contains("is_online")).unwrap();
    assert!(!online.contains('('), "{online}");
}

#[test]
fn resolve_prints_the_tag_path() {
    let directory = builtin_directory().unwrap();
    let out = commands::resolve(&directory, "UserNFCTokenMetadataTrait", "metadata.tag_number").unwrap();
    assert_eq!(out, "UserNFCTokenMetadataTrait handle 4 tags /1/2 parent 2\n");
    let root = commands::resolve(&directory, "UserNFCTokenMetadataTrait", ".").unwrap();
    assert!(root.contains("handle 1 tags / parent 1"), "{root}");
}

// ── Encode / decode ──────────────────────────────────────────────

#[test]
fn encode_update_produces_a_decodable_request() {
    let directory = builtin_directory().unwrap();
    let bytes = commands::encode_update(&directory, "LocaleSettingsTrait", "active_locale", "\"en_GB\"", 2).unwrap();
    let Message::UpdateRequest(request) = Message::decode(&bytes).unwrap() else {
        panic!("not an update request");
    };
    assert_eq!(request.elements[0].data, TlvValue::from("en_GB"));
    assert_eq!(request.elements[0].path.tags, vec![1]);
    assert_eq!(request.elements[0].path.instance_id.as_u64(), 2);

    let printed = commands::decode(&hex::encode(&bytes)).unwrap();
    assert!(printed.starts_with("UpdateRequest\n"), "{printed}");
    assert!(printed.contains("\"en_GB\""), "{printed}");
}

#[test]
fn encode_update_rejects_invalid_values() {
    let directory = builtin_directory().unwrap();
    assert!(commands::encode_update(&directory, "LowPowerHeartbeatSettingsTrait", "window", "null", 0).is_err());
    assert!(commands::encode_update(&directory, "LocaleSettingsTrait", "active_locale", "not json", 0).is_err());
    assert!(commands::encode_update(&directory, "LocaleSettingsTrait", "nope", "1", 0).is_err());
}

#[test]
fn decode_accepts_bare_elements_and_spacing() {
    // [1] unsigned 7 inside an anonymous structure
    let out = commands::decode("15 24 01 07 18").unwrap();
    assert!(out.contains("unsigned integer = 7"), "{out}");
    assert!(commands::decode("zz").is_err());
    assert!(commands::decode("").is_err());
}

#[test]
fn raw_value_is_tagged_with_the_property_tag() {
    let directory = builtin_directory().unwrap();
    let schema = directory.require(user_nfc_token_metadata::PROFILE_ID).unwrap();
    let bytes =
        commands::encode_value(&schema, user_nfc_token_metadata::METADATA, r#"{"serial_number": 9}"#).unwrap();
    let (tag, value) = TlvValue::decode(&bytes).unwrap();
    assert_eq!(tag, Tag::Context(1));
    assert_eq!(value, TlvValue::Structure(vec![(Tag::Context(1), TlvValue::Unsigned(9))]));
}

// ── JSON ─────────────────────────────────────────────────────────

#[test]
fn json_names_map_to_tags_and_back() {
    let directory = builtin_directory().unwrap();
    let schema = directory.require(low_power_heartbeat_settings::PROFILE_ID).unwrap();
    let value = tlv_from_json(
        &schema,
        PropertyHandle::ROOT,
        &json!({ "destination": null, "interval": 60000, "2": 500 }),
    )
    .unwrap();
    assert_eq!(value.get(1), Some(&TlvValue::Null));
    assert_eq!(value.get(2), Some(&TlvValue::Unsigned(500)));
    assert_eq!(value.get(4), Some(&TlvValue::Unsigned(60_000)));

    let back = tlv_to_json(&schema, PropertyHandle::ROOT, &value);
    assert_eq!(back, json!({ "destination": null, "window": 500, "interval": 60000 }));
}

#[test]
fn byte_strings_survive_the_json_round_trip() {
    let directory = builtin_directory().unwrap();
    let schema = directory.require(network_interface::PROFILE_ID).unwrap();
    let value = tlv_from_json(
        &schema,
        PropertyHandle::ROOT,
        &json!({ "is_online": true, "mac_address": { "hex": "18b4300a0b0c" } }),
    )
    .unwrap();
    assert_eq!(
        value.get(2),
        Some(&TlvValue::Bytes(vec![0x18, 0xb4, 0x30, 0x0a, 0x0b, 0x0c]))
    );

    let back = tlv_to_json(&schema, PropertyHandle::ROOT, &value);
    assert_eq!(back, json!({ "is_online": true, "mac_address": { "hex": "18b4300a0b0c" } }));
    assert!(tlv_from_json(&schema, network_interface::MAC_ADDRESS, &json!({ "hex": "zz" })).is_err());
}

#[test]
fn plain_json_needs_numeric_keys() {
    assert_eq!(
        plain_from_json(&json!({ "3": [-1, 2.5, "x"] })).unwrap(),
        TlvValue::Structure(vec![(
            Tag::Context(3),
            TlvValue::Array(vec![TlvValue::Signed(-1), TlvValue::Float(2.5), TlvValue::from("x")])
        )])
    );
    assert!(plain_from_json(&json!({ "name": 1 })).is_err());
}

// ── Config and loopback ──────────────────────────────────────────

#[test]
fn check_config_reports_settings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "binding": {{ "node_id": 255, "security": {{ "mode": "case" }} }} }}"#).unwrap();
    let out = commands::check_config(file.path()).unwrap();
    assert!(out.starts_with("ok: node 0xff security case"), "{out}");

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    write!(bad, r#"{{ "binding": {{ "security": {{ "mode": "group_enc", "key_id": 0 }} }} }}"#).unwrap();
    assert!(commands::check_config(bad.path()).is_err());
}

#[tokio::test]
async fn simulate_updates_and_reads_back() {
    let directory = Arc::new(builtin_directory().unwrap());
    let out = commands::simulate(
        directory,
        "LowPowerHeartbeatSettingsTrait",
        ".",
        r#"{ "destination": null, "window": 500, "offset": 0, "interval": 60000 }"#,
        UpdateClientConfig::default(),
    )
    .await
    .unwrap();
    assert!(out.starts_with("update LowPowerHeartbeatSettingsTrait: success\n"), "{out}");
    assert!(out.contains("\"interval\": 60000"), "{out}");
}

#[tokio::test]
async fn simulate_surfaces_schema_errors() {
    let directory = Arc::new(builtin_directory().unwrap());
    let err = commands::simulate(directory, "LocaleSettingsTrait", "active_locale", "null", UpdateClientConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("schema error"), "{err}");
}
