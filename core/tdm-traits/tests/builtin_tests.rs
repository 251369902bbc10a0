use pretty_assertions::assert_eq;
use std::sync::Arc;
use tdm_schema::data::{decode_trait, encode_trait};
use tdm_schema::{MemoryTraitStore, TraitDataSource};
use tdm_tlv::TlvValue;
use tdm_traits::power_source_capabilities::{PowerSourceCurrentType, PowerSourceType};
use tdm_traits::user_nfc_token_access::UserNfcTokenAccessResult;
use tdm_traits::{
    builtin_directory, builtin_schemas, configuration_done, locale_settings,
    low_power_heartbeat_settings, network_interface, network_interfaces, user_nfc_token_metadata,
    UnknownEnumValue,
};
use tdm_types::{ProfileId, PropertyHandle};

// ── ConfigurationDoneTrait ───────────────────────────────────────

#[test]
fn configuration_done_tags() {
    let s = configuration_done::schema().unwrap();
    assert_eq!(s.profile_id().as_u32(), 0x0000_1401);
    assert_eq!(s.handle_for_tag(PropertyHandle::ROOT, 2).unwrap(), configuration_done::APP_CONFIGURATION_COMPLETE);
    assert_eq!(s.handle_for_tag(PropertyHandle::ROOT, 3).unwrap(), configuration_done::DEVICE_READY);
    assert_eq!(s.tag_for_handle(configuration_done::APP_CONFIGURATION_COMPLETE).unwrap(), Some(2));
    assert_eq!(s.tag_for_handle(configuration_done::DEVICE_READY).unwrap(), Some(3));
    assert!(s.handle_for_tag(PropertyHandle::ROOT, 1).is_err());
}

#[test]
fn configuration_done_has_no_attributes() {
    let s = configuration_done::schema().unwrap();
    for handle in [configuration_done::APP_CONFIGURATION_COMPLETE, configuration_done::DEVICE_READY] {
        assert!(!s.is_optional(handle));
        assert!(!s.is_nullable(handle));
        assert!(!s.is_ephemeral(handle));
    }
}

// ── NetworkInterfaceTrait ────────────────────────────────────────

#[test]
fn network_interface_optional_bit_marks_second_property() {
    let s = network_interface::schema().unwrap();
    assert!(!s.is_optional(network_interface::IS_ONLINE));
    assert!(s.is_optional(network_interface::MAC_ADDRESS));
    assert!(!s.is_optional(network_interface::IP_ADDRESSES));
    assert!(!s.is_optional(PropertyHandle::ROOT));
}

#[test]
fn network_interfaces_primary_ids_are_optional() {
    let s = network_interfaces::schema().unwrap();
    assert!(!s.is_optional(network_interfaces::IS_NETWORK_INTERFACE_ID_LIST_DYNAMIC));
    assert!(!s.is_optional(network_interfaces::NETWORK_INTERFACE_ID_LIST));
    assert!(s.is_optional(network_interfaces::PRIMARY_NETWORK_INTERFACE_ID_IPV4));
    assert!(s.is_optional(network_interfaces::PRIMARY_NETWORK_INTERFACE_ID_IPV6));
}

// ── LowPowerHeartbeatSettingsTrait ───────────────────────────────

#[test]
fn heartbeat_destination_is_nullable() {
    let s = low_power_heartbeat_settings::schema().unwrap();
    assert!(s.is_nullable(low_power_heartbeat_settings::DESTINATION));
    assert!(!s.is_nullable(low_power_heartbeat_settings::WINDOW));
    assert!(!s.is_optional(low_power_heartbeat_settings::DESTINATION));
}

#[test]
fn heartbeat_round_trips_null_destination() {
    let schema = Arc::new(low_power_heartbeat_settings::schema().unwrap());
    let mut store = MemoryTraitStore::new(schema.clone());
    store.set_null(low_power_heartbeat_settings::DESTINATION).unwrap();
    store.set(low_power_heartbeat_settings::WINDOW, 2_000u64).unwrap();
    store.set(low_power_heartbeat_settings::OFFSET, 0u64).unwrap();
    store.set(low_power_heartbeat_settings::INTERVAL, 60_000u64).unwrap();

    let encoded = encode_trait(&schema, &store).unwrap();
    let mut decoded = MemoryTraitStore::new(schema.clone());
    decode_trait(&schema, None, &mut decoded, &encoded).unwrap();

    assert_eq!(decoded.get(low_power_heartbeat_settings::DESTINATION), Some(&TlvValue::Null));
    assert_eq!(decoded.get(low_power_heartbeat_settings::INTERVAL), Some(&TlvValue::Unsigned(60_000)));
}

// ── UserNFCTokenMetadataTrait ────────────────────────────────────

#[test]
fn nfc_metadata_is_nested() {
    let s = user_nfc_token_metadata::schema().unwrap();
    assert_eq!(s.tree_depth(), 2);
    assert_eq!(
        s.parent(user_nfc_token_metadata::METADATA_TAG_NUMBER).unwrap(),
        user_nfc_token_metadata::METADATA
    );
    assert_eq!(s.tag_path(user_nfc_token_metadata::METADATA_TAG_NUMBER).unwrap(), vec![1, 2]);
    assert_eq!(
        s.handle_for_name_path("metadata.serial_number").unwrap(),
        user_nfc_token_metadata::METADATA_SERIAL_NUMBER
    );
}

// ── LocaleSettingsTrait ──────────────────────────────────────────

#[test]
fn locale_update_element_decodes_into_store() {
    let schema = Arc::new(locale_settings::schema().unwrap());
    let update = TlvValue::Structure(vec![(tdm_tlv::Tag::Context(1), TlvValue::from("en_gb"))]);
    let encoded = update.encode(tdm_tlv::Tag::Anonymous).unwrap();

    let mut store = MemoryTraitStore::new(schema.clone());
    decode_trait(&schema, None, &mut store, &encoded).unwrap();
    assert_eq!(store.get(locale_settings::ACTIVE_LOCALE).and_then(|v| v.as_str()), Some("en_gb"));
    assert_eq!(store.data_version(), 0);
}

// ── Every built-in trait ─────────────────────────────────────────

#[test]
fn every_handle_round_trips_through_its_tag() {
    for schema in builtin_schemas().unwrap() {
        for handle in schema.handles().skip(1).collect::<Vec<_>>() {
            let parent = schema.parent(handle).unwrap();
            let tag = schema.tag_for_handle(handle).unwrap().unwrap();
            assert_eq!(schema.handle_for_tag(parent, tag).unwrap(), handle, "{}", schema.name());
        }
    }
}

#[test]
fn last_handles_match_tables() {
    assert_eq!(configuration_done::LAST_HANDLE.as_u32() as usize, configuration_done::PROPERTY_MAP.len() + 1);
    assert_eq!(network_interface::LAST_HANDLE.as_u32() as usize, network_interface::PROPERTY_MAP.len() + 1);
    assert_eq!(network_interfaces::LAST_HANDLE.as_u32() as usize, network_interfaces::PROPERTY_MAP.len() + 1);
    assert_eq!(
        low_power_heartbeat_settings::LAST_HANDLE.as_u32() as usize,
        low_power_heartbeat_settings::PROPERTY_MAP.len() + 1
    );
    assert_eq!(
        user_nfc_token_metadata::LAST_HANDLE.as_u32() as usize,
        user_nfc_token_metadata::PROPERTY_MAP.len() + 1
    );
}

#[test]
fn directory_contains_every_builtin() {
    let dir = builtin_directory().unwrap();
    assert_eq!(dir.len(), builtin_schemas().unwrap().len());
    assert!(dir.get(configuration_done::PROFILE_ID).is_some());
    assert!(dir.get(locale_settings::PROFILE_ID).is_some());
    assert!(dir.get(ProfileId::new(0x235A, 0xFFFF)).is_none());
    assert_eq!(dir.find_by_name("NetworkInterfaceTrait").unwrap().profile_id(), network_interface::PROFILE_ID);
}

// ── Enums ────────────────────────────────────────────────────────

#[test]
fn enums_convert_from_wire_values() {
    assert_eq!(PowerSourceType::try_from(1).unwrap(), PowerSourceType::Battery);
    assert_eq!(PowerSourceCurrentType::try_from(2).unwrap(), PowerSourceCurrentType::Ac);
    assert_eq!(
        UserNfcTokenAccessResult::try_from(4).unwrap(),
        UserNfcTokenAccessResult::FailureOutOfSchedule
    );
    assert_eq!(
        UserNfcTokenAccessResult::try_from(0).unwrap_err(),
        UnknownEnumValue {
            name: "UserNFCTokenAccessResult",
            value: 0
        }
    );
    assert!(PowerSourceCurrentType::try_from(3).is_err());
}

#[test]
fn enums_encode_as_unsigned() {
    for result in UserNfcTokenAccessResult::ALL {
        let value = TlvValue::from(*result);
        assert_eq!(UserNfcTokenAccessResult::try_from(value.as_u64().unwrap()).unwrap(), *result);
    }
    assert!(UserNfcTokenAccessResult::Success.is_success());
    assert_eq!(UserNfcTokenAccessResult::ALL.len(), 7);
}

#[test]
fn enums_serialize_snake_case() {
    let json = serde_json::to_string(&UserNfcTokenAccessResult::FailureTokenDisabled).unwrap();
    assert_eq!(json, "\"failure_token_disabled\"");
    let parsed: PowerSourceCurrentType = serde_json::from_str("\"dc\"").unwrap();
    assert_eq!(parsed, PowerSourceCurrentType::Dc);
}
