use pretty_assertions::assert_eq;
use tdm_tlv::{Tag, TlvValue};
use tdm_types::{InstanceId, ProfileId, ResourceId};
use tdm_update::{
    DataElement, DataPath, Message, MessageType, StatusCode, StatusReport, UpdateError, UpdateRequest,
    ViewRequest, ViewResponse,
};

fn locale_path() -> DataPath {
    DataPath {
        profile_id: ProfileId::new(0, 0x0016),
        instance_id: InstanceId::default(),
        resource_id: ResourceId::SELF_NODE,
        schema_version: Some(1),
        tags: vec![1],
    }
}

// ── DataPath ─────────────────────────────────────────────────────

#[test]
fn path_layout_omits_defaults() {
    let path = DataPath::root(ProfileId::new(0, 0x1401), InstanceId::default());
    assert_eq!(
        path.to_tlv().unwrap(),
        TlvValue::Path(vec![(
            Tag::Context(1),
            TlvValue::Structure(vec![(Tag::Context(1), TlvValue::Unsigned(0x1401))])
        )])
    );
}

#[test]
fn path_carries_property_tags_as_null_members() {
    let path = DataPath {
        instance_id: InstanceId::new(3),
        resource_id: ResourceId::new(0x18B4_3000_0000_0001),
        tags: vec![1, 2],
        ..locale_path()
    };
    let tlv = path.to_tlv().unwrap();
    let TlvValue::Path(members) = &tlv else {
        panic!("not a path: {tlv:?}");
    };
    assert_eq!(members.len(), 3);
    assert_eq!(members[1], (Tag::Context(1), TlvValue::Null));
    assert_eq!(members[2], (Tag::Context(2), TlvValue::Null));
    assert_eq!(DataPath::from_tlv(&tlv).unwrap(), path);
}

#[test]
fn path_without_locator_is_rejected() {
    let tlv = TlvValue::Path(vec![(Tag::Context(2), TlvValue::Null)]);
    assert!(matches!(DataPath::from_tlv(&tlv), Err(UpdateError::Protocol(_))));
}

#[test]
fn path_display() {
    assert_eq!(locale_path().to_string(), format!("{}/{}/0/1", ResourceId::SELF_NODE, ProfileId::new(0, 0x16)));
}

// ── Messages ─────────────────────────────────────────────────────

#[test]
fn update_request_round_trips() {
    let message = Message::UpdateRequest(UpdateRequest {
        elements: vec![DataElement {
            path: locale_path(),
            data_version: Some(9),
            data: TlvValue::from("en_GB"),
        }],
        argument: Some(TlvValue::Structure(vec![(Tag::Context(1), TlvValue::Bool(true))])),
    });
    let bytes = message.encode().unwrap();
    assert_eq!(bytes[0], MessageType::UpdateRequest as u8);
    assert_eq!(Message::decode(&bytes).unwrap(), message);
}

#[test]
fn view_messages_round_trip() {
    let request = Message::ViewRequest(ViewRequest {
        paths: vec![locale_path(), DataPath::root(ProfileId::new(0, 0x1C02), InstanceId::new(1))],
    });
    assert_eq!(Message::decode(&request.encode().unwrap()).unwrap(), request);

    let response = Message::ViewResponse(ViewResponse {
        elements: vec![DataElement {
            path: locale_path(),
            data_version: None,
            data: TlvValue::from("fr_FR"),
        }],
    });
    assert_eq!(Message::decode(&response.encode().unwrap()).unwrap(), response);
}

#[test]
fn status_report_round_trips() {
    let report = StatusReport::failure(StatusCode::InvalidPath, Some(2), "no such property");
    let message = Message::StatusReport(report.clone());
    match Message::decode(&message.encode().unwrap()).unwrap() {
        Message::StatusReport(decoded) => assert_eq!(decoded, report),
        other => panic!("unexpected {other:?}"),
    }
    assert!(StatusReport::success().is_success());
    assert!(!report.is_success());
}

#[test]
fn unknown_message_type_is_rejected() {
    let mut bytes = Message::StatusReport(StatusReport::success()).encode().unwrap();
    bytes[0] = 0x7F;
    assert!(matches!(Message::decode(&bytes), Err(UpdateError::Protocol(_))));
    assert!(matches!(Message::decode(&[]), Err(UpdateError::Protocol(_))));
}

#[test]
fn unknown_status_code_is_rejected() {
    let body = TlvValue::Structure(vec![(Tag::Context(1), TlvValue::Unsigned(99))]);
    let mut bytes = vec![MessageType::StatusReport as u8];
    bytes.extend(body.encode(Tag::Anonymous).unwrap());
    assert!(matches!(Message::decode(&bytes), Err(UpdateError::Protocol(_))));
}

#[test]
fn truncated_body_is_an_encoding_error() {
    let bytes = Message::ViewRequest(ViewRequest {
        paths: vec![locale_path()],
    })
    .encode()
    .unwrap();
    let err = Message::decode(&bytes[..bytes.len() - 2]).unwrap_err();
    assert!(matches!(err, UpdateError::Encoding(_)), "{err:?}");
}

#[test]
fn status_codes_display_and_serialize() {
    assert_eq!(StatusCode::UnsupportedVersion.to_string(), "unsupported version");
    assert_eq!(serde_json::to_string(&StatusCode::InvalidValue).unwrap(), "\"invalid_value\"");
    assert_eq!(StatusCode::try_from(3).unwrap(), StatusCode::InvalidValue);
}
