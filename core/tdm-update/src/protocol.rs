//! Update and view protocol messages.
//!
//! Every message is one byte of [`MessageType`] followed by a single
//! anonymous TLV structure:
//!
//! ```text
//! UpdateRequest  { [1] array<DataElement>, [2] argument? }
//! ViewRequest    { [1] array<DataPath> }
//! ViewResponse   { [1] array<DataElement> }
//! StatusReport   { [1] code, [2] element index?, [3] message? }
//!
//! DataElement    { [1] DataPath, [2] data version?, [5] data }
//! DataPath       path( [1] { [1] profile, [2] instance?, [3] resource?, [4] version? },
//!                      [t0] null, [t1] null, ... )
//! ```
//!
//! The property tags of a [`DataPath`] are the context tags of the trailing
//! null members, root first.

use crate::error::{UpdateError, UpdateResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tdm_tlv::{Tag, TlvValue};
use tdm_types::{InstanceId, ProfileId, ResourceId, SchemaVersion};

const TAG_LIST: u8 = 1;
const TAG_ARGUMENT: u8 = 2;

const TAG_ELEMENT_PATH: u8 = 1;
const TAG_ELEMENT_VERSION: u8 = 2;
const TAG_ELEMENT_DATA: u8 = 5;

const TAG_PATH_LOCATOR: u8 = 1;
const TAG_LOCATOR_PROFILE: u8 = 1;
const TAG_LOCATOR_INSTANCE: u8 = 2;
const TAG_LOCATOR_RESOURCE: u8 = 3;
const TAG_LOCATOR_VERSION: u8 = 4;

const TAG_STATUS_CODE: u8 = 1;
const TAG_STATUS_ELEMENT: u8 = 2;
const TAG_STATUS_MESSAGE: u8 = 3;

/// Leading byte of an encoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    ViewRequest = 0x01,
    ViewResponse = 0x02,
    UpdateRequest = 0x03,
    StatusReport = 0x04,
}

impl TryFrom<u8> for MessageType {
    type Error = UpdateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(MessageType::ViewRequest),
            0x02 => Ok(MessageType::ViewResponse),
            0x03 => Ok(MessageType::UpdateRequest),
            0x04 => Ok(MessageType::StatusReport),
            other => Err(UpdateError::Protocol(format!("unknown message type {other:#04x}"))),
        }
    }
}

/// Outcome reported by the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum StatusCode {
    Success = 0,
    UnknownTrait = 1,
    InvalidPath = 2,
    InvalidValue = 3,
    UnsupportedVersion = 4,
    InternalError = 5,
}

impl StatusCode {
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Success => "success",
            StatusCode::UnknownTrait => "unknown trait",
            StatusCode::InvalidPath => "invalid path",
            StatusCode::InvalidValue => "invalid value",
            StatusCode::UnsupportedVersion => "unsupported version",
            StatusCode::InternalError => "internal error",
        }
    }
}

impl TryFrom<u64> for StatusCode {
    type Error = UpdateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => StatusCode::Success,
            1 => StatusCode::UnknownTrait,
            2 => StatusCode::InvalidPath,
            3 => StatusCode::InvalidValue,
            4 => StatusCode::UnsupportedVersion,
            5 => StatusCode::InternalError,
            other => return Err(UpdateError::Protocol(format!("unknown status code {other}"))),
        })
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Decoding helpers ─────────────────────────────────────────────

fn protocol(what: impl Into<String>) -> UpdateError {
    UpdateError::Protocol(what.into())
}

fn member<'a>(value: &'a TlvValue, tag: u8, what: &str) -> UpdateResult<&'a TlvValue> {
    value
        .get(tag)
        .ok_or_else(|| protocol(format!("{what}: missing member [{tag}]")))
}

fn uint(value: &TlvValue, what: &str) -> UpdateResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| protocol(format!("{what}: expected unsigned integer, found {}", value.type_name())))
}

fn list<'a>(value: &'a TlvValue, what: &str) -> UpdateResult<&'a [TlvValue]> {
    member(value, TAG_LIST, what)?
        .as_array()
        .ok_or_else(|| protocol(format!("{what}: member [{TAG_LIST}] is not an array")))
}

fn structure(members: Vec<(Tag, TlvValue)>) -> TlvValue {
    TlvValue::Structure(members)
}

// ── DataPath ─────────────────────────────────────────────────────

/// Addresses one property of one trait instance on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPath {
    pub profile_id: ProfileId,
    pub instance_id: InstanceId,
    pub resource_id: ResourceId,
    /// Schema version the sender encoded with; `None` means current.
    pub schema_version: Option<SchemaVersion>,
    /// Property tags from the trait root.
    pub tags: Vec<u32>,
}

impl DataPath {
    /// The root of a trait instance on the local resource.
    pub fn root(profile_id: ProfileId, instance_id: InstanceId) -> Self {
        Self {
            profile_id,
            instance_id,
            resource_id: ResourceId::SELF_NODE,
            schema_version: None,
            tags: Vec::new(),
        }
    }

    pub fn to_tlv(&self) -> UpdateResult<TlvValue> {
        let mut locator = vec![(
            Tag::Context(TAG_LOCATOR_PROFILE),
            TlvValue::Unsigned(u64::from(self.profile_id.as_u32())),
        )];
        if self.instance_id.as_u64() != 0 {
            locator.push((Tag::Context(TAG_LOCATOR_INSTANCE), TlvValue::Unsigned(self.instance_id.as_u64())));
        }
        if !self.resource_id.is_self() {
            locator.push((Tag::Context(TAG_LOCATOR_RESOURCE), TlvValue::Unsigned(self.resource_id.as_u64())));
        }
        if let Some(version) = self.schema_version {
            locator.push((Tag::Context(TAG_LOCATOR_VERSION), TlvValue::Unsigned(u64::from(version))));
        }

        let mut members = Vec::with_capacity(self.tags.len() + 1);
        members.push((Tag::Context(TAG_PATH_LOCATOR), structure(locator)));
        for tag in &self.tags {
            members.push((Tag::for_property(*tag)?, TlvValue::Null));
        }
        Ok(TlvValue::Path(members))
    }

    pub fn from_tlv(value: &TlvValue) -> UpdateResult<Self> {
        let TlvValue::Path(members) = value else {
            return Err(protocol(format!("data path: expected path, found {}", value.type_name())));
        };
        let mut members = members.iter();
        let locator = match members.next() {
            Some((tag, locator)) if *tag == Tag::Context(TAG_PATH_LOCATOR) => locator,
            _ => return Err(protocol("data path: missing instance locator")),
        };

        let profile = uint(member(locator, TAG_LOCATOR_PROFILE, "instance locator")?, "profile id")?;
        let profile_id = u32::try_from(profile)
            .map(ProfileId::from_raw)
            .map_err(|_| protocol(format!("profile id {profile:#x} out of range")))?;
        let instance_id = match locator.get(TAG_LOCATOR_INSTANCE) {
            Some(v) => InstanceId::new(uint(v, "instance id")?),
            None => InstanceId::default(),
        };
        let resource_id = match locator.get(TAG_LOCATOR_RESOURCE) {
            Some(v) => ResourceId::new(uint(v, "resource id")?),
            None => ResourceId::SELF_NODE,
        };
        let schema_version = match locator.get(TAG_LOCATOR_VERSION) {
            Some(v) => Some(
                SchemaVersion::try_from(uint(v, "schema version")?)
                    .map_err(|_| protocol("schema version out of range"))?,
            ),
            None => None,
        };

        let tags = members
            .map(|(tag, _)| {
                tag.context_number()
                    .map(u32::from)
                    .ok_or_else(|| protocol(format!("data path: property tag {tag} is not a context tag")))
            })
            .collect::<UpdateResult<Vec<_>>>()?;

        Ok(Self {
            profile_id,
            instance_id,
            resource_id,
            schema_version,
            tags,
        })
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.resource_id, self.profile_id, self.instance_id)?;
        for tag in &self.tags {
            write!(f, "/{tag}")?;
        }
        Ok(())
    }
}

// ── DataElement ──────────────────────────────────────────────────

/// A value for one path, as carried by updates and view responses.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    pub path: DataPath,
    pub data_version: Option<u64>,
    pub data: TlvValue,
}

impl DataElement {
    pub fn to_tlv(&self) -> UpdateResult<TlvValue> {
        let mut members = vec![(Tag::Context(TAG_ELEMENT_PATH), self.path.to_tlv()?)];
        if let Some(version) = self.data_version {
            members.push((Tag::Context(TAG_ELEMENT_VERSION), TlvValue::Unsigned(version)));
        }
        members.push((Tag::Context(TAG_ELEMENT_DATA), self.data.clone()));
        Ok(structure(members))
    }

    pub fn from_tlv(value: &TlvValue) -> UpdateResult<Self> {
        let path = DataPath::from_tlv(member(value, TAG_ELEMENT_PATH, "data element")?)?;
        let data_version = value
            .get(TAG_ELEMENT_VERSION)
            .map(|v| uint(v, "data version"))
            .transpose()?;
        let data = member(value, TAG_ELEMENT_DATA, "data element")?.clone();
        Ok(Self {
            path,
            data_version,
            data,
        })
    }
}

fn elements_to_tlv(elements: &[DataElement]) -> UpdateResult<TlvValue> {
    elements
        .iter()
        .map(DataElement::to_tlv)
        .collect::<UpdateResult<Vec<_>>>()
        .map(TlvValue::Array)
}

fn elements_from_tlv(value: &TlvValue, what: &str) -> UpdateResult<Vec<DataElement>> {
    list(value, what)?.iter().map(DataElement::from_tlv).collect()
}

// ── Messages ─────────────────────────────────────────────────────

/// Asks the publisher to apply new values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateRequest {
    pub elements: Vec<DataElement>,
    /// Application-defined extra data passed through to the publisher.
    pub argument: Option<TlvValue>,
}

impl UpdateRequest {
    pub fn to_tlv(&self) -> UpdateResult<TlvValue> {
        let mut members = vec![(Tag::Context(TAG_LIST), elements_to_tlv(&self.elements)?)];
        if let Some(argument) = &self.argument {
            members.push((Tag::Context(TAG_ARGUMENT), argument.clone()));
        }
        Ok(structure(members))
    }

    pub fn from_tlv(value: &TlvValue) -> UpdateResult<Self> {
        Ok(Self {
            elements: elements_from_tlv(value, "update request")?,
            argument: value.get(TAG_ARGUMENT).cloned(),
        })
    }
}

/// Asks the publisher for the current values at some paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewRequest {
    pub paths: Vec<DataPath>,
}

impl ViewRequest {
    pub fn to_tlv(&self) -> UpdateResult<TlvValue> {
        let paths = self
            .paths
            .iter()
            .map(DataPath::to_tlv)
            .collect::<UpdateResult<Vec<_>>>()?;
        Ok(structure(vec![(Tag::Context(TAG_LIST), TlvValue::Array(paths))]))
    }

    pub fn from_tlv(value: &TlvValue) -> UpdateResult<Self> {
        Ok(Self {
            paths: list(value, "view request")?
                .iter()
                .map(DataPath::from_tlv)
                .collect::<UpdateResult<_>>()?,
        })
    }
}

/// The values answering a [`ViewRequest`], in request order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewResponse {
    pub elements: Vec<DataElement>,
}

impl ViewResponse {
    pub fn to_tlv(&self) -> UpdateResult<TlvValue> {
        Ok(structure(vec![(Tag::Context(TAG_LIST), elements_to_tlv(&self.elements)?)]))
    }

    pub fn from_tlv(value: &TlvValue) -> UpdateResult<Self> {
        Ok(Self {
            elements: elements_from_tlv(value, "view response")?,
        })
    }
}

/// The publisher's verdict on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub code: StatusCode,
    /// Index of the data element that failed, if one did.
    pub element_index: Option<u32>,
    pub message: Option<String>,
}

impl StatusReport {
    pub fn success() -> Self {
        Self {
            code: StatusCode::Success,
            element_index: None,
            message: None,
        }
    }

    pub fn failure(code: StatusCode, element_index: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            code,
            element_index,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn to_tlv(&self) -> UpdateResult<TlvValue> {
        let mut members = vec![(Tag::Context(TAG_STATUS_CODE), TlvValue::Unsigned(self.code as u64))];
        if let Some(index) = self.element_index {
            members.push((Tag::Context(TAG_STATUS_ELEMENT), TlvValue::Unsigned(u64::from(index))));
        }
        if let Some(message) = &self.message {
            members.push((Tag::Context(TAG_STATUS_MESSAGE), TlvValue::String(message.clone())));
        }
        Ok(structure(members))
    }

    pub fn from_tlv(value: &TlvValue) -> UpdateResult<Self> {
        let code = StatusCode::try_from(uint(member(value, TAG_STATUS_CODE, "status report")?, "status code")?)?;
        let element_index = value
            .get(TAG_STATUS_ELEMENT)
            .map(|v| {
                uint(v, "element index")
                    .and_then(|i| u32::try_from(i).map_err(|_| protocol("element index out of range")))
            })
            .transpose()?;
        let message = value
            .get(TAG_STATUS_MESSAGE)
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| protocol("status message is not a string"))
            })
            .transpose()?;
        Ok(Self {
            code,
            element_index,
            message,
        })
    }
}

/// Any message of the protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    UpdateRequest(UpdateRequest),
    ViewRequest(ViewRequest),
    ViewResponse(ViewResponse),
    StatusReport(StatusReport),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::UpdateRequest(_) => MessageType::UpdateRequest,
            Message::ViewRequest(_) => MessageType::ViewRequest,
            Message::ViewResponse(_) => MessageType::ViewResponse,
            Message::StatusReport(_) => MessageType::StatusReport,
        }
    }

    /// Type byte followed by the TLV body.
    pub fn encode(&self) -> UpdateResult<Vec<u8>> {
        let body = match self {
            Message::UpdateRequest(m) => m.to_tlv()?,
            Message::ViewRequest(m) => m.to_tlv()?,
            Message::ViewResponse(m) => m.to_tlv()?,
            Message::StatusReport(m) => m.to_tlv()?,
        };
        let mut out = vec![self.message_type() as u8];
        out.extend(body.encode(Tag::Anonymous)?);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> UpdateResult<Self> {
        let (&type_byte, body) = bytes
            .split_first()
            .ok_or_else(|| protocol("empty message"))?;
        let message_type = MessageType::try_from(type_byte)?;
        let (tag, value) = TlvValue::decode(body)?;
        if !tag.is_anonymous() || !value.is_structure() {
            return Err(protocol("message body must be an anonymous structure"));
        }
        Ok(match message_type {
            MessageType::UpdateRequest => Message::UpdateRequest(UpdateRequest::from_tlv(&value)?),
            MessageType::ViewRequest => Message::ViewRequest(ViewRequest::from_tlv(&value)?),
            MessageType::ViewResponse => Message::ViewResponse(ViewResponse::from_tlv(&value)?),
            MessageType::StatusReport => Message::StatusReport(StatusReport::from_tlv(&value)?),
        })
    }
}
