use crate::element::ContainerType;
use crate::error::{TlvError, TlvResult};
use crate::reader::{Element, ElementKind, TlvReader};
use crate::tag::Tag;
use crate::writer::TlvWriter;

/// An owned TLV value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TlvValue {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Null,
    /// Tagged members in encoding order.
    Structure(Vec<(Tag, TlvValue)>),
    Array(Vec<TlvValue>),
    /// Tagged members whose order is significant.
    Path(Vec<(Tag, TlvValue)>),
}

impl TlvValue {
    /// Decodes exactly one top-level element, returning its tag and value.
    pub fn decode(data: &[u8]) -> TlvResult<(Tag, TlvValue)> {
        let mut reader = TlvReader::new(data);
        let element = reader.next()?.ok_or(TlvError::UnexpectedEnd)?;
        let value = Self::read_element(&mut reader, element)?;
        reader.expect_end()?;
        Ok((element.tag, value))
    }

    /// Materializes `element` (just returned by `reader.next()`), descending
    /// into it if it is a container.
    pub fn read_element(reader: &mut TlvReader<'_>, element: Element<'_>) -> TlvResult<TlvValue> {
        Ok(match element.kind {
            ElementKind::Signed(v) => TlvValue::Signed(v),
            ElementKind::Unsigned(v) => TlvValue::Unsigned(v),
            ElementKind::Bool(v) => TlvValue::Bool(v),
            ElementKind::Float(v) => TlvValue::Float(v),
            ElementKind::Utf8(v) => TlvValue::String(v.to_string()),
            ElementKind::Bytes(v) => TlvValue::Bytes(v.to_vec()),
            ElementKind::Null => TlvValue::Null,
            ElementKind::Container(container) => {
                reader.enter_container()?;
                let value = match container {
                    ContainerType::Array => {
                        let mut items = Vec::new();
                        while let Some(member) = reader.next()? {
                            items.push(Self::read_element(reader, member)?);
                        }
                        TlvValue::Array(items)
                    }
                    ContainerType::Structure | ContainerType::Path => {
                        let mut members = Vec::new();
                        while let Some(member) = reader.next()? {
                            members.push((member.tag, Self::read_element(reader, member)?));
                        }
                        if container == ContainerType::Path {
                            TlvValue::Path(members)
                        } else {
                            TlvValue::Structure(members)
                        }
                    }
                };
                reader.exit_container()?;
                value
            }
        })
    }

    /// Encodes this value as a single element under `tag`.
    pub fn encode(&self, tag: Tag) -> TlvResult<Vec<u8>> {
        let mut writer = TlvWriter::new();
        writer.put_value(tag, self)?;
        writer.finish()
    }

    /// Looks up a structure or path member by context tag.
    pub fn get(&self, context_tag: u8) -> Option<&TlvValue> {
        self.members()?
            .iter()
            .find(|(tag, _)| *tag == Tag::Context(context_tag))
            .map(|(_, value)| value)
    }

    /// Members of a structure or path.
    pub fn members(&self) -> Option<&[(Tag, TlvValue)]> {
        match self {
            TlvValue::Structure(members) | TlvValue::Path(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            TlvValue::Unsigned(v) => Some(v),
            TlvValue::Signed(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            TlvValue::Signed(v) => Some(v),
            TlvValue::Unsigned(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            TlvValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TlvValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TlvValue::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TlvValue]> {
        match self {
            TlvValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TlvValue::Null)
    }

    pub fn is_structure(&self) -> bool {
        matches!(self, TlvValue::Structure(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TlvValue::Signed(_) => "signed integer",
            TlvValue::Unsigned(_) => "unsigned integer",
            TlvValue::Bool(_) => "boolean",
            TlvValue::Float(_) => "float",
            TlvValue::String(_) => "string",
            TlvValue::Bytes(_) => "bytes",
            TlvValue::Null => "null",
            TlvValue::Structure(_) => "structure",
            TlvValue::Array(_) => "array",
            TlvValue::Path(_) => "path",
        }
    }
}

impl From<bool> for TlvValue {
    fn from(v: bool) -> Self {
        TlvValue::Bool(v)
    }
}

impl From<u64> for TlvValue {
    fn from(v: u64) -> Self {
        TlvValue::Unsigned(v)
    }
}

impl From<u32> for TlvValue {
    fn from(v: u32) -> Self {
        TlvValue::Unsigned(v as u64)
    }
}

impl From<i64> for TlvValue {
    fn from(v: i64) -> Self {
        TlvValue::Signed(v)
    }
}

impl From<f64> for TlvValue {
    fn from(v: f64) -> Self {
        TlvValue::Float(v)
    }
}

impl From<&str> for TlvValue {
    fn from(v: &str) -> Self {
        TlvValue::String(v.to_string())
    }
}

impl From<String> for TlvValue {
    fn from(v: String) -> Self {
        TlvValue::String(v)
    }
}

impl From<Vec<u8>> for TlvValue {
    fn from(v: Vec<u8>) -> Self {
        TlvValue::Bytes(v)
    }
}
