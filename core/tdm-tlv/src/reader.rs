//! Zero-copy TLV decoder.

use crate::element::{ContainerType, ElementType};
use crate::error::{TlvError, TlvResult};
use crate::tag::Tag;

/// Maximum container nesting accepted by the reader.
pub const MAX_DEPTH: usize = 32;

/// One decoded element. Strings and byte strings borrow from the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element<'a> {
    pub tag: Tag,
    pub kind: ElementKind<'a>,
}

/// The value part of a decoded element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind<'a> {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f64),
    Utf8(&'a str),
    Bytes(&'a [u8]),
    Null,
    /// Start of a container. Call [`TlvReader::enter_container`] to read its
    /// members, or keep calling `next` to skip it.
    Container(ContainerType),
}

impl<'a> ElementKind<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Signed(_) => "signed integer",
            Self::Unsigned(_) => "unsigned integer",
            Self::Bool(_) => "boolean",
            Self::Float(_) => "float",
            Self::Utf8(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Null => "null",
            Self::Container(ContainerType::Structure) => "structure",
            Self::Container(ContainerType::Array) => "array",
            Self::Container(ContainerType::Path) => "path",
        }
    }
}

impl<'a> Element<'a> {
    /// Reads an unsigned value; non-negative signed encodings are accepted.
    pub fn as_u64(&self) -> TlvResult<u64> {
        match self.kind {
            ElementKind::Unsigned(v) => Ok(v),
            ElementKind::Signed(v) if v >= 0 => Ok(v as u64),
            other => Err(wrong_type("unsigned integer", &other)),
        }
    }

    /// Reads a signed value; unsigned encodings that fit are accepted.
    pub fn as_i64(&self) -> TlvResult<i64> {
        match self.kind {
            ElementKind::Signed(v) => Ok(v),
            ElementKind::Unsigned(v) => {
                i64::try_from(v).map_err(|_| wrong_type("signed integer", &self.kind))
            }
            other => Err(wrong_type("signed integer", &other)),
        }
    }

    pub fn as_bool(&self) -> TlvResult<bool> {
        match self.kind {
            ElementKind::Bool(v) => Ok(v),
            other => Err(wrong_type("boolean", &other)),
        }
    }

    pub fn as_str(&self) -> TlvResult<&'a str> {
        match self.kind {
            ElementKind::Utf8(v) => Ok(v),
            other => Err(wrong_type("string", &other)),
        }
    }

    pub fn as_bytes(&self) -> TlvResult<&'a [u8]> {
        match self.kind {
            ElementKind::Bytes(v) => Ok(v),
            other => Err(wrong_type("bytes", &other)),
        }
    }

    pub fn container_type(&self) -> Option<ContainerType> {
        match self.kind {
            ElementKind::Container(c) => Some(c),
            _ => None,
        }
    }
}

fn wrong_type(expected: &'static str, found: &ElementKind<'_>) -> TlvError {
    TlvError::WrongType {
        expected,
        found: found.type_name(),
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    container: ContainerType,
    ended: bool,
}

/// Walks a TLV encoding element by element.
///
/// At the top level `next` returns `None` once the input is exhausted. Inside
/// a container it returns `None` at the end-of-container marker; the caller
/// then calls [`exit_container`](Self::exit_container).
#[derive(Debug, Clone)]
pub struct TlvReader<'a> {
    data: &'a [u8],
    pos: usize,
    frames: Vec<Frame>,
    pending: Option<ContainerType>,
}

impl<'a> TlvReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            frames: Vec::new(),
            pending: None,
        }
    }

    /// Byte offset of the next unread element.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current container nesting.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Decodes the next element at the current nesting level.
    pub fn next(&mut self) -> TlvResult<Option<Element<'a>>> {
        if self.pending.is_some() {
            self.enter_container()?;
            self.exit_container()?;
        }
        if self.frames.last().is_some_and(|f| f.ended) {
            return Ok(None);
        }
        if self.pos >= self.data.len() {
            return if self.frames.is_empty() {
                Ok(None)
            } else {
                Err(TlvError::UnexpectedEnd)
            };
        }

        let control = self.data[self.pos];
        let element_type = ElementType::from_control(control)?;

        if element_type == ElementType::EndOfContainer {
            if control != ElementType::EndOfContainer as u8 {
                return Err(TlvError::InvalidTag(
                    "end of container must be anonymous".into(),
                ));
            }
            let Some(frame) = self.frames.last_mut() else {
                return Err(TlvError::ContainerMismatch(
                    "end of container at top level".into(),
                ));
            };
            frame.ended = true;
            self.pos += 1;
            return Ok(None);
        }

        let (tag, tag_len) = Tag::decode(control, &self.data[self.pos + 1..])?;
        self.check_member_tag(&tag)?;
        let mut cursor = self.pos + 1 + tag_len;
        let width = element_type.field_width();

        let kind = match element_type {
            ElementType::Int8 | ElementType::Int16 | ElementType::Int32 | ElementType::Int64 => {
                let raw = self.take(&mut cursor, width)?;
                ElementKind::Signed(sign_extend(raw))
            }
            ElementType::UInt8
            | ElementType::UInt16
            | ElementType::UInt32
            | ElementType::UInt64 => {
                let raw = self.take(&mut cursor, width)?;
                ElementKind::Unsigned(zero_extend(raw))
            }
            ElementType::BoolFalse => ElementKind::Bool(false),
            ElementType::BoolTrue => ElementKind::Bool(true),
            ElementType::Float32 => {
                let raw = self.take(&mut cursor, 4)?;
                ElementKind::Float(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64)
            }
            ElementType::Float64 => {
                let raw = self.take(&mut cursor, 8)?;
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(raw);
                ElementKind::Float(f64::from_le_bytes(bytes))
            }
            ElementType::Utf8Len1
            | ElementType::Utf8Len2
            | ElementType::Utf8Len4
            | ElementType::Utf8Len8 => {
                let body = self.take_length_prefixed(&mut cursor, width)?;
                let s = std::str::from_utf8(body).map_err(|_| TlvError::InvalidUtf8)?;
                ElementKind::Utf8(s)
            }
            ElementType::BytesLen1
            | ElementType::BytesLen2
            | ElementType::BytesLen4
            | ElementType::BytesLen8 => {
                ElementKind::Bytes(self.take_length_prefixed(&mut cursor, width)?)
            }
            ElementType::Null => ElementKind::Null,
            ElementType::Structure => ElementKind::Container(ContainerType::Structure),
            ElementType::Array => ElementKind::Container(ContainerType::Array),
            ElementType::Path => ElementKind::Container(ContainerType::Path),
            ElementType::EndOfContainer => unreachable!("handled above"),
        };

        if let ElementKind::Container(c) = kind {
            self.pending = Some(c);
        }
        self.pos = cursor;
        Ok(Some(Element { tag, kind }))
    }

    /// Enters the container returned by the last call to `next`.
    pub fn enter_container(&mut self) -> TlvResult<ContainerType> {
        let Some(container) = self.pending.take() else {
            return Err(TlvError::ContainerMismatch(
                "no container element to enter".into(),
            ));
        };
        if self.frames.len() >= MAX_DEPTH {
            return Err(TlvError::ContainerMismatch(format!(
                "nesting deeper than {MAX_DEPTH}"
            )));
        }
        self.frames.push(Frame {
            container,
            ended: false,
        });
        Ok(container)
    }

    /// Leaves the innermost container, skipping any unread members.
    pub fn exit_container(&mut self) -> TlvResult<ContainerType> {
        if self.frames.is_empty() {
            return Err(TlvError::ContainerMismatch(
                "exit_container with no open container".into(),
            ));
        }
        while self.next()?.is_some() {}
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| TlvError::ContainerMismatch("container stack underflow".into()))?;
        Ok(frame.container)
    }

    /// Fails unless every byte of the input has been consumed.
    pub fn expect_end(&mut self) -> TlvResult<()> {
        if self.pending.is_some() {
            self.enter_container()?;
            self.exit_container()?;
        }
        if !self.frames.is_empty() {
            return Err(TlvError::UnexpectedEnd);
        }
        match self.remaining() {
            0 => Ok(()),
            n => Err(TlvError::TrailingData(n)),
        }
    }

    fn check_member_tag(&self, tag: &Tag) -> TlvResult<()> {
        match self.frames.last() {
            Some(frame) if frame.container.requires_tagged_members() && tag.is_anonymous() => {
                Err(TlvError::InvalidTag(format!(
                    "anonymous member in {}",
                    frame.container
                )))
            }
            Some(frame) if frame.container == ContainerType::Array && !tag.is_anonymous() => {
                Err(TlvError::InvalidTag(format!("tagged member {tag} in array")))
            }
            _ => Ok(()),
        }
    }

    fn take(&self, cursor: &mut usize, n: usize) -> TlvResult<&'a [u8]> {
        let end = cursor.checked_add(n).ok_or(TlvError::UnexpectedEnd)?;
        let slice = self.data.get(*cursor..end).ok_or(TlvError::UnexpectedEnd)?;
        *cursor = end;
        Ok(slice)
    }

    fn take_length_prefixed(&self, cursor: &mut usize, width: usize) -> TlvResult<&'a [u8]> {
        let len = zero_extend(self.take(cursor, width)?);
        let len = usize::try_from(len).map_err(|_| TlvError::LengthOutOfRange(len))?;
        self.take(cursor, len)
    }
}

fn zero_extend(raw: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..raw.len()].copy_from_slice(raw);
    u64::from_le_bytes(bytes)
}

fn sign_extend(raw: &[u8]) -> i64 {
    let negative = raw.last().is_some_and(|b| b & 0x80 != 0);
    let mut bytes = if negative { [0xFFu8; 8] } else { [0u8; 8] };
    bytes[..raw.len()].copy_from_slice(raw);
    i64::from_le_bytes(bytes)
}
