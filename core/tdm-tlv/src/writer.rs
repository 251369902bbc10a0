//! Streaming TLV encoder.

use crate::element::{ContainerType, ElementType};
use crate::error::{TlvError, TlvResult};
use crate::tag::Tag;
use crate::value::TlvValue;

/// Writes TLV elements into an owned buffer with an optional size limit.
///
/// Scalar `put_*` calls either write the whole element or leave the buffer
/// untouched, so a `BufferTooSmall` failure never produces a torn scalar.
#[derive(Debug, Clone)]
pub struct TlvWriter {
    buf: Vec<u8>,
    max_len: usize,
    containers: Vec<ContainerType>,
}

impl Default for TlvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TlvWriter {
    /// Creates an unbounded writer.
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Creates a writer that refuses to grow beyond `max_len` bytes.
    pub fn with_limit(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len,
            containers: Vec::new(),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Remaining capacity before the limit is hit.
    pub fn remaining(&self) -> usize {
        self.max_len.saturating_sub(self.buf.len())
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    /// Writes an unsigned integer using the narrowest encoding.
    pub fn put_u64(&mut self, tag: Tag, value: u64) -> TlvResult<()> {
        if let Ok(v) = u8::try_from(value) {
            self.put_fixed(tag, ElementType::UInt8, &v.to_le_bytes())
        } else if let Ok(v) = u16::try_from(value) {
            self.put_fixed(tag, ElementType::UInt16, &v.to_le_bytes())
        } else if let Ok(v) = u32::try_from(value) {
            self.put_fixed(tag, ElementType::UInt32, &v.to_le_bytes())
        } else {
            self.put_fixed(tag, ElementType::UInt64, &value.to_le_bytes())
        }
    }

    /// Writes a signed integer using the narrowest encoding.
    pub fn put_i64(&mut self, tag: Tag, value: i64) -> TlvResult<()> {
        if let Ok(v) = i8::try_from(value) {
            self.put_fixed(tag, ElementType::Int8, &v.to_le_bytes())
        } else if let Ok(v) = i16::try_from(value) {
            self.put_fixed(tag, ElementType::Int16, &v.to_le_bytes())
        } else if let Ok(v) = i32::try_from(value) {
            self.put_fixed(tag, ElementType::Int32, &v.to_le_bytes())
        } else {
            self.put_fixed(tag, ElementType::Int64, &value.to_le_bytes())
        }
    }

    pub fn put_bool(&mut self, tag: Tag, value: bool) -> TlvResult<()> {
        let element_type = if value {
            ElementType::BoolTrue
        } else {
            ElementType::BoolFalse
        };
        self.put_fixed(tag, element_type, &[])
    }

    pub fn put_f32(&mut self, tag: Tag, value: f32) -> TlvResult<()> {
        self.put_fixed(tag, ElementType::Float32, &value.to_le_bytes())
    }

    pub fn put_f64(&mut self, tag: Tag, value: f64) -> TlvResult<()> {
        self.put_fixed(tag, ElementType::Float64, &value.to_le_bytes())
    }

    pub fn put_null(&mut self, tag: Tag) -> TlvResult<()> {
        self.put_fixed(tag, ElementType::Null, &[])
    }

    pub fn put_str(&mut self, tag: Tag, value: &str) -> TlvResult<()> {
        self.put_length_prefixed(tag, value.as_bytes(), true)
    }

    pub fn put_bytes(&mut self, tag: Tag, value: &[u8]) -> TlvResult<()> {
        self.put_length_prefixed(tag, value, false)
    }

    /// Opens a container; members follow until [`end_container`](Self::end_container).
    pub fn start_container(&mut self, tag: Tag, container: ContainerType) -> TlvResult<()> {
        self.put_fixed(tag, container.element_type(), &[])?;
        self.containers.push(container);
        Ok(())
    }

    /// Closes the innermost container, which must be of type `container`.
    pub fn end_container(&mut self, container: ContainerType) -> TlvResult<()> {
        match self.containers.last() {
            None => {
                return Err(TlvError::ContainerMismatch(
                    "end_container with no open container".into(),
                ));
            }
            Some(open) if *open != container => {
                return Err(TlvError::ContainerMismatch(format!(
                    "closing {container} while {open} is open"
                )));
            }
            Some(_) => {}
        }
        self.reserve(1)?;
        self.buf.push(ElementType::EndOfContainer as u8);
        self.containers.pop();
        Ok(())
    }

    /// Writes an owned value tree under `tag`.
    pub fn put_value(&mut self, tag: Tag, value: &TlvValue) -> TlvResult<()> {
        match value {
            TlvValue::Signed(v) => self.put_i64(tag, *v),
            TlvValue::Unsigned(v) => self.put_u64(tag, *v),
            TlvValue::Bool(v) => self.put_bool(tag, *v),
            TlvValue::Float(v) => self.put_f64(tag, *v),
            TlvValue::String(v) => self.put_str(tag, v),
            TlvValue::Bytes(v) => self.put_bytes(tag, v),
            TlvValue::Null => self.put_null(tag),
            TlvValue::Structure(members) | TlvValue::Path(members) => {
                let container = if matches!(value, TlvValue::Path(_)) {
                    ContainerType::Path
                } else {
                    ContainerType::Structure
                };
                self.start_container(tag, container)?;
                for (member_tag, member) in members {
                    self.put_value(*member_tag, member)?;
                }
                self.end_container(container)
            }
            TlvValue::Array(items) => {
                self.start_container(tag, ContainerType::Array)?;
                for item in items {
                    self.put_value(Tag::Anonymous, item)?;
                }
                self.end_container(ContainerType::Array)
            }
        }
    }

    /// Copies an already-encoded element verbatim.
    pub fn put_encoded(&mut self, encoded: &[u8]) -> TlvResult<()> {
        self.reserve(encoded.len())?;
        self.buf.extend_from_slice(encoded);
        Ok(())
    }

    /// Returns the encoding, failing if a container is still open.
    pub fn finish(self) -> TlvResult<Vec<u8>> {
        if let Some(open) = self.containers.last() {
            return Err(TlvError::ContainerMismatch(format!(
                "{} container(s) left open, innermost {open}",
                self.containers.len()
            )));
        }
        Ok(self.buf)
    }

    fn put_length_prefixed(&mut self, tag: Tag, data: &[u8], utf8: bool) -> TlvResult<()> {
        let element_type = ElementType::for_length(data.len(), utf8);
        let len = data.len() as u64;
        let prefix = len.to_le_bytes();
        let width = element_type.field_width();
        self.check_tag(&tag)?;
        self.reserve(1 + tag.encoded_len() + width + data.len())?;
        tag.encode(element_type as u8, &mut self.buf);
        self.buf.extend_from_slice(&prefix[..width]);
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn put_fixed(&mut self, tag: Tag, element_type: ElementType, value: &[u8]) -> TlvResult<()> {
        self.check_tag(&tag)?;
        self.reserve(1 + tag.encoded_len() + value.len())?;
        tag.encode(element_type as u8, &mut self.buf);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    fn check_tag(&self, tag: &Tag) -> TlvResult<()> {
        match self.containers.last() {
            Some(open) if open.requires_tagged_members() && tag.is_anonymous() => Err(
                TlvError::InvalidTag(format!("{open} members must be tagged")),
            ),
            Some(ContainerType::Array) if !tag.is_anonymous() => Err(TlvError::InvalidTag(
                format!("array members must be anonymous, got {tag}"),
            )),
            _ => Ok(()),
        }
    }

    fn reserve(&self, needed: usize) -> TlvResult<()> {
        let available = self.remaining();
        if needed > available {
            return Err(TlvError::BufferTooSmall { needed, available });
        }
        Ok(())
    }
}
