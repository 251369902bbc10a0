use crate::error::{TlvError, TlvResult};
use std::fmt;

/// Element type carried in the lower five bits of a control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementType {
    Int8 = 0x00,
    Int16 = 0x01,
    Int32 = 0x02,
    Int64 = 0x03,
    UInt8 = 0x04,
    UInt16 = 0x05,
    UInt32 = 0x06,
    UInt64 = 0x07,
    BoolFalse = 0x08,
    BoolTrue = 0x09,
    Float32 = 0x0A,
    Float64 = 0x0B,
    Utf8Len1 = 0x0C,
    Utf8Len2 = 0x0D,
    Utf8Len4 = 0x0E,
    Utf8Len8 = 0x0F,
    BytesLen1 = 0x10,
    BytesLen2 = 0x11,
    BytesLen4 = 0x12,
    BytesLen8 = 0x13,
    Null = 0x14,
    Structure = 0x15,
    Array = 0x16,
    Path = 0x17,
    EndOfContainer = 0x18,
}

impl ElementType {
    pub(crate) const MASK: u8 = 0x1F;

    /// Decodes the lower five bits of a control byte.
    pub fn from_control(control: u8) -> TlvResult<Self> {
        let raw = control & Self::MASK;
        Ok(match raw {
            0x00 => Self::Int8,
            0x01 => Self::Int16,
            0x02 => Self::Int32,
            0x03 => Self::Int64,
            0x04 => Self::UInt8,
            0x05 => Self::UInt16,
            0x06 => Self::UInt32,
            0x07 => Self::UInt64,
            0x08 => Self::BoolFalse,
            0x09 => Self::BoolTrue,
            0x0A => Self::Float32,
            0x0B => Self::Float64,
            0x0C => Self::Utf8Len1,
            0x0D => Self::Utf8Len2,
            0x0E => Self::Utf8Len4,
            0x0F => Self::Utf8Len8,
            0x10 => Self::BytesLen1,
            0x11 => Self::BytesLen2,
            0x12 => Self::BytesLen4,
            0x13 => Self::BytesLen8,
            0x14 => Self::Null,
            0x15 => Self::Structure,
            0x16 => Self::Array,
            0x17 => Self::Path,
            0x18 => Self::EndOfContainer,
            other => return Err(TlvError::InvalidElementType(other)),
        })
    }

    /// Width in bytes of the fixed value, or of the length prefix for
    /// strings and byte strings.
    pub(crate) fn field_width(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Utf8Len1 | Self::BytesLen1 => 1,
            Self::Int16 | Self::UInt16 | Self::Utf8Len2 | Self::BytesLen2 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 | Self::Utf8Len4 | Self::BytesLen4 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 | Self::Utf8Len8 | Self::BytesLen8 => 8,
            _ => 0,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => "signed integer",
            Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 => "unsigned integer",
            Self::BoolFalse | Self::BoolTrue => "boolean",
            Self::Float32 | Self::Float64 => "float",
            Self::Utf8Len1 | Self::Utf8Len2 | Self::Utf8Len4 | Self::Utf8Len8 => "string",
            Self::BytesLen1 | Self::BytesLen2 | Self::BytesLen4 | Self::BytesLen8 => "bytes",
            Self::Null => "null",
            Self::Structure => "structure",
            Self::Array => "array",
            Self::Path => "path",
            Self::EndOfContainer => "end of container",
        }
    }

    /// Picks the narrowest length-prefixed variant for `len` bytes.
    pub(crate) fn for_length(len: usize, utf8: bool) -> Self {
        let width = if len <= u8::MAX as usize {
            0
        } else if len <= u16::MAX as usize {
            1
        } else if len as u64 <= u32::MAX as u64 {
            2
        } else {
            3
        };
        match (utf8, width) {
            (true, 0) => Self::Utf8Len1,
            (true, 1) => Self::Utf8Len2,
            (true, 2) => Self::Utf8Len4,
            (true, _) => Self::Utf8Len8,
            (false, 0) => Self::BytesLen1,
            (false, 1) => Self::BytesLen2,
            (false, 2) => Self::BytesLen4,
            (false, _) => Self::BytesLen8,
        }
    }
}

/// The three container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    /// Members are tagged and unordered.
    Structure,
    /// Members are anonymous and ordered.
    Array,
    /// Members are tagged and ordered.
    Path,
}

impl ContainerType {
    pub(crate) fn element_type(self) -> ElementType {
        match self {
            Self::Structure => ElementType::Structure,
            Self::Array => ElementType::Array,
            Self::Path => ElementType::Path,
        }
    }

    pub(crate) fn requires_tagged_members(self) -> bool {
        !matches!(self, Self::Array)
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structure => "structure",
            Self::Array => "array",
            Self::Path => "path",
        };
        f.write_str(name)
    }
}
