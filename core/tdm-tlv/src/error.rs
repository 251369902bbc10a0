//! Error types for the TLV codec.

use thiserror::Error;

/// Result type for TLV operations.
pub type TlvResult<T> = Result<T, TlvError>;

/// Errors that can occur while encoding or decoding TLV.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlvError {
    /// The writer's capacity limit would be exceeded.
    #[error("buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    /// The input ended in the middle of an element or container.
    #[error("unexpected end of TLV data")]
    UnexpectedEnd,

    /// Unknown element type in a control byte.
    #[error("invalid element type: 0x{0:02X}")]
    InvalidElementType(u8),

    /// Tag kind not allowed where it was used.
    #[error("invalid tag: {0}")]
    InvalidTag(String),

    /// The element is not of the requested type.
    #[error("wrong element type: expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    /// Unbalanced or mismatched container start/end.
    #[error("container mismatch: {0}")]
    ContainerMismatch(String),

    /// A UTF-8 string element held invalid bytes.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// A length field does not fit in memory.
    #[error("length {0} out of range")]
    LengthOutOfRange(u64),

    /// Bytes remained after a complete top-level element.
    #[error("{0} trailing bytes after TLV element")]
    TrailingData(usize),
}
