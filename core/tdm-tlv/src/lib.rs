//! Tag-length-value encoding.
//!
//! A compact, self-describing binary format. Every element starts with a
//! control byte: the upper three bits select how the tag is encoded, the lower
//! five bits select the element type. Multi-byte fields are little-endian.
//!
//! ```text
//!  7   5 4       0
//! +-----+---------+------------+----------------+---------+
//! | tag | element | tag bytes  | length (opt.)  | value   |
//! | ctl | type    | 0..8       | 1/2/4/8        |         |
//! +-----+---------+------------+----------------+---------+
//! ```
//!
//! Containers (structure, array, path) are closed by an end-of-container
//! element. Structures and paths require tagged members; arrays require
//! anonymous members.
//!
//! - [`TlvWriter`] streams elements into a bounded buffer
//! - [`TlvReader`] walks elements without copying
//! - [`TlvValue`] is an owned tree for callers that want whole values
//! - [`pretty_print`] renders an encoding for logs and the CLI

mod debug;
mod element;
mod error;
mod reader;
mod tag;
mod value;
mod writer;

pub use debug::pretty_print;
pub use element::{ContainerType, ElementType};
pub use error::{TlvError, TlvResult};
pub use reader::{Element, ElementKind, TlvReader};
pub use tag::Tag;
pub use value::TlvValue;
pub use writer::TlvWriter;
