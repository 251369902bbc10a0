//! Trait schema engine.
//!
//! A trait's structured data is a tree of properties. Each node is named by a
//! schema-local [`PropertyHandle`](tdm_types::PropertyHandle); each non-root
//! node records its parent handle and the context tag it is encoded under
//! inside the parent's TLV structure. This crate provides:
//! - [`PropertyTable`]: the `(parent, tag)` table and its reverse index
//! - [`HandleBitfield`]: per-handle attribute bits (optional, nullable, ...)
//! - [`TraitSchemaEngine`]: one trait's immutable schema and the handle/tag
//!   resolution built on it
//! - [`SchemaBuilder`]: validates generated tables before they are used
//! - [`TraitSchemaDirectory`]: profile id → schema lookup
//! - [`data`]: schema-driven encoding of trait data to and from TLV
//!
//! Schemas are built once at startup and shared read-only (`Arc`) between
//! every exchange that needs them.

mod bitfield;
mod builder;
pub mod data;
mod directory;
mod engine;
mod error;
mod property;

pub use bitfield::HandleBitfield;
pub use builder::SchemaBuilder;
pub use data::{LeafData, MemoryTraitStore, TraitDataSink, TraitDataSource};
pub use directory::{DirectoryBuilder, TraitSchemaDirectory};
pub use engine::{PropertyAttribute, TraitSchemaEngine};
pub use error::{SchemaError, SchemaResult};
pub use property::{PropertyInfo, PropertyTable};
