//! Core type definitions for trait data management.
//!
//! This crate defines the small, wire-facing identifiers shared by every
//! layer of the stack:
//! - Profile ids (vendor + trait number) and property handles
//! - Schema versions and version ranges
//! - Trait paths addressing a property within a cataloged trait instance
//!
//! Schema tables, the TLV codec and the update protocol live in their own
//! crates and only depend on the types here.

mod ids;
mod path;
mod version;

pub use ids::{InstanceId, ProfileId, PropertyHandle, ResourceId, TraitDataHandle};
pub use path::TraitPath;
pub use version::{SchemaVersion, VersionRange};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid profile id: {0}")]
    InvalidProfileId(String),

    #[error("invalid property handle: {0}")]
    InvalidPropertyHandle(String),

    #[error("invalid version range: min {min} > max {max}")]
    InvalidVersionRange { min: u16, max: u16 },
}
