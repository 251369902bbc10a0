//! Error types for schema resolution.

use tdm_tlv::TlvError;
use tdm_types::{ProfileId, PropertyHandle, SchemaVersion, VersionRange};
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building or walking a trait schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The handle is not part of this trait.
    #[error("{profile_id}: property handle {handle} not found")]
    HandleNotFound {
        profile_id: ProfileId,
        handle: PropertyHandle,
    },

    /// No child of `parent` carries `tag`.
    #[error("{profile_id}: no property with tag {tag} under handle {parent}")]
    TagNotFound {
        profile_id: ProfileId,
        parent: PropertyHandle,
        tag: u32,
    },

    /// A parent walk exceeded the property count.
    #[error("{profile_id}: schema corrupt at handle {handle}: {reason}")]
    SchemaCorrupt {
        profile_id: ProfileId,
        handle: PropertyHandle,
        reason: String,
    },

    /// The directory has no schema for the profile.
    #[error("profile {0} is not registered")]
    ProfileNotRegistered(ProfileId),

    /// Two schemas were registered under the same profile id.
    #[error("profile {0} registered twice")]
    DuplicateProfile(ProfileId),

    /// Generated tables failed validation.
    #[error("{profile_id}: invalid schema: {reason}")]
    InvalidSchema {
        profile_id: ProfileId,
        reason: String,
    },

    /// A message referenced a schema version this trait does not support.
    #[error("{profile_id}: schema version {version} outside supported {supported}")]
    UnsupportedVersion {
        profile_id: ProfileId,
        version: SchemaVersion,
        supported: VersionRange,
    },

    /// A dotted name path did not resolve.
    #[error("{profile_id}: no property named {path:?}")]
    NameNotFound { profile_id: ProfileId, path: String },

    /// A required property had no value.
    #[error("{profile_id}: required property {handle} is absent")]
    MissingProperty {
        profile_id: ProfileId,
        handle: PropertyHandle,
    },

    /// A null was supplied for a property that is not nullable.
    #[error("{profile_id}: property {handle} is not nullable")]
    NotNullable {
        profile_id: ProfileId,
        handle: PropertyHandle,
    },

    /// A value's shape did not match the schema node.
    #[error("{profile_id}: property {handle} expected {expected}, found {found}")]
    TypeMismatch {
        profile_id: ProfileId,
        handle: PropertyHandle,
        expected: &'static str,
        found: &'static str,
    },

    /// The data source or sink refused an operation.
    #[error("data store error: {0}")]
    Data(String),

    /// TLV encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] TlvError),
}
