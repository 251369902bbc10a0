//! Error types for update and view exchanges.

use crate::protocol::StatusCode;
use tdm_schema::SchemaError;
use tdm_tlv::TlvError;
use tdm_types::{ProfileId, TraitDataHandle, TraitPath};
use thiserror::Error;

/// Result type for update operations.
pub type UpdateResult<T> = Result<T, UpdateError>;

/// Errors that end an update or view exchange.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateError {
    /// The property path does not resolve in the trait's schema.
    #[error("property not found at {path}: {reason}")]
    PropertyNotFound { path: TraitPath, reason: String },

    /// The catalog has no trait instance under this handle.
    #[error("trait data handle {0} is not in the catalog")]
    UnknownTraitHandle(TraitDataHandle),

    /// The directory has no schema for the trait's profile.
    #[error("profile {0} is not registered")]
    ProfileNotRegistered(ProfileId),

    /// Schema lookup or data validation failed.
    #[error("schema error: {0}")]
    Schema(SchemaError),

    /// The request or response could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] TlvError),

    /// A well-formed TLV message had the wrong shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The binding or transport failed; the reason is the transport's own.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Group-key security was requested without a usable key id.
    #[error("invalid key id {0:#06x}")]
    InvalidKeyId(u32),

    /// The security mode is not one this client can bind with.
    #[error("unsupported security mode {0}")]
    UnsupportedSecurityMode(u8),

    /// Another update for the same path is still running.
    #[error("update already in flight for {0}")]
    UpdateInFlight(TraitPath),

    /// No response arrived within the update timeout.
    #[error("update timed out")]
    Timeout,

    /// The publisher answered with a failure status.
    #[error("rejected by publisher: {0}")]
    Rejected(StatusCode),

    /// The binding was released and cannot carry more messages.
    #[error("binding already released")]
    BindingReleased,

    /// The local data store could not be used.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl From<SchemaError> for UpdateError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::ProfileNotRegistered(profile_id) => UpdateError::ProfileNotRegistered(profile_id),
            SchemaError::Encoding(e) => UpdateError::Encoding(e),
            other => UpdateError::Schema(other),
        }
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        UpdateError::Config(err.to_string())
    }
}
