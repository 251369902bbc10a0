use crate::{PropertyHandle, TraitDataHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Addresses one property of one cataloged trait instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitPath {
    /// Which trait instance, relative to the application's catalog.
    pub trait_data_handle: TraitDataHandle,
    /// Which property inside that trait's schema.
    pub property_handle: PropertyHandle,
}

impl TraitPath {
    #[must_use]
    pub const fn new(trait_data_handle: TraitDataHandle, property_handle: PropertyHandle) -> Self {
        Self {
            trait_data_handle,
            property_handle,
        }
    }

    /// The whole trait instance.
    #[must_use]
    pub const fn root(trait_data_handle: TraitDataHandle) -> Self {
        Self::new(trait_data_handle, PropertyHandle::ROOT)
    }
}

impl fmt::Display for TraitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trait_data_handle, self.property_handle)
    }
}
