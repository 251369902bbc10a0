//! Profile id → schema lookup.

use crate::engine::TraitSchemaEngine;
use crate::error::{SchemaError, SchemaResult};
use std::collections::HashMap;
use std::sync::Arc;
use tdm_types::ProfileId;
use tracing::{error, info};

/// Collects schemas before freezing them into a [`TraitSchemaDirectory`].
#[derive(Debug, Default)]
pub struct DirectoryBuilder {
    schemas: HashMap<ProfileId, Arc<TraitSchemaEngine>>,
}

impl DirectoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema. A second schema for the same profile is rejected.
    pub fn register(mut self, schema: impl Into<Arc<TraitSchemaEngine>>) -> SchemaResult<Self> {
        let schema = schema.into();
        let profile_id = schema.profile_id();
        if self.schemas.contains_key(&profile_id) {
            return Err(SchemaError::DuplicateProfile(profile_id));
        }
        self.schemas.insert(profile_id, schema);
        Ok(self)
    }

    pub fn build(self) -> TraitSchemaDirectory {
        info!(schemas = self.schemas.len(), "trait schema directory ready");
        TraitSchemaDirectory {
            schemas: self.schemas,
        }
    }
}

/// A read-only registry of every trait schema the node understands.
#[derive(Debug, Clone, Default)]
pub struct TraitSchemaDirectory {
    schemas: HashMap<ProfileId, Arc<TraitSchemaEngine>>,
}

impl TraitSchemaDirectory {
    pub fn builder() -> DirectoryBuilder {
        DirectoryBuilder::new()
    }

    /// The schema for `profile_id`. Unknown profiles are logged.
    pub fn get(&self, profile_id: ProfileId) -> Option<&Arc<TraitSchemaEngine>> {
        let schema = self.schemas.get(&profile_id);
        if schema.is_none() {
            error!(profile = %profile_id, "no trait schema registered for profile");
        }
        schema
    }

    /// Like [`get`](Self::get) but as an error.
    pub fn require(&self, profile_id: ProfileId) -> SchemaResult<Arc<TraitSchemaEngine>> {
        self.schemas
            .get(&profile_id)
            .cloned()
            .ok_or(SchemaError::ProfileNotRegistered(profile_id))
    }

    pub fn contains(&self, profile_id: ProfileId) -> bool {
        self.schemas.contains_key(&profile_id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered profile ids, ascending.
    pub fn profile_ids(&self) -> Vec<ProfileId> {
        let mut ids: Vec<_> = self.schemas.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Schemas in ascending profile order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TraitSchemaEngine>> + '_ {
        let mut schemas: Vec<_> = self.schemas.values().collect();
        schemas.sort_by_key(|s| s.profile_id());
        schemas.into_iter()
    }

    /// Looks a schema up by its trait name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<TraitSchemaEngine>> {
        self.schemas.values().find(|s| s.name() == name)
    }

    /// Registered schemas that extend `profile_id`.
    pub fn extensions_of(&self, profile_id: ProfileId) -> Vec<ProfileId> {
        let mut ids: Vec<_> = self
            .schemas
            .values()
            .filter(|s| s.is_extension_of(profile_id))
            .map(|s| s.profile_id())
            .collect();
        ids.sort();
        ids
    }
}
