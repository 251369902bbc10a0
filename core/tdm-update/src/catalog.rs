//! Trait catalogs.
//!
//! A catalog maps the application's [`TraitDataHandle`]s to trait instances
//! and, on the publishing side, to the stores holding their data.

use crate::error::{UpdateError, UpdateResult};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tdm_schema::{TraitDataSink, TraitDataSource};
use tdm_types::{InstanceId, ProfileId, ResourceId, TraitDataHandle};
use tracing::debug;

/// Which trait instance a catalog entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraitInstanceInfo {
    pub profile_id: ProfileId,
    pub instance_id: InstanceId,
    pub resource_id: ResourceId,
}

impl TraitInstanceInfo {
    /// Instance 0 of `profile_id` on the local resource.
    pub fn local(profile_id: ProfileId) -> Self {
        Self {
            profile_id,
            instance_id: InstanceId::default(),
            resource_id: ResourceId::SELF_NODE,
        }
    }

    pub fn with_instance(mut self, instance_id: InstanceId) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn with_resource(mut self, resource_id: ResourceId) -> Self {
        self.resource_id = resource_id;
        self
    }
}

/// Data storage for one trait instance.
pub trait TraitStore: TraitDataSource + TraitDataSink + Send {}

impl<T: TraitDataSource + TraitDataSink + Send> TraitStore for T {}

/// A store shared between the catalog and the application.
pub type SharedStore = Arc<Mutex<dyn TraitStore>>;

/// Wraps a store for registration in a catalog.
pub fn shared_store(store: impl TraitStore + 'static) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared store. A poisoned lock is reported, not unwrapped.
pub fn lock_store(store: &SharedStore) -> UpdateResult<MutexGuard<'_, dyn TraitStore + 'static>> {
    store
        .lock()
        .map_err(|e| UpdateError::Store(format!("store lock poisoned: {e}")))
}

/// Looks up trait instances by handle and by identity.
pub trait TraitCatalog: Send + Sync {
    /// The instance behind `handle`.
    fn locate(&self, handle: TraitDataHandle) -> UpdateResult<TraitInstanceInfo>;

    /// The handle of the instance matching `info`.
    fn find(&self, info: &TraitInstanceInfo) -> Option<TraitDataHandle>;

    /// The data store behind `handle`, if this side holds one.
    fn store(&self, handle: TraitDataHandle) -> Option<SharedStore>;

    /// Every handle, ascending.
    fn handles(&self) -> Vec<TraitDataHandle>;
}

struct CatalogEntry {
    info: TraitInstanceInfo,
    store: Option<SharedStore>,
}

/// A catalog for one node's traits, with handles assigned in insertion
/// order starting at 0.
#[derive(Default)]
pub struct SingleResourceCatalog {
    entries: BTreeMap<TraitDataHandle, CatalogEntry>,
}

impl SingleResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&self) -> UpdateResult<TraitDataHandle> {
        let next = self
            .entries
            .keys()
            .next_back()
            .map_or(Some(0), |h| h.as_u16().checked_add(1))
            .ok_or_else(|| UpdateError::Store("catalog is full".into()))?;
        Ok(TraitDataHandle::new(next))
    }

    /// Adds a trait instance the client only talks about.
    pub fn add(&mut self, info: TraitInstanceInfo) -> UpdateResult<TraitDataHandle> {
        self.insert(info, None)
    }

    /// Adds a trait instance along with the store that publishes it.
    pub fn add_store(&mut self, info: TraitInstanceInfo, store: SharedStore) -> UpdateResult<TraitDataHandle> {
        self.insert(info, Some(store))
    }

    fn insert(&mut self, info: TraitInstanceInfo, store: Option<SharedStore>) -> UpdateResult<TraitDataHandle> {
        if let Some(existing) = self.find(&info) {
            return Err(UpdateError::Store(format!(
                "{}/{} already cataloged as {existing}",
                info.profile_id, info.instance_id
            )));
        }
        let handle = self.next_handle()?;
        debug!(handle = %handle, profile = %info.profile_id, instance = %info.instance_id, "cataloged trait instance");
        self.entries.insert(handle, CatalogEntry { info, store });
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TraitCatalog for SingleResourceCatalog {
    fn locate(&self, handle: TraitDataHandle) -> UpdateResult<TraitInstanceInfo> {
        self.entries
            .get(&handle)
            .map(|e| e.info)
            .ok_or(UpdateError::UnknownTraitHandle(handle))
    }

    fn find(&self, info: &TraitInstanceInfo) -> Option<TraitDataHandle> {
        self.entries
            .iter()
            .find(|(_, e)| e.info == *info)
            .map(|(h, _)| *h)
    }

    fn store(&self, handle: TraitDataHandle) -> Option<SharedStore> {
        self.entries.get(&handle).and_then(|e| e.store.clone())
    }

    fn handles(&self) -> Vec<TraitDataHandle> {
        self.entries.keys().copied().collect()
    }
}
