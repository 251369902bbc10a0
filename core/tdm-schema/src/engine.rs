//! The schema engine for a single trait.

use crate::bitfield::HandleBitfield;
use crate::error::{SchemaError, SchemaResult};
use crate::property::PropertyTable;
use std::collections::BTreeMap;
use std::sync::Arc;
use tdm_types::{ProfileId, PropertyHandle, SchemaVersion, VersionRange};
use tracing::{debug, warn};

/// Per-property attributes recorded in the schema bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyAttribute {
    /// May be absent from a complete encoding.
    Optional,
    /// May carry an explicit null.
    Nullable,
    /// Not persisted by the publisher; metadata only.
    Ephemeral,
    /// Kept for compatibility; new writers should not set it.
    Deprecated,
    /// Derived from other properties.
    Denormalized,
}

impl PropertyAttribute {
    pub const ALL: [PropertyAttribute; 5] = [
        PropertyAttribute::Optional,
        PropertyAttribute::Nullable,
        PropertyAttribute::Ephemeral,
        PropertyAttribute::Deprecated,
        PropertyAttribute::Denormalized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PropertyAttribute::Optional => "optional",
            PropertyAttribute::Nullable => "nullable",
            PropertyAttribute::Ephemeral => "ephemeral",
            PropertyAttribute::Deprecated => "deprecated",
            PropertyAttribute::Denormalized => "denormalized",
        }
    }
}

/// One trait's immutable schema.
///
/// Built through [`SchemaBuilder`](crate::SchemaBuilder), which validates the
/// tables, then shared read-only. Every lookup is a pure function of the
/// schema.
#[derive(Debug, Clone)]
pub struct TraitSchemaEngine {
    pub(crate) profile_id: ProfileId,
    pub(crate) name: String,
    pub(crate) table: PropertyTable,
    /// Indexed by `handle - 2`; `None` for unnamed properties.
    pub(crate) property_names: Vec<Option<String>>,
    pub(crate) versions: VersionRange,
    pub(crate) tree_depth: usize,
    pub(crate) attributes: BTreeMap<PropertyAttribute, HandleBitfield>,
    pub(crate) parent_schema: Option<Arc<TraitSchemaEngine>>,
    /// Property tables for older schema versions, parallel to `table`.
    pub(crate) historical: BTreeMap<SchemaVersion, PropertyTable>,
}

impl TraitSchemaEngine {
    // ── Identity ─────────────────────────────────────────────────

    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of properties, excluding the root.
    pub fn property_count(&self) -> usize {
        self.table.len()
    }

    /// Depth of the deepest property (root children are depth 1).
    pub fn tree_depth(&self) -> usize {
        self.tree_depth
    }

    pub fn table(&self) -> &PropertyTable {
        &self.table
    }

    /// The trait this one extends, if any.
    pub fn parent_schema(&self) -> Option<&Arc<TraitSchemaEngine>> {
        self.parent_schema.as_ref()
    }

    /// Whether this trait extends `profile_id`, directly or transitively.
    pub fn is_extension_of(&self, profile_id: ProfileId) -> bool {
        let mut current = self.parent_schema.as_deref();
        while let Some(schema) = current {
            if schema.profile_id == profile_id {
                return true;
            }
            current = schema.parent_schema.as_deref();
        }
        false
    }

    /// Every handle in the schema, root first.
    pub fn handles(&self) -> impl Iterator<Item = PropertyHandle> + '_ {
        std::iter::once(PropertyHandle::ROOT).chain(self.table.iter().map(|(h, _)| h))
    }

    // ── Handle / tag resolution ──────────────────────────────────

    /// The context tag `handle` is encoded under; `None` for the root.
    pub fn tag_for_handle(&self, handle: PropertyHandle) -> SchemaResult<Option<u32>> {
        if handle.is_root() {
            return Ok(None);
        }
        self.table
            .get(handle)
            .map(|info| Some(info.tag))
            .ok_or_else(|| self.not_found(handle))
    }

    /// The child of `parent` tagged `tag`.
    pub fn handle_for_tag(&self, parent: PropertyHandle, tag: u32) -> SchemaResult<PropertyHandle> {
        Self::lookup_tag(&self.table, self.profile_id, parent, tag)
    }

    /// The enclosing handle. The root is its own parent.
    pub fn parent(&self, handle: PropertyHandle) -> SchemaResult<PropertyHandle> {
        if handle.is_root() {
            return Ok(PropertyHandle::ROOT);
        }
        self.table
            .get(handle)
            .map(|info| info.parent)
            .ok_or_else(|| self.not_found(handle))
    }

    /// Tags from the root down to `handle`. Empty for the root.
    pub fn tag_path(&self, handle: PropertyHandle) -> SchemaResult<Vec<u32>> {
        let mut tags = Vec::new();
        let mut current = handle;
        while !current.is_root() {
            if tags.len() > self.table.len() {
                return Err(SchemaError::SchemaCorrupt {
                    profile_id: self.profile_id,
                    handle,
                    reason: "parent chain does not reach the root".into(),
                });
            }
            let info = self.table.get(current).ok_or_else(|| self.not_found(current))?;
            tags.push(info.tag);
            current = info.parent;
        }
        tags.reverse();
        Ok(tags)
    }

    /// Resolves a root-relative tag path to a handle.
    pub fn resolve_tag_path(&self, tags: &[u32]) -> SchemaResult<PropertyHandle> {
        tags.iter().try_fold(PropertyHandle::ROOT, |parent, &tag| {
            self.handle_for_tag(parent, tag)
        })
    }

    // ── Tree navigation ──────────────────────────────────────────

    /// Direct children of `handle`, ascending by handle.
    pub fn children(&self, handle: PropertyHandle) -> SchemaResult<Vec<PropertyHandle>> {
        self.check(handle)?;
        Ok(self
            .table
            .iter()
            .filter(|(_, info)| info.parent == handle)
            .map(|(child, _)| child)
            .collect())
    }

    /// Whether `handle` has no children. Leaves carry scalar or opaque values.
    pub fn is_leaf(&self, handle: PropertyHandle) -> SchemaResult<bool> {
        self.check(handle)?;
        Ok(!self.table.iter().any(|(_, info)| info.parent == handle))
    }

    /// Whether `ancestor` strictly encloses `descendant`.
    pub fn is_ancestor(
        &self,
        ancestor: PropertyHandle,
        descendant: PropertyHandle,
    ) -> SchemaResult<bool> {
        self.check(ancestor)?;
        let mut current = descendant;
        for _ in 0..=self.table.len() {
            if current.is_root() {
                return Ok(false);
            }
            current = self.parent(current)?;
            if current == ancestor {
                return Ok(true);
            }
        }
        Err(SchemaError::SchemaCorrupt {
            profile_id: self.profile_id,
            handle: descendant,
            reason: "parent chain does not reach the root".into(),
        })
    }

    /// Distance from the root; the root is depth 0.
    pub fn depth(&self, handle: PropertyHandle) -> SchemaResult<usize> {
        self.tag_path(handle).map(|tags| tags.len())
    }

    // ── Names ────────────────────────────────────────────────────

    /// The property's name, if the schema was built with names.
    pub fn property_name(&self, handle: PropertyHandle) -> SchemaResult<Option<&str>> {
        self.check(handle)?;
        Ok(handle
            .property_index()
            .and_then(|i| self.property_names.get(i))
            .and_then(|name| name.as_deref()))
    }

    /// Resolves a dotted name path such as `"metadata.serial"`.
    pub fn handle_for_name_path(&self, path: &str) -> SchemaResult<PropertyHandle> {
        let mut current = PropertyHandle::ROOT;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = self
                .table
                .iter()
                .find(|(child, info)| {
                    info.parent == current
                        && child
                            .property_index()
                            .and_then(|i| self.property_names.get(i))
                            .and_then(|n| n.as_deref())
                            == Some(segment)
                })
                .map(|(child, _)| child)
                .ok_or_else(|| SchemaError::NameNotFound {
                    profile_id: self.profile_id,
                    path: path.to_string(),
                })?;
        }
        Ok(current)
    }

    // ── Attributes ───────────────────────────────────────────────

    /// Whether `handle` carries `attribute`. Absent bitmaps mean no property
    /// has it; handles outside the bitmap are reported and read as unset.
    pub fn has_attribute(&self, handle: PropertyHandle, attribute: PropertyAttribute) -> bool {
        let Some(bits) = self.attributes.get(&attribute) else {
            return false;
        };
        if handle.is_root() {
            return false;
        }
        match bits.get(handle) {
            Some(set) => set,
            None => {
                warn!(
                    profile = %self.profile_id,
                    handle = %handle,
                    attribute = attribute.name(),
                    "attribute query outside the schema bitmap"
                );
                false
            }
        }
    }

    pub fn is_optional(&self, handle: PropertyHandle) -> bool {
        self.has_attribute(handle, PropertyAttribute::Optional)
    }

    pub fn is_nullable(&self, handle: PropertyHandle) -> bool {
        self.has_attribute(handle, PropertyAttribute::Nullable)
    }

    pub fn is_ephemeral(&self, handle: PropertyHandle) -> bool {
        self.has_attribute(handle, PropertyAttribute::Ephemeral)
    }

    pub fn is_deprecated(&self, handle: PropertyHandle) -> bool {
        self.has_attribute(handle, PropertyAttribute::Deprecated)
    }

    pub fn is_denormalized(&self, handle: PropertyHandle) -> bool {
        self.has_attribute(handle, PropertyAttribute::Denormalized)
    }

    /// The raw bitmap for `attribute`, if the schema has one.
    pub fn attribute_bits(&self, attribute: PropertyAttribute) -> Option<&HandleBitfield> {
        self.attributes.get(&attribute)
    }

    // ── Versioning ───────────────────────────────────────────────

    pub fn version_range(&self) -> VersionRange {
        self.versions
    }

    /// The overlap between `requested` and what this schema supports.
    pub fn compatible_range(&self, requested: VersionRange) -> SchemaResult<VersionRange> {
        self.versions
            .intersect(&requested)
            .ok_or(SchemaError::UnsupportedVersion {
                profile_id: self.profile_id,
                version: requested.max(),
                supported: self.versions,
            })
    }

    /// The property table used by messages of `version`.
    ///
    /// `None` means the current version. A version without its own table
    /// uses the nearest newer one, falling back to the current table.
    pub fn table_for(&self, version: Option<SchemaVersion>) -> SchemaResult<&PropertyTable> {
        let Some(version) = version else {
            return Ok(&self.table);
        };
        if !self.versions.contains(version) {
            return Err(SchemaError::UnsupportedVersion {
                profile_id: self.profile_id,
                version,
                supported: self.versions,
            });
        }
        let table = self
            .historical
            .range(version..)
            .next()
            .map(|(v, table)| {
                debug!(profile = %self.profile_id, requested = version, table = v, "using historical property table");
                table
            })
            .unwrap_or(&self.table);
        Ok(table)
    }

    /// [`handle_for_tag`](Self::handle_for_tag) against the table for
    /// `version`.
    pub fn handle_for_tag_at(
        &self,
        version: Option<SchemaVersion>,
        parent: PropertyHandle,
        tag: u32,
    ) -> SchemaResult<PropertyHandle> {
        let table = self.table_for(version)?;
        Self::lookup_tag(table, self.profile_id, parent, tag)
    }

    /// [`resolve_tag_path`](Self::resolve_tag_path) against the table for
    /// `version`.
    pub fn resolve_tag_path_at(
        &self,
        version: Option<SchemaVersion>,
        tags: &[u32],
    ) -> SchemaResult<PropertyHandle> {
        let table = self.table_for(version)?;
        tags.iter().try_fold(PropertyHandle::ROOT, |parent, &tag| {
            Self::lookup_tag(table, self.profile_id, parent, tag)
        })
    }

    // ── Internal ─────────────────────────────────────────────────

    fn lookup_tag(
        table: &PropertyTable,
        profile_id: ProfileId,
        parent: PropertyHandle,
        tag: u32,
    ) -> SchemaResult<PropertyHandle> {
        table
            .handle_for(parent, tag)
            .ok_or(SchemaError::TagNotFound {
                profile_id,
                parent,
                tag,
            })
    }

    fn check(&self, handle: PropertyHandle) -> SchemaResult<()> {
        if self.table.contains(handle) {
            Ok(())
        } else {
            Err(self.not_found(handle))
        }
    }

    fn not_found(&self, handle: PropertyHandle) -> SchemaError {
        SchemaError::HandleNotFound {
            profile_id: self.profile_id,
            handle,
        }
    }
}
