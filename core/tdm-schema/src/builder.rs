//! Assembles and validates trait schemas.

use crate::bitfield::HandleBitfield;
use crate::engine::{PropertyAttribute, TraitSchemaEngine};
use crate::error::{SchemaError, SchemaResult};
use crate::property::{PropertyInfo, PropertyTable};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tdm_types::{ProfileId, PropertyHandle, SchemaVersion, VersionRange};
use tracing::debug;

/// Collects a trait's generated tables and validates them on [`build`].
///
/// ```ignore
/// let schema = SchemaBuilder::new(ProfileId::new(0, 0x1401), "ConfigurationDoneTrait")
///     .properties(&[PropertyInfo::new(1, 2), PropertyInfo::new(1, 3)])
///     .optional_bits(&[0x02])
///     .build()?;
/// ```
///
/// [`build`]: SchemaBuilder::build
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    profile_id: ProfileId,
    name: String,
    properties: Vec<PropertyInfo>,
    names: Vec<Option<String>>,
    attributes: BTreeMap<PropertyAttribute, HandleBitfield>,
    versions: (SchemaVersion, SchemaVersion),
    parent_schema: Option<Arc<TraitSchemaEngine>>,
    historical: BTreeMap<SchemaVersion, Vec<PropertyInfo>>,
}

impl SchemaBuilder {
    pub fn new(profile_id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            profile_id,
            name: name.into(),
            properties: Vec::new(),
            names: Vec::new(),
            attributes: BTreeMap::new(),
            versions: (1, 1),
            parent_schema: None,
            historical: BTreeMap::new(),
        }
    }

    // ── Properties ───────────────────────────────────────────────

    /// Appends one unnamed property; its handle is the next free one.
    pub fn property(mut self, parent: PropertyHandle, tag: u32) -> Self {
        self.properties.push(PropertyInfo { parent, tag });
        self.names.push(None);
        self
    }

    /// Appends one named property.
    pub fn named_property(mut self, name: impl Into<String>, parent: PropertyHandle, tag: u32) -> Self {
        self.properties.push(PropertyInfo { parent, tag });
        self.names.push(Some(name.into()));
        self
    }

    /// Appends a generated table in handle order.
    pub fn properties(mut self, table: &[PropertyInfo]) -> Self {
        self.properties.extend_from_slice(table);
        self.names.resize(self.properties.len(), None);
        self
    }

    /// Names properties in handle order, starting at the first property.
    pub fn property_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| Some((*n).to_string())).collect();
        self
    }

    // ── Attributes ───────────────────────────────────────────────

    /// Sets the raw bitmap for `attribute`.
    pub fn attribute_bits(mut self, attribute: PropertyAttribute, bits: &[u8]) -> Self {
        self.attributes
            .insert(attribute, HandleBitfield::from_bytes(bits));
        self
    }

    /// Marks individual handles with `attribute`.
    pub fn mark(mut self, attribute: PropertyAttribute, handles: &[PropertyHandle]) -> Self {
        let bits = self
            .attributes
            .entry(attribute)
            .or_insert_with(|| HandleBitfield::from_bytes(&[]));
        for handle in handles {
            bits.set(*handle);
        }
        self
    }

    pub fn optional_bits(self, bits: &[u8]) -> Self {
        self.attribute_bits(PropertyAttribute::Optional, bits)
    }

    pub fn nullable_bits(self, bits: &[u8]) -> Self {
        self.attribute_bits(PropertyAttribute::Nullable, bits)
    }

    pub fn ephemeral_bits(self, bits: &[u8]) -> Self {
        self.attribute_bits(PropertyAttribute::Ephemeral, bits)
    }

    pub fn deprecated_bits(self, bits: &[u8]) -> Self {
        self.attribute_bits(PropertyAttribute::Deprecated, bits)
    }

    pub fn denormalized_bits(self, bits: &[u8]) -> Self {
        self.attribute_bits(PropertyAttribute::Denormalized, bits)
    }

    // ── Versions & extension ─────────────────────────────────────

    /// Supported schema versions, inclusive. Checked in [`build`](Self::build).
    pub fn versions(mut self, min: SchemaVersion, max: SchemaVersion) -> Self {
        self.versions = (min, max);
        self
    }

    /// Declares the trait this one extends.
    pub fn extends(mut self, parent: Arc<TraitSchemaEngine>) -> Self {
        self.parent_schema = Some(parent);
        self
    }

    /// Records the property table used by messages of `version`.
    pub fn historical_table(mut self, version: SchemaVersion, table: &[PropertyInfo]) -> Self {
        self.historical.insert(version, table.to_vec());
        self
    }

    // ── Build ────────────────────────────────────────────────────

    /// Validates the collected tables and freezes them.
    pub fn build(self) -> SchemaResult<TraitSchemaEngine> {
        let profile_id = self.profile_id;
        let invalid = |reason: String| SchemaError::InvalidSchema { profile_id, reason };

        let versions = VersionRange::new(self.versions.0, self.versions.1)
            .map_err(|e| invalid(e.to_string()))?;

        let tree_depth = validate_table(&self.properties).map_err(&invalid)?;

        if self.names.len() > self.properties.len() {
            return Err(invalid(format!(
                "{} names for {} properties",
                self.names.len(),
                self.properties.len()
            )));
        }
        let mut names = self.names;
        names.resize(self.properties.len(), None);
        let mut seen = HashSet::new();
        for (index, name) in names.iter().enumerate() {
            if let Some(name) = name {
                let parent = self.properties[index].parent;
                if !seen.insert((parent, name.as_str())) {
                    return Err(invalid(format!("duplicate name {name:?} under handle {parent}")));
                }
            }
        }

        let mut attributes = self.attributes;
        for (attribute, bits) in attributes.iter_mut() {
            if let Some(extra) = bits.handles().find(|h| h.as_u32() as usize > self.properties.len() + 1) {
                return Err(invalid(format!(
                    "{} bit set for handle {extra} beyond the property table",
                    attribute.name()
                )));
            }
            bits.pad_to(self.properties.len());
        }

        let mut historical = BTreeMap::new();
        for (version, entries) in self.historical {
            if !versions.contains(version) {
                return Err(invalid(format!(
                    "historical table for v{version} outside supported {versions}"
                )));
            }
            if entries.len() > self.properties.len() {
                return Err(invalid(format!(
                    "historical table for v{version} has more properties than the current table"
                )));
            }
            validate_table(&entries)
                .map_err(|reason| invalid(format!("historical table for v{version}: {reason}")))?;
            if let Some(index) = entries
                .iter()
                .zip(&self.properties)
                .position(|(old, current)| old.parent != current.parent)
            {
                return Err(invalid(format!(
                    "historical table for v{version} moves handle {}",
                    PropertyHandle::from_property_index(index)
                )));
            }
            historical.insert(version, PropertyTable::new(entries));
        }

        debug!(
            profile = %profile_id,
            name = %self.name,
            properties = self.properties.len(),
            depth = tree_depth,
            "built trait schema"
        );

        Ok(TraitSchemaEngine {
            profile_id,
            name: self.name,
            table: PropertyTable::new(self.properties),
            property_names: names,
            versions,
            tree_depth,
            attributes,
            parent_schema: self.parent_schema,
            historical,
        })
    }
}

/// Checks parents and sibling tags, returning the depth of the tree.
fn validate_table(entries: &[PropertyInfo]) -> Result<usize, String> {
    let last = entries.len() as u32 + 1;
    let mut sibling_tags = HashSet::new();

    for (index, info) in entries.iter().enumerate() {
        let handle = PropertyHandle::from_property_index(index);
        let parent = info.parent.as_u32();
        if info.parent.is_null() || parent > last {
            return Err(format!("handle {handle} has invalid parent {}", info.parent));
        }
        if info.parent == handle {
            return Err(format!("handle {handle} is its own parent"));
        }
        if info.tag > u32::from(u8::MAX) {
            return Err(format!("handle {handle} has tag {} beyond the context tag range", info.tag));
        }
        if !sibling_tags.insert((info.parent, info.tag)) {
            return Err(format!(
                "duplicate tag {} under handle {}",
                info.tag, info.parent
            ));
        }
    }

    // Every chain must reach the root within `len` steps.
    let mut depth = 0;
    for index in 0..entries.len() {
        let mut current = PropertyHandle::from_property_index(index);
        let mut steps = 0;
        while !current.is_root() {
            steps += 1;
            if steps > entries.len() {
                return Err(format!(
                    "parent cycle through handle {}",
                    PropertyHandle::from_property_index(index)
                ));
            }
            current = entries[current.property_index().unwrap_or_default()].parent;
        }
        depth = depth.max(steps);
    }
    Ok(depth)
}
