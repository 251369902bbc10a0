//! Schema-driven encoding of trait data.
//!
//! The schema decides the shape; a [`TraitDataSource`] supplies leaf values
//! when encoding and a [`TraitDataSink`] receives them when decoding.
//! Containers are written as TLV structures whose members carry the child
//! properties' context tags.

use crate::engine::TraitSchemaEngine;
use crate::error::{SchemaError, SchemaResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tdm_tlv::{ContainerType, Tag, TlvValue, TlvWriter};
use tdm_types::{PropertyHandle, SchemaVersion};
use tracing::{debug, trace};

/// What a data source holds for one property.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafData {
    Value(TlvValue),
    /// Explicitly null. Only valid for nullable properties.
    Null,
    /// No value at all. Only valid for optional properties.
    Absent,
}

impl LeafData {
    pub fn is_present(&self) -> bool {
        !matches!(self, LeafData::Absent)
    }
}

/// Supplies property values while encoding.
pub trait TraitDataSource {
    /// The value of a leaf property.
    fn get_leaf_data(&self, handle: PropertyHandle) -> SchemaResult<LeafData>;

    /// Whether an optional or nullable container is present. Non-leaf
    /// handles only; the default treats every container as present.
    fn container_presence(&self, _handle: PropertyHandle) -> SchemaResult<LeafData> {
        Ok(LeafData::Value(TlvValue::Structure(Vec::new())))
    }

    /// Monotonic version of the instance's data.
    fn data_version(&self) -> u64;
}

/// Receives property values while decoding.
pub trait TraitDataSink {
    /// Stores a leaf value; `None` records an explicit null. A null on a
    /// container clears it.
    fn set_leaf_data(&mut self, handle: PropertyHandle, value: Option<TlvValue>) -> SchemaResult<()>;

    fn set_data_version(&mut self, version: u64);
}

fn is_container(schema: &TraitSchemaEngine, handle: PropertyHandle) -> SchemaResult<bool> {
    Ok(handle.is_root() || !schema.is_leaf(handle)?)
}

fn property_tag(schema: &TraitSchemaEngine, handle: PropertyHandle) -> SchemaResult<Tag> {
    match schema.tag_for_handle(handle)? {
        Some(tag) => Ok(Tag::for_property(tag)?),
        None => Ok(Tag::Anonymous),
    }
}

// ── Encode ───────────────────────────────────────────────────────

/// Writes `handle` (and everything beneath it) under `tag`.
///
/// An absent optional property writes nothing.
pub fn encode_property(
    schema: &TraitSchemaEngine,
    source: &dyn TraitDataSource,
    handle: PropertyHandle,
    writer: &mut TlvWriter,
    tag: Tag,
) -> SchemaResult<()> {
    let profile_id = schema.profile_id();

    let data = if is_container(schema, handle)? {
        if schema.is_optional(handle) || schema.is_nullable(handle) {
            source.container_presence(handle)?
        } else {
            LeafData::Value(TlvValue::Structure(Vec::new()))
        }
    } else {
        source.get_leaf_data(handle)?
    };

    match data {
        LeafData::Absent if schema.is_optional(handle) => {
            trace!(profile = %profile_id, handle = %handle, "optional property absent");
            Ok(())
        }
        LeafData::Absent => Err(SchemaError::MissingProperty { profile_id, handle }),
        LeafData::Null if schema.is_nullable(handle) => Ok(writer.put_null(tag)?),
        LeafData::Null => Err(SchemaError::NotNullable { profile_id, handle }),
        LeafData::Value(value) => {
            if !is_container(schema, handle)? {
                return Ok(writer.put_value(tag, &value)?);
            }
            writer.start_container(tag, ContainerType::Structure)?;
            for child in schema.children(handle)? {
                let child_tag = property_tag(schema, child)?;
                encode_property(schema, source, child, writer, child_tag)?;
            }
            writer.end_container(ContainerType::Structure)?;
            Ok(())
        }
    }
}

/// Encodes a whole trait instance as one anonymous structure.
pub fn encode_trait(schema: &TraitSchemaEngine, source: &dyn TraitDataSource) -> SchemaResult<Vec<u8>> {
    let mut writer = TlvWriter::new();
    encode_property(schema, source, PropertyHandle::ROOT, &mut writer, Tag::Anonymous)?;
    Ok(writer.finish()?)
}

// ── Decode ───────────────────────────────────────────────────────

/// Applies a decoded value for `handle` to `sink`.
///
/// Member tags are resolved with the property table for `version`. Tags the
/// schema does not know are skipped so newer publishers can add properties.
pub fn decode_property(
    schema: &TraitSchemaEngine,
    version: Option<SchemaVersion>,
    sink: &mut dyn TraitDataSink,
    handle: PropertyHandle,
    value: &TlvValue,
) -> SchemaResult<()> {
    let profile_id = schema.profile_id();
    schema.table_for(version)?;

    if value.is_null() {
        if !schema.is_nullable(handle) {
            return Err(SchemaError::NotNullable { profile_id, handle });
        }
        return sink.set_leaf_data(handle, None);
    }

    if !is_container(schema, handle)? {
        return sink.set_leaf_data(handle, Some(value.clone()));
    }

    let TlvValue::Structure(members) = value else {
        return Err(SchemaError::TypeMismatch {
            profile_id,
            handle,
            expected: "structure",
            found: value.type_name(),
        });
    };
    for (tag, member) in members {
        let Some(number) = tag.context_number() else {
            debug!(profile = %profile_id, parent = %handle, tag = %tag, "skipping non-context member");
            continue;
        };
        match schema.handle_for_tag_at(version, handle, u32::from(number)) {
            Ok(child) => decode_property(schema, version, sink, child, member)?,
            Err(SchemaError::TagNotFound { .. }) => {
                debug!(profile = %profile_id, parent = %handle, tag = number, "skipping unknown property");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Decodes a complete encoding produced by [`encode_trait`].
pub fn decode_trait(
    schema: &TraitSchemaEngine,
    version: Option<SchemaVersion>,
    sink: &mut dyn TraitDataSink,
    encoded: &[u8],
) -> SchemaResult<()> {
    let (_, value) = TlvValue::decode(encoded)?;
    decode_property(schema, version, sink, PropertyHandle::ROOT, &value)
}

/// Strict check of a value about to be sent for `handle`: every member tag
/// must resolve and nulls may only appear where the schema allows them.
pub fn validate_value(
    schema: &TraitSchemaEngine,
    handle: PropertyHandle,
    value: &TlvValue,
) -> SchemaResult<()> {
    let profile_id = schema.profile_id();
    if value.is_null() {
        return if schema.is_nullable(handle) {
            Ok(())
        } else {
            Err(SchemaError::NotNullable { profile_id, handle })
        };
    }
    if !is_container(schema, handle)? {
        return Ok(());
    }
    let TlvValue::Structure(members) = value else {
        return Err(SchemaError::TypeMismatch {
            profile_id,
            handle,
            expected: "structure",
            found: value.type_name(),
        });
    };
    for (tag, member) in members {
        let number = tag.context_number().ok_or(SchemaError::TypeMismatch {
            profile_id,
            handle,
            expected: "context-tagged member",
            found: "non-context tag",
        })?;
        let child = schema.handle_for_tag(handle, u32::from(number))?;
        validate_value(schema, child, member)?;
    }
    Ok(())
}

// ── In-memory store ──────────────────────────────────────────────

/// A map-backed trait instance that is both a source and a sink.
#[derive(Debug, Clone)]
pub struct MemoryTraitStore {
    schema: Arc<TraitSchemaEngine>,
    values: BTreeMap<PropertyHandle, TlvValue>,
    version: u64,
}

impl MemoryTraitStore {
    pub fn new(schema: Arc<TraitSchemaEngine>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            version: 0,
        }
    }

    pub fn schema(&self) -> &Arc<TraitSchemaEngine> {
        &self.schema
    }

    /// Sets a leaf value and bumps the data version.
    pub fn set(&mut self, handle: PropertyHandle, value: impl Into<TlvValue>) -> SchemaResult<()> {
        self.set_leaf_data(handle, Some(value.into()))?;
        self.version += 1;
        Ok(())
    }

    /// Stores an explicit null and bumps the data version.
    pub fn set_null(&mut self, handle: PropertyHandle) -> SchemaResult<()> {
        self.set_leaf_data(handle, None)?;
        self.version += 1;
        Ok(())
    }

    pub fn get(&self, handle: PropertyHandle) -> Option<&TlvValue> {
        self.values.get(&handle)
    }

    /// Clears a property and everything beneath it.
    pub fn remove(&mut self, handle: PropertyHandle) {
        self.values
            .retain(|h, _| *h != handle && !matches!(self.schema.is_ancestor(handle, *h), Ok(true)));
    }

    /// Stored values, ascending by handle.
    pub fn values(&self) -> impl Iterator<Item = (PropertyHandle, &TlvValue)> + '_ {
        self.values.iter().map(|(h, v)| (*h, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TraitDataSource for MemoryTraitStore {
    fn get_leaf_data(&self, handle: PropertyHandle) -> SchemaResult<LeafData> {
        Ok(match self.values.get(&handle) {
            Some(TlvValue::Null) => LeafData::Null,
            Some(value) => LeafData::Value(value.clone()),
            None => LeafData::Absent,
        })
    }

    fn container_presence(&self, handle: PropertyHandle) -> SchemaResult<LeafData> {
        if matches!(self.values.get(&handle), Some(TlvValue::Null)) {
            return Ok(LeafData::Null);
        }
        let populated = self
            .values
            .keys()
            .any(|h| matches!(self.schema.is_ancestor(handle, *h), Ok(true)));
        Ok(if populated {
            LeafData::Value(TlvValue::Structure(Vec::new()))
        } else {
            LeafData::Absent
        })
    }

    fn data_version(&self) -> u64 {
        self.version
    }
}

impl TraitDataSink for MemoryTraitStore {
    fn set_leaf_data(&mut self, handle: PropertyHandle, value: Option<TlvValue>) -> SchemaResult<()> {
        if handle.is_root() || !self.schema.table().contains(handle) {
            return Err(SchemaError::HandleNotFound {
                profile_id: self.schema.profile_id(),
                handle,
            });
        }
        match value {
            None => {
                self.remove(handle);
                self.values.insert(handle, TlvValue::Null);
            }
            Some(value) => {
                // A value beneath a null container makes the container present again.
                let schema = &self.schema;
                self.values.retain(|h, v| {
                    !(v.is_null() && matches!(schema.is_ancestor(*h, handle), Ok(true)))
                });
                self.values.insert(handle, value);
            }
        }
        Ok(())
    }

    fn set_data_version(&mut self, version: u64) {
        self.version = version;
    }
}
