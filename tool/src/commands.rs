//! Subcommand implementations. Each returns the text to print.

use crate::json::{tlv_from_json, tlv_to_json};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;
use tdm_schema::{MemoryTraitStore, PropertyAttribute, TraitDataSource, TraitSchemaDirectory, TraitSchemaEngine};
use tdm_tlv::{pretty_print, Tag};
use tdm_types::{InstanceId, ProfileId, PropertyHandle, TraitPath};
use tdm_update::{
    DataElement, DataPath, LoopbackTransport, Message, MessageType, SingleResourceCatalog, TraitInstanceInfo,
    UpdateClient, UpdateClientConfig, UpdateRequest, UpdateServer,
};
use tracing::{debug, info};

/// Finds a trait by name or profile id (`0x00001401`, `5121`, `0:1401`).
pub fn find_trait(directory: &TraitSchemaDirectory, name_or_id: &str) -> Result<Arc<TraitSchemaEngine>> {
    if let Some(schema) = directory.find_by_name(name_or_id) {
        return Ok(schema.clone());
    }
    let profile_id: ProfileId = name_or_id
        .parse()
        .with_context(|| format!("no trait named {name_or_id:?}"))?;
    Ok(directory.require(profile_id)?)
}

/// Resolves a dotted property name path; `.` or empty means the root.
pub fn find_property(schema: &TraitSchemaEngine, path: &str) -> Result<PropertyHandle> {
    let path = path.trim_matches('.');
    Ok(schema.handle_for_name_path(path)?)
}

pub fn list(directory: &TraitSchemaDirectory) -> String {
    let mut out = String::new();
    for schema in directory.iter() {
        let _ = writeln!(
            out,
            "{}  {:<34} {:>2} properties  {}",
            schema.profile_id(),
            schema.name(),
            schema.property_count(),
            schema.version_range()
        );
    }
    out
}

pub fn show(directory: &TraitSchemaDirectory, name_or_id: &str) -> Result<String> {
    let schema = find_trait(directory, name_or_id)?;
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", schema.profile_id(), schema.name());
    let _ = writeln!(out, "versions {}  depth {}", schema.version_range(), schema.tree_depth());
    if let Some(parent) = schema.parent_schema() {
        let _ = writeln!(out, "extends {} {}", parent.profile_id(), parent.name());
    }
    for handle in schema.handles().skip(1) {
        let depth = schema.depth(handle)?;
        let tag = schema.tag_for_handle(handle)?.unwrap_or_default();
        let name = schema.property_name(handle)?.unwrap_or("?");
        let attributes: Vec<_> = PropertyAttribute::ALL
            .iter()
            .filter(|a| schema.has_attribute(handle, **a))
            .map(|a| a.name())
            .collect();
        let _ = write!(out, "{}{:>3} [{tag}] {name}", "  ".repeat(depth), handle.as_u32());
        if !attributes.is_empty() {
            let _ = write!(out, " ({})", attributes.join(", "));
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn resolve(directory: &TraitSchemaDirectory, name_or_id: &str, property: &str) -> Result<String> {
    let schema = find_trait(directory, name_or_id)?;
    let handle = find_property(&schema, property)?;
    let tags = schema.tag_path(handle)?;
    let tags: Vec<_> = tags.iter().map(u32::to_string).collect();
    Ok(format!(
        "{} handle {handle} tags /{} parent {}\n",
        schema.name(),
        tags.join("/"),
        schema.parent(handle)?
    ))
}

/// Builds an encoded update request for one property.
pub fn encode_update(
    directory: &TraitSchemaDirectory,
    name_or_id: &str,
    property: &str,
    value: &str,
    instance: u64,
) -> Result<Vec<u8>> {
    let schema = find_trait(directory, name_or_id)?;
    let handle = find_property(&schema, property)?;
    let json: Value = serde_json::from_str(value).context("value is not JSON")?;
    let data = tlv_from_json(&schema, handle, &json)?;
    tdm_schema::data::validate_value(&schema, handle, &data)?;

    let message = Message::UpdateRequest(UpdateRequest {
        elements: vec![DataElement {
            path: DataPath {
                schema_version: Some(schema.version_range().max()),
                tags: schema.tag_path(handle)?,
                ..DataPath::root(schema.profile_id(), InstanceId::new(instance))
            },
            data_version: None,
            data,
        }],
        argument: None,
    });
    let bytes = message.encode()?;
    debug!(profile = %schema.profile_id(), handle = %handle, bytes = bytes.len(), "encoded update");
    Ok(bytes)
}

/// Pretty-prints hex input: a protocol message when it starts with a known
/// message type, otherwise a bare TLV element.
pub fn decode(input: &str) -> Result<String> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(&cleaned);
    let bytes = hex::decode(cleaned).context("input is not hex")?;
    if bytes.is_empty() {
        bail!("nothing to decode");
    }
    if let Ok(message_type) = MessageType::try_from(bytes[0])
        && let Ok(body) = pretty_print(&bytes[1..])
    {
        return Ok(format!("{message_type:?}\n{body}"));
    }
    Ok(pretty_print(&bytes)?)
}

pub fn check_config(path: &Path) -> Result<String> {
    let config = UpdateClientConfig::load(path)?;
    Ok(format!(
        "ok: node {:#x} security {} response timeout {} ms update timeout {} ms concurrency {:?}\n",
        config.binding.node_id,
        config.binding.security.name(),
        config.binding.response_timeout_ms,
        config.update_timeout_ms,
        config.concurrency,
    ))
}

/// Runs one update and reads the property back from an in-process
/// publisher.
pub async fn simulate(
    directory: Arc<TraitSchemaDirectory>,
    name_or_id: &str,
    property: &str,
    value: &str,
    config: UpdateClientConfig,
) -> Result<String> {
    let schema = find_trait(&directory, name_or_id)?;
    let handle = find_property(&schema, property)?;
    let json: Value = serde_json::from_str(value).context("value is not JSON")?;
    let data = tlv_from_json(&schema, handle, &json)?;

    let store = Arc::new(std::sync::Mutex::new(MemoryTraitStore::new(schema.clone())));
    let mut catalog = SingleResourceCatalog::new();
    let trait_handle = catalog.add_store(TraitInstanceInfo::local(schema.profile_id()), store.clone())?;
    let catalog = Arc::new(catalog);

    let server = Arc::new(UpdateServer::new(directory.clone(), catalog.clone()));
    let client = UpdateClient::new(directory, catalog, Arc::new(LoopbackTransport::new(server)), config)?;

    let path = TraitPath::new(trait_handle, handle);
    let report = client.update(path, data).await?;
    info!(path = %path, "simulated update acknowledged");

    let mut out = format!("update {}: {}\n", schema.name(), report.code);
    match client.view(path).await {
        Ok(value) => {
            let rendered = serde_json::to_string_pretty(&tlv_to_json(&schema, handle, &value))?;
            let _ = writeln!(out, "view {property}: {rendered}");
        }
        Err(e) => {
            let _ = writeln!(out, "view {property}: {e}");
        }
    }
    let version = store
        .lock()
        .map_err(|_| anyhow!("publisher store poisoned"))?
        .data_version();
    let _ = writeln!(out, "publisher data version {version}");
    Ok(out)
}

/// Encodes the element `value` would be sent as, for `--raw` output.
pub fn encode_value(schema: &TraitSchemaEngine, handle: PropertyHandle, value: &str) -> Result<Vec<u8>> {
    let json: Value = serde_json::from_str(value).context("value is not JSON")?;
    let data = tlv_from_json(schema, handle, &json)?;
    let tag = match schema.tag_for_handle(handle)? {
        Some(tag) => Tag::for_property(tag)?,
        None => Tag::Anonymous,
    };
    Ok(data.encode(tag)?)
}
