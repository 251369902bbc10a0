//! JSON views of trait data.
//!
//! Objects map to structures. Keys are property names where the schema has
//! them, or decimal context tags. Byte strings are written `{"hex": "0a0b"}`
//! in both directions.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Number, Value};
use tdm_schema::TraitSchemaEngine;
use tdm_tlv::{Tag, TlvValue};
use tdm_types::PropertyHandle;

/// Converts `json` into the value for `handle`.
pub fn tlv_from_json(schema: &TraitSchemaEngine, handle: PropertyHandle, json: &Value) -> Result<TlvValue> {
    let Value::Object(object) = json else {
        return plain_from_json(json);
    };
    let children = schema.children(handle)?;
    if children.is_empty() {
        return plain_from_json(json);
    }

    let mut members = Vec::with_capacity(object.len());
    for (key, value) in object {
        let child = match key.parse::<u32>() {
            Ok(tag) => schema.handle_for_tag(handle, tag)?,
            Err(_) => children
                .iter()
                .copied()
                .find(|c| matches!(schema.property_name(*c), Ok(Some(name)) if name == key))
                .ok_or_else(|| anyhow!("{} has no property {key:?} under {handle}", schema.name()))?,
        };
        let tag = schema
            .tag_for_handle(child)?
            .ok_or_else(|| anyhow!("property {child} has no tag"))?;
        members.push((Tag::for_property(tag)?, tlv_from_json(schema, child, value)?));
    }
    Ok(TlvValue::Structure(members))
}

/// Converts JSON without a schema. Object keys must be context tags.
pub fn plain_from_json(json: &Value) -> Result<TlvValue> {
    Ok(match json {
        Value::Null => TlvValue::Null,
        Value::Bool(b) => TlvValue::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                TlvValue::Unsigned(u)
            } else if let Some(i) = n.as_i64() {
                TlvValue::Signed(i)
            } else {
                TlvValue::Float(n.as_f64().context("number out of range")?)
            }
        }
        Value::String(s) => TlvValue::String(s.clone()),
        Value::Array(items) => TlvValue::Array(items.iter().map(plain_from_json).collect::<Result<_>>()?),
        Value::Object(object) => {
            if let Some(bytes) = hex_bytes(object) {
                return Ok(TlvValue::Bytes(bytes?));
            }
            let mut members = Vec::with_capacity(object.len());
            for (key, value) in object {
                let Ok(tag) = key.parse::<u8>() else {
                    bail!("member key {key:?} is not a context tag");
                };
                members.push((Tag::Context(tag), plain_from_json(value)?));
            }
            TlvValue::Structure(members)
        }
    })
}

/// Renders the value of `handle` as JSON.
pub fn tlv_to_json(schema: &TraitSchemaEngine, handle: PropertyHandle, value: &TlvValue) -> Value {
    match value {
        TlvValue::Structure(members) | TlvValue::Path(members) => {
            let mut object = Map::new();
            for (tag, member) in members {
                let child = tag
                    .context_number()
                    .and_then(|n| schema.handle_for_tag(handle, u32::from(n)).ok());
                let key = child
                    .and_then(|c| schema.property_name(c).ok().flatten().map(str::to_string))
                    .unwrap_or_else(|| tag_key(tag));
                let rendered = match child {
                    Some(c) => tlv_to_json(schema, c, member),
                    None => plain_to_json(member),
                };
                object.insert(key, rendered);
            }
            Value::Object(object)
        }
        other => plain_to_json(other),
    }
}

/// Renders a value as JSON without a schema.
pub fn plain_to_json(value: &TlvValue) -> Value {
    match value {
        TlvValue::Signed(i) => Value::from(*i),
        TlvValue::Unsigned(u) => Value::from(*u),
        TlvValue::Bool(b) => Value::Bool(*b),
        TlvValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        TlvValue::String(s) => Value::String(s.clone()),
        TlvValue::Bytes(b) => {
            let mut object = Map::new();
            object.insert(HEX_KEY.to_string(), Value::String(hex::encode(b)));
            Value::Object(object)
        }
        TlvValue::Null => Value::Null,
        TlvValue::Array(items) => Value::Array(items.iter().map(plain_to_json).collect()),
        TlvValue::Structure(members) | TlvValue::Path(members) => Value::Object(
            members
                .iter()
                .map(|(tag, member)| (tag_key(tag), plain_to_json(member)))
                .collect(),
        ),
    }
}

const HEX_KEY: &str = "hex";

/// Decodes `{"hex": ".."}`. Any other object yields `None`.
fn hex_bytes(object: &Map<String, Value>) -> Option<Result<Vec<u8>>> {
    if object.len() != 1 {
        return None;
    }
    let Value::String(digits) = object.get(HEX_KEY)? else {
        return None;
    };
    Some(hex::decode(digits).with_context(|| format!("{digits:?} is not hex")))
}

fn tag_key(tag: &Tag) -> String {
    match tag.context_number() {
        Some(n) => n.to_string(),
        None => tag.to_string(),
    }
}
