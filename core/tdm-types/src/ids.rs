//! Identifier types used throughout the stack.
//!
//! All identifiers are thin newtypes over the integer carried on the wire.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 32-bit wire identifier of a trait.
///
/// The upper 16 bits carry the vendor (or category) id and the lower 16 bits
/// the vendor-specific trait number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(u32);

impl ProfileId {
    /// Composes a profile id from its vendor and trait fields.
    #[must_use]
    pub const fn new(vendor_id: u16, trait_id: u16) -> Self {
        Self(((vendor_id as u32) << 16) | trait_id as u32)
    }

    /// Wraps a raw 32-bit profile id.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw 32-bit value.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Vendor (upper 16 bits).
    #[must_use]
    pub const fn vendor_id(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Vendor-specific trait number (lower 16 bits).
    #[must_use]
    pub const fn trait_id(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl FromStr for ProfileId {
    type Err = Error;

    /// Accepts `0x`-prefixed hex, plain decimal, or `vendor:trait` in hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || Error::InvalidProfileId(s.to_string());

        if let Some((vendor, trait_id)) = s.split_once(':') {
            let vendor = parse_u16_hex(vendor).ok_or_else(invalid)?;
            let trait_id = parse_u16_hex(trait_id).ok_or_else(invalid)?;
            return Ok(Self::new(vendor, trait_id));
        }

        let raw = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| invalid())?,
            None => s.parse::<u32>().map_err(|_| invalid())?,
        };
        Ok(Self(raw))
    }
}

fn parse_u16_hex(s: &str) -> Option<u16> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    u16::from_str_radix(s, 16).ok()
}

/// Schema-local identifier of a node in a trait's property tree.
///
/// Handle 0 is the null handle, handle 1 is always the trait root and
/// properties are numbered densely from 2 in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyHandle(u32);

impl PropertyHandle {
    /// The reserved invalid handle.
    pub const NULL: Self = Self(0);

    /// The root of every trait.
    pub const ROOT: Self = Self(1);

    /// The first handle that can name a property.
    pub const FIRST_PROPERTY: Self = Self(2);

    /// Wraps a raw handle value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Whether this is the root handle.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.0 == Self::ROOT.0
    }

    /// Whether this is the null handle.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == Self::NULL.0
    }

    /// Index into per-property tables (property table, bitfields).
    ///
    /// Returns `None` for the null and root handles, which have no entry.
    #[must_use]
    pub const fn property_index(&self) -> Option<usize> {
        if self.0 >= Self::FIRST_PROPERTY.0 {
            Some((self.0 - Self::FIRST_PROPERTY.0) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`property_index`](Self::property_index).
    #[must_use]
    pub const fn from_property_index(index: usize) -> Self {
        Self(index as u32 + Self::FIRST_PROPERTY.0)
    }
}

impl fmt::Display for PropertyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PropertyHandle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| Error::InvalidPropertyHandle(s.to_string()))
    }
}

/// Index of a trait instance in an application catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitDataHandle(u16);

impl TraitDataHandle {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TraitDataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the resource (usually a node) that hosts a trait instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    /// The local node.
    pub const SELF_NODE: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_self(&self) -> bool {
        self.0 == Self::SELF_NODE.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self() {
            write!(f, "self")
        } else {
            write!(f, "{:016X}", self.0)
        }
    }
}

/// Distinguishes multiple instances of the same trait on one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
