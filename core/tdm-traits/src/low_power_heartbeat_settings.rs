//! `weave.trait.heartbeat.LowPowerHeartbeatSettingsTrait`
//!
//! A sleepy device's heartbeat schedule. `destination` is null when the
//! heartbeat is broadcast.

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x1C02);
pub const NAME: &str = "LowPowerHeartbeatSettingsTrait";

/// `destination`: uint64 node id, nullable
pub const DESTINATION: PropertyHandle = PropertyHandle::new(2);
/// `window`: duration
pub const WINDOW: PropertyHandle = PropertyHandle::new(3);
/// `offset`: duration
pub const OFFSET: PropertyHandle = PropertyHandle::new(4);
/// `interval`: duration
pub const INTERVAL: PropertyHandle = PropertyHandle::new(5);
pub const LAST_HANDLE: PropertyHandle = INTERVAL;

pub const PROPERTY_MAP: &[PropertyInfo] = &[
    PropertyInfo::new(1, 1),
    PropertyInfo::new(1, 2),
    PropertyInfo::new(1, 3),
    PropertyInfo::new(1, 4),
];

pub const PROPERTY_NAMES: &[&str] = &["destination", "window", "offset", "interval"];

pub const IS_NULLABLE: &[u8] = &[0x01];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .nullable_bits(IS_NULLABLE)
        .build()
}
