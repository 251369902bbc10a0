//! `weave.trait.pairing.ConfigurationDoneTrait`

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x1401);
pub const NAME: &str = "ConfigurationDoneTrait";

/// `app_configuration_complete`: bool
pub const APP_CONFIGURATION_COMPLETE: PropertyHandle = PropertyHandle::new(2);
/// `device_ready`: bool
pub const DEVICE_READY: PropertyHandle = PropertyHandle::new(3);
pub const LAST_HANDLE: PropertyHandle = DEVICE_READY;

pub const PROPERTY_MAP: &[PropertyInfo] = &[
    PropertyInfo::new(1, 2), // app_configuration_complete
    PropertyInfo::new(1, 3), // device_ready
];

pub const PROPERTY_NAMES: &[&str] = &["app_configuration_complete", "device_ready"];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .build()
}
