//! `weave.trait.locale.LocaleCapabilitiesTrait`

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x0017);
pub const NAME: &str = "LocaleCapabilitiesTrait";

/// `available_locales`: array of string
pub const AVAILABLE_LOCALES: PropertyHandle = PropertyHandle::new(2);
pub const LAST_HANDLE: PropertyHandle = AVAILABLE_LOCALES;

pub const PROPERTY_MAP: &[PropertyInfo] = &[PropertyInfo::new(1, 1)];

pub const PROPERTY_NAMES: &[&str] = &["available_locales"];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .build()
}
