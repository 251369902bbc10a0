//! `weave.trait.locale.LocaleSettingsTrait`

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x0016);
pub const NAME: &str = "LocaleSettingsTrait";

/// `active_locale`: string such as `"en_GB"`
pub const ACTIVE_LOCALE: PropertyHandle = PropertyHandle::new(2);
pub const LAST_HANDLE: PropertyHandle = ACTIVE_LOCALE;

pub const PROPERTY_MAP: &[PropertyInfo] = &[PropertyInfo::new(1, 1)];

pub const PROPERTY_NAMES: &[&str] = &["active_locale"];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .build()
}
