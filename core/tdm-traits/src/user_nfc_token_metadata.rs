//! `weave.trait.security.UserNFCTokenMetadataTrait`

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x0E15);
pub const NAME: &str = "UserNFCTokenMetadataTrait";

/// `metadata`: struct
pub const METADATA: PropertyHandle = PropertyHandle::new(2);
/// `metadata.serial_number`: string
pub const METADATA_SERIAL_NUMBER: PropertyHandle = PropertyHandle::new(3);
/// `metadata.tag_number`: string
pub const METADATA_TAG_NUMBER: PropertyHandle = PropertyHandle::new(4);
pub const LAST_HANDLE: PropertyHandle = METADATA_TAG_NUMBER;

pub const PROPERTY_MAP: &[PropertyInfo] = &[
    PropertyInfo::new(1, 1), // metadata
    PropertyInfo::new(2, 1), // serial_number
    PropertyInfo::new(2, 2), // tag_number
];

pub const PROPERTY_NAMES: &[&str] = &["metadata", "serial_number", "tag_number"];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .build()
}
