//! `weave.trait.network.NetworkInterfaceTrait`

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x1D01);
pub const NAME: &str = "NetworkInterfaceTrait";

/// `is_online`: bool
pub const IS_ONLINE: PropertyHandle = PropertyHandle::new(2);
/// `mac_address`: bytes, optional
pub const MAC_ADDRESS: PropertyHandle = PropertyHandle::new(3);
/// `ip_addresses`: array of bytes
pub const IP_ADDRESSES: PropertyHandle = PropertyHandle::new(4);
pub const LAST_HANDLE: PropertyHandle = IP_ADDRESSES;

pub const PROPERTY_MAP: &[PropertyInfo] = &[
    PropertyInfo::new(1, 1), // is_online
    PropertyInfo::new(1, 2), // mac_address
    PropertyInfo::new(1, 3), // ip_addresses
];

pub const PROPERTY_NAMES: &[&str] = &["is_online", "mac_address", "ip_addresses"];

pub const IS_OPTIONAL: &[u8] = &[0x02];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .optional_bits(IS_OPTIONAL)
        .build()
}
