//! `weave.trait.network.NetworkInterfacesTrait`

use tdm_schema::{PropertyInfo, SchemaBuilder, SchemaResult, TraitSchemaEngine};
use tdm_types::{ProfileId, PropertyHandle};

pub const PROFILE_ID: ProfileId = ProfileId::new(0x0000, 0x1D02);
pub const NAME: &str = "NetworkInterfacesTrait";

/// `is_network_interface_id_list_dynamic`: bool
pub const IS_NETWORK_INTERFACE_ID_LIST_DYNAMIC: PropertyHandle = PropertyHandle::new(2);
/// `network_interface_id_list`: array of uint32
pub const NETWORK_INTERFACE_ID_LIST: PropertyHandle = PropertyHandle::new(3);
/// `primary_network_interface_id_ipv4`: uint32, optional
pub const PRIMARY_NETWORK_INTERFACE_ID_IPV4: PropertyHandle = PropertyHandle::new(4);
/// `primary_network_interface_id_ipv6`: uint32, optional
pub const PRIMARY_NETWORK_INTERFACE_ID_IPV6: PropertyHandle = PropertyHandle::new(5);
pub const LAST_HANDLE: PropertyHandle = PRIMARY_NETWORK_INTERFACE_ID_IPV6;

pub const PROPERTY_MAP: &[PropertyInfo] = &[
    PropertyInfo::new(1, 1),
    PropertyInfo::new(1, 2),
    PropertyInfo::new(1, 3),
    PropertyInfo::new(1, 4),
];

pub const PROPERTY_NAMES: &[&str] = &[
    "is_network_interface_id_list_dynamic",
    "network_interface_id_list",
    "primary_network_interface_id_ipv4",
    "primary_network_interface_id_ipv6",
];

pub const IS_OPTIONAL: &[u8] = &[0x0C];

pub fn schema() -> SchemaResult<TraitSchemaEngine> {
    SchemaBuilder::new(PROFILE_ID, NAME)
        .properties(PROPERTY_MAP)
        .property_names(PROPERTY_NAMES)
        .optional_bits(IS_OPTIONAL)
        .build()
}
