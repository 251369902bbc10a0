//! Built-in trait schemas.
//!
//! Each module carries one trait's generated tables as `const` data: the
//! profile id, a `PROPERTY_MAP` in handle order (entry `i` describes handle
//! `i + 2`), per-property handle constants and any attribute bitmaps. The
//! module's `schema()` runs the tables through
//! [`SchemaBuilder`](tdm_schema::SchemaBuilder) so a bad table fails at
//! startup rather than mid-exchange.

/// Declares a `#[repr(u8)]` trait enum with its wire conversions.
macro_rules! trait_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl TryFrom<u64> for $name {
            type Error = $crate::UnknownEnumValue;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    _ => Err($crate::UnknownEnumValue { name: $label, value }),
                }
            }
        }

        impl From<$name> for tdm_tlv::TlvValue {
            fn from(value: $name) -> Self {
                tdm_tlv::TlvValue::Unsigned(value as u64)
            }
        }
    };
}

pub mod configuration_done;
pub mod locale_capabilities;
pub mod locale_settings;
pub mod low_power_heartbeat_settings;
pub mod network_interface;
pub mod network_interfaces;
pub mod power_source_capabilities;
pub mod user_nfc_token_access;
pub mod user_nfc_token_metadata;

use tdm_schema::{SchemaResult, TraitSchemaDirectory, TraitSchemaEngine};
use thiserror::Error;
use tracing::info;

/// A wire value that does not name a variant of a trait enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value} is not a valid {name}")]
pub struct UnknownEnumValue {
    pub name: &'static str,
    pub value: u64,
}

/// Every compiled-in schema, validated.
pub fn builtin_schemas() -> SchemaResult<Vec<TraitSchemaEngine>> {
    Ok(vec![
        configuration_done::schema()?,
        network_interface::schema()?,
        network_interfaces::schema()?,
        low_power_heartbeat_settings::schema()?,
        user_nfc_token_metadata::schema()?,
        locale_settings::schema()?,
        locale_capabilities::schema()?,
    ])
}

/// A directory holding every compiled-in schema.
pub fn builtin_directory() -> SchemaResult<TraitSchemaDirectory> {
    let mut builder = TraitSchemaDirectory::builder();
    for schema in builtin_schemas()? {
        builder = builder.register(schema)?;
    }
    let directory = builder.build();
    info!(traits = directory.len(), "loaded built-in trait schemas");
    Ok(directory)
}
