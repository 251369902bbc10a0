//! tdm-tool: inspect the built-in trait schemas and exercise the update
//! protocol from the command line.
//!
//! Usage:
//!   tdm-tool list
//!   tdm-tool show NetworkInterfaceTrait
//!   tdm-tool resolve UserNFCTokenMetadataTrait metadata.tag_number
//!   tdm-tool encode-update LocaleSettingsTrait active_locale '"en_GB"'
//!   tdm-tool decode 03 15 36 01 ...
//!   tdm-tool simulate LowPowerHeartbeatSettingsTrait . '{"destination": null, "window": 500, "offset": 0, "interval": 60000}'

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tdm_tool::commands;
use tdm_traits::builtin_directory;
use tdm_update::{SecurityMode, UpdateClientConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tdm-tool")]
#[command(about = "Trait schema and update protocol tool")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in traits
    List,

    /// Print a trait's property tree
    Show {
        /// Trait name or profile id
        #[arg(value_name = "TRAIT")]
        trait_name: String,
    },

    /// Resolve a dotted property name to its handle and tag path
    Resolve {
        #[arg(value_name = "TRAIT")]
        trait_name: String,
        /// Dotted property names, e.g. `metadata.serial_number`; `.` is the root
        property: String,
    },

    /// Print the hex encoding of an update request
    EncodeUpdate {
        #[arg(value_name = "TRAIT")]
        trait_name: String,
        property: String,
        /// New value as JSON
        value: String,
        /// Trait instance id
        #[arg(long, default_value = "0")]
        instance: u64,
        /// Print only the tagged property element, not the whole message
        #[arg(long)]
        raw: bool,
    },

    /// Pretty-print a hex-encoded message or TLV element
    Decode {
        /// Hex bytes; whitespace is ignored
        hex: Vec<String>,
    },

    /// Load and validate a client config file
    CheckConfig { path: PathBuf },

    /// Send an update to an in-process publisher and read it back
    Simulate {
        #[arg(value_name = "TRAIT")]
        trait_name: String,
        property: String,
        value: String,
        /// Client config file; defaults apply without one
        #[arg(long)]
        config: Option<PathBuf>,
        /// Security mode: 0 none, 1 CASE, 2 group key
        #[arg(long)]
        security: Option<u8>,
        /// Application key id for group key security
        #[arg(long, default_value = "0")]
        key_id: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let directory = builtin_directory()?;
    debug!(traits = directory.len(), command = ?args.command, "starting");

    let output = match args.command {
        Command::List => commands::list(&directory),
        Command::Show { trait_name } => commands::show(&directory, &trait_name)?,
        Command::Resolve { trait_name, property } => commands::resolve(&directory, &trait_name, &property)?,
        Command::EncodeUpdate {
            trait_name,
            property,
            value,
            instance,
            raw,
        } => {
            let bytes = if raw {
                let schema = commands::find_trait(&directory, &trait_name)?;
                let handle = commands::find_property(&schema, &property)?;
                commands::encode_value(&schema, handle, &value)?
            } else {
                commands::encode_update(&directory, &trait_name, &property, &value, instance)?
            };
            format!("{}\n", hex::encode(bytes))
        }
        Command::Decode { hex } => commands::decode(&hex.concat())?,
        Command::CheckConfig { path } => commands::check_config(&path)?,
        Command::Simulate {
            trait_name,
            property,
            value,
            config,
            security,
            key_id,
        } => {
            let mut config = match config {
                Some(path) => UpdateClientConfig::load(path)?,
                None => UpdateClientConfig::default(),
            };
            if let Some(code) = security {
                config.binding.security = SecurityMode::from_code(code, key_id)?;
            }
            commands::simulate(Arc::new(directory), &trait_name, &property, &value, config).await?
        }
    };
    print!("{output}");
    Ok(())
}
