//! Binding and client configuration.
//!
//! Defaults mirror the reference update client: a 15 s exchange response
//! timeout, 3 s WRMP retransmit timeouts, a 200 ms ack timeout and a 30 s
//! overall update timeout.

use crate::error::{UpdateError, UpdateResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Key id meaning "no key".
pub const KEY_ID_NONE: u32 = 0;

/// Reliable-messaging retransmission parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrmpConfig {
    pub initial_retrans_timeout_ms: u32,
    pub active_retrans_timeout_ms: u32,
    pub ack_timeout_ms: u16,
    pub max_retrans: u8,
}

impl Default for WrmpConfig {
    fn default() -> Self {
        Self {
            initial_retrans_timeout_ms: 3000,
            active_retrans_timeout_ms: 3000,
            ack_timeout_ms: 200,
            max_retrans: 3,
        }
    }
}

/// How the binding secures its messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SecurityMode {
    #[default]
    None,
    /// Shared CASE session.
    Case,
    /// Group key encryption with an application key.
    GroupEnc { key_id: u32 },
}

impl SecurityMode {
    /// Maps the numeric mode used on command lines (0 none, 1 CASE,
    /// 2 group key) to a mode.
    pub fn from_code(code: u8, key_id: u32) -> UpdateResult<Self> {
        let mode = match code {
            0 => SecurityMode::None,
            1 => SecurityMode::Case,
            2 => SecurityMode::GroupEnc { key_id },
            other => return Err(UpdateError::UnsupportedSecurityMode(other)),
        };
        mode.validate()?;
        Ok(mode)
    }

    /// Group key mode needs a real key id.
    pub fn validate(&self) -> UpdateResult<()> {
        match *self {
            SecurityMode::GroupEnc { key_id } if key_id == KEY_ID_NONE => {
                Err(UpdateError::InvalidKeyId(key_id))
            }
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SecurityMode::None => "none",
            SecurityMode::Case => "case",
            SecurityMode::GroupEnc { .. } => "group_enc",
        }
    }
}

/// Where and how to bind to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Publisher node id.
    pub node_id: u64,
    /// Subnet on the fabric, if the publisher is not on the default one.
    pub subnet_id: Option<u16>,
    /// Max time between an outgoing message and the next incoming one.
    pub response_timeout_ms: u32,
    pub wrmp: WrmpConfig,
    pub security: SecurityMode,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            subnet_id: None,
            response_timeout_ms: 15_000,
            wrmp: WrmpConfig::default(),
            security: SecurityMode::None,
        }
    }
}

impl BindingConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.response_timeout_ms))
    }

    pub fn validate(&self) -> UpdateResult<()> {
        self.security.validate()
    }
}

/// What to do when an update targets a path that already has one running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Wait for earlier updates on the path, in request order.
    #[default]
    Queue,
    /// Fail immediately with `UpdateInFlight`.
    Reject,
}

/// Update client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateClientConfig {
    pub binding: BindingConfig,
    /// Upper bound on one update exchange, binding included.
    pub update_timeout_ms: u64,
    pub concurrency: ConcurrencyPolicy,
}

impl Default for UpdateClientConfig {
    fn default() -> Self {
        Self {
            binding: BindingConfig::default(),
            update_timeout_ms: 30_000,
            concurrency: ConcurrencyPolicy::Queue,
        }
    }
}

impl UpdateClientConfig {
    pub fn update_timeout(&self) -> Duration {
        Duration::from_millis(self.update_timeout_ms)
    }

    pub fn validate(&self) -> UpdateResult<()> {
        if self.update_timeout_ms == 0 {
            return Err(UpdateError::Config("update_timeout_ms must be non-zero".into()));
        }
        self.binding.validate()
    }

    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> UpdateResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> UpdateResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| UpdateError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), security = config.binding.security.name(), "loaded update client config");
        Ok(config)
    }
}
