//! Account configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::types::GasSettings;

pub const DEFAULT_CHAIN_ID: u64 = 31337;
pub const DEFAULT_PROTOCOL_VERSION: u64 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Chain the execution requests are bound to.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Protocol version carried in the transaction context.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u64,
    /// Gas used when a transaction does not bring its own fee options.
    #[serde(default)]
    pub gas_settings: GasSettings,
}

fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_protocol_version() -> u64 {
    DEFAULT_PROTOCOL_VERSION
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            gas_settings: GasSettings::default(),
        }
    }
}

impl KernelConfig {
    /// Load configuration from environment variables. Unset variables fall
    /// back to defaults; set but unparsable ones are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let chain_id = parse_var("KERNEL_CHAIN_ID")?.unwrap_or(defaults.chain_id);
        let protocol_version =
            parse_var("KERNEL_PROTOCOL_VERSION")?.unwrap_or(defaults.protocol_version);
        let gas_limit =
            parse_var("KERNEL_GAS_LIMIT")?.unwrap_or(defaults.gas_settings.gas_limit);
        let max_fee_per_gas =
            parse_var("KERNEL_MAX_FEE_PER_GAS")?.unwrap_or(defaults.gas_settings.max_fee_per_gas);

        Ok(Self {
            chain_id,
            protocol_version,
            gas_settings: GasSettings {
                gas_limit,
                max_fee_per_gas,
            },
        })
    }
}

fn parse_var(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be an unsigned integer, got {raw:?}")),
        Err(_) => Ok(None),
    }
}
