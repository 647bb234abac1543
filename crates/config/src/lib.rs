//! Chainfee Configuration Module
//!
//! This module provides configuration types for the fee accounting and
//! message dispatch core: the native fee denomination, the policy applied to
//! fees of failed transactions, block-fee publication and logging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Symbol of the chain's native token. Fixed fees are always charged in it.
pub const NATIVE_TOKEN_SYMBOL: &str = "BNB";

/// Default log filter used when neither the config nor `RUST_LOG` set one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`AppConfig`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not acceptable
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// What happens to an already staged fee when a message handler fails.
///
/// Fee accounting and message execution are decoupled: the fee is staged
/// before the handler runs, so this policy decides whether a failed
/// transaction still pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailedTxFeePolicy {
    /// Keep the staged fee; it is committed with the rest of the block.
    #[default]
    Collect,
    /// Un-stage the fee so the failed transaction pays nothing.
    Discard,
}

impl fmt::Display for FailedTxFeePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedTxFeePolicy::Collect => write!(f, "collect"),
            FailedTxFeePolicy::Discard => write!(f, "discard"),
        }
    }
}

impl FromStr for FailedTxFeePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collect" | "keep" => Ok(FailedTxFeePolicy::Collect),
            "discard" | "drop" => Ok(FailedTxFeePolicy::Discard),
            _ => Err(format!("Unknown failed tx fee policy: {}", s)),
        }
    }
}

/// Fee accounting configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Denomination fixed fees are charged in
    pub native_denom: String,
    /// Policy for fees staged by transactions whose handler failed
    pub failed_tx_fee_policy: FailedTxFeePolicy,
    /// Whether end-of-block distribution builds a publishable record
    pub publish_block_fee: bool,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            native_denom: NATIVE_TOKEN_SYMBOL.to_string(),
            failed_tx_fee_policy: FailedTxFeePolicy::default(),
            publish_block_fee: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive, e.g. `info,chainfee_ledger=debug`
    pub filter: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
    /// Include the event target in each line
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
            with_target: false,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub fees: FeeConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parses a configuration from TOML text. Missing sections take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<()> {
        let denom = &self.fees.native_denom;
        if denom.is_empty() || !denom.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!(
                "native_denom must be a non-empty alphanumeric symbol, got {:?}",
                denom
            )));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter is empty".to_string()));
        }
        Ok(())
    }
}
