//! Faifa configuration

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use faifa_common::Result;
use serde::{Deserialize, Serialize};

/// Billing service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// JSON rate table; the built-in reference table when absent
    pub rates_path: Option<PathBuf>,
    /// Bill cache configuration
    pub cache: CacheSettings,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            rates_path: None,
            cache: CacheSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl BillingConfig {
    /// Load configuration from `faifa.{toml,json}` and `FAIFA_` variables.
    ///
    /// Nested keys use `__`, e.g. `FAIFA_CACHE__TTL_SECS=60`.
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .add_source(File::with_name("faifa").required(false))
            .add_source(
                Environment::with_prefix("FAIFA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// Bill cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_entries: 10_000,
        }
    }
}
