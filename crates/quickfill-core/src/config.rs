//! Configuration management for Quickfill.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.

use crate::collection::{KeySpace, DEFAULT_NAMESPACE};
use crate::error::{QuickfillError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Store URL used when none is configured
pub const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379/0";

/// Main configuration structure for Quickfill.
///
/// ## Example Configuration File (quickfill.toml)
///
/// ```toml
/// [general]
/// log_level = "info"
///
/// [store]
/// url = "redis://127.0.0.1:6379/0"
/// namespace = "gomate"
/// connect_timeout_secs = 5
///
/// [query]
/// max_results = 5
/// min_word_len = 3
/// cache_ttl_secs = 600
///
/// [load]
/// progress_interval = 10000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Store connection and key layout
    pub store: StoreConfig,

    /// Query tuning
    pub query: QueryConfig,

    /// Load tuning
    pub load: LoadConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            log_level: "info".to_string(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection URL of the ordered store
    pub url: String,

    /// Prefix of every key written
    pub namespace: String,

    /// Seconds to wait for a connection
    pub connect_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            url: DEFAULT_STORE_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            connect_timeout_secs: 5,
        }
    }
}

impl StoreConfig {
    /// Key space for the configured namespace
    pub fn key_space(&self) -> KeySpace {
        KeySpace::new(self.namespace.clone())
    }
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum number of results per query
    pub max_results: usize,

    /// Query words shorter than this are ignored
    pub min_word_len: usize,

    /// Lifetime of a cached ranking
    pub cache_ttl_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            max_results: 5,
            min_word_len: 3,
            cache_ttl_secs: 600,
        }
    }
}

/// Load configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Log progress every N records (0 = never)
    pub progress_interval: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            progress_interval: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&contents).map_err(|e| QuickfillError::ConfigError {
                reason: format!("Failed to parse config: {}", e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Saving configuration");
        let contents =
            toml::to_string_pretty(self).map_err(|e| QuickfillError::ConfigError {
                reason: format!("Failed to serialize config: {}", e),
            })?;

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs =
            ProjectDirs::from("", "", "quickfill").ok_or_else(|| QuickfillError::ConfigError {
                reason: "Could not determine config directory".to_string(),
            })?;

        Ok(dirs.config_dir().join("quickfill.toml"))
    }

    /// Reject settings that would make queries or keys meaningless.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.store.namespace.is_empty() {
            Some("store.namespace must not be empty")
        } else if self.store.namespace.contains(':') {
            Some("store.namespace must not contain ':'")
        } else if self.query.max_results == 0 {
            Some("query.max_results must be at least 1")
        } else if self.query.min_word_len == 0 {
            Some("query.min_word_len must be at least 1")
        } else if self.query.cache_ttl_secs == 0 {
            Some("query.cache_ttl_secs must be at least 1")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(QuickfillError::ConfigError {
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}
