//! Configuration loading and management
//!
//! Handles parsing of `<data-dir>/config.toml`. Every field has a default, so a missing file or
//! a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub operations: OperationsConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub actor: ActorConfig,
}

/// Page sizing for todo listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Used when the caller asks for a page size of zero or less
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Upper bound for any requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PaginationConfig {
    /// Clamp a requested page (>= 1) and page size (into `[1, max_page_size]`).
    pub fn normalize(&self, page: i64, page_size: i64) -> (u64, u64) {
        let page = u64::try_from(page.max(1)).unwrap_or(1);
        let size = if page_size <= 0 {
            self.default_page_size
        } else {
            u64::try_from(page_size).unwrap_or(self.max_page_size)
        };
        (page, size.clamp(1, self.max_page_size.max(1)))
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(Error::InvalidConfig(
                "pagination.default_page_size must be at least 1".to_string(),
            ));
        }
        if self.max_page_size < self.default_page_size {
            return Err(Error::InvalidConfig(format!(
                "pagination.max_page_size ({}) is smaller than default_page_size ({})",
                self.max_page_size, self.default_page_size
            )));
        }
        Ok(())
    }
}

/// Per-operation deadlines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationsConfig {
    #[serde(default = "default_operation_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_operation_timeout_ms() -> u64 {
    10_000
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl OperationsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// On-disk store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Actor-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Email used when no other actor source is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory, or return defaults when it is missing
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        if self.operations.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "operations.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.store.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "store.lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(actor) = &self.actor.default {
            if actor.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "actor.default cannot be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}
