//! Storage layout for todoshare
//!
//! All state lives in one data directory:
//!
//! ```text
//! <data-dir>/
//!   config.toml      # Optional configuration
//!   actor            # Persisted acting user (email)
//!   store.json       # Users, categories, shares and todos
//!   store.lock       # Exclusive lock guarding store.json
//! ```
//!
//! The data directory is `--data-dir` / `TODOSHARE_HOME` when given, otherwise the
//! platform data directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::lock;

/// Environment variable naming the data directory
pub const HOME_ENV: &str = "TODOSHARE_HOME";

const STORE_FILE: &str = "store.json";
const STORE_LOCK: &str = "store.lock";
const CONFIG_FILE: &str = "config.toml";
const ACTOR_FILE: &str = "actor";

/// Path manager and file helpers for the data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Resolve the data directory: explicit path first, then the platform default.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Ok(Self::new(dir));
        }
        let dirs = directories::ProjectDirs::from("", "", "todoshare").ok_or_else(|| {
            Error::InvalidArgument(format!(
                "cannot determine a data directory; pass --data-dir or set {HOME_ENV}"
            ))
        })?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn store_lock_file(&self) -> PathBuf {
        self.data_dir.join(STORE_LOCK)
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    pub fn actor_file(&self) -> PathBuf {
        self.data_dir.join(ACTOR_FILE)
    }

    /// Create the data directory if missing
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file, `None` when the file does not exist
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    // =========================================================================
    // Actor persistence
    // =========================================================================

    /// Read the persisted acting user, if any
    pub fn read_actor(&self) -> Result<Option<String>> {
        let path = self.actor_file();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        let actor = raw.trim();
        if actor.is_empty() {
            return Ok(None);
        }
        Ok(Some(actor.to_string()))
    }

    /// Persist the acting user
    pub fn write_actor(&self, actor: &str) -> Result<()> {
        self.init()?;
        lock::write_atomic(self.actor_file(), format!("{actor}\n").as_bytes())
    }
}
