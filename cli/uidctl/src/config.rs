//! Configuration loading.
//!
//! Values come from, highest precedence first:
//! - command-line flags and their environment variables
//! - `config.json` in the platform config directory (or `--config`)
//! - built-in defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use uidvault_registry::StoreConfig;

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Get the default config file path.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "uidvault", "uidvault").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the identifier database.
    pub database_path: PathBuf,

    /// Path to the log file.
    pub log_file: PathBuf,

    /// Size at which the log file is rotated.
    pub log_max_bytes: u64,

    /// Number of rotated log files kept.
    pub log_backups: usize,

    /// Lock wait for database operations, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(StoreConfig::DEFAULT_PATH),
            log_file: PathBuf::from("uidvault.log"),
            log_max_bytes: 5 * 1024 * 1024,
            log_backups: 3,
            busy_timeout_ms: StoreConfig::DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load config from `explicit` if given, otherwise from the default
    /// location. A missing default file yields defaults; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Store settings derived from this config.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.database_path)
            .with_busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}
