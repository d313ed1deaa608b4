//! Application configuration management.
//!
//! Configuration is stored at `~/.config/rollcall/config.json` (or the
//! platform equivalent). Every field is optional; `ROLLCALL_DATA_DIR` and
//! `ROLLCALL_LOG_DIR` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::feed::DEFAULT_DEDUPE_WINDOW;

/// Application name used for config/data directory paths
const APP_NAME: &str = "rollcall";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DATA_DIR_ENV: &str = "ROLLCALL_DATA_DIR";
pub const LOG_DIR_ENV: &str = "ROLLCALL_LOG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding `roster.json`
    pub data_dir: Option<PathBuf>,
    /// Window for collapsing repeated feed scans, in milliseconds
    pub scan_dedupe_ms: Option<u64>,
    /// Save after every accepted feed scan instead of once at the end
    pub autosave: Option<bool>,
    /// Enables a daily rolling log file in this directory
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply directory overrides from a variable lookup. Empty values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        if let Some(dir) = var(DATA_DIR_ENV) {
            self.data_dir = Some(dir);
        }
        if let Some(dir) = var(LOG_DIR_ENV) {
            self.log_dir = Some(dir);
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn dedupe_window(&self) -> Duration {
        self.scan_dedupe_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEDUPE_WINDOW)
    }

    pub fn autosave(&self) -> bool {
        self.autosave.unwrap_or(true)
    }
}
