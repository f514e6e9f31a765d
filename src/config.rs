//! User configuration loaded from `<config dir>/moncal/config.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calendar::ViewRange;
use crate::error::ConfigError;
use crate::logging::{default_log_dir, default_log_level};
use crate::store::default_db_path;

/// Every field is optional; unset fields fall back to the defaults below.
///
/// ```toml
/// db_path = "/home/me/.local/share/moncal/moncal.db"
/// log_level = "info"
/// log_dir = "/home/me/.local/share/moncal/logs"
///
/// [view]
/// first_month = "2025-11"
/// last_month = "2026-11"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub db_path: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub view: ViewRange,
}

impl Config {
    /// Loads the default config file, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn db_path(&self) -> String {
        self.db_path.clone().unwrap_or_else(default_db_path)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("moncal").join("config.toml"))
}
