//! Configuration management for LazyLinear.
//!
//! Configuration lives in a JSON file under the platform config directory.
//! A missing file is not an error. The `LINEAR_API_KEY` environment variable
//! overrides the stored key and a non-empty `DEBUG` enables diagnostics.

mod theme;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use theme::ThemeConfig;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "LINEAR_API_KEY";

/// Environment variable that enables debug diagnostics.
pub const DEBUG_ENV: &str = "DEBUG";

const APP_DIR: &str = "lazylinear";
const CONFIG_FILE: &str = "config.json";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no config directory.
    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// User configuration.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub linear_api_key: String,
    pub theme: ThemeConfig,
    pub debug_mode: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.linear_api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Config")
            .field("linear_api_key", &key)
            .field("theme", &self.theme)
            .field("debug_mode", &self.debug_mode)
            .finish()
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path` and apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        debug!("Loaded config from {}", path.display());
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `LINEAR_API_KEY` and `DEBUG` from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                debug!("Using API key from {}", API_KEY_ENV);
                self.linear_api_key = key.trim().to_string();
            }
        }
        if std::env::var(DEBUG_ENV).is_ok_and(|value| !value.is_empty()) {
            self.debug_mode = true;
        }
    }

    /// The API key, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.linear_api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}
