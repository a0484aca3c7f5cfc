//! Configuration for recokit.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{RecoError, RecoResult};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "recokit.toml";

/// Main configuration for recokit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Cursor and rating source settings.
    #[serde(default)]
    pub cursor: CursorConfig,

    /// Score cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Cursor settings, shared by the delimited text and SQLite sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Field delimiter for rating files.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Skip the first line of rating files.
    #[serde(default)]
    pub skip_header: bool,

    /// Rows fetched per query by the SQLite source.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            skip_header: false,
            page_size: default_page_size(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_page_size() -> usize {
    256
}

/// Score cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Wrap scorers in the per-user cache.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Remember items the scorer could not score, so they are not
    /// requested again while the cached user stays the same.
    #[serde(default = "default_true")]
    pub remember_missing: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remember_missing: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> RecoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RecoResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> RecoResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Rejects values the sources cannot work with.
    pub fn validate(&self) -> RecoResult<()> {
        if self.cursor.delimiter.is_empty() {
            return Err(RecoError::config("cursor.delimiter must not be empty"));
        }
        if self.cursor.page_size == 0 {
            return Err(RecoError::config("cursor.page_size must be at least 1"));
        }
        match self.general.log_format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(RecoError::config(format!(
                "general.log_format must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}
