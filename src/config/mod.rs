//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::MinGames;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where dataset documents are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Static host serving the dataset. Local `data_dir` is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Timeout in seconds for remote reads
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    10
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl DatasetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Parsed `base_url`, if configured.
    pub fn remote_url(&self) -> Result<Option<Url>, ConfigError> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ConfigError::ValidationError(format!("Invalid dataset base_url {}: {}", raw, e))
                })
            })
            .transpose()
    }
}

/// Map listing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Maps with fewer baseline games are hidden from the listing
    #[serde(default)]
    pub min_total_games: u64,

    /// Per-map timeout for the popularity scan, in seconds
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_seconds: u64,

    /// Minimum games preselected on map pages
    #[serde(default = "default_min_games")]
    pub default_min_games: u64,

    /// Fixed map table per mode folder, used when the dataset is remote
    #[serde(default)]
    pub maps: HashMap<String, Vec<String>>,
}

fn default_scan_timeout() -> u64 {
    5
}

fn default_min_games() -> u64 {
    500
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            min_total_games: 0,
            scan_timeout_seconds: default_scan_timeout(),
            default_min_games: default_min_games(),
            maps: HashMap::new(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub listing: ListingConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            dataset: DatasetConfig::default(),
            listing: ListingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.dataset.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Dataset timeout must be greater than 0".to_string(),
            ));
        }

        if self.listing.scan_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Scan timeout must be greater than 0".to_string(),
            ));
        }

        self.default_min_games()?;
        self.dataset.remote_url()?;

        Ok(())
    }

    pub fn default_min_games(&self) -> Result<MinGames, ConfigError> {
        MinGames::try_from(self.listing.default_min_games)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.listing.scan_timeout_seconds)
    }
}
