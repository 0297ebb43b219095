//! Configuration management for txsearch
//!
//! This module handles loading, validation, and management of
//! txsearch configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;
pub use error::ConfigResult;

// ==================== Configuration Types ====================

/// Document store connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Store host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Store port
    #[serde(default = "default_port")]
    pub port: u16,
    /// URL scheme ("http" or "https")
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Index holding transaction documents
    #[serde(default = "default_index")]
    pub index: String,
    /// Basic auth username (auth is skipped when either credential is empty)
    #[serde(default = "default_username")]
    pub username: String,
    /// Basic auth password
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_index() -> String {
    "transactions".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationConfig {
    /// Records per page for searches without an explicit limit
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

fn default_records_per_page() -> usize {
    50
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml {
                message: e.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.store.scheme != "http" && self.store.scheme != "https" {
            return Err(ConfigError::InvalidValue {
                field: "store.scheme".to_string(),
                reason: format!("Unsupported scheme: {}", self.store.scheme),
            });
        }

        if self.store.index.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.index".to_string(),
                reason: "Index name must not be empty".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Base URL of the document store, without a trailing slash
    pub fn store_url(&self) -> String {
        format!("{}://{}:{}", self.store.scheme, self.store.host, self.store.port)
    }

    /// Whether basic auth credentials are configured
    pub fn has_credentials(&self) -> bool {
        !self.store.username.is_empty() && !self.store.password.is_empty()
    }
}

// ==================== Tests ====================
