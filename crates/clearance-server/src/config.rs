//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, the two
//! collaborator endpoints, and the sweeper schedule.

use clearance_sweeper::SweeperConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Churn report service
    pub churn: ServiceConfig,

    /// Product catalog service
    pub catalog: ServiceConfig,

    /// Sweeper schedule and pacing
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

/// Remote collaborator endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL (e.g., "https://zap.example.com")
    pub base_url: String,

    /// Access token; may be left empty in the file and supplied from the
    /// environment instead
    #[serde(default)]
    pub token: String,

    /// Request timeout in seconds; the client default applies when absent
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Replace the collaborator tokens where an override is given
    pub fn with_tokens(mut self, churn: Option<String>, catalog: Option<String>) -> Self {
        if let Some(token) = churn {
            self.churn.token = token;
        }
        if let Some(token) = catalog {
            self.catalog.token = token;
        }
        self
    }

    /// Check required fields once all overrides are in place
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.churn.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("churn.base_url".to_string()));
        }
        if self.churn.token.is_empty() {
            return Err(ConfigError::MissingField("churn.token".to_string()));
        }
        if self.catalog.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("catalog.base_url".to_string()));
        }
        if self.catalog.token.is_empty() {
            return Err(ConfigError::MissingField("catalog.token".to_string()));
        }
        Ok(())
    }

    /// Create a default configuration for local development
    pub fn default_dev_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            churn: ServiceConfig {
                base_url: "http://localhost:9001".to_string(),
                token: String::new(),
                timeout_secs: None,
            },
            catalog: ServiceConfig {
                base_url: "http://localhost:9002".to_string(),
                token: String::new(),
                timeout_secs: None,
            },
            sweeper: SweeperConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
