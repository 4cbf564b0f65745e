//! Configuration Storage
//!
//! This module loads the connection settings, stored on disk,
//! used to reach the Redis server.

use crate::error::{RedisTuiError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides the configured URL
pub const URL_ENV: &str = "REDIS_URL";

/// Persistent configuration data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Optional password
    pub password: Option<String>,
    /// Logical database index
    pub db: i64,
    /// Seconds to wait for the initial connection
    pub connect_timeout_secs: u64,
    /// Full connection URL; takes precedence over the individual fields
    pub url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            connect_timeout_secs: 5,
            url: None,
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                RedisTuiError::Config("Could not find configuration directory".to_string())
            })?
            .join("redis-tui");

        fs::create_dir_all(&config_dir).map_err(|e| {
            RedisTuiError::Config(format!("Failed to create config directory: {}", e))
        })?;

        Ok(config_dir)
    }

    /// Get the configuration file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;

        let mut config = if config_file.exists() {
            let content = fs::read_to_string(&config_file).map_err(|e| {
                RedisTuiError::Config(format!("Failed to read config file: {}", e))
            })?;
            Self::from_toml(&content)?
        } else {
            Self::new()
        };

        config.apply_env(std::env::var(URL_ENV).ok());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RedisTuiError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Override the URL with the value of `REDIS_URL`, if set and non-empty
    pub fn apply_env(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.url = Some(url);
        }
    }

    /// Connection URL understood by the Redis client
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let auth = match self.password.as_deref() {
            Some(password) if !password.is_empty() => {
                format!(":{}@", urlencoding::encode(password))
            }
            _ => String::new(),
        };

        format!("redis://{}{}:{}/{}", auth, self.host, self.port, self.db)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
