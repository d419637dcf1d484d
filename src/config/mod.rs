//! # Configuration Management Module
//!
//! This module handles configuration for the Goosebbs system: type-safe
//! section structs with serde, sensible defaults for every key, and
//! load/create helpers used by the CLI.
//!
//! ## Configuration File Format
//!
//! Goosebbs uses TOML for human-readable configuration:
//!
//! ```toml
//! [bbs]
//! name = "Goose Retro BBS"
//! sysop = "sysop"
//! location = "Local"
//!
//! [server]
//! bind_address = "127.0.0.1"
//! port = 2323
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! # file = "goosebbs.log"
//! ```
//!
//! Every key has a default, so a partial file (or `[bbs]` alone) loads
//! fine. `goosebbs init` writes the full default file as a starting point.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bbs: BbsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Station identity: shown in the banner, the status command, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BbsConfig {
    #[serde(default = "default_bbs_name")]
    pub name: String,
    #[serde(default = "default_sysop")]
    pub sysop: String,
    #[serde(default = "default_location")]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind. Loopback by default; widen deliberately, since the
    /// protocol is plain text end to end.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level when no `-v` flags are given: error, warn, info,
    /// debug, or trace.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file. When set, log lines go to the file, and also to
    /// stdout when stdout is a terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_bbs_name() -> String {
    "Goose Retro BBS".to_string()
}

fn default_sysop() -> String {
    "sysop".to_string()
}

fn default_location() -> String {
    "Local".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    2323
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BbsConfig {
    fn default() -> Self {
        Self {
            name: default_bbs_name(),
            sysop: default_sysop(),
            location: default_location(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
