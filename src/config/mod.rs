//! Service Configuration Module
//!
//! Provides deployment configuration loaded from TOML files with
//! environment overrides for the operational knobs.
//!
//! ## Loading Order
//!
//! 1. `RECALL_CONFIG` environment variable (path to TOML file)
//! 2. `recall.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Environment variables always win over the file:
//! - `RECALL_SERVER_ADDR` - full bind address (e.g. `0.0.0.0:5000`)
//! - `PORT` - port only, bound on all interfaces
//! - `RECALL_DB_PATH` - store location
//! - `OPENAI_BASE_URL` - provider base URL
//!
//! The remote-API credential (`OPENAI_API_KEY`) is environment-only and is
//! never read from or written to a config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listening port
const DEFAULT_PORT: u16 = 5000;

fn default_server_addr() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

fn default_db_path() -> String {
    "./data/knowledge.db".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    1
}

/// Root configuration for a service deployment.
///
/// Load with [`ServiceConfig::load`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Knowledge store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Remote provider configuration
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Retry behavior for rate-limited provider calls
    #[serde(default)]
    pub retry: RetryConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

/// Knowledge store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the sled database directory
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Remote provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Chat completion model name
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
        }
    }
}

/// Retry behavior for rate-limited provider calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts, in seconds
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration using the standard search order:
    /// 1. `$RECALL_CONFIG` environment variable
    /// 2. `./recall.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env_overrides();
        config
    }

    fn load_file() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("RECALL_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded service config from RECALL_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from RECALL_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "RECALL_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./recall.toml
        let local = Path::new("recall.toml");
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!("Loaded service config from ./recall.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./recall.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        Self::default()
    }

    /// Parse a TOML config file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = toml::from_str(&raw).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("RECALL_SERVER_ADDR") {
            if !addr.is_empty() {
                self.server.addr = addr;
            }
        } else if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.addr = format!("0.0.0.0:{p}"),
                Err(_) => warn!(port = %port, "PORT is not a valid port number, ignoring"),
            }
        }

        if let Ok(path) = std::env::var("RECALL_DB_PATH") {
            if !path.is_empty() {
                self.store.path = path;
            }
        }

        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.is_empty() {
                self.providers.base_url = url;
            }
        }
    }
}

/// Config loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
