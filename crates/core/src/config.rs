//! Configuration management for Turnstile.
//!
//! Configuration is read once at process start. A TOML file supplies the
//! base values and a small set of environment variables override them.

use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;

use crate::error::{CoreError, Result};

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "TURNSTILE_CONFIG";

/// Default environment variable holding the token signing secret.
pub const DEFAULT_SECRET_ENV: &str = "TURNSTILE_TOKEN_SECRET";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tokens: TokenConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Upper bound on requests handled at once
    pub max_concurrent_requests: usize,
}

/// Where the token secret comes from. The secret itself never appears in
/// configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub secret_env: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            max_concurrent_requests: 512,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_env: DEFAULT_SECRET_ENV.to_string(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: "data/checkins.db".to_string(),
        }
    }
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Loads the file named by `TURNSTILE_CONFIG` (or the defaults when it
    /// is unset) and applies environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::load_path(&path)?,
            _ => Self::default_config(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    fn load_path(path: &str) -> Result<Self> {
        Self::from_file(path)
    }

    #[cfg(not(feature = "toml"))]
    fn load_path(path: &str) -> Result<Self> {
        Err(CoreError::Config(format!(
            "cannot load {}: built without the toml feature",
            path
        )))
    }

    /// Applies `PORT`, `TURNSTILE_BIND_ADDR`, `TURNSTILE_LEDGER_PATH` and
    /// `TURNSTILE_LOG_JSON` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| CoreError::Config(format!("invalid PORT: {}", port)))?;
        }
        if let Some(addr) = lookup("TURNSTILE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(path) = lookup("TURNSTILE_LEDGER_PATH") {
            self.ledger.path = path;
        }
        if let Some(json) = lookup("TURNSTILE_LOG_JSON") {
            self.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Socket address string the gate binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }
}
