//! Configuration module for clubchat.

use serde::Deserialize;
use std::path::Path;

use crate::{ChatError, Result};

/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "CHAT_SERVER_PORT";

/// Environment variable overriding the bind address.
pub const ENV_BIND_ADDR: &str = "CHAT_BIND_ADDR";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Maximum length of a single input line in bytes.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9191
}

fn default_max_connections() -> usize {
    100
}

fn default_max_line_length() -> usize {
    4096
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
            max_line_length: default_max_line_length(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/clubchat.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ChatError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChatError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CHAT_SERVER_PORT`: Override the listen port
    /// - `CHAT_BIND_ADDR`: Override the bind address
    ///
    /// Returns a warning for each value that was ignored. Overrides are
    /// applied before logging exists, so the caller reports them.
    pub fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides(
            std::env::var(ENV_PORT).ok().as_deref(),
            std::env::var(ENV_BIND_ADDR).ok().as_deref(),
        )
    }

    /// Apply explicit port and bind address overrides.
    ///
    /// Empty values are ignored. A port that does not parse is ignored and
    /// reported in the returned warnings.
    pub fn apply_overrides(
        &mut self,
        port: Option<&str>,
        bind_addr: Option<&str>,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warnings.push(format!("Ignoring invalid {ENV_PORT}: {port:?}")),
            }
        }

        if let Some(addr) = bind_addr.map(str::trim).filter(|a| !a.is_empty()) {
            self.server.host = addr.to_string();
        }

        warnings
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `max_connections` is zero
    /// - `max_line_length` is zero
    pub fn validate(&self) -> Result<()> {
        if self.server.max_connections == 0 {
            return Err(ChatError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        if self.server.max_line_length == 0 {
            return Err(ChatError::Config(
                "max_line_length must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
