//! Configuration management module.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing.
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Transport chosen at boot; never negotiated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Proto {
    Tcp,
    Udp,
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proto::Tcp => write!(f, "tcp"),
            Proto::Udp => write!(f, "udp"),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Target device / bind endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Device port (default: 9000).
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_proto")]
    pub proto: Proto,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_proto() -> Proto {
    Proto::Tcp
}

/// Timeout and retry settings, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Response read timeout (default: 2.0).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Delay before reconnecting after a failure (default: 3.0).
    #[serde(default = "default_retry_secs")]
    pub retry_secs: f64,
}

fn default_timeout_secs() -> f64 {
    2.0
}

fn default_retry_secs() -> f64 {
    3.0
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file written in addition to stdout (default: stdout only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::Validation("Host cannot be empty".to_string()));
        }
        if self.connection.port == 0 {
            return Err(ConfigError::Validation(
                "Port must be greater than 0".to_string(),
            ));
        }
        if self.timing.timeout_secs <= 0.0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }
        if self.timing.retry_secs < 0.0 {
            return Err(ConfigError::Validation(
                "Retry delay cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl TimingConfig {
    /// Response read timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Reconnect delay as a Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            proto: default_proto(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_secs: default_retry_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_host() {
        let mut config = AppConfig::default();
        config.connection.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_port() {
        let mut config = AppConfig::default();
        config.connection.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_timeout_bounds() {
        let mut config = AppConfig::default();

        config.timing.timeout_secs = 0.0;
        assert!(config.validate().is_err());

        config.timing.timeout_secs = 2.0;
        config.timing.retry_secs = -1.0;
        assert!(config.validate().is_err());

        config.timing.retry_secs = 3.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.connection.host = "192.168.1.20".to_string();
        config.connection.proto = Proto::Udp;
        config.timing.timeout_secs = 1.5;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.connection.host, "192.168.1.20");
        assert_eq!(parsed.connection.proto, Proto::Udp);
        assert_eq!(parsed.timing.timeout_secs, 1.5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[connection]\nhost = \"10.0.0.5\"\n").unwrap();

        assert_eq!(parsed.connection.host, "10.0.0.5");
        assert_eq!(parsed.connection.port, 9000);
        assert_eq!(parsed.connection.proto, Proto::Tcp);
        assert_eq!(parsed.timing.timeout_secs, 2.0);
        assert!(parsed.log.file.is_none());
    }
}
