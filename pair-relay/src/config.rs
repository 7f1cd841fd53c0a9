//! Configuration loading for pair-relay.
//!
//! Configuration is loaded from a TOML file (default: `blindpair.toml`).
//! Every section and field is optional.

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration for pair-relay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Rate limiting configuration.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// HTTP endpoints configuration.
    #[serde(default)]
    pub http: HttpConfig,
    /// Maintenance task configuration.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum relayed messages per user per minute (default: 60).
    #[serde(default = "default_messages_per_minute")]
    pub messages_per_minute: u32,
    /// Maximum relayed messages per second across all users (default: 1000).
    #[serde(default = "default_global_messages_per_second")]
    pub global_messages_per_second: u32,
}

/// HTTP endpoints configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Serve the HTTP endpoints at all (default: true).
    #[serde(default = "default_http_enabled")]
    pub enabled: bool,
    /// Bind address for HTTP server (default: 127.0.0.1:8080).
    #[serde(default = "default_http_bind")]
    pub bind_address: String,
    /// Enable metrics endpoint (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

/// Maintenance task configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// Sweep interval in seconds (default: 60).
    #[serde(default = "default_maintenance_interval")]
    pub interval_secs: u64,
    /// Enable maintenance task (default: true).
    #[serde(default = "default_maintenance_enabled")]
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_messages_per_minute() -> u32 {
    60
}

fn default_global_messages_per_second() -> u32 {
    1000
}

fn default_http_enabled() -> bool {
    true
}

fn default_http_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_maintenance_interval() -> u64 {
    60
}

fn default_maintenance_enabled() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            messages_per_minute: default_messages_per_minute(),
            global_messages_per_second: default_global_messages_per_second(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: default_http_enabled(),
            bind_address: default_http_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_maintenance_interval(),
            enabled: default_maintenance_enabled(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// value is out of range.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the relay unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.messages_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.messages_per_minute",
                reason: "must be greater than zero",
            });
        }
        if self.limits.global_messages_per_second == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.global_messages_per_second",
                reason: "must be greater than zero",
            });
        }
        if self.maintenance.enabled && self.maintenance.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "maintenance.interval_secs",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
