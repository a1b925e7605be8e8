//! Configuration management for the Lake Shore 335 adapter
//!
//! This module handles loading, validation, and management of the adapter
//! configuration from YAML files. It takes the place of the device properties
//! (`Port`, `Baudrate`, `Output`) a control-system framework would normally
//! provide.

use crate::error::{LakeshoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Locations searched by [`Config::load`], in order
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "lakeshore335.yaml",
    "/data/lakeshore335.yaml",
    "/etc/lakeshore335/config.yaml",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct Config {
    /// Serial line to the controller
    pub serial: SerialConfig,

    /// Control loop output this instance is bound to (1 or 2)
    pub output: u8,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Serial port parameters. Parity, stop bits and byte size are fixed by the
/// instrument and live in [`crate::serial`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the serial port
    pub port: String,

    /// Baud rate
    pub baudrate: u32,

    /// Read timeout in milliseconds
    pub timeout_ms: u64,

    /// Blind wait between writing a query and reading its reply (0 disables)
    pub query_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Console level override
    pub console_level: Option<String>,

    /// File level override
    pub file_level: Option<String>,

    /// Level applied to the live log stream of the web API
    pub web_level: Option<String>,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in &DEFAULT_CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Load from an explicit path when given, otherwise from default locations
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::load(),
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.trim().is_empty() {
            return Err(LakeshoreError::validation(
                "serial.port",
                "Port cannot be empty",
            ));
        }

        if self.serial.baudrate == 0 {
            return Err(LakeshoreError::validation(
                "serial.baudrate",
                "Must be greater than 0",
            ));
        }

        if self.serial.timeout_ms == 0 {
            return Err(LakeshoreError::validation(
                "serial.timeout_ms",
                "Must be greater than 0",
            ));
        }

        if !(1..=2).contains(&self.output) {
            return Err(LakeshoreError::validation("output", "Must be 1 or 2"));
        }

        if self.web.port == 0 {
            return Err(LakeshoreError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(LakeshoreError::config("Log level cannot be empty"));
        }

        Ok(())
    }
}
