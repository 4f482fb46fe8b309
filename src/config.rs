//! Configuration management for adb-shellfs.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::device::{AdbLocator, DeviceOptions, DEFAULT_ONESHOT_TIMEOUT};
use crate::session::DEFAULT_COMMAND_TIMEOUT;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// adb and device settings.
    pub adb: AdbSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// adb configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbSection {
    /// Explicit adb executable; probed from the usual locations when unset.
    pub path: Option<String>,
    /// Device serial.
    pub serial: Option<String>,
    /// Per-command deadline on the persistent shell, in seconds.
    pub command_timeout_secs: u64,
    /// Deadline for transfers and other one-shot adb calls, in seconds.
    pub oneshot_timeout_secs: u64,
}

impl Default for AdbSection {
    fn default() -> Self {
        Self {
            path: None,
            serial: None,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            oneshot_timeout_secs: DEFAULT_ONESHOT_TIMEOUT.as_secs(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(path) = non_empty("ADB_SHELLFS_ADB_PATH") {
            self.adb.path = Some(path);
        }

        if let Some(serial) = non_empty("ADB_SHELLFS_SERIAL").or_else(|| non_empty("ANDROID_SERIAL")) {
            self.adb.serial = Some(serial);
        }

        if let Some(secs) = non_empty("ADB_SHELLFS_TIMEOUT") {
            self.adb.command_timeout_secs = secs
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(secs))?;
        }

        if let Some(level) = non_empty("ADB_SHELLFS_LOG_LEVEL").or_else(|| non_empty("RUST_LOG")) {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref adb) = args.adb {
            self.adb.path = Some(adb.clone());
        }

        if let Some(ref serial) = args.serial {
            self.adb.serial = Some(serial.clone());
        }

        if let Some(secs) = args.timeout {
            self.adb.command_timeout_secs = secs;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env()?;
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Reject settings no session could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adb.command_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        if self.adb.oneshot_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(())
    }

    /// Facade settings derived from this configuration.
    pub fn device_options(&self) -> DeviceOptions {
        DeviceOptions {
            serial: self.adb.serial.clone().filter(|s| !s.is_empty()),
            command_timeout: Duration::from_secs(self.adb.command_timeout_secs),
            oneshot_timeout: Duration::from_secs(self.adb.oneshot_timeout_secs),
        }
    }

    /// Locator honoring an explicit adb path.
    pub fn locator(&self) -> AdbLocator {
        match self.adb.path {
            Some(ref path) => AdbLocator::fixed(path.clone()),
            None => AdbLocator::new(),
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Timeout that is not a positive number of seconds.
    InvalidTimeout(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidTimeout(value) => write!(f, "invalid timeout: '{}'", value),
        }
    }
}

impl std::error::Error for ConfigError {}
