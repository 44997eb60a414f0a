//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::controller::registry::VibrationSettings;
use crate::error::Result;

/// Number of emulated players the core exposes settings for
pub const MAX_PLAYERS: usize = 10;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    /// Per-port player settings; the index in this list is the port
    #[serde(default)]
    pub players: Vec<PlayerConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Host input configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_device_root")]
    pub device_root: String,

    #[serde(default = "default_overlay_port")]
    pub overlay_port: u32,

    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,

    #[serde(default = "default_enumeration_timeout_ms")]
    pub enumeration_timeout_ms: u64,
}

/// Settings for a single emulated player port
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PlayerConfig {
    #[serde(default)]
    pub use_system_vibrator: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rolling log files; empty logs to stdout only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_device_root() -> String { "/dev/input".to_string() }
fn default_overlay_port() -> u32 { 100 }
fn default_rescan_interval_ms() -> u64 { 2000 }
fn default_enumeration_timeout_ms() -> u64 { 500 }

fn default_log_level() -> String { "info".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_root: default_device_root(),
            overlay_port: default_overlay_port(),
            rescan_interval_ms: default_rescan_interval_ms(),
            enumeration_timeout_ms: default_enumeration_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use controller_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.input.device_root.is_empty() {
            return Err(crate::error::ControllerBridgeError::Config(
                toml::de::Error::custom("device_root cannot be empty")
            ));
        }

        // The overlay port must stay clear of every player port
        if (self.input.overlay_port as usize) < MAX_PLAYERS {
            return Err(crate::error::ControllerBridgeError::Config(
                toml::de::Error::custom(format!("overlay_port must be at least {}", MAX_PLAYERS))
            ));
        }

        if self.input.rescan_interval_ms < 100 || self.input.rescan_interval_ms > 60000 {
            return Err(crate::error::ControllerBridgeError::Config(
                toml::de::Error::custom("rescan_interval_ms must be between 100 and 60000")
            ));
        }

        if self.input.enumeration_timeout_ms == 0 || self.input.enumeration_timeout_ms > 10000 {
            return Err(crate::error::ControllerBridgeError::Config(
                toml::de::Error::custom("enumeration_timeout_ms must be between 1 and 10000")
            ));
        }

        if self.players.len() > MAX_PLAYERS {
            return Err(crate::error::ControllerBridgeError::Config(
                toml::de::Error::custom(format!(
                    "at most {} players can be configured",
                    MAX_PLAYERS
                ))
            ));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(crate::error::ControllerBridgeError::Config(
                toml::de::Error::custom("log level must be one of: trace, debug, info, warn, error")
            ));
        }

        Ok(())
    }
}

impl VibrationSettings for Config {
    fn use_system_vibrator(&self, port: u32) -> bool {
        self.players
            .get(port as usize)
            .map(|player| player.use_system_vibrator)
            .unwrap_or(false)
    }
}
