//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::engine::Protocol;
use crate::error::{Result, SirfLinkError};
use crate::frame_buffer::DEFAULT_CAPACITY;
use crate::serial::{is_supported_baud_rate, BAUD_RATES};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Framing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,

    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Falls back to the protocol's default when absent
    #[serde(default)]
    pub patience: Option<usize>,
}

/// Capture log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CaptureConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_capture_dir")]
    pub dir: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Daily-rolling log file directory; empty logs to stderr only
    #[serde(default)]
    pub dir: String,
}

/// Command sent to the receiver at startup
#[derive(Debug, Deserialize, Clone)]
pub struct CommandConfig {
    pub protocol: Protocol,

    pub message_id: u16,

    #[serde(default)]
    pub arguments: String,

    /// Radix of OSP argument tokens
    #[serde(default = "default_base")]
    pub base: u32,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 57600 }
fn default_timeout_ms() -> u64 { 500 }

fn default_protocol() -> Protocol { Protocol::Osp }
fn default_buffer_capacity() -> usize { DEFAULT_CAPACITY }

fn default_capture_dir() -> String { "./captures".to_string() }

fn default_log_level() -> String { "info".to_string() }

fn default_base() -> u32 { 16 }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            buffer_capacity: default_buffer_capacity(),
            patience: None,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_capture_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: String::new(),
        }
    }
}

impl LinkConfig {
    /// Configured patience, or the protocol default for this buffer size
    pub fn effective_patience(&self) -> usize {
        self.patience
            .unwrap_or_else(|| self.protocol.default_patience(self.buffer_capacity))
    }
}

fn invalid(message: impl std::fmt::Display) -> SirfLinkError {
    SirfLinkError::Config(toml::de::Error::custom(message))
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
    /// use sirf_link::config::Config;
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
        // Validate serial port configuration
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if !is_supported_baud_rate(self.serial.baud_rate) {
            let rates: Vec<String> = BAUD_RATES.iter().map(u32::to_string).collect();
            return Err(invalid(format!("baud_rate must be one of: {}", rates.join(", "))));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 25500 {
            return Err(invalid("timeout_ms must be between 1 and 25500"));
        }

        // Frame buffer must hold a minimal frame and a 16-bit OSP length
        if self.link.buffer_capacity < 16 || self.link.buffer_capacity > 65535 {
            return Err(invalid("buffer_capacity must be between 16 and 65535"));
        }

        if self.link.patience == Some(0) {
            return Err(invalid("patience must be greater than 0"));
        }

        if self.capture.enabled && self.capture.dir.is_empty() {
            return Err(invalid("capture dir cannot be empty when enabled"));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!(
                "logging level '{}' must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        for (index, command) in self.commands.iter().enumerate() {
            match command.protocol {
                Protocol::Osp => {
                    if command.message_id > u16::from(u8::MAX) {
                        return Err(invalid(format!(
                            "commands[{}]: OSP message_id {} must be between 0 and 255",
                            index, command.message_id
                        )));
                    }
                    if !(2..=36).contains(&command.base) {
                        return Err(invalid(format!(
                            "commands[{}]: base {} must be between 2 and 36",
                            index, command.base
                        )));
                    }
                }
                Protocol::Nmea => {
                    if command.message_id > 999 {
                        return Err(invalid(format!(
                            "commands[{}]: NMEA message_id {} must be between 0 and 999",
                            index, command.message_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
