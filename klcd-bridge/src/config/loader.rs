//! Bridge configuration file
//!
//! Every section and key is optional; missing values take the defaults of
//! the embedded `bridge.toml`.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;
use thiserror::Error;

use klcd_core::config::{BridgeSettings, DisplaySettings, Presets};
use klcd_core::safety::HotendBounds;

use super::limits::{MAX_PRESET_C, PRINTER_URL_SCHEME, SUPPORTED_BAUDS};

/// Embedded default configuration
///
/// Edit bridge.toml and rebuild to change the defaults.
pub const EMBEDDED_CONFIG: &str = include_str!("../../bridge.toml");

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML or has wrongly typed values
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the screen's tty
    pub port: PathBuf,
    /// Baud rate
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: PathBuf::from("/dev/ttyUSB0"),
            baud: 115_200,
        }
    }
}

/// Printer host settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Base URL of the Moonraker API
    pub url: String,
    /// Per-request timeout (ms)
    pub timeout_ms: u64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            url: String::from("http://127.0.0.1:7125"),
            timeout_ms: 5_000,
        }
    }
}

impl PrinterConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Telemetry polling settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Time between snapshots (ms)
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 2_000 }
    }
}

impl PollConfig {
    /// Time between snapshots
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub serial: SerialConfig,
    pub printer: PrinterConfig,
    pub poll: PollConfig,
    pub display: DisplaySettings,
    pub safety: HotendBounds,
    pub presets: Presets,
}

impl BridgeConfig {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `path`, or the embedded default when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                info!("Loaded configuration from {}", path.display());
                Self::from_toml(&text)
            }
            None => {
                info!("Using embedded default configuration");
                Self::from_toml(EMBEDDED_CONFIG)
            }
        }
    }

    /// Check value ranges that the types alone cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_BAUDS.contains(&self.serial.baud) {
            return Err(ConfigError::Invalid(format!(
                "unsupported baud rate {}",
                self.serial.baud
            )));
        }
        if !self.printer.url.starts_with(PRINTER_URL_SCHEME) {
            return Err(ConfigError::Invalid(format!(
                "printer url {:?} must start with {}",
                self.printer.url, PRINTER_URL_SCHEME
            )));
        }
        if self.printer.timeout_ms == 0 {
            return Err(ConfigError::Invalid("printer timeout_ms must be positive".into()));
        }
        if self.poll.interval_ms == 0 {
            return Err(ConfigError::Invalid("poll interval_ms must be positive".into()));
        }
        if self.safety.hotend_min.partial_cmp(&self.safety.hotend_max) != Some(Ordering::Less) {
            return Err(ConfigError::Invalid(format!(
                "hotend_min {} must be below hotend_max {}",
                self.safety.hotend_min, self.safety.hotend_max
            )));
        }
        for (name, preset) in [("pla", self.presets.pla), ("abs", self.presets.abs)] {
            if preset.hotend > MAX_PRESET_C || preset.bed > MAX_PRESET_C {
                return Err(ConfigError::Invalid(format!(
                    "preset {} targets must be at most {} °C",
                    name, MAX_PRESET_C
                )));
            }
        }
        Ok(())
    }

    /// Settings consumed by the dispatch handlers and the synchronizer
    pub fn settings(&self) -> BridgeSettings {
        BridgeSettings {
            display: self.display.clone(),
            safety: self.safety,
            presets: self.presets,
        }
    }
}
