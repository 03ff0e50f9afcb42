//! Configuration for port-echo
//!
//! Every field has a default equal to the diagnostic's built-in constants,
//! so an empty (or absent) TOML file reproduces the stock behaviour.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Largest frame a single read may return
pub const MAX_FRAME_LEN: usize = 512;

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM6";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub echo: EchoConfig,
}

/// Serial port parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device name (e.g. "/dev/ttyUSB0", "COM6")
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound on a single blocking read
    pub read_timeout_ms: u64,
}

/// Loop behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Text written back every iteration
    pub reply: String,
    /// Pause after each write
    pub interval_ms: u64,
    /// Read size per iteration, at most [`MAX_FRAME_LEN`]
    pub frame_len: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 500,
        }
    }
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            reply: "hello".to_string(),
            interval_ms: 500,
            frame_len: MAX_FRAME_LEN,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl EchoConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.trim().is_empty() {
            return Err(Error::InvalidConfig("serial.port must not be empty".into()));
        }
        if self.serial.baud_rate == 0 {
            return Err(Error::InvalidConfig("serial.baud_rate must be > 0".into()));
        }
        if self.echo.frame_len == 0 || self.echo.frame_len > MAX_FRAME_LEN {
            return Err(Error::InvalidConfig(format!(
                "echo.frame_len must be in 1..={}, got {}",
                MAX_FRAME_LEN, self.echo.frame_len
            )));
        }
        Ok(())
    }
}
