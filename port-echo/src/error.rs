//! Error types for port-echo

use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// port-echo error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The port could not be opened (missing, busy, or no permission)
    #[error("Port {port} unavailable: {source}")]
    PortUnavailable {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Read, write or flush failed after the port was opened
    #[error("Port I/O error: {0}")]
    PortIo(#[from] std::io::Error),

    /// Port enumeration failed
    #[error("Failed to list serial ports: {0}")]
    PortList(#[source] serialport::Error),

    /// Configuration file could not be read
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::Config`]
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures that happened before the loop was entered
    pub fn is_startup(&self) -> bool {
        !matches!(self, Error::PortIo(_))
    }
}
