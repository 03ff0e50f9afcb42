//! port-echo - serial port diagnostic
//!
//! Opens one port, then repeatedly reads up to 512 bytes, decodes whatever
//! arrived as a little-endian unsigned integer, writes a fixed reply and
//! sleeps before the next round.
//!
//! The loop talks to the port through [`transport::Transport`], so tests can
//! drive it with [`transport::MockTransport`] instead of real hardware.

pub mod config;
pub mod decode;
pub mod echo;
pub mod error;
pub mod frame;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use echo::{IterationReport, PortEchoLoop, RunStats};
pub use error::{Error, Result};
