//! Transport layer: the minimal capability the echo loop needs from a port

use crate::error::Result;

mod mock;
mod serial;

pub use mock::{MockRead, MockTransport, MockWrite};
pub use serial::{PortSummary, SerialTransport, list_ports};

/// Byte channel the echo loop drives
pub trait Transport: Send {
    /// Read up to `buffer.len()` bytes, blocking at most the port's read timeout.
    ///
    /// Returns `Ok(0)` when nothing arrived before the timeout.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write the whole of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Block until pending writes have been handed to the device
    fn flush(&mut self) -> Result<()>;

    /// Port identifier, for logging
    fn name(&self) -> &str;
}
