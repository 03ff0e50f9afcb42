//! The read, decode, reply, pace loop
//!
//! One iteration:
//!
//! ```text
//! read ≤ frame_len bytes (bounded by the port timeout)
//!   → decode little-endian if non-empty, else keep the last value
//!   → report the raw frame and value
//!   → write the reply and flush
//!   → sleep for the pacing interval
//! ```
//!
//! A read timeout is an empty frame, not an error. Any other transport error
//! ends the loop and is returned to the caller untouched.

use crate::config::{EchoConfig, MAX_FRAME_LEN};
use crate::decode::ValueTracker;
use crate::error::Result;
use crate::frame::hex_line;
use crate::transport::Transport;
use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// A frame as seen by the operator, before the reply goes out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    /// Zero-based iteration index
    pub index: u64,
    /// Raw bytes read this iteration (empty on timeout)
    pub frame: Vec<u8>,
    /// Decoded value after this iteration
    pub value: BigUint,
    /// False when the frame was empty and `value` was carried over
    pub value_updated: bool,
}

/// Totals for a run that ended through its stop flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Iterations whose reply was written
    pub iterations: u64,
    pub frames_received: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Drives one exclusively owned port
pub struct PortEchoLoop<T: Transport> {
    transport: T,
    config: EchoConfig,
    tracker: ValueTracker,
    buffer: Vec<u8>,
    stats: RunStats,
}

impl<T: Transport> PortEchoLoop<T> {
    pub fn new(transport: T, config: EchoConfig) -> Self {
        let frame_len = config.frame_len.clamp(1, MAX_FRAME_LEN);
        Self {
            transport,
            config,
            tracker: ValueTracker::new(),
            buffer: vec![0u8; frame_len],
            stats: RunStats::default(),
        }
    }

    /// Current decoded value (zero until the first non-empty frame)
    pub fn value(&self) -> &BigUint {
        self.tracker.value()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Read and decode one frame
    fn receive(&mut self) -> Result<IterationReport> {
        let n = self.transport.read(&mut self.buffer)?;
        let frame = self.buffer[..n].to_vec();

        let value_updated = self.tracker.update(&frame);
        if n > 0 {
            log::debug!("Received {} bytes: {}", n, hex_line(&frame));
            self.stats.frames_received += 1;
            self.stats.bytes_read += n as u64;
        }

        Ok(IterationReport {
            index: self.stats.iterations,
            frame,
            value: self.tracker.value().clone(),
            value_updated,
        })
    }

    /// Write the reply and flush it
    fn reply(&mut self) -> Result<()> {
        let reply = self.config.reply.as_bytes();
        self.transport.write_all(reply)?;
        self.transport.flush()?;
        self.stats.bytes_written += reply.len() as u64;
        Ok(())
    }

    /// One iteration without pacing: read, hand the frame to `on_frame`, reply
    ///
    /// `on_frame` runs before the write, so a frame is reported even when the
    /// reply then fails.
    pub fn step<F>(&mut self, mut on_frame: F) -> Result<IterationReport>
    where
        F: FnMut(&IterationReport),
    {
        let report = self.receive()?;
        on_frame(&report);
        self.reply()?;
        self.stats.iterations += 1;
        Ok(report)
    }

    /// Run until `running` is cleared or the transport fails
    ///
    /// The flag is checked before each read, so clearing it never cuts an
    /// iteration short.
    pub fn run<F>(&mut self, running: &AtomicBool, mut on_frame: F) -> Result<RunStats>
    where
        F: FnMut(&IterationReport),
    {
        log::info!(
            "Echo loop started on {} (reply {:?}, interval {:?})",
            self.transport.name(),
            self.config.reply,
            self.config.interval()
        );

        while running.load(Ordering::SeqCst) {
            if let Err(e) = self.step(&mut on_frame) {
                log::error!(
                    "Echo loop on {} failed after {} iterations: {}",
                    self.transport.name(),
                    self.stats.iterations,
                    e
                );
                return Err(e);
            }
            thread::sleep(self.config.interval());
        }

        log::info!(
            "Echo loop stopped after {} iterations ({} frames, {} bytes in, {} bytes out)",
            self.stats.iterations,
            self.stats.frames_received,
            self.stats.bytes_read,
            self.stats.bytes_written
        );
        Ok(self.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn fast_config() -> EchoConfig {
        EchoConfig {
            interval_ms: 0,
            ..EchoConfig::default()
        }
    }

    #[test]
    fn test_step_decodes_and_replies() {
        let mock = MockTransport::new();
        mock.inject_read(&[0x01, 0x00]);
        let mut echo = PortEchoLoop::new(mock.clone(), fast_config());

        let report = echo.step(|_| {}).unwrap();
        assert_eq!(report.index, 0);
        assert_eq!(report.frame, vec![0x01, 0x00]);
        assert_eq!(report.value, BigUint::from(1u8));
        assert!(report.value_updated);
        assert_eq!(mock.get_written(), b"hello");
        assert_eq!(mock.flushes(), 1);
    }

    #[test]
    fn test_empty_read_keeps_value_and_still_replies() {
        let mock = MockTransport::new();
        mock.inject_read(&[0xFF, 0xFF]);
        mock.inject_timeout();
        let mut echo = PortEchoLoop::new(mock.clone(), fast_config());

        assert_eq!(echo.step(|_| {}).unwrap().value, BigUint::from(65_535u32));

        let report = echo.step(|_| {}).unwrap();
        assert!(report.frame.is_empty());
        assert!(!report.value_updated);
        assert_eq!(report.value, BigUint::from(65_535u32));
        assert_eq!(mock.get_written(), b"hellohello");
    }

    #[test]
    fn test_read_is_capped_at_frame_len() {
        let mock = MockTransport::new();
        mock.inject_read(&[0xAA; 600]);
        let mut echo = PortEchoLoop::new(mock.clone(), fast_config());

        assert_eq!(echo.step(|_| {}).unwrap().frame.len(), MAX_FRAME_LEN);
        assert_eq!(echo.step(|_| {}).unwrap().frame.len(), 600 - MAX_FRAME_LEN);
    }

    #[test]
    fn test_frame_reported_before_failed_reply() {
        let mock = MockTransport::new();
        mock.inject_read(&[0x2A, 0x00]);
        mock.fail_writes(std::io::ErrorKind::NotConnected);
        let mut echo = PortEchoLoop::new(mock.clone(), fast_config());

        let mut seen = Vec::new();
        let result = echo.step(|r| seen.push((r.frame.clone(), r.value.clone())));

        assert!(result.is_err());
        assert_eq!(seen, vec![(vec![0x2A, 0x00], BigUint::from(42u8))]);
        assert_eq!(echo.stats().iterations, 0);
        assert_eq!(echo.stats().frames_received, 1);
        assert_eq!(echo.stats().bytes_written, 0);
    }

    #[test]
    fn test_custom_reply() {
        let mock = MockTransport::new();
        let config = EchoConfig {
            reply: "pong".to_string(),
            ..fast_config()
        };
        let mut echo = PortEchoLoop::new(mock.clone(), config);

        echo.step(|_| {}).unwrap();
        assert_eq!(mock.get_written(), b"pong");
    }

    #[test]
    fn test_stats_accumulate() {
        let mock = MockTransport::new();
        mock.inject_read(&[1, 2, 3]);
        mock.inject_timeout();
        mock.inject_read(&[4]);
        let mut echo = PortEchoLoop::new(mock, fast_config());

        for _ in 0..3 {
            echo.step(|_| {}).unwrap();
        }
        assert_eq!(
            *echo.stats(),
            RunStats {
                iterations: 3,
                frames_received: 2,
                bytes_read: 4,
                bytes_written: 15,
            }
        );
    }
}
