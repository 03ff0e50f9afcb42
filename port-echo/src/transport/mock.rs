//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// One scripted outcome of a `read` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRead {
    /// Bytes delivered by the peer; anything beyond the caller's buffer stays queued
    Data(Vec<u8>),
    /// Nothing arrived before the timeout
    Timeout,
    /// Transport failure (e.g. device unplugged)
    Fail(io::ErrorKind),
}

/// A recorded write
#[derive(Debug, Clone)]
pub struct MockWrite {
    pub data: Vec<u8>,
    pub at: Instant,
}

/// Mock transport for unit testing
///
/// Clones share state, so a test can keep one handle for inspection while the
/// loop owns another. Reads past the end of the script behave like timeouts.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    reads: VecDeque<MockRead>,
    writes: Vec<MockWrite>,
    write_failure: Option<io::ErrorKind>,
    read_calls: usize,
    flushes: usize,
    stop: Option<(usize, Arc<AtomicBool>)>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                reads: VecDeque::new(),
                writes: Vec::new(),
                write_failure: None,
                read_calls: 0,
                flushes: 0,
                stop: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue bytes for a future read
    pub fn inject_read(&self, data: &[u8]) {
        self.lock().reads.push_back(MockRead::Data(data.to_vec()));
    }

    /// Queue a read that times out with no data
    pub fn inject_timeout(&self) {
        self.lock().reads.push_back(MockRead::Timeout);
    }

    /// Queue a read that fails with `kind`
    pub fn inject_read_error(&self, kind: io::ErrorKind) {
        self.lock().reads.push_back(MockRead::Fail(kind));
    }

    /// Make every subsequent write fail with `kind`
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        self.lock().write_failure = Some(kind);
    }

    /// Clear `running` once `count` writes have been recorded
    pub fn stop_after_writes(&self, count: usize, running: Arc<AtomicBool>) {
        self.lock().stop = Some((count, running));
    }

    /// All recorded writes, oldest first
    pub fn writes(&self) -> Vec<MockWrite> {
        self.lock().writes.clone()
    }

    /// All written bytes, concatenated
    pub fn get_written(&self) -> Vec<u8> {
        self.lock()
            .writes
            .iter()
            .flat_map(|w| w.data.iter().copied())
            .collect()
    }

    pub fn read_calls(&self) -> usize {
        self.lock().read_calls
    }

    pub fn flushes(&self) -> usize {
        self.lock().flushes
    }

    /// Scripted reads not yet consumed
    pub fn pending_reads(&self) -> usize {
        self.lock().reads.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.lock();
        inner.read_calls += 1;

        match inner.reads.pop_front() {
            None | Some(MockRead::Timeout) => Ok(0),
            Some(MockRead::Fail(kind)) => {
                Err(io::Error::new(kind, "mock transport read failure").into())
            }
            Some(MockRead::Data(mut data)) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    inner.reads.push_front(MockRead::Data(rest));
                }
                Ok(n)
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if let Some(kind) = inner.write_failure {
            return Err(io::Error::new(kind, "mock transport write failure").into());
        }

        inner.writes.push(MockWrite {
            data: data.to_vec(),
            at: Instant::now(),
        });

        let written = inner.writes.len();
        if let Some((count, running)) = &inner.stop {
            if written >= *count {
                running.store(false, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
