//! In-memory transports for loop tests

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use klcd_core::config::BridgeSettings;
use klcd_core::dispatch::BridgeState;
use klcd_core::traits::{SerialRx, SerialTx};

use crate::shared::Shared;

/// Receiver that replays chunks, then requests shutdown
pub struct MemoryRx {
    chunks: VecDeque<Vec<u8>>,
    shutdown: Arc<AtomicBool>,
    fail: bool,
}

impl MemoryRx {
    pub fn new(chunks: &[&[u8]], shutdown: Arc<AtomicBool>) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            shutdown,
            fail: false,
        }
    }

    /// Receiver whose first read fails
    pub fn failing() -> Self {
        Self {
            chunks: VecDeque::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            fail: true,
        }
    }
}

impl SerialRx for MemoryRx {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
        }
        let Some(mut chunk) = self.chunks.pop_front() else {
            self.shutdown.store(true, Ordering::Relaxed);
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

/// Transmitter that appends to a shared buffer
#[derive(Clone, Default)]
pub struct MemoryTx {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryTx {
    /// Everything written so far, split into lines
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.bytes.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .split_terminator("\r\n")
            .map(String::from)
            .collect()
    }
}

impl SerialTx for MemoryTx {
    type Error = io::Error;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.bytes.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Shared context over an in-memory writer with default settings
pub fn shared() -> (Shared<MemoryTx>, MemoryTx) {
    let output = MemoryTx::default();
    let shared = Shared::new(
        BridgeState::new(BridgeSettings::default()),
        output.clone(),
        Arc::new(AtomicBool::new(false)),
    );
    (shared, output)
}
