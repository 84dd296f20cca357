//! State shared between the read loop and the poll loop
//!
//! Bridge state and the serial writer sit behind separate mutexes. Each
//! dispatch or synchronizer cycle writes all of its lines under one writer
//! lock, so lines from different cycles never interleave.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use klcd_core::dispatch::BridgeState;
use klcd_core::traits::SerialTx;
use klcd_protocol::Line;

/// Shared bridge context
pub struct Shared<W> {
    state: Mutex<BridgeState>,
    writer: Mutex<W>,
    shutdown: Arc<AtomicBool>,
}

impl<W: SerialTx> Shared<W> {
    /// Create the shared context; `shutdown` is also set by signal handlers
    pub fn new(state: BridgeState, writer: W, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            state: Mutex::new(state),
            writer: Mutex::new(writer),
            shutdown,
        }
    }

    /// Lock the bridge state
    ///
    /// A panic in the other loop leaves the state usable, so poisoning is
    /// ignored.
    pub fn lock_state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write lines to the screen as one contiguous block
    pub fn send<I>(&self, lines: I) -> Result<(), W::Error>
    where
        I: IntoIterator<Item = Line>,
    {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            debug!("TX {}", line);
            writer.write_line(&line)?;
        }
        writer.flush()
    }

    /// Whether shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Handle on the shutdown flag
    #[cfg(test)]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Ask both loops to stop
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
