//! Bridge activities
//!
//! The read loop dispatches screen commands; the poll loop feeds printer
//! snapshots to the synchronizer. Both run on their own thread and stop
//! when the shared shutdown flag is set.

use std::io;

use thiserror::Error;

use klcd_core::dispatch::RegistryError;

use crate::config::ConfigError;
use crate::serial::SerialPortError;

pub mod poll_loop;
pub mod read_loop;

#[cfg(test)]
pub(crate) mod testing;

pub use poll_loop::run_poll_loop;
pub use read_loop::run_read_loop;

/// Fatal bridge errors
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Serial(#[from] SerialPortError),
    #[error("failed to build handler table: {0}")]
    Registry(RegistryError),
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{0} thread panicked")]
    Panicked(&'static str),
    #[error("serial transport failed: {0}")]
    Transport(#[source] io::Error),
}
