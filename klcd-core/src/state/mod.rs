//! Printer state tracking
//!
//! Telemetry arrives as immutable snapshots. The synchronizer compares each
//! one to the last and turns lifecycle changes into one-shot notifications.

pub mod machine;
pub mod snapshot;
pub mod sync;

pub use machine::{PrintState, UnknownState};
pub use snapshot::PrinterSnapshot;
pub use sync::{format_elapsed, round_to_int, StateSynchronizer, SyncNotifications};
