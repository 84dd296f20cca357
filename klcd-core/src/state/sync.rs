//! State synchronizer
//!
//! Holds the last snapshot and compares each new one against it:
//!
//! 1. Safety check: an implausible hotend reading emits the fault overlay
//!    and overrides the reported state with `Error` for this cycle.
//! 2. Transition check: if the (effective) state changed, emit the entry
//!    notifications of the new state exactly once.
//! 3. The new snapshot, with its effective state, replaces the old one.
//!
//! The first snapshot counts as a transition from nothing.

use heapless::Vec;
use klcd_protocol::Notification;

use super::machine::PrintState;
use super::snapshot::PrinterSnapshot;
use crate::safety::{HotendBounds, SafetyMonitor, SafetyStatus};

/// Notifications from one update: the fault overlay plus at most two
/// entry notifications
pub type SyncNotifications = Vec<Notification, 3>;

/// Sentinel time reported when the elapsed time is unknown
pub const UNKNOWN_TIME: (u32, u32) = (999, 999);

/// Tracks printer telemetry and derives screen notifications
#[derive(Debug, Clone, Default)]
pub struct StateSynchronizer {
    previous: Option<PrinterSnapshot>,
    /// State the backend reported before any safety override
    reported: PrintState,
    monitor: SafetyMonitor,
}

impl StateSynchronizer {
    /// Create a synchronizer with no snapshot yet
    pub fn new(bounds: HotendBounds) -> Self {
        Self {
            previous: None,
            reported: PrintState::Standby,
            monitor: SafetyMonitor::new(bounds),
        }
    }

    /// Latest snapshot, with its effective state
    pub fn latest(&self) -> Option<&PrinterSnapshot> {
        self.previous.as_ref()
    }

    /// Effective state of the latest snapshot (`Standby` before the first)
    pub fn state(&self) -> PrintState {
        self.previous
            .as_ref()
            .map(|snapshot| snapshot.state)
            .unwrap_or_default()
    }

    /// State the backend reported for the latest snapshot
    ///
    /// Differs from [`state`](Self::state) while a safety fault overrides
    /// it with `Error`.
    pub fn reported_state(&self) -> PrintState {
        self.reported
    }

    /// Read a numeric field of the latest snapshot, `0.0` if never populated
    pub fn value(&self, field: fn(&PrinterSnapshot) -> Option<f32>) -> f32 {
        self.previous.as_ref().and_then(field).unwrap_or(0.0)
    }

    /// Process a fresh snapshot and return the notifications to send
    pub fn update(&mut self, snapshot: PrinterSnapshot) -> SyncNotifications {
        let mut out = SyncNotifications::new();
        self.reported = snapshot.state;

        let snapshot = match self.monitor.check(&snapshot) {
            SafetyStatus::Fault(_) => {
                let _ = out.push(Notification::HotendFault);
                snapshot.with_state(PrintState::Error)
            }
            SafetyStatus::Ok => snapshot,
        };

        let changed = self
            .previous
            .as_ref()
            .map_or(true, |previous| previous.state != snapshot.state);
        if changed {
            for notification in snapshot.state.entry_notifications() {
                let _ = out.push(*notification);
            }
        }

        self.previous = Some(snapshot);
        out
    }
}

/// Round to the nearest integer, halves away from zero
///
/// Saturates at the `i32` range; NaN becomes 0.
pub fn round_to_int(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

/// Split a duration into whole hours and minutes
///
/// Exactly zero means the backend has no time yet and maps to
/// `(999, 999)`. Negative and NaN durations count as zero seconds elapsed.
pub fn format_elapsed(seconds: f32) -> (u32, u32) {
    if seconds == 0.0 {
        return UNKNOWN_TIME;
    }
    // Float to int casts saturate
    let minutes = seconds as u32 / 60;
    (minutes / 60, minutes % 60)
}
