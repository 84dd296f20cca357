//! Safety monitor implementation
//!
//! A hotend reading outside the plausible range usually means a broken
//! thermistor or wiring. The check runs on every snapshot, independent of
//! the reported lifecycle state.

use crate::state::PrinterSnapshot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default plausibility bounds (°C)
pub const HOTEND_MIN_C: f32 = 0.0;
pub const HOTEND_MAX_C: f32 = 300.0;

/// Fault conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Hotend temperature outside the plausible range
    HotendImplausible,
}

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(Fault),
}

/// Plausible hotend temperature range, inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HotendBounds {
    /// Lowest plausible reading (°C)
    pub hotend_min: f32,
    /// Highest plausible reading (°C)
    pub hotend_max: f32,
}

impl Default for HotendBounds {
    fn default() -> Self {
        Self {
            hotend_min: HOTEND_MIN_C,
            hotend_max: HOTEND_MAX_C,
        }
    }
}

impl HotendBounds {
    /// Check if a reading is plausible (NaN never is)
    pub fn contains(&self, celsius: f32) -> bool {
        celsius >= self.hotend_min && celsius <= self.hotend_max
    }
}

/// Safety monitor for telemetry snapshots
#[derive(Debug, Clone, Default)]
pub struct SafetyMonitor {
    bounds: HotendBounds,
}

impl SafetyMonitor {
    /// Create a monitor with the given bounds
    pub fn new(bounds: HotendBounds) -> Self {
        Self { bounds }
    }

    /// Configured bounds
    pub fn bounds(&self) -> HotendBounds {
        self.bounds
    }

    /// Check a snapshot
    ///
    /// A snapshot without a hotend reading is not checked.
    pub fn check(&self, snapshot: &PrinterSnapshot) -> SafetyStatus {
        match snapshot.hotend {
            Some(celsius) if !self.bounds.contains(celsius) => {
                SafetyStatus::Fault(Fault::HotendImplausible)
            }
            _ => SafetyStatus::Ok,
        }
    }
}
