//! Safety monitoring
//!
//! Detects implausible telemetry and forces the error overlay.

pub mod monitor;

pub use monitor::{Fault, HotendBounds, SafetyMonitor, SafetyStatus};
