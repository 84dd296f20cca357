//! Printer telemetry snapshot

use alloc::string::String;

use super::machine::PrintState;

/// Point-in-time capture of printer telemetry
///
/// Replaced wholesale on every poll, never patched. `None` means the
/// backend did not report the field.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrinterSnapshot {
    /// Hotend temperature (°C)
    pub hotend: Option<f32>,
    /// Hotend target (°C)
    pub hotend_target: Option<f32>,
    /// Bed temperature (°C)
    pub bed: Option<f32>,
    /// Bed target (°C)
    pub bed_target: Option<f32>,
    /// Part fan speed (%)
    pub fan: Option<f32>,
    /// Lifecycle state
    pub state: PrintState,
    /// Print progress (%)
    pub progress: Option<f32>,
    /// Time spent actually printing (s)
    pub print_duration: Option<f32>,
    /// Time since the job started, including pauses (s)
    pub total_duration: Option<f32>,
    /// Estimated time left (s)
    pub remaining: Option<f32>,
    /// Feed rate override (%)
    pub feed_rate: Option<f32>,
    /// Flow rate override (%)
    pub flow_rate: Option<f32>,
    /// Toolhead X (mm)
    pub x: Option<f32>,
    /// Toolhead Y (mm)
    pub y: Option<f32>,
    /// Toolhead Z (mm)
    pub z: Option<f32>,
    /// Z offset (mm)
    pub z_offset: Option<f32>,
    /// Maximum velocity (mm/s)
    pub max_velocity: Option<f32>,
    /// Maximum acceleration (mm/s²)
    pub max_accel: Option<f32>,
    /// Minimum cruise ratio
    pub minimum_cruise_ratio: Option<f32>,
    /// Square corner velocity (mm/s)
    pub square_corner_velocity: Option<f32>,
    /// File being printed
    pub file_name: Option<String>,
}

impl PrinterSnapshot {
    /// Same snapshot with a different lifecycle state
    pub fn with_state(self, state: PrintState) -> Self {
        Self { state, ..self }
    }
}
