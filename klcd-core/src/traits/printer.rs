//! Printer backend capability
//!
//! Every control and query operation the screen can trigger goes through
//! this trait, so the dispatch logic never talks to a concrete backend.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use klcd_protocol::{Axis, AxisMove};

use crate::state::PrinterSnapshot;

/// Errors reported by a printer backend
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrinterError {
    /// Backend could not be reached
    Unreachable,
    /// Backend answered with an error status
    Status(u16),
    /// Backend answered with something that could not be decoded
    InvalidResponse,
    /// Backend refused the request
    Rejected(String),
}

impl fmt::Display for PrinterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterError::Unreachable => f.write_str("printer backend unreachable"),
            PrinterError::Status(code) => write!(f, "printer backend returned status {}", code),
            PrinterError::InvalidResponse => f.write_str("invalid response from printer backend"),
            PrinterError::Rejected(reason) => write!(f, "printer backend rejected request: {}", reason),
        }
    }
}

/// Query and control operations of a printer backend
///
/// Temperatures are in degrees Celsius, percentages are 0-100.
pub trait PrinterClient {
    /// Fetch a fresh telemetry snapshot
    fn snapshot(&mut self) -> Result<PrinterSnapshot, PrinterError>;

    /// Fetch the printable file paths, `/`-delimited, in backend order
    fn file_list(&mut self) -> Result<Vec<String>, PrinterError>;

    /// Set the hotend target temperature
    fn set_hotend_target(&mut self, celsius: u32) -> Result<(), PrinterError>;

    /// Set the bed target temperature
    fn set_bed_target(&mut self, celsius: u32) -> Result<(), PrinterError>;

    /// Set the part fan speed
    fn set_fan_speed(&mut self, percent: u32) -> Result<(), PrinterError>;

    /// Set the feed rate override
    fn set_feed_rate(&mut self, percent: u32) -> Result<(), PrinterError>;

    /// Home one axis, or all axes when `axis` is `None`
    fn home(&mut self, axis: Option<Axis>) -> Result<(), PrinterError>;

    /// Move one axis relative to its current position
    fn move_relative(&mut self, movement: AxisMove) -> Result<(), PrinterError>;

    /// Disable all stepper motors
    fn disable_motors(&mut self) -> Result<(), PrinterError>;

    /// Start printing a file by its backend path
    fn start_print(&mut self, path: &str) -> Result<(), PrinterError>;

    /// Pause the running print
    fn pause(&mut self) -> Result<(), PrinterError>;

    /// Resume a paused print
    fn resume(&mut self) -> Result<(), PrinterError>;

    /// Cancel the running print
    fn cancel(&mut self) -> Result<(), PrinterError>;
}
