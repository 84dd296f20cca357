//! Test doubles
//!
//! Enabled for downstream crates with the `testing` feature.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use klcd_protocol::{Axis, AxisMove};

use crate::state::PrinterSnapshot;
use crate::traits::{PrinterClient, PrinterError};

/// Printer backend that records every call
#[derive(Debug, Default)]
pub struct FakePrinter {
    pub calls: Vec<String>,
    pub files: Vec<String>,
    pub snapshot: PrinterSnapshot,
    pub offline: bool,
}

impl FakePrinter {
    /// Online printer that lists `files`
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| String::from(*f)).collect(),
            ..Default::default()
        }
    }

    fn record(&mut self, call: String) -> Result<(), PrinterError> {
        if self.offline {
            return Err(PrinterError::Unreachable);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl PrinterClient for FakePrinter {
    fn snapshot(&mut self) -> Result<PrinterSnapshot, PrinterError> {
        self.record(String::from("snapshot"))?;
        Ok(self.snapshot.clone())
    }

    fn file_list(&mut self) -> Result<Vec<String>, PrinterError> {
        self.record(String::from("file_list"))?;
        Ok(self.files.clone())
    }

    fn set_hotend_target(&mut self, celsius: u32) -> Result<(), PrinterError> {
        self.record(format!("hotend {}", celsius))
    }

    fn set_bed_target(&mut self, celsius: u32) -> Result<(), PrinterError> {
        self.record(format!("bed {}", celsius))
    }

    fn set_fan_speed(&mut self, percent: u32) -> Result<(), PrinterError> {
        self.record(format!("fan {}", percent))
    }

    fn set_feed_rate(&mut self, percent: u32) -> Result<(), PrinterError> {
        self.record(format!("feed {}", percent))
    }

    fn home(&mut self, axis: Option<Axis>) -> Result<(), PrinterError> {
        match axis {
            Some(axis) => self.record(format!("home {}", axis.letter())),
            None => self.record(String::from("home all")),
        }
    }

    fn move_relative(&mut self, movement: AxisMove) -> Result<(), PrinterError> {
        self.record(format!(
            "move {} {} F{}",
            movement.axis.letter(),
            movement.distance,
            movement.feed
        ))
    }

    fn disable_motors(&mut self) -> Result<(), PrinterError> {
        self.record(String::from("motors off"))
    }

    fn start_print(&mut self, path: &str) -> Result<(), PrinterError> {
        self.record(format!("start {}", path))
    }

    fn pause(&mut self) -> Result<(), PrinterError> {
        self.record(String::from("pause"))
    }

    fn resume(&mut self) -> Result<(), PrinterError> {
        self.record(String::from("resume"))
    }

    fn cancel(&mut self) -> Result<(), PrinterError> {
        self.record(String::from("cancel"))
    }
}
