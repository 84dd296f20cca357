//! Outbound messages for the touchscreen protocol
//!
//! Three shapes are sent to the screen:
//! - Query replies: `A<n>V <value> [...]`
//! - Notifications: `J<nn>`, one-shot overlays and state changes
//! - Listing frames: `FN`, `<handle>` / `<label>` pairs, `END`
//!
//! Everything is encoded into fixed-capacity [`Line`]s without the CRLF
//! terminator; the transport appends it when writing.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::handle::Handle;
use crate::line::Line;

// Notification codes
pub const J_PRINTING: u8 = 4;
pub const J_PAUSED: u8 = 5;
pub const J_HOTEND_FAULT: u8 = 10;
pub const J_READY: u8 = 12;
pub const J_PRINT_COMPLETE: u8 = 14;
pub const J_STOP_ACK: u8 = 16;
pub const J_RESET: u8 = 17;
pub const J_FILE_OPENED: u8 = 20;
pub const J_LIST_REFRESHED: u8 = 21;
pub const J_BUILD_VERSION: u8 = 33;

/// Rows per listing page
pub const PAGE_SIZE: usize = 4;

/// Lines in the largest listing frame: `FN`, five row pairs, `END`
pub const MAX_LISTING_LINES: usize = 2 + 2 * (PAGE_SIZE + 1);

/// Encoded listing frame
pub type ListingLines = Vec<Line, MAX_LISTING_LINES>;

/// Errors that can occur while encoding outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Encoded text does not fit in a line
    LineTooLong,
    /// Listing frame has no room for another row
    FrameFull,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::LineTooLong => f.write_str("encoded line too long"),
            EncodeError::FrameFull => f.write_str("listing frame full"),
        }
    }
}

/// One-shot notifications to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    /// A print started
    Printing,
    /// The print is paused
    Paused,
    /// Hotend temperature is implausible
    HotendFault,
    /// Printer idle, or cool-down acknowledged
    Ready,
    /// Print complete overlay
    PrintComplete,
    /// Stop acknowledged
    StopAcknowledged,
    /// Reset the screen to its boot page
    Reset,
    /// File selected and ready to print
    FileOpened,
    /// File list refreshed
    ListRefreshed,
    /// Build version follows on the next line
    BuildVersion,
}

impl Notification {
    /// Numeric code sent after the `J`
    pub const fn code(self) -> u8 {
        match self {
            Notification::Printing => J_PRINTING,
            Notification::Paused => J_PAUSED,
            Notification::HotendFault => J_HOTEND_FAULT,
            Notification::Ready => J_READY,
            Notification::PrintComplete => J_PRINT_COMPLETE,
            Notification::StopAcknowledged => J_STOP_ACK,
            Notification::Reset => J_RESET,
            Notification::FileOpened => J_FILE_OPENED,
            Notification::ListRefreshed => J_LIST_REFRESHED,
            Notification::BuildVersion => J_BUILD_VERSION,
        }
    }

    /// Encode this notification into a line
    pub fn to_line(&self) -> Result<Line, EncodeError> {
        let mut line = Line::new();
        write!(line, "J{:02}", self.code()).map_err(|_| EncodeError::LineTooLong)?;
        Ok(line)
    }
}

/// Replies to query opcodes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply<'a> {
    /// A0: hotend temperature
    HotendTemp(i32),
    /// A1: hotend target
    HotendTarget(i32),
    /// A2: bed temperature
    BedTemp(i32),
    /// A3: bed target
    BedTarget(i32),
    /// A4: part fan speed
    FanSpeed(i32),
    /// A5: toolhead position
    Position { x: f32, y: f32, z: f32 },
    /// A6: print progress in percent
    Progress(i32),
    /// A7: elapsed print time
    PrintTime { hours: u32, minutes: u32 },
    /// A20: feed rate in percent
    FeedRate(i32),
    /// Raw text line, sent after `J33`
    Text(&'a str),
}

impl Reply<'_> {
    /// Encode this reply into a line
    pub fn to_line(&self) -> Result<Line, EncodeError> {
        let mut line = Line::new();
        let result = match self {
            Reply::HotendTemp(v) => write!(line, "A0V {}", v),
            Reply::HotendTarget(v) => write!(line, "A1V {}", v),
            Reply::BedTemp(v) => write!(line, "A2V {}", v),
            Reply::BedTarget(v) => write!(line, "A3V {}", v),
            Reply::FanSpeed(v) => write!(line, "A4V {}", v),
            Reply::Position { x, y, z } => {
                write!(line, "A5V X: {:.1} Y: {:.1} Z: {:.1}", x, y, z)
            }
            Reply::Progress(v) => write!(line, "A6V {}", v),
            Reply::PrintTime { hours, minutes } => {
                write!(line, "A7V {} H {} M", hours, minutes)
            }
            Reply::FeedRate(v) => write!(line, "A20V {}", v),
            Reply::Text(text) => line.push_str(text).map_err(|_| fmt::Error),
        };
        result.map_err(|_| EncodeError::LineTooLong)?;
        Ok(line)
    }
}

/// Builder for a listing frame
///
/// ```text
/// FN
/// <menu>
/// <Special Menu>/.gcode
/// <1-f.idx>
/// part.gcode
/// END
/// ```
#[derive(Debug, Clone)]
pub struct ListingEncoder {
    lines: ListingLines,
}

impl ListingEncoder {
    /// Start a new frame
    pub fn new() -> Self {
        let mut lines = ListingLines::new();
        let mut start = Line::new();
        // Cannot fail, both capacities are far above one short line
        let _ = start.push_str("FN");
        let _ = lines.push(start);
        Self { lines }
    }

    /// Append one row
    pub fn row(&mut self, handle: Handle, label: &str) -> Result<(), EncodeError> {
        // Keep room for END
        if self.lines.len() + 3 > MAX_LISTING_LINES {
            return Err(EncodeError::FrameFull);
        }

        let mut handle_line = Line::new();
        write!(handle_line, "{}", handle).map_err(|_| EncodeError::LineTooLong)?;
        let mut label_line = Line::new();
        label_line
            .push_str(label)
            .map_err(|_| EncodeError::LineTooLong)?;

        self.lines
            .push(handle_line)
            .map_err(|_| EncodeError::FrameFull)?;
        self.lines
            .push(label_line)
            .map_err(|_| EncodeError::FrameFull)?;
        Ok(())
    }

    /// Number of rows added so far
    pub fn rows(&self) -> usize {
        (self.lines.len() - 1) / 2
    }

    /// Terminate the frame and return its lines
    pub fn finish(mut self) -> Result<ListingLines, EncodeError> {
        let mut end = Line::new();
        end.push_str("END").map_err(|_| EncodeError::LineTooLong)?;
        self.lines.push(end).map_err(|_| EncodeError::FrameFull)?;
        Ok(self.lines)
    }
}

impl Default for ListingEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::NodeHandle;

    #[test]
    fn test_notification_codes_are_two_digits() {
        assert_eq!(Notification::Printing.to_line().unwrap().as_str(), "J04");
        assert_eq!(Notification::Paused.to_line().unwrap().as_str(), "J05");
        assert_eq!(Notification::HotendFault.to_line().unwrap().as_str(), "J10");
        assert_eq!(Notification::Reset.to_line().unwrap().as_str(), "J17");
        assert_eq!(Notification::BuildVersion.to_line().unwrap().as_str(), "J33");
    }

    #[test]
    fn test_integer_replies() {
        assert_eq!(Reply::HotendTemp(205).to_line().unwrap().as_str(), "A0V 205");
        assert_eq!(Reply::BedTarget(60).to_line().unwrap().as_str(), "A3V 60");
        assert_eq!(Reply::FeedRate(100).to_line().unwrap().as_str(), "A20V 100");
        assert_eq!(Reply::HotendTemp(-5).to_line().unwrap().as_str(), "A0V -5");
    }

    #[test]
    fn test_position_reply() {
        let reply = Reply::Position {
            x: 10.04,
            y: -2.5,
            z: 0.3,
        };
        assert_eq!(
            reply.to_line().unwrap().as_str(),
            "A5V X: 10.0 Y: -2.5 Z: 0.3"
        );
    }

    #[test]
    fn test_print_time_reply() {
        let reply = Reply::PrintTime {
            hours: 999,
            minutes: 999,
        };
        assert_eq!(reply.to_line().unwrap().as_str(), "A7V 999 H 999 M");
    }

    #[test]
    fn test_text_reply_too_long() {
        let long = [b'v'; 200];
        let text = core::str::from_utf8(&long).unwrap();
        assert_eq!(Reply::Text(text).to_line(), Err(EncodeError::LineTooLong));
    }

    #[test]
    fn test_listing_frame() {
        let mut encoder = ListingEncoder::new();
        encoder.row(Handle::Menu, "<Special Menu>").unwrap();
        encoder
            .row(Handle::Node(NodeHandle::file(1)), "a.gcode")
            .unwrap();
        assert_eq!(encoder.rows(), 2);

        let lines = encoder.finish().unwrap();
        let text: Vec<&str, 8> = lines.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            text.as_slice(),
            &["FN", "<menu>", "<Special Menu>", "<1-f.idx>", "a.gcode", "END"]
        );
    }

    #[test]
    fn test_listing_frame_full() {
        let mut encoder = ListingEncoder::new();
        for i in 0..(PAGE_SIZE + 1) as u16 {
            encoder
                .row(Handle::Node(NodeHandle::file(i + 1)), "x.gcode")
                .unwrap();
        }
        assert_eq!(
            encoder.row(Handle::Back, "/.."),
            Err(EncodeError::FrameFull)
        );
        assert_eq!(encoder.finish().unwrap().len(), MAX_LISTING_LINES);
    }
}
