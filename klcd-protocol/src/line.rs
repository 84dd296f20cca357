//! Line assembly for the touchscreen protocol.
//!
//! Line format:
//! - ASCII text, at most [`MAX_LINE_LEN`] bytes
//! - terminated by CRLF (a bare LF is accepted on input)
//!
//! Blank lines are skipped. A line that overflows the buffer is reported
//! once and the rest of it is discarded up to the next terminator.

use core::fmt;

use heapless::{String, Vec};

/// Maximum line length in bytes, excluding the terminator
pub const MAX_LINE_LEN: usize = 128;

/// Terminator appended to every outbound line
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// A single protocol line without its terminator
pub type Line = String<MAX_LINE_LEN>;

/// Errors that can occur while assembling lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// No terminator within `MAX_LINE_LEN` bytes
    TooLong,
    /// Line is not valid UTF-8
    InvalidUtf8,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::TooLong => write!(f, "line longer than {} bytes", MAX_LINE_LEN),
            LineError::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
        }
    }
}

/// Build a [`Line`] from text, failing if it does not fit
pub fn line_from(text: &str) -> Result<Line, LineError> {
    let mut line = Line::new();
    line.push_str(text).map_err(|_| LineError::TooLong)?;
    Ok(line)
}

/// State machine for splitting a byte stream into lines
#[derive(Debug, Clone)]
pub struct LineParser {
    state: ParseState,
    buffer: Vec<u8, MAX_LINE_LEN>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Collecting bytes of the current line
    Collecting,
    /// Skipping the tail of an overlong line
    Discarding,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Create a new line parser
    pub fn new() -> Self {
        Self {
            state: ParseState::Collecting,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state, dropping any partial line
    pub fn reset(&mut self) {
        self.state = ParseState::Collecting;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(line))` when a complete non-blank line is available,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current line
    /// had to be dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match self.state {
            ParseState::Collecting => {
                if byte == b'\n' {
                    return self.take_line();
                }
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = ParseState::Discarding;
                    return Err(LineError::TooLong);
                }
                Ok(None)
            }
            ParseState::Discarding => {
                if byte == b'\n' {
                    self.state = ParseState::Collecting;
                }
                Ok(None)
            }
        }
    }

    /// Convert the buffered bytes into a line and clear the buffer
    fn take_line(&mut self) -> Result<Option<Line>, LineError> {
        let result = match core::str::from_utf8(&self.buffer) {
            Ok(text) => {
                let text = text.trim_end_matches('\r');
                if text.trim().is_empty() {
                    Ok(None)
                } else {
                    line_from(text).map(Some)
                }
            }
            Err(_) => Err(LineError::InvalidUtf8),
        };
        self.buffer.clear();
        result
    }
}
