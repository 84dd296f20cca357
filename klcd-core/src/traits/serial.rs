//! Serial link abstractions
//!
//! Blocking byte-stream traits implemented by the bridge for a tty and by
//! tests for in-memory buffers.

use klcd_protocol::line::LINE_TERMINATOR;

/// Serial transmitter
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Write all bytes
    ///
    /// Blocks until everything has been written or an error occurs.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write one protocol line followed by CRLF
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.write_all(line.as_bytes())?;
        self.write_all(LINE_TERMINATOR)
    }
}

/// Serial receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Read available bytes into `buf`
    ///
    /// Blocks for at most the transport's read timeout. Returns `Ok(0)` when
    /// the timeout expired without data, so callers can check for shutdown.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}
