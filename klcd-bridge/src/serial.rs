//! Screen serial port
//!
//! Opens the tty in raw mode with a one second read timeout so the read
//! loop wakes up regularly to check for shutdown. The original terminal
//! settings are restored when the port is dropped.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use log::debug;
use nix::sys::termios::{self, BaudRate, ControlFlags, SetArg, SpecialCharacterIndices, Termios};
use thiserror::Error;

use klcd_core::traits::{SerialRx, SerialTx};

/// Read timeout in tenths of a second
const READ_TIMEOUT_DECIS: u8 = 10;

/// Errors opening the serial port
#[derive(Debug, Error)]
pub enum SerialPortError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure {}: {source}", path.display())]
    Configure {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },
    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),
    #[error("failed to clone serial port handle: {0}")]
    Clone(#[source] io::Error),
}

fn baud_rate(baud: u32) -> Option<BaudRate> {
    let rate = match baud {
        9600 => BaudRate::B9600,
        19200 => BaudRate::B19200,
        38400 => BaudRate::B38400,
        57600 => BaudRate::B57600,
        115200 => BaudRate::B115200,
        230400 => BaudRate::B230400,
        460800 => BaudRate::B460800,
        921600 => BaudRate::B921600,
        _ => return None,
    };
    Some(rate)
}

/// Raw-mode tty connected to the screen
///
/// Receives through [`SerialRx`]; transmit handles come from
/// [`SerialPort::writer`].
pub struct SerialPort {
    file: File,
    original: Termios,
}

impl SerialPort {
    /// Open `path` raw at `baud`
    pub fn open(path: &Path, baud: u32) -> Result<Self, SerialPortError> {
        let speed = baud_rate(baud).ok_or(SerialPortError::UnsupportedBaud(baud))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(nix::libc::O_NOCTTY)
            .open(path)
            .map_err(|source| SerialPortError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let configure = |source| SerialPortError::Configure {
            path: path.to_path_buf(),
            source,
        };

        let original = termios::tcgetattr(&file).map_err(configure)?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::cfsetspeed(&mut raw, speed).map_err(configure)?;
        raw.control_flags |= ControlFlags::CLOCAL | ControlFlags::CREAD;
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = READ_TIMEOUT_DECIS;
        termios::tcsetattr(&file, SetArg::TCSANOW, &raw).map_err(configure)?;

        debug!("Opened {} at {} baud", path.display(), baud);
        Ok(Self { file, original })
    }

    /// Independent transmit handle on the same tty
    pub fn writer(&self) -> Result<SerialWriter, SerialPortError> {
        let file = self.file.try_clone().map_err(SerialPortError::Clone)?;
        Ok(SerialWriter { file })
    }
}

impl Drop for SerialPort {
    fn drop(&mut self) {
        let _ = termios::tcsetattr(&self.file, SetArg::TCSANOW, &self.original);
    }
}

impl SerialRx for SerialPort {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.file.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

/// Transmit half of a [`SerialPort`]
pub struct SerialWriter {
    file: File,
}

impl SerialTx for SerialWriter {
    type Error = io::Error;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
