//! Dispatch error types

use core::fmt;

use klcd_protocol::{EncodeError, Handle, HandleError, Opcode};

use crate::files::BrowseError;
use crate::state::PrintState;
use crate::traits::PrinterError;

/// Errors raised by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerError {
    /// The command needs a parameter that was not sent
    MissingArgument,
    /// Print start requested without a selected file
    NoFileSelected,
    /// Handle does not match anything in the file tree
    UnknownHandle(Handle),
    /// Handle text could not be parsed
    InvalidHandle(HandleError),
    /// Homing requested for an unknown axis
    InvalidAxis,
    /// Not allowed in the current print state
    Refused(PrintState),
    /// The printer backend failed
    Printer(PrinterError),
    /// A reply could not be encoded
    Encode(EncodeError),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::MissingArgument => f.write_str("missing parameter"),
            HandlerError::NoFileSelected => f.write_str("no file selected"),
            HandlerError::UnknownHandle(handle) => write!(f, "unknown handle {}", handle),
            HandlerError::InvalidHandle(e) => write!(f, "invalid handle: {}", e),
            HandlerError::InvalidAxis => f.write_str("invalid axis"),
            HandlerError::Refused(state) => write!(f, "refused while {:?}", state),
            HandlerError::Printer(e) => write!(f, "{}", e),
            HandlerError::Encode(e) => write!(f, "{}", e),
        }
    }
}

impl From<PrinterError> for HandlerError {
    fn from(e: PrinterError) -> Self {
        HandlerError::Printer(e)
    }
}

impl From<EncodeError> for HandlerError {
    fn from(e: EncodeError) -> Self {
        HandlerError::Encode(e)
    }
}

impl From<HandleError> for HandlerError {
    fn from(e: HandleError) -> Self {
        HandlerError::InvalidHandle(e)
    }
}

impl From<BrowseError> for HandlerError {
    fn from(e: BrowseError) -> Self {
        match e {
            BrowseError::UnknownHandle(handle) => HandlerError::UnknownHandle(handle),
        }
    }
}

/// Errors from dispatching a frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// No handler registered for the opcode
    UnknownOpcode(Opcode),
    /// The handler failed; its output was discarded
    Handler {
        opcode: Opcode,
        source: HandlerError,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownOpcode(opcode) => write!(f, "no handler for {}", opcode),
            DispatchError::Handler { opcode, source } => write!(f, "{} failed: {}", opcode, source),
        }
    }
}

/// Errors from building a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Opcode registered twice
    Duplicate(Opcode),
    /// No room for another handler
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Duplicate(opcode) => write!(f, "{} registered twice", opcode),
            RegistryError::Full => f.write_str("handler registry full"),
        }
    }
}
