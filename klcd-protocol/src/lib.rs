//! Touchscreen serial protocol
//!
//! This crate defines the line-oriented ASCII protocol spoken between a
//! DGUS-style printer touchscreen and the host that drives it.
//!
//! # Protocol Overview
//!
//! Every message is a single ASCII line terminated by CRLF:
//! ```text
//! screen → host   A<digits> [parameters]        e.g. "A8 S4", "A22 X-10.0 F3000"
//! host → screen   A<digits>V <value> [...]      query reply, e.g. "A0V 205"
//! host → screen   J<two digits>                 notification, e.g. "J04"
//! host → screen   FN / <handle> / <name> ... / END   file listing frame
//! ```
//!
//! The screen is a "dumb terminal": it only reports button presses and asks
//! for values. All menu state and printer logic stays on the host.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod handle;
pub mod line;
pub mod messages;

pub use command::{ArgKind, Axis, AxisMove, CommandFrame, Opcode, ParseError, ParsedArg, Token};
pub use handle::{Handle, HandleError, NodeHandle, NodeKind};
pub use line::{line_from, Line, LineError, LineParser, LINE_TERMINATOR, MAX_LINE_LEN};
pub use messages::{EncodeError, ListingEncoder, ListingLines, Notification, Reply, PAGE_SIZE};
