//! Capability traits
//!
//! These traits define the interface between the bridge logic and the
//! outside world: the printer backend and the serial link to the screen.

pub mod printer;
pub mod serial;

pub use printer::{PrinterClient, PrinterError};
pub use serial::{SerialRx, SerialTx};
