//! Board-agnostic core logic for the touchscreen bridge
//!
//! This crate contains everything between the wire protocol and the I/O:
//!
//! - Capability traits for the printer client and the serial transport
//! - Dispatch registry and the handlers for every screen opcode
//! - Virtual file index with paginated, handle-addressed listings
//! - State synchronizer that turns telemetry snapshots into notifications
//! - Safety monitoring of implausible telemetry
//! - Settings types shared with the bridge configuration

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod dispatch;
pub mod files;
pub mod safety;
pub mod state;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
