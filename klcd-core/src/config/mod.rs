//! Configuration types
//!
//! Board-agnostic settings. The bridge reads them from TOML; tests build
//! them directly.

pub mod types;

pub use types::*;
