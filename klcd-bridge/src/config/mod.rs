//! Configuration loading
//!
//! Reads the bridge TOML file, falling back to the embedded default, and
//! applies command line overrides.

pub mod limits;
pub mod loader;

pub use loader::{BridgeConfig, ConfigError};
