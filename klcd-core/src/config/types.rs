//! Configuration type definitions

use alloc::string::String;

use crate::files::NameStyle;
use crate::safety::HotendBounds;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Version line reported for `A33` unless configured otherwise
pub const DEFAULT_BUILD_VERSION: &str = concat!("KLCD ", env!("CARGO_PKG_VERSION"));

/// Heater targets for one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Preset {
    /// Hotend target (°C)
    pub hotend: u32,
    /// Bed target (°C)
    pub bed: u32,
}

/// Material presets offered by the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Presets {
    /// PLA preheat
    pub pla: Preset,
    /// ABS preheat
    pub abs: Preset,
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            pla: Preset { hotend: 200, bed: 60 },
            abs: Preset {
                hotend: 245,
                bed: 100,
            },
        }
    }
}

/// Screen-specific settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplaySettings {
    /// Screen runs DGUS clone firmware (directory labels end in `/.gcode`)
    pub dgus_clone: bool,
    /// Version line sent after `J33`
    pub build_version: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            dgus_clone: true,
            build_version: String::from(DEFAULT_BUILD_VERSION),
        }
    }
}

impl DisplaySettings {
    /// Label style for file listings
    pub fn name_style(&self) -> NameStyle {
        NameStyle {
            dgus_clone: self.dgus_clone,
        }
    }
}

/// Everything the dispatch handlers and the synchronizer need to know
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeSettings {
    /// Screen settings
    pub display: DisplaySettings,
    /// Hotend plausibility bounds
    pub safety: HotendBounds,
    /// Material presets
    pub presets: Presets,
}
