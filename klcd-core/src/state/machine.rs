//! Print lifecycle states
//!
//! The backend owns the real state machine; this is the view the screen
//! needs, plus the notifications it expects when the state changes.

use core::fmt;
use core::str::FromStr;

use klcd_protocol::Notification;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Print lifecycle state reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PrintState {
    /// Idle, ready to print
    #[default]
    Standby,
    /// A print is running
    Printing,
    /// A print is paused
    Paused,
    /// A pause was requested and the toolhead is parking
    Pausing,
    /// The last print was cancelled
    Cancelled,
    /// The last print finished
    Complete,
    /// The backend or the bridge reported a fault
    Error,
}

/// State name not known to the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownState;

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown print state")
    }
}

impl FromStr for PrintState {
    type Err = UnknownState;

    /// Parse a backend state name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: [(&str, PrintState); 7] = [
            ("standby", PrintState::Standby),
            ("printing", PrintState::Printing),
            ("paused", PrintState::Paused),
            ("pausing", PrintState::Pausing),
            ("cancelled", PrintState::Cancelled),
            ("complete", PrintState::Complete),
            ("error", PrintState::Error),
        ];

        let s = s.trim();
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, state)| *state)
            .ok_or(UnknownState)
    }
}

impl PrintState {
    /// Check if a print job is in progress
    ///
    /// Motion, preheat and print-start commands are refused in these states.
    pub fn is_active(&self) -> bool {
        matches!(self, PrintState::Printing | PrintState::Pausing | PrintState::Paused)
    }

    /// Check if a paused print can be resumed
    pub fn can_resume(&self) -> bool {
        matches!(self, PrintState::Paused | PrintState::Pausing)
    }

    /// Notifications to send when the printer enters this state
    pub fn entry_notifications(&self) -> &'static [Notification] {
        match self {
            PrintState::Printing => &[Notification::Printing],
            PrintState::Paused => &[Notification::Paused],
            PrintState::Cancelled => &[Notification::StopAcknowledged, Notification::PrintComplete],
            PrintState::Complete => &[Notification::PrintComplete],
            PrintState::Standby => &[Notification::Ready],
            PrintState::Pausing | PrintState::Error => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_names() {
        assert_eq!("printing".parse::<PrintState>(), Ok(PrintState::Printing));
        assert_eq!("Paused".parse::<PrintState>(), Ok(PrintState::Paused));
        assert_eq!(" standby ".parse::<PrintState>(), Ok(PrintState::Standby));
        assert_eq!("exploded".parse::<PrintState>(), Err(UnknownState));
    }

    #[test]
    fn test_active_states() {
        assert!(PrintState::Printing.is_active());
        assert!(PrintState::Pausing.is_active());
        assert!(PrintState::Paused.is_active());
        assert!(!PrintState::Standby.is_active());
        assert!(!PrintState::Complete.is_active());
        assert!(!PrintState::Error.is_active());
    }

    #[test]
    fn test_entry_notifications() {
        assert_eq!(
            PrintState::Cancelled.entry_notifications(),
            &[Notification::StopAcknowledged, Notification::PrintComplete]
        );
        assert_eq!(PrintState::Standby.entry_notifications(), &[Notification::Ready]);
        assert!(PrintState::Pausing.entry_notifications().is_empty());
        assert!(PrintState::Error.entry_notifications().is_empty());
    }
}
