//! Display labels for menu entries
//!
//! The screen shows at most about 22 characters per row, and DGUS clone
//! firmware only lists entries whose name ends in `.gcode`.

use alloc::string::String;

/// Maximum characters kept from a file's base name
pub const FILE_LABEL_LEN: usize = 20;

/// Maximum characters kept from a directory name
pub const DIR_LABEL_LEN: usize = FILE_LABEL_LEN - 1;

/// Suffix of every file label
pub const FILE_SUFFIX: &str = ".gcode";

/// Suffix of directory labels for DGUS clones
pub const DGUS_DIR_SUFFIX: &str = "/.gcode";

/// Label of the special menu row
pub const MENU_LABEL: &str = "<Special Menu>";

/// Label of the back row
pub const BACK_LABEL: &str = "/..";

/// Label style for the connected screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NameStyle {
    /// Append `/.gcode` to directory labels
    pub dgus_clone: bool,
}

impl Default for NameStyle {
    fn default() -> Self {
        Self { dgus_clone: true }
    }
}

impl NameStyle {
    /// Label for a file: truncated base name plus `.gcode`
    pub fn file_label(&self, name: &str) -> String {
        let base = match name.rfind('.') {
            Some(dot) => &name[..dot],
            None => name,
        };
        let mut label = String::from(truncate_chars(base, FILE_LABEL_LEN));
        label.push_str(FILE_SUFFIX);
        label
    }

    /// Label for a directory, or a synthetic row styled like one
    pub fn directory_label(&self, name: &str) -> String {
        let mut label = String::from(truncate_chars(name, DIR_LABEL_LEN));
        if self.dgus_clone {
            label.push_str(DGUS_DIR_SUFFIX);
        }
        label
    }
}

/// Keep at most `max` characters, never splitting a character
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Compare two labels ignoring case
pub fn cmp_ignore_case(a: &str, b: &str) -> core::cmp::Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
