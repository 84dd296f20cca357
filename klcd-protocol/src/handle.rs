//! File-menu handles
//!
//! The screen addresses menu rows by short handles instead of file names:
//! - `<N-f.idx>`: file entry N of its directory
//! - `<N-d.idx>`: directory entry N of its directory
//! - `<0-d.idx>`: the root directory
//! - `<back-d.idx>`: go to the parent directory
//! - `<menu>`: the special menu row on the first root page
//!
//! The kind is carried as a tag, so no caller has to look inside the text.

use core::fmt;

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeKind {
    /// A printable file
    File,
    /// A directory that can be entered
    Directory,
}

impl NodeKind {
    /// Wire suffix letter
    const fn tag(self) -> char {
        match self {
            NodeKind::File => 'f',
            NodeKind::Directory => 'd',
        }
    }
}

/// Handle of a node in the file tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeHandle {
    /// Position within the parent directory's counter for this kind (1-based)
    pub index: u16,
    /// File or directory
    pub kind: NodeKind,
}

impl NodeHandle {
    /// Sentinel for the root directory
    pub const ROOT: NodeHandle = NodeHandle {
        index: 0,
        kind: NodeKind::Directory,
    };

    /// Handle of a file entry
    pub const fn file(index: u16) -> Self {
        Self {
            index,
            kind: NodeKind::File,
        }
    }

    /// Handle of a directory entry
    pub const fn directory(index: u16) -> Self {
        Self {
            index,
            kind: NodeKind::Directory,
        }
    }

    /// Check if this is the root sentinel
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    /// Check if this handle addresses a directory
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}-{}.idx>", self.index, self.kind.tag())
    }
}

/// Anything the screen can select in a file listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handle {
    /// A file or directory (including the root sentinel)
    Node(NodeHandle),
    /// Back-navigation row
    Back,
    /// Special menu row
    Menu,
}

/// Errors from handle parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleError {
    /// Not of the form `<...>`
    Malformed,
    /// Index is not a number or does not fit
    InvalidIndex,
    /// Suffix is neither `f.idx` nor `d.idx`
    UnknownKind,
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleError::Malformed => f.write_str("malformed handle"),
            HandleError::InvalidIndex => f.write_str("invalid handle index"),
            HandleError::UnknownKind => f.write_str("unknown handle kind"),
        }
    }
}

const BACK_BODY: &str = "back-d.idx";
const MENU_BODY: &str = "menu";

impl Handle {
    /// Sentinel for the root directory
    pub const ROOT: Handle = Handle::Node(NodeHandle::ROOT);

    /// Parse a handle from its wire form
    pub fn parse(text: &str) -> Result<Self, HandleError> {
        let body = text
            .trim()
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or(HandleError::Malformed)?;

        match body {
            BACK_BODY => return Ok(Handle::Back),
            MENU_BODY => return Ok(Handle::Menu),
            _ => {}
        }

        let (index, suffix) = body.split_once('-').ok_or(HandleError::Malformed)?;
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HandleError::InvalidIndex);
        }
        let index: u16 = index.parse().map_err(|_| HandleError::InvalidIndex)?;

        let kind = match suffix {
            "f.idx" => NodeKind::File,
            "d.idx" => NodeKind::Directory,
            _ => return Err(HandleError::UnknownKind),
        };

        Ok(Handle::Node(NodeHandle { index, kind }))
    }

    /// The node handle, if this addresses a tree node
    pub fn node(&self) -> Option<NodeHandle> {
        match self {
            Handle::Node(node) => Some(*node),
            _ => None,
        }
    }
}

impl From<NodeHandle> for Handle {
    fn from(node: NodeHandle) -> Self {
        Handle::Node(node)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Node(node) => fmt::Display::fmt(node, f),
            Handle::Back => write!(f, "<{}>", BACK_BODY),
            Handle::Menu => write!(f, "<{}>", MENU_BODY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use heapless::String;

    fn render(handle: Handle) -> String<16> {
        let mut out = String::new();
        write!(out, "{}", handle).unwrap();
        out
    }

    #[test]
    fn test_parse_file_and_directory() {
        assert_eq!(
            Handle::parse("<3-f.idx>"),
            Ok(Handle::Node(NodeHandle::file(3)))
        );
        assert_eq!(
            Handle::parse("<12-d.idx>"),
            Ok(Handle::Node(NodeHandle::directory(12)))
        );
    }

    #[test]
    fn test_parse_sentinels() {
        assert_eq!(Handle::parse("<0-d.idx>"), Ok(Handle::ROOT));
        assert_eq!(Handle::parse("<back-d.idx>"), Ok(Handle::Back));
        assert_eq!(Handle::parse("<menu>"), Ok(Handle::Menu));
        assert!(NodeHandle::ROOT.is_root());
    }

    #[test]
    fn test_format_matches_wire() {
        assert_eq!(render(Handle::Node(NodeHandle::file(1))).as_str(), "<1-f.idx>");
        assert_eq!(render(Handle::Node(NodeHandle::directory(2))).as_str(), "<2-d.idx>");
        assert_eq!(render(Handle::ROOT).as_str(), "<0-d.idx>");
        assert_eq!(render(Handle::Back).as_str(), "<back-d.idx>");
        assert_eq!(render(Handle::Menu).as_str(), "<menu>");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Handle::parse("1-f.idx"), Err(HandleError::Malformed));
        assert_eq!(Handle::parse("<x-f.idx>"), Err(HandleError::InvalidIndex));
        assert_eq!(Handle::parse("<99999-f.idx>"), Err(HandleError::InvalidIndex));
        assert_eq!(Handle::parse("<1-z.idx>"), Err(HandleError::UnknownKind));
        assert_eq!(Handle::parse("<nope>"), Err(HandleError::Malformed));
    }
}
