//! Virtual file index
//!
//! Turns the backend's flat path list into a directory tree addressed by
//! short handles, and pages through it four rows at a time.

pub mod browser;
pub mod naming;
pub mod tree;

pub use browser::{BrowseError, Checkpoint, FileBrowser, ListingRow, Selection};
pub use naming::NameStyle;
pub use tree::{Directory, FileNode, FileTree, NodeEntry};
