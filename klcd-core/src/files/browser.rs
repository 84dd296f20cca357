//! File browser
//!
//! Keeps the current tree, the navigation cursor and the selected file, and
//! renders listing pages for the screen.
//!
//! Page layout, four rows per page:
//! - Root, offset 0: the special menu row, then entries 0..3
//! - Root, offset N > 0: entries N-1..N+3 (shifted by the menu row)
//! - Elsewhere: entries N..N+4, plus a back row when fewer than four fit
//!
//! Entries are sorted case-insensitively at render time.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use klcd_protocol::{EncodeError, Handle, ListingEncoder, ListingLines, NodeHandle, NodeKind, PAGE_SIZE};

use super::naming::{cmp_ignore_case, NameStyle, BACK_LABEL, MENU_LABEL};
use super::tree::{FileNode, FileTree};

/// Errors from browsing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BrowseError {
    /// Handle does not address anything reachable from the cursor
    UnknownHandle(Handle),
}

impl fmt::Display for BrowseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowseError::UnknownHandle(handle) => write!(f, "unknown handle {}", handle),
        }
    }
}

/// Result of selecting a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Selection {
    /// The cursor moved to another directory
    Navigated,
    /// A file was recorded for printing
    FileSelected,
    /// Nothing to do (special menu row)
    Ignored,
}

/// One rendered listing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Handle the screen sends back when the row is pressed
    pub handle: Handle,
    /// Display label
    pub label: String,
}

/// Saved cursor and selection, see [`FileBrowser::checkpoint`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    cursor: Vec<NodeHandle>,
    selected: Option<String>,
}

/// Navigation state over a file tree
#[derive(Debug, Clone, Default)]
pub struct FileBrowser {
    style: NameStyle,
    tree: Option<FileTree>,
    /// Directory handles from the root to the current directory
    cursor: Vec<NodeHandle>,
    /// Backend path of the selected file
    selected: Option<String>,
}

impl FileBrowser {
    /// Create a browser with no tree yet
    pub fn new(style: NameStyle) -> Self {
        Self {
            style,
            tree: None,
            cursor: Vec::new(),
            selected: None,
        }
    }

    /// Check if a tree has been built
    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    /// Current tree
    pub fn tree(&self) -> Option<&FileTree> {
        self.tree.as_ref()
    }

    /// Replace the tree if the path list changed
    ///
    /// Returns `true` if the tree was rebuilt. The cursor survives a rebuild
    /// only if every step of it still resolves.
    pub fn update(&mut self, paths: Vec<String>) -> bool {
        if let Some(tree) = &self.tree {
            if tree.source() == paths.as_slice() {
                return false;
            }
        }

        let tree = FileTree::build(paths, &self.style);
        if tree.resolve(&self.cursor).is_none() {
            self.cursor.clear();
        }
        self.tree = Some(tree);
        true
    }

    /// Return to the root and forget the selection
    pub fn reset(&mut self) {
        self.cursor.clear();
        self.selected = None;
    }

    /// Save the cursor and selection
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor.clone(),
            selected: self.selected.clone(),
        }
    }

    /// Return to a saved cursor and selection
    ///
    /// The tree is kept as it is. A cursor that no longer resolves in it
    /// falls back to the root.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.cursor;
        self.selected = checkpoint.selected;
        let resolves = match &self.tree {
            Some(tree) => tree.resolve(&self.cursor).is_some(),
            None => self.cursor.is_empty(),
        };
        if !resolves {
            self.cursor.clear();
        }
    }

    /// Check if the cursor is at the root
    pub fn at_root(&self) -> bool {
        self.cursor.is_empty()
    }

    /// Handle of the current directory
    pub fn current(&self) -> NodeHandle {
        self.cursor.last().copied().unwrap_or(NodeHandle::ROOT)
    }

    /// Directory handles from the root to the current directory
    pub fn cursor(&self) -> &[NodeHandle] {
        &self.cursor
    }

    /// Backend path of the selected file
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Act on a handle pressed on the screen
    pub fn select(&mut self, handle: Handle) -> Result<Selection, BrowseError> {
        let node = match handle {
            Handle::Menu => return Ok(Selection::Ignored),
            Handle::Back => {
                self.cursor.pop();
                return Ok(Selection::Navigated);
            }
            Handle::Node(node) if node.is_root() => {
                self.cursor.clear();
                return Ok(Selection::Navigated);
            }
            Handle::Node(node) => node,
        };

        let tree = self.tree.as_ref().ok_or(BrowseError::UnknownHandle(handle))?;
        let current = tree.resolve(&self.cursor);

        match node.kind {
            NodeKind::Directory => {
                if current.and_then(|dir| dir.subdirectory(node)).is_some() {
                    self.cursor.push(node);
                } else {
                    self.cursor = tree
                        .find_directory(node)
                        .ok_or(BrowseError::UnknownHandle(handle))?;
                }
                Ok(Selection::Navigated)
            }
            NodeKind::File => {
                let path = current
                    .and_then(|dir| dir.child(node))
                    .and_then(FileNode::path)
                    .ok_or(BrowseError::UnknownHandle(handle))?;
                self.selected = Some(String::from(path));
                Ok(Selection::FileSelected)
            }
        }
    }

    /// Rows of the page starting at item `offset` of the current directory
    pub fn render_page(&self, offset: usize) -> Vec<ListingRow> {
        let mut entries: Vec<&FileNode> = self
            .tree
            .as_ref()
            .and_then(|tree| tree.resolve(&self.cursor))
            .map(|dir| dir.children().iter().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| cmp_ignore_case(&a.label, &b.label));

        let mut rows = Vec::with_capacity(PAGE_SIZE + 1);
        let (start, end) = if self.at_root() {
            if offset == 0 {
                rows.push(ListingRow {
                    handle: Handle::Menu,
                    label: self.style.directory_label(MENU_LABEL),
                });
                (0, PAGE_SIZE - 1)
            } else {
                (offset - 1, offset + PAGE_SIZE - 1)
            }
        } else {
            (offset, offset.saturating_add(PAGE_SIZE))
        };

        let end = end.min(entries.len());
        let start = start.min(end);
        rows.extend(entries[start..end].iter().map(|node| ListingRow {
            handle: Handle::Node(node.handle),
            label: node.label.clone(),
        }));

        if !self.at_root() && rows.len() < PAGE_SIZE {
            rows.push(ListingRow {
                handle: Handle::Back,
                label: self.style.directory_label(BACK_LABEL),
            });
        }
        rows
    }

    /// Encode the page starting at item `offset` as a listing frame
    pub fn encode_page(&self, offset: usize) -> Result<ListingLines, EncodeError> {
        let mut encoder = ListingEncoder::new();
        for row in self.render_page(offset) {
            encoder.row(row.handle, &row.label)?;
        }
        encoder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn browser(list: &[&str]) -> FileBrowser {
        let mut browser = FileBrowser::new(NameStyle::default());
        browser.update(list.iter().map(|p| String::from(*p)).collect());
        browser
    }

    fn handles(rows: &[ListingRow]) -> Vec<Handle> {
        rows.iter().map(|r| r.handle).collect()
    }

    fn labels(rows: &[ListingRow]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_root_first_page_reserves_menu_row() {
        let browser = browser(&["a.gcode", "b.gcode", "sub/c.gcode"]);
        let rows = browser.render_page(0);
        assert_eq!(
            handles(&rows),
            vec![
                Handle::Menu,
                Handle::Node(NodeHandle::file(1)),
                Handle::Node(NodeHandle::file(2)),
                Handle::Node(NodeHandle::directory(1)),
            ]
        );
        assert_eq!(
            labels(&rows),
            vec!["<Special Menu>/.gcode", "a.gcode", "b.gcode", "sub/.gcode"]
        );
    }

    #[test]
    fn test_root_later_pages_shift_back() {
        let browser = browser(&["a.g", "b.g", "c.g", "d.g", "e.g", "f.g", "g.g", "h.g"]);
        let rows = browser.render_page(4);
        assert_eq!(labels(&rows), vec!["d.gcode", "e.gcode", "f.gcode", "g.gcode"]);

        // Past the end: nothing, and no back row at root
        assert!(browser.render_page(40).is_empty());
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let browser = browser(&["beta.gcode", "Alpha.gcode", "gamma.gcode"]);
        let rows = browser.render_page(0);
        assert_eq!(
            labels(&rows)[1..],
            ["Alpha.gcode", "beta.gcode", "gamma.gcode"]
        );
        // Handles still follow insertion order
        assert_eq!(rows[1].handle, Handle::Node(NodeHandle::file(2)));
    }

    #[test]
    fn test_subdirectory_gets_back_row() {
        let mut browser = browser(&["sub/one.gcode", "sub/two.gcode"]);
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();

        let rows = browser.render_page(0);
        assert_eq!(labels(&rows), vec!["one.gcode", "two.gcode", "/../.gcode"]);
        assert_eq!(rows[2].handle, Handle::Back);
    }

    #[test]
    fn test_full_subdirectory_page_has_no_back_row() {
        let mut browser = browser(&["s/a.g", "s/b.g", "s/c.g", "s/d.g", "s/e.g"]);
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        assert!(!handles(&browser.render_page(0)).contains(&Handle::Back));
        assert_eq!(
            handles(&browser.render_page(4)),
            vec![Handle::Node(NodeHandle::file(5)), Handle::Back]
        );
    }

    #[test]
    fn test_back_navigation() {
        let mut browser = browser(&["a/b/c.gcode"]);
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        assert_eq!(browser.cursor().len(), 2);

        assert_eq!(browser.select(Handle::Back), Ok(Selection::Navigated));
        assert_eq!(browser.cursor(), &[NodeHandle::directory(1)]);
        browser.select(Handle::Back).unwrap();
        assert!(browser.at_root());
        browser.select(Handle::Back).unwrap();
        assert!(browser.at_root());
    }

    #[test]
    fn test_directory_lookup_falls_back_to_search() {
        let mut browser = browser(&["x/y/z.gcode", "w/v.gcode"]);
        // <2-d.idx> is not a child of x, but "w" is found from the root
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        browser.select(Handle::Node(NodeHandle::directory(2))).unwrap();
        assert_eq!(browser.cursor(), &[NodeHandle::directory(2)]);

        assert_eq!(
            browser.select(Handle::Node(NodeHandle::directory(7))),
            Err(BrowseError::UnknownHandle(Handle::Node(NodeHandle::directory(7))))
        );
    }

    #[test]
    fn test_select_file_keeps_cursor() {
        let mut browser = browser(&["a.gcode", "sub/c.gcode"]);
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        assert_eq!(
            browser.select(Handle::Node(NodeHandle::file(1))),
            Ok(Selection::FileSelected)
        );
        assert_eq!(browser.selected(), Some("sub/c.gcode"));
        assert_eq!(browser.current(), NodeHandle::directory(1));
    }

    #[test]
    fn test_unknown_file_handle() {
        let mut browser = browser(&["a.gcode"]);
        let handle = Handle::Node(NodeHandle::file(9));
        assert_eq!(browser.select(handle), Err(BrowseError::UnknownHandle(handle)));
        assert_eq!(browser.selected(), None);
    }

    #[test]
    fn test_menu_and_root_handles() {
        let mut browser = browser(&["sub/c.gcode"]);
        assert_eq!(browser.select(Handle::Menu), Ok(Selection::Ignored));
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        browser.select(Handle::ROOT).unwrap();
        assert!(browser.at_root());
    }

    #[test]
    fn test_rebuild_only_on_change() {
        let mut browser = browser(&["a.gcode"]);
        assert!(!browser.update(vec![String::from("a.gcode")]));
        assert!(browser.update(vec![String::from("b.gcode")]));
    }

    #[test]
    fn test_rebuild_keeps_valid_cursor() {
        let mut browser = browser(&["sub/a.gcode"]);
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();

        browser.update(vec![String::from("sub/a.gcode"), String::from("b.gcode")]);
        assert_eq!(browser.current(), NodeHandle::directory(1));

        browser.update(vec![String::from("b.gcode")]);
        assert!(browser.at_root());
    }

    #[test]
    fn test_reset_clears_selection() {
        let mut browser = browser(&["sub/a.gcode"]);
        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        browser.select(Handle::Node(NodeHandle::file(1))).unwrap();
        browser.reset();
        assert!(browser.at_root());
        assert_eq!(browser.selected(), None);
    }

    #[test]
    fn test_restore_checkpoint() {
        let mut browser = browser(&["sub/a.gcode", "b.gcode"]);
        let saved = browser.checkpoint();

        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        browser.select(Handle::Node(NodeHandle::file(1))).unwrap();
        browser.restore(saved);
        assert!(browser.at_root());
        assert_eq!(browser.selected(), None);

        browser.select(Handle::Node(NodeHandle::directory(1))).unwrap();
        let inside = browser.checkpoint();
        browser.update(vec![String::from("b.gcode")]);
        browser.restore(inside);
        assert!(browser.at_root());
    }

    #[test]
    fn test_encode_page() {
        let browser = browser(&["a.gcode"]);
        let lines = browser.encode_page(0).unwrap();
        let text: Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            text,
            vec!["FN", "<menu>", "<Special Menu>/.gcode", "<1-f.idx>", "a.gcode", "END"]
        );
    }

    #[test]
    fn test_no_tree_renders_menu_only() {
        let browser = FileBrowser::new(NameStyle::default());
        assert_eq!(handles(&browser.render_page(0)), vec![Handle::Menu]);
    }
}
