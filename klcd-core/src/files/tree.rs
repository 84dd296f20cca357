//! Virtual file tree
//!
//! Built in one pass from the flat path list the backend reports. Each
//! directory numbers its files and its subdirectories separately, starting
//! at 1, in the order paths arrive. The same list always yields the same
//! handles. Once a directory runs out of handles of one kind, further
//! entries of that kind are left out rather than given a duplicate.

use alloc::string::String;
use alloc::vec::Vec;

use klcd_protocol::{NodeHandle, NodeKind};

use super::naming::NameStyle;

/// What a tree node holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEntry {
    /// A printable file and its backend path
    File { path: String },
    /// A directory
    Directory(Directory),
}

/// Node in the file tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Display label
    pub label: String,
    /// Handle, unique among the siblings of the same kind
    pub handle: NodeHandle,
    /// File path or directory contents
    pub entry: NodeEntry,
}

impl FileNode {
    /// Directory contents, if this is a directory
    pub fn as_directory(&self) -> Option<&Directory> {
        match &self.entry {
            NodeEntry::Directory(dir) => Some(dir),
            NodeEntry::File { .. } => None,
        }
    }

    /// Backend path, if this is a file
    pub fn path(&self) -> Option<&str> {
        match &self.entry {
            NodeEntry::File { path } => Some(path),
            NodeEntry::Directory(_) => None,
        }
    }
}

/// Directory contents in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    children: Vec<FileNode>,
    next_file: u32,
    next_dir: u32,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            next_file: 1,
            next_dir: 1,
        }
    }

    /// Children in insertion order
    pub fn children(&self) -> &[FileNode] {
        &self.children
    }

    /// Child with the given handle
    pub fn child(&self, handle: NodeHandle) -> Option<&FileNode> {
        self.children.iter().find(|node| node.handle == handle)
    }

    /// Child directory with the given handle
    pub fn subdirectory(&self, handle: NodeHandle) -> Option<&Directory> {
        self.child(handle).and_then(FileNode::as_directory)
    }

    /// Next unused handle of `kind`, or `None` once the range is spent
    fn allocate(&mut self, kind: NodeKind) -> Option<NodeHandle> {
        let counter = match kind {
            NodeKind::File => &mut self.next_file,
            NodeKind::Directory => &mut self.next_dir,
        };
        let index = u16::try_from(*counter).ok()?;
        *counter += 1;
        Some(NodeHandle { index, kind })
    }

    /// Add a file; a same-label entry is replaced in place
    ///
    /// Returns false when no file handle is left.
    fn insert_file(&mut self, label: String, path: &str) -> bool {
        let Some(handle) = self.allocate(NodeKind::File) else {
            return false;
        };
        let node = FileNode {
            label,
            handle,
            entry: NodeEntry::File {
                path: String::from(path),
            },
        };
        match self.children.iter().position(|child| child.label == node.label) {
            Some(pos) => self.children[pos] = node,
            None => self.children.push(node),
        }
        true
    }

    /// Position of the subdirectory with `label`, creating it if needed
    ///
    /// An existing directory is reused; a file with the same label is
    /// replaced in place. `None` when a new directory is needed but no
    /// directory handle is left.
    fn directory_position(&mut self, label: String) -> Option<usize> {
        let found = self.children.iter().position(|child| child.label == label);
        if let Some(pos) = found {
            if self.children[pos].as_directory().is_some() {
                return Some(pos);
            }
        }

        let node = FileNode {
            label,
            handle: self.allocate(NodeKind::Directory)?,
            entry: NodeEntry::Directory(Directory::new()),
        };
        match found {
            Some(pos) => {
                self.children[pos] = node;
                Some(pos)
            }
            None => {
                self.children.push(node);
                Some(self.children.len() - 1)
            }
        }
    }

    /// Insert a file below this directory, creating directories on the way
    ///
    /// Returns false when the file was left out for lack of handles.
    fn insert_path(&mut self, segments: &[&str], path: &str, style: &NameStyle) -> bool {
        match segments {
            [] => true,
            [name] => self.insert_file(style.file_label(name), path),
            [name, rest @ ..] => {
                let Some(pos) = self.directory_position(style.directory_label(name)) else {
                    return false;
                };
                match &mut self.children[pos].entry {
                    NodeEntry::Directory(dir) => dir.insert_path(rest, path, style),
                    NodeEntry::File { .. } => false,
                }
            }
        }
    }

    /// Depth-first search for the first directory with `handle`
    ///
    /// Pushes the handles leading to it onto `path`.
    fn find_path(&self, handle: NodeHandle, path: &mut Vec<NodeHandle>) -> bool {
        for child in &self.children {
            if let Some(dir) = child.as_directory() {
                path.push(child.handle);
                if child.handle == handle || dir.find_path(handle, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }
}

/// Handle-addressed directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTree {
    root: Directory,
    source: Vec<String>,
    omitted: usize,
}

impl FileTree {
    /// Build a tree from `/`-delimited paths
    ///
    /// Empty path segments are ignored.
    pub fn build(paths: Vec<String>, style: &NameStyle) -> Self {
        let mut root = Directory::new();
        let mut omitted = 0;

        for path in &paths {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            if !root.insert_path(&segments, path, style) {
                omitted += 1;
            }
        }

        Self {
            root,
            source: paths,
            omitted,
        }
    }

    /// Number of paths left out because a directory ran out of handles
    pub fn omitted(&self) -> usize {
        self.omitted
    }

    /// The path list this tree was built from
    pub fn source(&self) -> &[String] {
        &self.source
    }

    /// Root directory
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Follow a path of directory handles from the root
    pub fn resolve(&self, path: &[NodeHandle]) -> Option<&Directory> {
        path.iter()
            .try_fold(&self.root, |dir, handle| dir.subdirectory(*handle))
    }

    /// Path to the first directory with `handle`, searching depth-first
    ///
    /// The root sentinel resolves to the empty path.
    pub fn find_directory(&self, handle: NodeHandle) -> Option<Vec<NodeHandle>> {
        if handle.is_root() {
            return Some(Vec::new());
        }
        let mut path = Vec::new();
        self.root.find_path(handle, &mut path).then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| String::from(*p)).collect()
    }

    fn labels(dir: &Directory) -> Vec<&str> {
        dir.children().iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_per_directory_handles() {
        let tree = FileTree::build(
            paths(&["a.gcode", "b.gcode", "sub/c.gcode"]),
            &NameStyle::default(),
        );
        let root = tree.root();
        assert_eq!(labels(root), vec!["a.gcode", "b.gcode", "sub/.gcode"]);
        assert_eq!(root.children()[0].handle, NodeHandle::file(1));
        assert_eq!(root.children()[1].handle, NodeHandle::file(2));
        assert_eq!(root.children()[2].handle, NodeHandle::directory(1));

        let sub = root.subdirectory(NodeHandle::directory(1)).unwrap();
        assert_eq!(sub.children()[0].handle, NodeHandle::file(1));
        assert_eq!(sub.children()[0].path(), Some("sub/c.gcode"));
    }

    #[test]
    fn test_directories_reused() {
        let tree = FileTree::build(
            paths(&["x/one.gcode", "y/two.gcode", "x/three.gcode"]),
            &NameStyle::default(),
        );
        let root = tree.root();
        assert_eq!(root.children().len(), 2);
        let x = root.subdirectory(NodeHandle::directory(1)).unwrap();
        assert_eq!(labels(x), vec!["one.gcode", "three.gcode"]);
        assert_eq!(x.children()[1].handle, NodeHandle::file(2));
    }

    #[test]
    fn test_original_path_survives_truncation() {
        let long = "a_really_long_directory/an_even_longer_file_name_here.gcode";
        let tree = FileTree::build(paths(&[long]), &NameStyle::default());
        let dir = tree.root().subdirectory(NodeHandle::directory(1)).unwrap();
        assert_eq!(dir.children()[0].label, "an_even_longer_file_.gcode");
        assert_eq!(dir.children()[0].path(), Some(long));
    }

    #[test]
    fn test_file_collision_replaces_in_place() {
        let tree = FileTree::build(
            paths(&["part.gcode", "other.gcode", "part.gco"]),
            &NameStyle::default(),
        );
        let root = tree.root();
        assert_eq!(labels(root), vec!["part.gcode", "other.gcode"]);
        assert_eq!(root.children()[0].handle, NodeHandle::file(3));
        assert_eq!(root.children()[0].path(), Some("part.gco"));
    }

    #[test]
    fn test_directory_replaces_file_with_same_label() {
        // Without the DGUS suffix "x.stl" and the directory "x.gcode" share a label
        let style = NameStyle { dgus_clone: false };

        let tree = FileTree::build(paths(&["x.stl", "x.gcode/bar.gcode"]), &style);
        let root = tree.root();
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].handle, NodeHandle::directory(1));

        let tree = FileTree::build(paths(&["x.gcode/bar.gcode", "x.stl"]), &style);
        let root = tree.root();
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].handle, NodeHandle::file(1));
        assert_eq!(root.children()[0].path(), Some("x.stl"));
    }

    #[test]
    fn test_empty_segments_ignored() {
        let tree = FileTree::build(paths(&["/top.gcode", "a//b.gcode", ""]), &NameStyle::default());
        assert_eq!(labels(tree.root()), vec!["top.gcode", "a/.gcode"]);
    }

    #[test]
    fn test_resolve_and_find() {
        let tree = FileTree::build(
            paths(&["a/b/c.gcode", "d/e.gcode"]),
            &NameStyle::default(),
        );
        let a = NodeHandle::directory(1);
        let b = NodeHandle::directory(1);
        let d = NodeHandle::directory(2);

        assert!(tree.resolve(&[a, b]).is_some());
        assert!(tree.resolve(&[d, b]).is_none());
        assert_eq!(tree.find_directory(d), Some(vec![d]));
        assert_eq!(tree.find_directory(NodeHandle::ROOT), Some(Vec::new()));
        assert_eq!(tree.find_directory(NodeHandle::directory(9)), None);
        // Files are never directories
        assert_eq!(tree.find_directory(NodeHandle::file(1)), None);
    }

    #[test]
    fn test_exhausted_handles_are_not_reused() {
        let style = NameStyle::default();
        let mut dir = Directory::new();
        dir.next_file = u32::from(u16::MAX);

        assert!(dir.insert_path(&["last.gcode"], "last.gcode", &style));
        assert!(!dir.insert_path(&["extra.gcode"], "extra.gcode", &style));
        assert_eq!(labels(&dir), vec!["last.gcode"]);
        assert_eq!(dir.children()[0].handle, NodeHandle::file(u16::MAX));
        assert_eq!(dir.children()[0].path(), Some("last.gcode"));

        // Directories draw from their own range
        assert!(dir.insert_path(&["sub", "a.gcode"], "sub/a.gcode", &style));

        dir.next_dir = u32::from(u16::MAX) + 1;
        assert!(!dir.insert_path(&["more", "b.gcode"], "more/b.gcode", &style));
        assert_eq!(dir.children().len(), 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        let list = paths(&["z.gcode", "m/n.gcode", "A.gcode", "m/o/p.gcode"]);
        let first = FileTree::build(list.clone(), &NameStyle::default());
        let second = FileTree::build(list, &NameStyle::default());
        assert_eq!(first, second);
    }
}
