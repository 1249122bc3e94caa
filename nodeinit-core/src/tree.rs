//! In-memory file tree shared by the template loader, the staging area and tests.
//!
//! Keys are [`TreePath`]s: relative, `/`-separated, never starting with `./`.
//! Iteration order is the lexical order of the paths, which keeps every
//! report and diff deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TreePath
// ---------------------------------------------------------------------------

/// A relative path inside a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TreePath(String);

impl TreePath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let raw = path.as_ref().replace('\\', "/");
        let parts: Vec<&str> = raw
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect();
        Self(parts.join("/"))
    }

    /// Build from a filesystem path relative to `root`.
    pub fn from_relative(root: &Path, full: &Path) -> Option<Self> {
        let rel = full.strip_prefix(root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(Self::new(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn join(&self, segment: &str) -> TreePath {
        if self.0.is_empty() {
            TreePath::new(segment)
        } else {
            TreePath::new(format!("{}/{}", self.0, segment))
        }
    }

    pub fn parent(&self) -> TreePath {
        match self.0.rfind('/') {
            Some(idx) => TreePath(self.0[..idx].to_string()),
            None => TreePath(String::new()),
        }
    }

    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Extension of the file name, without the dot. Dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// `true` when `self` lies strictly below the directory `dir`.
    pub fn is_under(&self, dir: &TreePath) -> bool {
        dir.0.is_empty()
            || (self.0.len() > dir.0.len()
                && self.0.starts_with(&dir.0)
                && self.0.as_bytes()[dir.0.len()] == b'/')
    }

    /// Replace the leading directory `from` with `to`.
    pub fn rebase(&self, from: &TreePath, to: &TreePath) -> Option<TreePath> {
        if !self.is_under(from) {
            return None;
        }
        let rest = if from.0.is_empty() {
            self.0.as_str()
        } else {
            &self.0[from.0.len() + 1..]
        };
        Some(to.join(rest))
    }

    /// Resolve a relative specifier such as `../config/x` against this
    /// file's directory. Returns `None` when it climbs above the root.
    pub fn resolve_relative(&self, specifier: &str) -> Option<TreePath> {
        let parent = self.parent();
        let mut parts: Vec<&str> = parent.0.split('/').filter(|s| !s.is_empty()).collect();
        for seg in specifier.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    parts.pop()?;
                }
                other => parts.push(other),
            }
        }
        Some(TreePath(parts.join("/")))
    }

    /// Native path under `root`.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TreePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TreePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// File content. Non-UTF-8 files are carried as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Binary(Vec<u8>),
}

impl Node {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Node::Text(text),
            Err(err) => Node::Binary(err.into_bytes()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Node::Text(text) => text.as_bytes(),
            Node::Binary(bytes) => bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    files: BTreeMap<TreePath, Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &TreePath) -> Option<&Node> {
        self.files.get(path)
    }

    /// Text content of `path`, or `None` if absent or binary.
    pub fn text(&self, path: &TreePath) -> Option<&str> {
        self.files.get(path).and_then(Node::as_text)
    }

    pub fn insert(&mut self, path: TreePath, node: Node) -> Option<Node> {
        self.files.insert(path, node)
    }

    pub fn insert_text(&mut self, path: impl Into<TreePath>, text: impl Into<String>) {
        self.files.insert(path.into(), Node::Text(text.into()));
    }

    pub fn remove(&mut self, path: &TreePath) -> Option<Node> {
        self.files.remove(path)
    }

    /// Remove every file below `dir`. Returns the removed paths.
    pub fn remove_dir(&mut self, dir: &TreePath) -> Vec<TreePath> {
        let doomed = self.paths_under(dir);
        for path in &doomed {
            self.files.remove(path);
        }
        doomed
    }

    /// Move `from` to `to`, replacing any file at `to`.
    ///
    /// Returns `false` (and changes nothing) when `from` does not exist.
    pub fn rename(&mut self, from: &TreePath, to: TreePath) -> bool {
        match self.files.remove(from) {
            Some(node) => {
                self.files.insert(to, node);
                true
            }
            None => false,
        }
    }

    /// Copy `from` to `to`. Returns `false` when `from` does not exist.
    pub fn copy(&mut self, from: &TreePath, to: TreePath) -> bool {
        match self.files.get(from).cloned() {
            Some(node) => {
                self.files.insert(to, node);
                true
            }
            None => false,
        }
    }

    /// Paths strictly below `dir`, in order.
    pub fn paths_under(&self, dir: &TreePath) -> Vec<TreePath> {
        self.files
            .keys()
            .filter(|p| p.is_under(dir))
            .cloned()
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &TreePath> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, &Node)> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&TreePath, &mut Node)> {
        self.files.iter_mut()
    }
}

impl FromIterator<(TreePath, Node)> for Tree {
    fn from_iter<I: IntoIterator<Item = (TreePath, Node)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_path_normalises_separators() {
        assert_eq!(TreePath::new("./src\\app//x.ts").as_str(), "src/app/x.ts");
    }

    #[test]
    fn extension_skips_dotfiles() {
        assert_eq!(TreePath::new(".env").extension(), None);
        assert_eq!(TreePath::new("src/server.ts").extension(), Some("ts"));
        assert_eq!(TreePath::new("Dockerfile-prod").extension(), None);
    }

    #[test]
    fn is_under_requires_segment_boundary() {
        let dir = TreePath::new("src/app");
        assert!(TreePath::new("src/app/x.ts").is_under(&dir));
        assert!(!TreePath::new("src/apps/x.ts").is_under(&dir));
        assert!(!dir.is_under(&dir));
    }

    #[test]
    fn resolve_relative_walks_up() {
        let file = TreePath::new("src/app/apis/user/services/user.service.ts");
        assert_eq!(
            file.resolve_relative("../repositories/user.repository"),
            Some(TreePath::new("src/app/apis/user/repositories/user.repository"))
        );
        assert_eq!(TreePath::new("a.ts").resolve_relative("../../x"), None);
    }

    #[test]
    fn rebase_moves_directory_prefix() {
        let p = TreePath::new("src-typescript/config/x.ts");
        assert_eq!(
            p.rebase(&TreePath::new("src-typescript"), &TreePath::new("src")),
            Some(TreePath::new("src/config/x.ts"))
        );
    }

    #[test]
    fn rename_missing_source_is_noop() {
        let mut tree = Tree::new();
        tree.insert_text("b.ts", "b");
        assert!(!tree.rename(&TreePath::new("a.ts"), TreePath::new("b.ts")));
        assert_eq!(tree.text(&TreePath::new("b.ts")), Some("b"));
    }

    #[test]
    fn remove_dir_only_touches_children() {
        let mut tree = Tree::new();
        tree.insert_text("src/app/crons/a.ts", "");
        tree.insert_text("src/app/crons/b.ts", "");
        tree.insert_text("src/app/cronsx.ts", "");
        let removed = tree.remove_dir(&TreePath::new("src/app/crons"));
        assert_eq!(removed.len(), 2);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn non_utf8_becomes_binary() {
        assert!(matches!(Node::from_bytes(vec![0xff, 0xfe]), Node::Binary(_)));
        assert!(matches!(Node::from_bytes(b"ok".to_vec()), Node::Text(_)));
    }
}
