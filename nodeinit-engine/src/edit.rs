//! The edit vocabulary Transformers speak.
//!
//! Structural edits (delete, rename, copy) change the staging tree as soon
//! as they are applied. Content edits are queued in the target file's
//! [`EditSession`](crate::session::EditSession) and run once, in the write
//! phase.

use nodeinit_core::TreePath;
use nodeinit_edit::{EnvOp, ManifestOp, PathPattern, RefScope};

#[derive(Debug, Clone, PartialEq)]
pub enum FileEdit {
    DeleteFile(TreePath),
    /// Delete every file below a directory.
    DeleteDir(TreePath),
    RenameFile {
        from: TreePath,
        to: TreePath,
    },
    CopyFile {
        from: TreePath,
        to: TreePath,
    },
    /// Remove every occurrence of the region delimited by the `region`
    /// markers. A `required` region missing from the file (or a missing
    /// file) is a template mismatch; an optional one is a no-op.
    StripRegion {
        path: TreePath,
        region: String,
        required: bool,
    },
    RewriteReference {
        path: TreePath,
        from: PathPattern,
        to: String,
        scope: RefScope,
    },
    PatchManifestField {
        path: TreePath,
        op: ManifestOp,
    },
    PatchEnv {
        path: TreePath,
        op: EnvOp,
    },
}

impl FileEdit {
    /// The file this edit targets; the source for rename and copy.
    pub fn path(&self) -> &TreePath {
        match self {
            FileEdit::DeleteFile(path) | FileEdit::DeleteDir(path) => path,
            FileEdit::RenameFile { from, .. } | FileEdit::CopyFile { from, .. } => from,
            FileEdit::StripRegion { path, .. }
            | FileEdit::RewriteReference { path, .. }
            | FileEdit::PatchManifestField { path, .. }
            | FileEdit::PatchEnv { path, .. } => path,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FileEdit::DeleteFile(_)
                | FileEdit::DeleteDir(_)
                | FileEdit::RenameFile { .. }
                | FileEdit::CopyFile { .. }
        )
    }

    pub fn strip(path: &TreePath, region: &str) -> Self {
        FileEdit::StripRegion {
            path: path.clone(),
            region: region.to_string(),
            required: false,
        }
    }

    pub fn strip_required(path: &TreePath, region: &str) -> Self {
        FileEdit::StripRegion {
            path: path.clone(),
            region: region.to_string(),
            required: true,
        }
    }

    pub fn rewrite(path: &TreePath, from: &str, to: &str, scope: RefScope) -> Self {
        FileEdit::RewriteReference {
            path: path.clone(),
            from: PathPattern::new(from),
            to: to.to_string(),
            scope,
        }
    }

    pub fn manifest(path: &TreePath, op: ManifestOp) -> Self {
        FileEdit::PatchManifestField {
            path: path.clone(),
            op,
        }
    }

    pub fn env(path: &TreePath, op: EnvOp) -> Self {
        FileEdit::PatchEnv {
            path: path.clone(),
            op,
        }
    }
}
