//! The Staging Tree: the working copy a generation run mutates.
//!
//! Structural edits take effect immediately so later stages see the
//! canonical layout. Content edits wait in per-file [`EditSession`]s until
//! [`StagingTree::write_phase`]. Sessions follow their file through renames
//! and die with it on delete.

use std::collections::BTreeMap;

use nodeinit_core::{Node, Tree, TreePath};
use nodeinit_edit::{marker, MARKER_PREFIX};

use crate::edit::FileEdit;
use crate::error::{GenerationError, Stage, StageError};
use crate::session::EditSession;

#[derive(Debug, Clone)]
pub struct StagingTree {
    tree: Tree,
    sessions: BTreeMap<TreePath, EditSession>,
    /// Current path of a renamed file -> its path in the template.
    renamed: BTreeMap<TreePath, TreePath>,
}

impl StagingTree {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            sessions: BTreeMap::new(),
            renamed: BTreeMap::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Files with queued content edits.
    pub fn pending(&self) -> Vec<&TreePath> {
        self.sessions
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(p, _)| p)
            .collect()
    }

    /// The template path `path` was renamed from, if it was.
    pub fn renamed_from(&self, path: &TreePath) -> Option<&TreePath> {
        self.renamed.get(path)
    }

    pub fn renames(&self) -> impl Iterator<Item = (&TreePath, &TreePath)> {
        self.renamed.iter()
    }

    pub fn apply_all(
        &mut self,
        stage: Stage,
        edits: impl IntoIterator<Item = FileEdit>,
    ) -> Result<(), GenerationError> {
        for edit in edits {
            self.apply(stage, edit)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, stage: Stage, edit: FileEdit) -> Result<(), GenerationError> {
        match edit {
            FileEdit::DeleteFile(path) => {
                if self.tree.remove(&path).is_some() {
                    tracing::debug!("deleted {}", path);
                }
                self.forget(&path);
            }
            FileEdit::DeleteDir(dir) => {
                for path in self.tree.remove_dir(&dir) {
                    tracing::debug!("deleted {}", path);
                    self.forget(&path);
                }
            }
            FileEdit::RenameFile { from, to } => {
                if !self.tree.rename(&from, to.clone()) {
                    tracing::debug!("rename skipped, {} is absent", from);
                    return Ok(());
                }
                tracing::debug!("renamed {} -> {}", from, to);
                let origin = self.renamed.remove(&from).unwrap_or_else(|| from.clone());
                self.renamed.insert(to.clone(), origin);
                if let Some(session) = self.sessions.remove(&from) {
                    self.sessions.insert(to, session);
                }
            }
            FileEdit::CopyFile { from, to } => {
                if !self.tree.copy(&from, to.clone()) {
                    tracing::debug!("copy skipped, {} is absent", from);
                    return Ok(());
                }
                tracing::debug!("copied {} -> {}", from, to);
                self.renamed.remove(&to);
                match self.sessions.get(&from).cloned() {
                    Some(session) => self.sessions.insert(to, session),
                    None => self.sessions.remove(&to),
                };
            }
            content => self.queue(stage, content)?,
        }
        Ok(())
    }

    fn queue(&mut self, stage: Stage, edit: FileEdit) -> Result<(), GenerationError> {
        let path = edit.path().clone();
        match self.tree.get(&path) {
            None => {
                let mandatory = matches!(
                    edit,
                    FileEdit::StripRegion { required: true, .. } | FileEdit::PatchManifestField { .. }
                );
                if mandatory {
                    return Err(GenerationError::stage(stage, StageError::MissingFile { path }));
                }
                tracing::debug!("{} is absent, edit skipped", path);
                Ok(())
            }
            Some(Node::Binary(_)) => Err(GenerationError::stage(stage, StageError::BinaryFile { path })),
            Some(Node::Text(_)) => {
                self.sessions.entry(path).or_default().push(stage, edit);
                Ok(())
            }
        }
    }

    fn forget(&mut self, path: &TreePath) {
        if self.sessions.remove(path).is_some() {
            tracing::debug!("dropped pending edits of {}", path);
        }
        self.renamed.remove(path);
    }

    /// Apply every Edit Session once. Returns the number of files written.
    pub fn write_phase(&mut self) -> Result<usize, GenerationError> {
        let sessions = std::mem::take(&mut self.sessions);
        let mut written = 0;
        for (path, session) in sessions {
            if session.is_empty() {
                continue;
            }
            let Some(text) = self.tree.text(&path) else {
                continue;
            };
            let updated = session.apply(&path, text)?;
            self.tree.insert(path, Node::Text(updated));
            written += 1;
        }
        tracing::debug!("write phase touched {} file(s)", written);
        Ok(written)
    }

    /// Delete every remaining marker line. Returns the number of files changed.
    pub fn sweep_markers(&mut self) -> usize {
        let mut swept = 0;
        for (path, node) in self.tree.iter_mut() {
            let Node::Text(text) = node else { continue };
            if !text.contains(MARKER_PREFIX) {
                continue;
            }
            let cleaned = marker::sweep(text);
            if cleaned != *text {
                tracing::debug!("swept markers from {}", path);
                *text = cleaned;
                swept += 1;
            }
        }
        swept
    }
}
