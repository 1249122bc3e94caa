//! What a generation run did, file by file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use nodeinit_core::{DatabaseKind, InstallationType, LanguageVariant, Tree, TreePath};

use crate::staging::StagingTree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum FileChange {
    Unchanged,
    Edited,
    Added,
    Removed,
    Renamed { from: TreePath },
}

impl FileChange {
    pub fn label(&self) -> &'static str {
        match self {
            FileChange::Unchanged => "unchanged",
            FileChange::Edited => "edited",
            FileChange::Added => "added",
            FileChange::Removed => "removed",
            FileChange::Renamed { .. } => "renamed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: TreePath,
    #[serde(flatten)]
    pub change: FileChange,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub project_name: String,
    pub installation_type: InstallationType,
    pub language: LanguageVariant,
    pub database: DatabaseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    /// Dependencies that had to be looked up, with the version found.
    pub resolved: BTreeMap<String, String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl GenerationReport {
    /// Number of files with a change of the same kind as `change`.
    pub fn count(&self, change: &FileChange) -> usize {
        self.files
            .iter()
            .filter(|f| std::mem::discriminant(&f.change) == std::mem::discriminant(change))
            .count()
    }

    /// Files that differ from the template in any way.
    pub fn changed(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| f.change != FileChange::Unchanged)
    }

    pub fn removed(&self) -> Vec<&TreePath> {
        self.files
            .iter()
            .filter(|f| f.change == FileChange::Removed)
            .map(|f| &f.path)
            .collect()
    }
}

/// Classify every file of `template` and `staged`, sorted by path.
pub fn compare(template: &Tree, staged: &StagingTree) -> Vec<FileReport> {
    let mut files = Vec::new();
    let mut origins = std::collections::BTreeSet::new();

    for (path, node) in staged.tree().iter() {
        let change = if let Some(from) = staged.renamed_from(path) {
            origins.insert(from.clone());
            FileChange::Renamed { from: from.clone() }
        } else {
            match template.get(path) {
                Some(original) if original == node => FileChange::Unchanged,
                Some(_) => FileChange::Edited,
                None => FileChange::Added,
            }
        };
        files.push(FileReport {
            path: path.clone(),
            change,
        });
    }

    for path in template.paths() {
        if !staged.tree().contains(path) && !origins.contains(path) {
            files.push(FileReport {
                path: path.clone(),
                change: FileChange::Removed,
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
