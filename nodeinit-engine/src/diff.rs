//! Dry-run unified diff support for `nodeinit plan`.

use similar::TextDiff;

use nodeinit_core::{Node, Tree, TreePath};

use crate::report::{FileChange, FileReport};

/// A single file diff against the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: TreePath,
    pub change: FileChange,
    pub unified_diff: String,
}

/// Render a unified diff for every file in `changes` that is not unchanged.
///
/// `changes` is what [`crate::report::compare`] produced for the same pair
/// of trees. Binary files get a one-line note instead of a diff.
pub fn unified(template: &Tree, staged: &Tree, changes: &[FileReport]) -> Vec<FileDiff> {
    changes
        .iter()
        .filter(|c| c.change != FileChange::Unchanged)
        .map(|c| {
            let (old_path, old_header, new_header) = match &c.change {
                FileChange::Added => (None, "/dev/null".to_string(), format!("b/{}", c.path)),
                FileChange::Removed => (Some(&c.path), format!("a/{}", c.path), "/dev/null".to_string()),
                FileChange::Renamed { from } => (Some(from), format!("a/{from}"), format!("b/{}", c.path)),
                FileChange::Edited | FileChange::Unchanged => {
                    (Some(&c.path), format!("a/{}", c.path), format!("b/{}", c.path))
                }
            };
            let old = old_path.and_then(|p| template.get(p));
            let new = match c.change {
                FileChange::Removed => None,
                _ => staged.get(&c.path),
            };

            let unified_diff = match (text_of(old), text_of(new)) {
                (Some(old), Some(new)) => TextDiff::from_lines(old, new)
                    .unified_diff()
                    .header(&old_header, &new_header)
                    .context_radius(3)
                    .to_string(),
                _ => format!("Binary files {old_header} and {new_header} differ\n"),
            };

            FileDiff {
                path: c.path.clone(),
                change: c.change.clone(),
                unified_diff,
            }
        })
        .collect()
}

/// Text of a node; an absent node diffs as empty text.
fn text_of(node: Option<&Node>) -> Option<&str> {
    match node {
        None => Some(""),
        Some(node) => node.as_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(path: &str, change: FileChange) -> FileReport {
        FileReport {
            path: TreePath::new(path),
            change,
        }
    }

    #[test]
    fn edited_file_has_headers_and_hunk() {
        let mut template = Tree::new();
        template.insert_text("package.json", "{\n  \"name\": \"x\"\n}\n");
        let mut staged = Tree::new();
        staged.insert_text("package.json", "{\n  \"name\": \"demo\"\n}\n");
        let diffs = unified(&template, &staged, &[report("package.json", FileChange::Edited)]);
        assert_eq!(diffs.len(), 1);
        let text = &diffs[0].unified_diff;
        assert!(text.contains("--- a/package.json"));
        assert!(text.contains("+++ b/package.json"));
        assert!(text.contains("@@"));
        assert!(text.contains("+  \"name\": \"demo\""));
    }

    #[test]
    fn removed_file_diffs_against_dev_null() {
        let mut template = Tree::new();
        template.insert_text("Dockerfile-dev", "FROM node:20\n");
        let diffs = unified(
            &template,
            &Tree::new(),
            &[report("Dockerfile-dev", FileChange::Removed)],
        );
        assert!(diffs[0].unified_diff.contains("+++ /dev/null"));
        assert!(diffs[0].unified_diff.contains("-FROM node:20"));
    }

    #[test]
    fn unchanged_and_binary_files() {
        let mut template = Tree::new();
        template.insert_text("a.ts", "a\n");
        template.insert("logo.png".into(), Node::Binary(vec![0xff, 0x00]));
        let mut staged = template.clone();
        staged.insert("logo.png".into(), Node::Binary(vec![0xfe]));
        let diffs = unified(
            &template,
            &staged,
            &[
                report("a.ts", FileChange::Unchanged),
                report("logo.png", FileChange::Edited),
            ],
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].unified_diff,
            "Binary files a/logo.png and b/logo.png differ\n"
        );
    }
}
