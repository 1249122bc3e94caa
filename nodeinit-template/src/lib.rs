//! Template Tree Provider.
//!
//! `fetch(variant)` reads a base template from local storage and returns the
//! immutable [`Tree`] for one language variant. Two layouts are recognised:
//!
//! - **dual**: `src-typescript/` and `src-javascript/` side by side; the
//!   requested one becomes `src/`, the other is dropped
//! - **single**: a plain `src/`; its language is inferred from
//!   `tsconfig.json` or the source extensions
//!
//! `.git/` and `node_modules/` are never read.

use std::fs;
use std::path::{Path, PathBuf};

use nodeinit_core::{LanguageVariant, Node, Tree, TreePath};
use nodeinit_edit::{marker, MarkerError};
use thiserror::Error;

/// Manifest every template must carry at its root.
pub const MANIFEST: &str = "package.json";

const SKIPPED_DIRS: [&str; 2] = [".git", "node_modules"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template not found at {path}")]
    NotFound { path: PathBuf },

    /// A file that must be text is not valid UTF-8.
    #[error("{path} is not valid UTF-8")]
    NonUtf8 { path: TreePath },

    #[error("could not determine template layout at '{path}': no src/, src-typescript/ or src-javascript/")]
    UnknownLayout { path: PathBuf },

    #[error("template at '{path}' has no {variant} sources")]
    MissingVariant {
        variant: LanguageVariant,
        path: PathBuf,
    },

    /// A template file carries unbalanced sentinel markers.
    #[error("{path}: {source}")]
    Marker {
        path: TreePath,
        #[source]
        source: MarkerError,
    },
}

/// How a template organises its language variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `src-typescript/` + `src-javascript/`.
    Dual,
    /// A single `src/` in the given language.
    Single(LanguageVariant),
}

/// Supplies the base tree for a language variant.
pub trait TemplateProvider {
    fn fetch(&self, variant: LanguageVariant) -> Result<Tree, TemplateError>;
}

// ---------------------------------------------------------------------------
// Directory-backed provider
// ---------------------------------------------------------------------------

/// A template checked out on local disk.
#[derive(Debug, Clone)]
pub struct DirTemplate {
    root: PathBuf,
}

impl DirTemplate {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateProvider for DirTemplate {
    fn fetch(&self, variant: LanguageVariant) -> Result<Tree, TemplateError> {
        let tree = load_dir(&self.root)?;
        let selected = select_variant(tree, variant).map_err(|e| with_root(e, &self.root))?;
        tracing::info!(
            "fetched {} template from {} ({} files)",
            variant.label(),
            self.root.display(),
            selected.len()
        );
        Ok(selected)
    }
}

/// A template already held in memory, laid out like one on disk.
#[derive(Debug, Clone)]
pub struct MemoryTemplate {
    tree: Tree,
}

impl MemoryTemplate {
    pub fn new(tree: Tree) -> Self {
        Self { tree }
    }
}

impl TemplateProvider for MemoryTemplate {
    fn fetch(&self, variant: LanguageVariant) -> Result<Tree, TemplateError> {
        select_variant(self.tree.clone(), variant)
    }
}

fn with_root(err: TemplateError, root: &Path) -> TemplateError {
    match err {
        TemplateError::UnknownLayout { .. } => TemplateError::UnknownLayout {
            path: root.to_path_buf(),
        },
        TemplateError::MissingVariant { variant, .. } => TemplateError::MissingVariant {
            variant,
            path: root.to_path_buf(),
        },
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read every file under `root` into a [`Tree`].
///
/// Non-UTF-8 files become [`Node::Binary`].
pub fn load_dir(root: &Path) -> Result<Tree, TemplateError> {
    if !root.is_dir() {
        return Err(TemplateError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let mut tree = Tree::new();
    let walker = walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && SKIPPED_DIRS
                    .iter()
                    .any(|skip| e.file_name().to_string_lossy() == *skip))
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            TemplateError::Io {
                path,
                source: e.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = TreePath::from_relative(root, entry.path()) else {
            continue;
        };
        let bytes = fs::read(entry.path()).map_err(|e| TemplateError::Io {
            path: entry.path().to_path_buf(),
            source: e,
        })?;
        tree.insert(rel, Node::from_bytes(bytes));
    }
    Ok(tree)
}

/// Work out the layout of an already loaded template tree.
pub fn detect_layout(tree: &Tree) -> Result<Layout, TemplateError> {
    let ts = TreePath::new(LanguageVariant::Ts.source_dir());
    let js = TreePath::new(LanguageVariant::Js.source_dir());
    if !tree.paths_under(&ts).is_empty() || !tree.paths_under(&js).is_empty() {
        return Ok(Layout::Dual);
    }

    let src = TreePath::new("src");
    let sources = tree.paths_under(&src);
    if sources.is_empty() {
        return Err(TemplateError::UnknownLayout {
            path: PathBuf::new(),
        });
    }
    if tree.contains(&TreePath::new("tsconfig.json"))
        || sources.iter().any(|p| p.extension() == Some("ts"))
    {
        return Ok(Layout::Single(LanguageVariant::Ts));
    }
    if sources.iter().any(|p| p.extension() == Some("js")) {
        return Ok(Layout::Single(LanguageVariant::Js));
    }
    Err(TemplateError::UnknownLayout {
        path: PathBuf::new(),
    })
}

/// Reduce a loaded template to a single variant with its sources at `src/`.
///
/// Also checks that the manifest is present and textual and that every
/// text file has balanced markers.
pub fn select_variant(tree: Tree, variant: LanguageVariant) -> Result<Tree, TemplateError> {
    let layout = detect_layout(&tree)?;
    let selected = match layout {
        Layout::Single(found) if found == variant => tree,
        Layout::Single(_) => {
            return Err(TemplateError::MissingVariant {
                variant,
                path: PathBuf::new(),
            })
        }
        Layout::Dual => {
            let wanted = TreePath::new(variant.source_dir());
            if tree.paths_under(&wanted).is_empty() {
                return Err(TemplateError::MissingVariant {
                    variant,
                    path: PathBuf::new(),
                });
            }
            let src = TreePath::new("src");
            let ts = TreePath::new(LanguageVariant::Ts.source_dir());
            let js = TreePath::new(LanguageVariant::Js.source_dir());
            tree.iter()
                .filter_map(|(path, node)| {
                    if path.is_under(&wanted) {
                        path.rebase(&wanted, &src).map(|p| (p, node.clone()))
                    } else if path.is_under(&ts) || path.is_under(&js) {
                        None
                    } else {
                        Some((path.clone(), node.clone()))
                    }
                })
                .collect()
        }
    };

    let manifest = TreePath::new(MANIFEST);
    match selected.get(&manifest) {
        None => {
            return Err(TemplateError::NotFound {
                path: PathBuf::from(MANIFEST),
            })
        }
        Some(Node::Binary(_)) => return Err(TemplateError::NonUtf8 { path: manifest }),
        Some(Node::Text(_)) => {}
    }

    for (path, node) in selected.iter() {
        if let Some(text) = node.as_text() {
            marker::check_balance(text).map_err(|source| TemplateError::Marker {
                path: path.clone(),
                source,
            })?;
        }
    }

    tracing::debug!("selected {} variant ({:?} layout)", variant, layout);
    Ok(selected)
}
