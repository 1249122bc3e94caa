//! Error types for nodeinit-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::selection::ApiMethod;
use crate::tree::TreePath;

/// A single violation found while checking a selection or a generated tree.
///
/// Selection checks and tree consistency checks share one enum so a caller
/// can collect every defect from both into a single report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Project names must be at least three characters long.
    #[error("project name '{name}' must be at least 3 characters long")]
    ProjectNameTooShort { name: String },

    /// Project names end up in `package.json`, so npm's naming rules apply.
    #[error("project name '{name}' is not a valid npm package name (lowercase, no spaces)")]
    ProjectNameInvalid { name: String },

    /// A custom installation kept no HTTP method at all.
    #[error("at least one API method must be selected")]
    EmptyApiMethods,

    /// The same method listed twice.
    #[error("API method {method} is selected more than once")]
    DuplicateApiMethod { method: ApiMethod },

    #[error("swagger path '{path}' must match ^/[A-Za-z0-9_-]+$")]
    InvalidSwaggerPath { path: String },

    /// A sentinel marker survived generation.
    #[error("{path}:{line}: leftover marker '{marker}'")]
    ResidualMarker {
        path: TreePath,
        line: usize,
        marker: String,
    },

    /// A relative import or require points at a file that is not in the tree.
    #[error("{path}: import '{specifier}' does not resolve to a file")]
    BrokenReference { path: TreePath, specifier: String },

    #[error("{path}: manifest is unreadable: {reason}")]
    ManifestUnreadable { path: TreePath, reason: String },

    /// The manifest still depends on a package of a removed feature.
    #[error("manifest still lists '{package}' although {feature} was removed")]
    StaleDependency { package: String, feature: String },

    /// The manifest lacks a package the selection requires.
    #[error("manifest is missing '{package}' required by {feature}")]
    MissingDependency { package: String, feature: String },

    /// A file that belongs to a removed feature is still present.
    #[error("{path} belongs to {feature}, which was removed")]
    StaleFile { path: TreePath, feature: String },
}

/// Errors from reading or writing user settings and selection files.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`SettingsError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SettingsError {
    SettingsError::Io {
        path: path.into(),
        source,
    }
}
