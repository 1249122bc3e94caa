//! Error types for nodeinit-edit.

use thiserror::Error;

/// Sentinel marker failures. Each one means the template and the engine
/// disagree about where a region lives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// No marker for a region that had to be present.
    #[error("marker for region '{name}' not found")]
    NotFound { name: String },

    /// A begin without its end, an end without its begin, or a block whose
    /// braces never close before the end of the file.
    #[error("region '{name}' starting at line {line} is unbalanced")]
    Unbalanced { name: String, line: usize },

    /// A region opened again before its previous occurrence was closed.
    #[error("region '{name}' opened twice (line {line})")]
    Duplicate { name: String, line: usize },
}

/// Manifest (`package.json`) failures.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {source}")]
    ParseError {
        #[source]
        source: serde_json::Error,
    },

    /// The root, or a section that must hold key/value pairs, is not an object.
    #[error("manifest field '{field}' is not an object")]
    NotAnObject { field: String },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
}
