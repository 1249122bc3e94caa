//! Error types for nodeinit-engine.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use nodeinit_core::{TreePath, ValidationError};
use nodeinit_edit::{ManifestError, MarkerError};
use nodeinit_template::TemplateError;

use crate::resolver::ResolverError;

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CopyTemplate,
    ProjectName,
    LanguageVariant,
    Database,
    ApiMethods,
    Socket,
    Cron,
    Swagger,
    Docker,
    Write,
    Sweep,
    Validate,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::CopyTemplate => "copy template",
            Stage::ProjectName => "project name",
            Stage::LanguageVariant => "language variant",
            Stage::Database => "database",
            Stage::ApiMethods => "api methods",
            Stage::Socket => "socket",
            Stage::Cron => "cron",
            Stage::Swagger => "swagger",
            Stage::Docker => "docker",
            Stage::Write => "write",
            Stage::Sweep => "sweep",
            Stage::Validate => "validate",
            Stage::Publish => "publish",
        };
        f.write_str(s)
    }
}

/// The cause of a failed stage, always naming the file involved.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{path}: {source}")]
    Marker {
        path: TreePath,
        #[source]
        source: MarkerError,
    },

    #[error("{path}: {source}")]
    Manifest {
        path: TreePath,
        #[source]
        source: ManifestError,
    },

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("target {path} exists and is not an empty directory")]
    TargetNotEmpty { path: PathBuf },

    /// A file the stage cannot do without is absent from the tree.
    #[error("{path} is required but missing from the tree")]
    MissingFile { path: TreePath },

    #[error("{path} is binary and cannot be edited")]
    BinaryFile { path: TreePath },
}

/// All errors that can end a generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The selection failed schema validation; nothing was touched.
    #[error("invalid selection: {}", summarize(.0))]
    InvalidSelection(Vec<ValidationError>),

    /// A step failed; the target path is untouched.
    #[error("{stage} step failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    /// The pruned tree failed the consistency checks.
    #[error("generated tree is inconsistent: {}", summarize(.0))]
    Inconsistent(Vec<ValidationError>),
}

impl GenerationError {
    pub fn stage(stage: Stage, source: impl Into<StageError>) -> Self {
        GenerationError::Stage {
            stage,
            source: source.into(),
        }
    }

    /// Every validation violation carried by this error.
    pub fn violations(&self) -> &[ValidationError] {
        match self {
            GenerationError::InvalidSelection(v) | GenerationError::Inconsistent(v) => v,
            GenerationError::Stage { .. } => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

/// Convenience constructor for [`StageError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StageError {
    StageError::Io {
        path: path.into(),
        source,
    }
}
