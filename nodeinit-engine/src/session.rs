//! Per-file Edit Sessions.
//!
//! Every content edit aimed at one file lands in that file's session. The
//! session applies them in a single pass, in a fixed order: all region
//! strips (merged and removed bottom-up), then reference rewrites, then
//! dotenv edits, then manifest edits. Each queued edit remembers the stage
//! that contributed it, so a failure is reported against the right step.

use nodeinit_core::TreePath;
use nodeinit_edit::{marker, patch_env, rewrite, EnvOp, Manifest, ManifestOp, PathPattern, RefScope};

use crate::edit::FileEdit;
use crate::error::{GenerationError, Stage, StageError};

#[derive(Debug, Clone, PartialEq)]
struct Strip {
    stage: Stage,
    region: String,
    required: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Rewrite {
    from: PathPattern,
    to: String,
    scope: RefScope,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    strips: Vec<Strip>,
    rewrites: Vec<Rewrite>,
    env: Vec<EnvOp>,
    manifest: Vec<(Stage, ManifestOp)>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a content edit. Structural edits are ignored; the staging
    /// tree applies those itself.
    pub fn push(&mut self, stage: Stage, edit: FileEdit) {
        match edit {
            FileEdit::StripRegion {
                region, required, ..
            } => self.strips.push(Strip {
                stage,
                region,
                required,
            }),
            FileEdit::RewriteReference {
                from, to, scope, ..
            } => self.rewrites.push(Rewrite { from, to, scope }),
            FileEdit::PatchEnv { op, .. } => self.env.push(op),
            FileEdit::PatchManifestField { op, .. } => self.manifest.push((stage, op)),
            FileEdit::DeleteFile(_)
            | FileEdit::DeleteDir(_)
            | FileEdit::RenameFile { .. }
            | FileEdit::CopyFile { .. } => {}
        }
    }

    pub fn len(&self) -> usize {
        self.strips.len() + self.rewrites.len() + self.env.len() + self.manifest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every queued edit to `text` in one pass.
    pub fn apply(&self, path: &TreePath, text: &str) -> Result<String, GenerationError> {
        let mut out = self.apply_strips(path, text)?;

        for rw in &self.rewrites {
            let (next, _) = rewrite::rewrite(&out, &rw.from, &rw.to, rw.scope);
            out = next;
        }

        if !self.env.is_empty() {
            out = patch_env(&out, &self.env);
        }

        if let Some((first_stage, _)) = self.manifest.first() {
            out = self.apply_manifest(path, &out, *first_stage)?;
        }
        Ok(out)
    }

    fn apply_strips(&self, path: &TreePath, text: &str) -> Result<String, GenerationError> {
        if self.strips.is_empty() {
            return Ok(text.to_string());
        }
        let mut spans = Vec::new();
        for strip in &self.strips {
            let found = if strip.required {
                marker::locate(text, &strip.region)
            } else {
                marker::locate_optional(text, &strip.region)
            };
            let found = found.map_err(|source| {
                GenerationError::stage(
                    strip.stage,
                    StageError::Marker {
                        path: path.clone(),
                        source,
                    },
                )
            })?;
            if !found.is_empty() {
                tracing::debug!("{}: stripping region '{}'", path, strip.region);
            }
            spans.extend(found);
        }
        Ok(marker::remove_spans(text, &spans))
    }

    fn apply_manifest(
        &self,
        path: &TreePath,
        text: &str,
        first_stage: Stage,
    ) -> Result<String, GenerationError> {
        let fail = |stage: Stage, source| {
            GenerationError::stage(
                stage,
                StageError::Manifest {
                    path: path.clone(),
                    source,
                },
            )
        };
        let mut parsed = Manifest::parse(text).map_err(|e| fail(first_stage, e))?;
        for (stage, op) in &self.manifest {
            parsed.apply(op).map_err(|e| fail(*stage, e))?;
        }
        parsed.to_text().map_err(|e| fail(Stage::Write, e))
    }
}
