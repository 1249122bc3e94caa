use nodeinit_edit::ManifestOp;

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

/// Writes the project name into the manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectName;

impl Transformer for ProjectName {
    fn stage(&self) -> Stage {
        Stage::ProjectName
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        vec![FileEdit::manifest(
            &ctx.manifest(),
            ManifestOp::SetName(ctx.selection.project_name.clone()),
        )]
    }
}
