//! Packaging adjustments for the JavaScript variant.
//!
//! The template's manifest and Dockerfiles are written for TypeScript, so
//! the TypeScript variant needs nothing here.

use nodeinit_core::{LanguageVariant, TreePath};
use nodeinit_edit::ManifestOp;
use serde_json::Value;

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageVariantStep;

impl Transformer for LanguageVariantStep {
    fn stage(&self) -> Stage {
        Stage::LanguageVariant
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        if ctx.language() == LanguageVariant::Ts {
            return Vec::new();
        }
        let manifest = ctx.manifest();
        let ops = [
            ManifestOp::SetField {
                key: "main".into(),
                value: Value::String("src/server.js".into()),
            },
            ManifestOp::SetScript {
                name: "start".into(),
                command: "node src/server.js".into(),
            },
            ManifestOp::SetScript {
                name: "dev".into(),
                command: "nodemon src/server.js".into(),
            },
            ManifestOp::RemoveScript("build".into()),
            ManifestOp::RemoveDependency("typescript".into()),
            ManifestOp::RemoveDependency("ts-node".into()),
            ManifestOp::RemoveDependencyPrefix("@types/".into()),
        ];

        let mut edits = vec![FileEdit::DeleteFile(TreePath::new("tsconfig.json"))];
        edits.extend(ops.into_iter().map(|op| FileEdit::manifest(&manifest, op)));
        edits.push(FileEdit::strip(&TreePath::new("Dockerfile-prod"), "ts-build"));
        edits
    }
}
