//! API documentation: moved to a custom path, or removed.

use nodeinit_core::{TreePath, DEFAULT_SWAGGER_PATH};
use nodeinit_edit::{ManifestOp, RefScope};

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger;

impl Transformer for Swagger {
    fn stage(&self) -> Stage {
        Stage::Swagger
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        let swagger = &ctx.selection.swagger;
        let express = ctx.config("expressConfig");

        if swagger.enabled {
            if swagger.path == DEFAULT_SWAGGER_PATH {
                return Vec::new();
            }
            return vec![FileEdit::rewrite(
                &express,
                DEFAULT_SWAGGER_PATH,
                &swagger.path,
                RefScope::StringLiteral,
            )];
        }

        let manifest = ctx.manifest();
        let controller = ctx.master_controller();
        let mut edits = vec![
            FileEdit::manifest(&manifest, ManifestOp::RemoveDependency("swagger-ui-express".into())),
            FileEdit::manifest(
                &manifest,
                ManifestOp::RemoveDependency("@types/swagger-ui-express".into()),
            ),
            FileEdit::DeleteFile(ctx.config("swaggerConfig")),
            FileEdit::DeleteFile(TreePath::new("swagger.json")),
        ];
        for region in ["swagger-import", "swagger-config", "swagger-serve"] {
            edits.push(FileEdit::strip(&express, region));
        }
        for region in ["swagger-import", "swagger-record", "swagger-doc"] {
            edits.push(FileEdit::strip(&controller, region));
        }
        for file in ctx.controllers() {
            edits.push(FileEdit::strip(&file, "swagger-doc"));
        }
        edits.push(FileEdit::strip(&ctx.readme(), "swagger-docs"));
        edits
    }
}
