//! Removes the container setup.

use nodeinit_core::TreePath;

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

pub const DOCKER_FILES: [&str; 4] = [
    "Dockerfile-dev",
    "Dockerfile-prod",
    "docker-compose.yml",
    ".dockerignore",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Docker;

impl Transformer for Docker {
    fn stage(&self) -> Stage {
        Stage::Docker
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        let mut edits: Vec<FileEdit> = DOCKER_FILES
            .iter()
            .map(|f| FileEdit::DeleteFile(TreePath::new(f)))
            .collect();
        edits.push(FileEdit::strip(&ctx.readme(), "docker-docs"));
        edits
    }
}
