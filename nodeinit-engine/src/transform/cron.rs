//! Removes scheduled-job support.

use nodeinit_core::TreePath;
use nodeinit_edit::ManifestOp;

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

#[derive(Debug, Clone, Copy, Default)]
pub struct Cron;

const CONTROLLER_REGIONS: [&str; 5] = [
    "cron-import",
    "cron-requests",
    "cron-interface",
    "cron-controller",
    "cron-job",
];

impl Transformer for Cron {
    fn stage(&self) -> Stage {
        Stage::Cron
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        let manifest = ctx.manifest();
        let server = ctx.server();
        let controller = ctx.master_controller();
        let mut edits = vec![
            FileEdit::manifest(&manifest, ManifestOp::RemoveDependency("cron".into())),
            FileEdit::manifest(&manifest, ManifestOp::RemoveDependency("@types/cron".into())),
            FileEdit::DeleteFile(ctx.config("cronConfig")),
            FileEdit::DeleteDir(TreePath::new("src/app/crons")),
            FileEdit::DeleteFile(ctx.source("app/enums/CronJob")),
            FileEdit::strip(&server, "cron-import"),
            FileEdit::strip(&server, "cron-init"),
            FileEdit::strip(&ctx.readme(), "cron-docs"),
        ];
        edits.extend(
            CONTROLLER_REGIONS
                .iter()
                .map(|region| FileEdit::strip(&controller, region)),
        );
        edits
    }
}
