//! Removes the Socket.IO channel.

use nodeinit_edit::ManifestOp;

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

#[derive(Debug, Clone, Copy, Default)]
pub struct Socket;

const CONTROLLER_REGIONS: [&str; 5] = [
    "socket-import",
    "socket-requests",
    "socket-interface",
    "socket-controller",
    "socket-io",
];

impl Transformer for Socket {
    fn stage(&self) -> Stage {
        Stage::Socket
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        let server = ctx.server();
        let controller = ctx.master_controller();
        let mut edits = vec![
            FileEdit::manifest(&ctx.manifest(), ManifestOp::RemoveDependency("socket.io".into())),
            FileEdit::DeleteFile(ctx.config("socketConfig")),
            FileEdit::strip(&server, "socket-import"),
            FileEdit::strip(&server, "socket-init"),
            FileEdit::strip(&ctx.source("app/routes/user.routes"), "socket-events"),
            FileEdit::strip(&ctx.readme(), "socket-docs"),
        ];
        edits.extend(
            CONTROLLER_REGIONS
                .iter()
                .map(|region| FileEdit::strip(&controller, region)),
        );
        edits
    }
}
