//! nodeinit engine: turns a template tree and a feature selection into a
//! pruned, consistent project tree.
//!
//! Pipeline:
//!   1. fetch the template variant        (`nodeinit_template`)
//!   2. run the transformers               (`transform`) → `FileEdit`s
//!   3. queue edits per file               (`staging`, `session`)
//!   4. write phase + marker sweep         (`staging`)
//!   5. consistency checks                 (`validate`)
//!   6. publish atomically                 (`publish`)
//!
//! [`Pipeline::plan`] stops after step 5 and keeps everything in memory.

pub mod diff;
pub mod edit;
pub mod error;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod resolver;
pub mod session;
pub mod staging;
pub mod transform;
pub mod validate;

pub use diff::FileDiff;
pub use edit::FileEdit;
pub use error::{GenerationError, Stage, StageError};
pub use pipeline::{Pipeline, Plan};
pub use report::{FileChange, FileReport, GenerationReport};
pub use resolver::{FixedVersions, NpmRegistry, RecordingResolver, ResolverError, VersionResolver};
pub use session::EditSession;
pub use staging::StagingTree;
pub use transform::{TransformContext, Transformer};
pub use validate::validate_tree;
