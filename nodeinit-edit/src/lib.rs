//! # nodeinit-edit
//!
//! Pure text primitives used by the generation engine. Nothing here touches
//! the filesystem.
//!
//! - [`marker`]: locate and strip sentinel-marked regions, sweep markers
//! - [`rewrite`]: token-anchored reference rewriting
//! - [`manifest`]: `package.json` patching
//! - [`env`]: dotenv line edits

pub mod env;
pub mod error;
pub mod lexer;
pub mod manifest;
pub mod marker;
pub mod rewrite;

pub use env::{patch_env, EnvOp};
pub use error::{ManifestError, MarkerError};
pub use manifest::{DependencySection, Manifest, ManifestOp};
pub use marker::{LineSpan, MARKER_PREFIX};
pub use rewrite::{PathPattern, RefScope};
