//! Transformers: one unit of work per feature.
//!
//! A transformer is a pure function of the current staging tree and the
//! selection. It never mutates anything itself; it returns the
//! [`FileEdit`]s the staging tree should apply on its behalf.

use std::collections::BTreeMap;

use nodeinit_core::{FeatureSelection, LanguageVariant, Tree, TreePath};

use crate::edit::FileEdit;
use crate::error::Stage;

mod api;
mod cron;
mod database;
mod docker;
mod language;
mod project;
mod socket;
mod swagger;

pub use api::ApiMethods;
pub use cron::Cron;
pub use database::{stale_drivers, DatabaseIntegration};
pub use docker::{Docker, DOCKER_FILES};
pub use language::LanguageVariantStep;
pub use project::ProjectName;
pub use socket::Socket;
pub use swagger::Swagger;

pub const MANIFEST: &str = "package.json";
pub const README: &str = "README.md";
pub const ENV_SAMPLE: &str = ".env.sample";
pub const ENV: &str = ".env";

/// What a transformer gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub tree: &'a Tree,
    pub selection: &'a FeatureSelection,
    /// Versions resolved for dependencies the manifest does not pin yet.
    pub versions: &'a BTreeMap<String, String>,
}

impl<'a> TransformContext<'a> {
    pub fn language(&self) -> LanguageVariant {
        self.selection.language
    }

    /// `src/<stem>.<ext>` for the selected language.
    pub fn source(&self, stem: &str) -> TreePath {
        TreePath::new(format!("src/{}.{}", stem, self.language().extension()))
    }

    pub fn server(&self) -> TreePath {
        self.source("server")
    }

    pub fn master_controller(&self) -> TreePath {
        self.source("app/utils/MasterController")
    }

    pub fn config(&self, name: &str) -> TreePath {
        self.source(&format!("config/{name}"))
    }

    pub fn manifest(&self) -> TreePath {
        TreePath::new(MANIFEST)
    }

    pub fn readme(&self) -> TreePath {
        TreePath::new(README)
    }

    /// Every controller module below `src/app/apis`.
    pub fn controllers(&self) -> Vec<TreePath> {
        let ext = self.language().extension();
        self.tree
            .paths_under(&TreePath::new("src/app/apis"))
            .into_iter()
            .filter(|p| p.parent().file_name() == "controllers" && p.extension() == Some(ext))
            .collect()
    }
}

pub trait Transformer {
    fn stage(&self) -> Stage;

    /// The edits this transformer wants for `ctx`.
    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit>;

    /// Files this transformer touches for `ctx`.
    fn touched(&self, ctx: &TransformContext<'_>) -> Vec<TreePath> {
        let mut paths: Vec<TreePath> = self
            .edits(ctx)
            .iter()
            .map(|e| e.path().clone())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

/// The transformers a selection runs, in pipeline order.
///
/// The four feature toggles run only for custom installations and only when
/// the feature is switched off (or, for Swagger, moved).
pub fn for_selection(selection: &FeatureSelection) -> Vec<Box<dyn Transformer>> {
    let mut steps: Vec<Box<dyn Transformer>> = vec![
        Box::new(ProjectName),
        Box::new(LanguageVariantStep),
        Box::new(DatabaseIntegration),
    ];
    if selection.is_all() {
        return steps;
    }
    steps.push(Box::new(ApiMethods));
    if !selection.socket {
        steps.push(Box::new(Socket));
    }
    if !selection.cron {
        steps.push(Box::new(Cron));
    }
    steps.push(Box::new(Swagger));
    if !selection.docker {
        steps.push(Box::new(Docker));
    }
    steps
}
