//! Pipeline Orchestrator.
//!
//! `plan` runs every step up to and including validation in memory;
//! `generate` checks the target first, plans, then publishes. The first
//! failure ends the run and nothing reaches the target.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use nodeinit_core::{FeatureSelection, Tree, TreePath};
use nodeinit_edit::Manifest;
use nodeinit_template::TemplateProvider;

use crate::diff::{self, FileDiff};
use crate::error::{GenerationError, Stage, StageError};
use crate::publish;
use crate::report::{self, FileReport, GenerationReport};
use crate::resolver::{resolve_all, VersionResolver};
use crate::staging::StagingTree;
use crate::transform::{self, TransformContext, MANIFEST};
use crate::validate::validate_tree;

/// The outcome of a dry run.
#[derive(Debug, Clone)]
pub struct Plan {
    /// The selection as actually applied.
    pub selection: FeatureSelection,
    pub template: Tree,
    pub staging: StagingTree,
    pub resolved: BTreeMap<String, String>,
    pub changes: Vec<FileReport>,
    pub started_at: DateTime<Utc>,
}

impl Plan {
    pub fn tree(&self) -> &Tree {
        self.staging.tree()
    }

    pub fn diffs(&self) -> Vec<FileDiff> {
        diff::unified(&self.template, self.staging.tree(), &self.changes)
    }

    pub fn report(&self, target: Option<&Path>) -> GenerationReport {
        GenerationReport {
            project_name: self.selection.project_name.clone(),
            installation_type: self.selection.installation_type,
            language: self.selection.language,
            database: self.selection.database,
            target: target.map(Path::to_path_buf),
            resolved: self.resolved.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            files: self.changes.clone(),
        }
    }
}

pub struct Pipeline<'a> {
    resolver: &'a dyn VersionResolver,
}

impl<'a> Pipeline<'a> {
    pub fn new(resolver: &'a dyn VersionResolver) -> Self {
        Self { resolver }
    }

    /// Steps 1 to 6, in memory.
    pub fn plan(
        &self,
        selection: &FeatureSelection,
        template: &dyn TemplateProvider,
    ) -> Result<Plan, GenerationError> {
        let started_at = Utc::now();
        selection.validate().map_err(GenerationError::InvalidSelection)?;
        let selection = selection.effective();

        tracing::info!("stage: {}", Stage::CopyTemplate);
        let base = template
            .fetch(selection.language)
            .map_err(|e| GenerationError::stage(Stage::CopyTemplate, e))?;
        let mut staging = StagingTree::new(base.clone());

        let resolved = self.resolve_drivers(&base, &selection)?;

        for step in transform::for_selection(&selection) {
            let stage = step.stage();
            tracing::info!("stage: {}", stage);
            let edits = {
                let ctx = TransformContext {
                    tree: staging.tree(),
                    selection: &selection,
                    versions: &resolved,
                };
                step.edits(&ctx)
            };
            tracing::debug!("{}: {} edit(s)", stage, edits.len());
            staging.apply_all(stage, edits)?;
        }

        tracing::info!("stage: {}", Stage::Write);
        staging.write_phase()?;

        tracing::info!("stage: {}", Stage::Sweep);
        staging.sweep_markers();

        tracing::info!("stage: {}", Stage::Validate);
        validate_tree(staging.tree(), &selection).map_err(GenerationError::Inconsistent)?;

        let changes = report::compare(&base, &staging);
        Ok(Plan {
            selection,
            template: base,
            staging,
            resolved,
            changes,
            started_at,
        })
    }

    /// Plan, then publish to `target`. `target` must be absent or empty.
    pub fn generate(
        &self,
        selection: &FeatureSelection,
        template: &dyn TemplateProvider,
        target: &Path,
    ) -> Result<GenerationReport, GenerationError> {
        selection.validate().map_err(GenerationError::InvalidSelection)?;
        publish::check_target(target).map_err(|e| GenerationError::stage(Stage::Publish, e))?;

        let plan = self.plan(selection, template)?;

        tracing::info!("stage: {}", Stage::Publish);
        publish::publish(plan.tree(), target)
            .map_err(|e| GenerationError::stage(Stage::Publish, e))?;
        Ok(plan.report(Some(target)))
    }

    /// Look up the chosen drivers the template manifest does not pin.
    fn resolve_drivers(
        &self,
        base: &Tree,
        selection: &FeatureSelection,
    ) -> Result<BTreeMap<String, String>, GenerationError> {
        let path = TreePath::new(MANIFEST);
        let text = base.text(&path).ok_or_else(|| {
            GenerationError::stage(Stage::Database, StageError::MissingFile { path: path.clone() })
        })?;
        let manifest = Manifest::parse(text).map_err(|source| {
            GenerationError::stage(
                Stage::Database,
                StageError::Manifest {
                    path: path.clone(),
                    source,
                },
            )
        })?;

        let missing: Vec<String> = selection
            .database
            .drivers()
            .iter()
            .filter(|d| !manifest.has_dependency(d))
            .map(|d| d.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(BTreeMap::new());
        }
        tracing::info!("resolving {}", missing.join(", "));
        resolve_all(self.resolver, &missing)
            .map_err(|e| GenerationError::stage(Stage::Database, StageError::Resolver(e)))
    }
}
