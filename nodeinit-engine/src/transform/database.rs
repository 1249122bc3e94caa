//! Database Integration.
//!
//! Runs for every installation. Reduces the template's two ORM stacks to
//! the chosen one under canonical file names, narrows the manifest to the
//! chosen driver set and fills in the dotenv files.

use nodeinit_core::{DatabaseKind, OrmFamily, TreePath};
use nodeinit_edit::{DependencySection, EnvOp, ManifestOp, RefScope};

use super::{TransformContext, Transformer, ENV, ENV_SAMPLE};
use crate::edit::FileEdit;
use crate::error::Stage;

const REPOSITORIES: &str = "src/app/apis/user/repositories";
const MODELS: &str = "src/app/models";
const SERVICE: &str = "src/app/apis/user/services/user.service";

const PLACEHOLDER_USER: &str = "db_user";
const PLACEHOLDER_PASS: &str = "change-me";

#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseIntegration;

/// Server regions owned by the other family.
fn server_regions(dropped: OrmFamily) -> &'static [&'static str] {
    match dropped {
        OrmFamily::Mongoose => &["mongoose-import", "mongoose-connect"],
        OrmFamily::Sequelize => &["sequelize-import", "dialect-valid", "sequelize-connect"],
    }
}

/// Dependencies the manifest must not list for `kind`.
pub fn stale_drivers(kind: DatabaseKind) -> Vec<&'static str> {
    let keep = kind.drivers();
    DatabaseKind::driver_universe()
        .into_iter()
        .filter(|d| !keep.contains(d))
        .collect()
}

/// Database name used in connection settings: npm-ish names with the
/// separators a database would choke on replaced.
fn database_name(project: &str) -> String {
    project
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn env_ops(kind: DatabaseKind, project: &str) -> Vec<EnvOp> {
    let mut ops = vec![EnvOp::set("DB_DIALECT", kind.dialect())];
    let name = database_name(project);
    match kind {
        DatabaseKind::Mongo => {
            ops.push(EnvOp::set("MONGO_URI", format!("mongodb://127.0.0.1:27017/{name}")));
        }
        DatabaseKind::Sqlite => {
            for key in ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASS"] {
                ops.push(EnvOp::unset(key));
            }
            ops.push(EnvOp::set("DB_NAME", name));
            ops.push(EnvOp::set("DB_STORAGE", "database.sqlite"));
        }
        _ => {
            if let Some(port) = kind.default_port() {
                ops.push(EnvOp::set("DB_PORT", port.to_string()));
            }
            ops.push(EnvOp::set("DB_NAME", name));
            ops.push(EnvOp::set("DB_USER", PLACEHOLDER_USER));
            ops.push(EnvOp::set("DB_PASS", PLACEHOLDER_PASS));
        }
    }
    ops
}

impl Transformer for DatabaseIntegration {
    fn stage(&self) -> Stage {
        Stage::Database
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        let kind = ctx.selection.database;
        let kept = kind.family();
        let dropped = kept.other();
        let ext = ctx.language().extension();
        let mut edits = Vec::new();

        // 1. Repository and model: drop the other family, canonicalise ours.
        for (dir, stem) in [(REPOSITORIES, "user.repository"), (MODELS, "user.model")] {
            edits.push(FileEdit::DeleteFile(TreePath::new(format!(
                "{dir}/{}.{stem}.{ext}",
                dropped.prefix()
            ))));
            edits.push(FileEdit::RenameFile {
                from: TreePath::new(format!("{dir}/{}.{stem}.{ext}", kept.prefix())),
                to: TreePath::new(format!("{dir}/{stem}.{ext}")),
            });
        }
        edits.push(FileEdit::rewrite(
            &TreePath::new(format!("{REPOSITORIES}/user.repository.{ext}")),
            "../../../models/*.user.model",
            "../../../models/user.model",
            RefScope::ImportPath,
        ));
        edits.push(FileEdit::rewrite(
            &TreePath::new(format!("{SERVICE}.{ext}")),
            "../repositories/*.user.repository",
            "../repositories/user.repository",
            RefScope::ImportPath,
        ));

        // 2. Configuration module and server wiring.
        edits.push(FileEdit::DeleteFile(
            ctx.config(&format!("{}Config", dropped.prefix())),
        ));
        let server = ctx.server();
        for region in server_regions(dropped) {
            edits.push(FileEdit::strip_required(&server, region));
        }

        // 3. Dotenv files.
        let sample = TreePath::new(ENV_SAMPLE);
        if ctx.tree.contains(&sample) {
            let env = TreePath::new(ENV);
            edits.push(FileEdit::CopyFile {
                from: sample.clone(),
                to: env.clone(),
            });
            let region = format!("{}-env", dropped.prefix());
            let ops = env_ops(kind, &ctx.selection.project_name);
            for file in [sample, env] {
                edits.push(FileEdit::strip_required(&file, &region));
                edits.extend(ops.iter().cloned().map(|op| FileEdit::env(&file, op)));
            }
        }

        // 4. Manifest: exactly the chosen driver set.
        let manifest = ctx.manifest();
        for stale in stale_drivers(kind) {
            edits.push(FileEdit::manifest(
                &manifest,
                ManifestOp::RemoveDependency(stale.to_string()),
            ));
        }
        for driver in kind.drivers() {
            if let Some(version) = ctx.versions.get(*driver) {
                edits.push(FileEdit::manifest(
                    &manifest,
                    ManifestOp::AddDependency {
                        section: DependencySection::Dependencies,
                        name: driver.to_string(),
                        version: version.clone(),
                    },
                ));
            }
        }

        edits
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use nodeinit_core::FeatureSelection;

    use super::*;
    use crate::transform::testing;

    #[test]
    fn stale_drivers_exclude_the_chosen_set() {
        let stale = stale_drivers(DatabaseKind::Postgres);
        assert!(stale.contains(&"mongoose"));
        assert!(stale.contains(&"mysql2"));
        assert!(!stale.contains(&"pg"));
        assert!(!stale.contains(&"sequelize"));
        assert!(stale_drivers(DatabaseKind::Mongo).contains(&"sequelize"));
    }

    #[test]
    fn database_name_replaces_separators() {
        assert_eq!(database_name("my-shop.api"), "my_shop_api");
    }

    #[test]
    fn sqlite_drops_network_settings() {
        let ops = env_ops(DatabaseKind::Sqlite, "demo");
        assert!(ops.contains(&EnvOp::unset("DB_HOST")));
        assert!(ops.contains(&EnvOp::set("DB_STORAGE", "database.sqlite")));
        assert!(!ops.iter().any(|op| matches!(op, EnvOp::Set { key, .. } if key == "DB_PORT")));
    }

    #[test]
    fn mongo_renames_mongoose_files_and_strips_sequelize_wiring() {
        let sel = FeatureSelection::custom("demo", DatabaseKind::Mongo);
        let tree = testing::fixture(&sel);
        let versions = BTreeMap::new();
        let edits = DatabaseIntegration.edits(&testing::ctx(&tree, &sel, &versions));
        assert!(edits.contains(&FileEdit::RenameFile {
            from: TreePath::new("src/app/models/mongoose.user.model.ts"),
            to: TreePath::new("src/app/models/user.model.ts"),
        }));
        assert!(edits.contains(&FileEdit::DeleteFile(TreePath::new(
            "src/config/sequelizeConfig.ts"
        ))));
        assert!(edits.contains(&FileEdit::strip_required(
            &TreePath::new("src/server.ts"),
            "dialect-valid"
        )));
        assert!(!edits
            .iter()
            .any(|e| matches!(e, FileEdit::PatchManifestField { op: ManifestOp::AddDependency { .. }, .. })));
    }

    #[test]
    fn resolved_drivers_are_added() {
        let sel = FeatureSelection::custom("demo", DatabaseKind::Mysql);
        let tree = testing::fixture(&sel);
        let versions: BTreeMap<String, String> =
            [("mysql2".to_string(), "3.6.5".to_string())].into_iter().collect();
        let edits = DatabaseIntegration.edits(&testing::ctx(&tree, &sel, &versions));
        assert!(edits.contains(&FileEdit::manifest(
            &TreePath::new("package.json"),
            ManifestOp::AddDependency {
                section: DependencySection::Dependencies,
                name: "mysql2".into(),
                version: "3.6.5".into(),
            }
        )));
        assert!(edits.contains(&FileEdit::env(
            &TreePath::new(".env"),
            EnvOp::set("DB_PORT", "3306")
        )));
    }
}
