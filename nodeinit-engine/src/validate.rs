//! Consistency Validator.
//!
//! Checks a finished tree against the selection that produced it and
//! reports every violation at once.

use nodeinit_core::{DatabaseKind, FeatureSelection, LanguageVariant, Tree, TreePath, ValidationError};
use nodeinit_edit::{marker, rewrite, Manifest};

use crate::transform::{stale_drivers, DOCKER_FILES, MANIFEST};

const SOURCE_EXTENSIONS: [&str; 4] = ["ts", "js", "mjs", "cjs"];
const RESOLVE_SUFFIXES: [&str; 6] = ["", ".ts", ".js", ".json", "/index.ts", "/index.js"];

/// Validate `tree` as the output for `selection`.
///
/// `selection` is taken as given; callers pass the effective selection.
pub fn validate_tree(tree: &Tree, selection: &FeatureSelection) -> Result<(), Vec<ValidationError>> {
    let mut errors = match selection.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    check_markers(tree, &mut errors);
    check_references(tree, &mut errors);
    check_manifest(tree, selection, &mut errors);
    check_stale_files(tree, selection, &mut errors);

    if errors.is_empty() {
        tracing::debug!("tree of {} files is consistent", tree.len());
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_markers(tree: &Tree, errors: &mut Vec<ValidationError>) {
    for (path, node) in tree.iter() {
        let Some(text) = node.as_text() else { continue };
        for (line, marker) in marker::residual_markers(text) {
            errors.push(ValidationError::ResidualMarker {
                path: path.clone(),
                line,
                marker,
            });
        }
    }
}

fn is_source(path: &TreePath) -> bool {
    path.extension()
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn resolves(tree: &Tree, target: &TreePath) -> bool {
    RESOLVE_SUFFIXES
        .iter()
        .any(|suffix| tree.contains(&TreePath::new(format!("{}{}", target.as_str(), suffix))))
}

fn check_references(tree: &Tree, errors: &mut Vec<ValidationError>) {
    for (path, node) in tree.iter() {
        if !is_source(path) {
            continue;
        }
        let Some(text) = node.as_text() else { continue };
        for spec in rewrite::import_specifiers(text) {
            let specifier = spec.text(text);
            if !(specifier.starts_with("./") || specifier.starts_with("../")) {
                continue;
            }
            let ok = path
                .resolve_relative(specifier)
                .is_some_and(|target| resolves(tree, &target));
            if !ok {
                errors.push(ValidationError::BrokenReference {
                    path: path.clone(),
                    specifier: specifier.to_string(),
                });
            }
        }
    }
}

/// Packages that must be gone, each with the feature that owned it.
fn removed_packages(selection: &FeatureSelection) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if !selection.socket {
        out.push(("socket.io", "socket support".to_string()));
    }
    if !selection.cron {
        out.push(("cron", "cron support".to_string()));
    }
    if !selection.swagger.enabled {
        out.push(("swagger-ui-express", "swagger docs".to_string()));
        out.push(("@types/swagger-ui-express", "swagger docs".to_string()));
    }
    if selection.language == LanguageVariant::Js {
        out.push(("typescript", "the TypeScript toolchain".to_string()));
        out.push(("ts-node", "the TypeScript toolchain".to_string()));
    }
    let other_backends = format!("backends other than {}", selection.database.label());
    for driver in stale_drivers(selection.database) {
        out.push((driver, other_backends.clone()));
    }
    out
}

fn check_manifest(tree: &Tree, selection: &FeatureSelection, errors: &mut Vec<ValidationError>) {
    let path = TreePath::new(MANIFEST);
    let manifest = match tree.text(&path).map(Manifest::parse) {
        Some(Ok(manifest)) => manifest,
        Some(Err(e)) => {
            errors.push(ValidationError::ManifestUnreadable {
                path,
                reason: e.to_string(),
            });
            return;
        }
        None => {
            errors.push(ValidationError::ManifestUnreadable {
                path,
                reason: "missing or not text".to_string(),
            });
            return;
        }
    };

    for (package, feature) in removed_packages(selection) {
        if manifest.has_dependency(package) {
            errors.push(ValidationError::StaleDependency {
                package: package.to_string(),
                feature,
            });
        }
    }

    let database: DatabaseKind = selection.database;
    for driver in database.drivers() {
        if !manifest.has_dependency(driver) {
            errors.push(ValidationError::MissingDependency {
                package: driver.to_string(),
                feature: format!("the {} backend", database.label()),
            });
        }
    }
}

fn check_stale_files(tree: &Tree, selection: &FeatureSelection, errors: &mut Vec<ValidationError>) {
    let ext = selection.language.extension();
    let mut stale: Vec<(TreePath, &str)> = Vec::new();
    if !selection.socket {
        stale.push((TreePath::new(format!("src/config/socketConfig.{ext}")), "socket support"));
    }
    if !selection.cron {
        stale.push((TreePath::new(format!("src/config/cronConfig.{ext}")), "cron support"));
        stale.push((TreePath::new(format!("src/app/enums/CronJob.{ext}")), "cron support"));
        for path in tree.paths_under(&TreePath::new("src/app/crons")) {
            stale.push((path, "cron support"));
        }
    }
    if !selection.swagger.enabled {
        stale.push((TreePath::new(format!("src/config/swaggerConfig.{ext}")), "swagger docs"));
        stale.push((TreePath::new("swagger.json"), "swagger docs"));
    }
    if !selection.docker {
        for file in DOCKER_FILES {
            stale.push((TreePath::new(file), "docker support"));
        }
    }

    for (path, feature) in stale {
        if tree.contains(&path) {
            errors.push(ValidationError::StaleFile {
                path,
                feature: feature.to_string(),
            });
        }
    }
}
