//! `nodeinit check <DIR> --selection FILE`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use nodeinit_core::selection;
use nodeinit_engine::validate_tree;
use nodeinit_template::load_dir;

/// Run the consistency checks against a project already on disk.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Project root to check.
    pub dir: PathBuf,

    /// The selection the project was generated from.
    #[arg(long, value_name = "FILE")]
    pub selection: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckJson {
    ok: bool,
    files: usize,
    violations: Vec<String>,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let sel = selection::load(&self.selection)
            .with_context(|| format!("cannot read selection from {}", self.selection.display()))?;
        let tree = load_dir(&self.dir)
            .with_context(|| format!("cannot read project at {}", self.dir.display()))?;

        let violations: Vec<String> = match validate_tree(&tree, &sel.effective()) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(ToString::to_string).collect(),
        };

        if self.json {
            let payload = CheckJson {
                ok: violations.is_empty(),
                files: tree.len(),
                violations: violations.clone(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
            );
        } else if violations.is_empty() {
            println!(
                "{} {} is consistent ({} files)",
                "✓".green(),
                self.dir.display(),
                tree.len()
            );
        } else {
            for v in &violations {
                println!("{} {}", "✗".red(), v);
            }
        }

        if !violations.is_empty() {
            bail!("{} problem(s) found in {}", violations.len(), self.dir.display());
        }
        Ok(())
    }
}
