//! `nodeinit new <TARGET> [selection flags] [--json]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use nodeinit_engine::{publish, Pipeline};
use nodeinit_template::DirTemplate;

use super::output;
use super::selection::{load_settings, SelectionArgs};

/// Generate a project into TARGET.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Directory to create. `.` means the current directory, which must be empty.
    pub target: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the generation report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl NewArgs {
    pub fn run(self) -> Result<()> {
        let settings = load_settings()?;
        let template_dir = self.selection.template_dir(&settings)?;
        // Refuse before asking any questions.
        publish::check_target(&self.target)
            .with_context(|| format!("cannot generate into '{}'", self.target.display()))?;

        let selection = self.selection.resolve_selection()?;
        let resolver = self.selection.resolver(&settings);
        let template = DirTemplate::new(&template_dir);

        let report = Pipeline::new(&resolver)
            .generate(&selection, &template, &self.target)
            .with_context(|| format!("failed to generate '{}'", self.target.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
            return Ok(());
        }

        output::print_summary(&report);
        output::print_changes(&report.files);
        println!(
            "{} Created '{}' in {}",
            "✓".green(),
            report.project_name,
            self.target.display()
        );
        println!("  Next: cd {} && npm install && npm run dev", self.target.display());
        Ok(())
    }
}
