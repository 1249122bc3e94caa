//! `nodeinit plan <TARGET>`: what `new` would do, nothing written.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use nodeinit_engine::{publish, FileChange, GenerationReport, Pipeline};
use nodeinit_template::DirTemplate;

use super::output;
use super::selection::{load_settings, SelectionArgs};

/// Arguments for `nodeinit plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Directory `new` would create.
    pub target: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print the report and diffs as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlanJson {
    #[serde(flatten)]
    report: GenerationReport,
    diffs: Vec<DiffJson>,
}

#[derive(Serialize)]
struct DiffJson {
    path: String,
    #[serde(flatten)]
    change: FileChange,
    unified_diff: String,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let settings = load_settings()?;
        let template_dir = self.selection.template_dir(&settings)?;
        let selection = self.selection.resolve_selection()?;
        let resolver = self.selection.resolver(&settings);
        let template = DirTemplate::new(&template_dir);

        let plan = Pipeline::new(&resolver)
            .plan(&selection, &template)
            .context("dry run failed")?;
        let report = plan.report(Some(self.target.as_path()));
        let diffs = plan.diffs();
        let blocked = publish::check_target(&self.target).err();

        if self.json {
            let payload = PlanJson {
                report,
                diffs: diffs
                    .into_iter()
                    .map(|d| DiffJson {
                        path: d.path.to_string(),
                        change: d.change,
                        unified_diff: d.unified_diff,
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize plan")?
            );
            return Ok(());
        }

        output::print_summary(&report);
        output::print_changes(&report.files);
        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        if let Some(err) = blocked {
            println!("{} {}", "warning:".yellow().bold(), err);
        }
        println!("Dry run: nothing was written.");
        Ok(())
    }
}
