//! `nodeinit config show` and `nodeinit config set-template <DIR>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::{settings::Style, Table, Tabled};

use nodeinit_core::settings;
use nodeinit_template::{detect_layout, load_dir, Layout};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the current settings.
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Remember DIR as the template to generate from.
    SetTemplate {
        dir: PathBuf,
    },
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "key")]
    key: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

pub fn run(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show(json),
        ConfigCommand::SetTemplate { dir } => set_template(dir),
    }
}

fn show(json: bool) -> Result<()> {
    let home = settings::home().context("could not determine home directory")?;
    let current = settings::load_at(&home).context("failed to load settings")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&current).context("failed to serialize settings")?
        );
        return Ok(());
    }

    let rows = vec![
        SettingRow {
            key: "template_dir",
            value: current
                .template_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(not set)".to_string()),
        },
        SettingRow {
            key: "registry_url",
            value: current.registry_url.clone(),
        },
        SettingRow {
            key: "resolver_timeout_secs",
            value: current.resolver_timeout_secs.to_string(),
        },
        SettingRow {
            key: "resolver_retries",
            value: current.resolver_retries.to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("File: {}", settings::settings_path_at(&home).display());
    Ok(())
}

fn set_template(dir: PathBuf) -> Result<()> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("cannot resolve path '{}'", dir.display()))?;
    let tree = load_dir(&dir).with_context(|| format!("cannot read template at {}", dir.display()))?;
    let layout = detect_layout(&tree)
        .with_context(|| format!("{} does not look like a template", dir.display()))?;

    let home = settings::home().context("could not determine home directory")?;
    let mut current = settings::load_at(&home).context("failed to load settings")?;
    current.template_dir = Some(dir.clone());
    settings::save_at(&home, &current).context("failed to save settings")?;

    let layout = match layout {
        Layout::Dual => "TypeScript + JavaScript".to_string(),
        Layout::Single(variant) => format!("{} only", variant.label()),
    };
    println!("✓ Template set to {} ({layout})", dir.display());
    Ok(())
}
