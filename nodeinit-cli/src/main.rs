//! nodeinit: generate a Node backend project from a template.
//!
//! # Usage
//!
//! ```text
//! nodeinit new <TARGET> [selection flags] [--json]
//! nodeinit plan <TARGET> [selection flags] [--json]
//! nodeinit check <DIR> --selection FILE [--json]
//! nodeinit config show | set-template <DIR>
//! ```
//!
//! Exit codes: 0 success, 1 cancelled by the user, 2 any failure.

mod commands;
mod prompt;

use std::fmt;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

use commands::{
    check::CheckArgs, config::ConfigCommand, new::NewArgs, plan::PlanArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "nodeinit",
    version,
    about = "Generate an Express backend project from a template",
    long_about = None,
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). NODEINIT_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a project into TARGET.
    New(NewArgs),

    /// Show what `new` would write, without writing anything.
    Plan(PlanArgs),

    /// Check an existing project tree against a selection.
    Check(CheckArgs),

    /// Show or change user settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// The user backed out of the prompt session.
#[derive(Debug)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cancelled by user")
    }
}

impl std::error::Error for Cancelled {}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<Cancelled>() => {
            eprintln!("{}", "Exited from nodeinit".yellow());
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::New(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("NODEINIT_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
