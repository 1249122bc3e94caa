//! Change tables shared by `new` and `plan`.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use nodeinit_engine::{FileChange, FileReport, GenerationReport};

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "change")]
    change: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "from")]
    from: String,
}

pub fn print_summary(report: &GenerationReport) {
    println!(
        "nodeinit v{} | {} | {} | {} | {} install",
        env!("CARGO_PKG_VERSION"),
        report.project_name.bold(),
        report.language.label(),
        report.database.label(),
        report.installation_type,
    );
    for (name, version) in &report.resolved {
        println!("  resolved {name}@{version}");
    }
}

pub fn print_changes(files: &[FileReport]) {
    let rows: Vec<ChangeRow> = files
        .iter()
        .filter(|f| f.change != FileChange::Unchanged)
        .map(|f| ChangeRow {
            change: paint(&f.change),
            path: f.path.to_string(),
            from: match &f.change {
                FileChange::Renamed { from } => from.to_string(),
                _ => String::new(),
            },
        })
        .collect();

    let unchanged = files.len() - rows.len();
    if rows.is_empty() {
        println!("No changes against the template ({unchanged} files).");
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{unchanged} file(s) copied unchanged.");
}

fn paint(change: &FileChange) -> String {
    let label = change.label();
    match change {
        FileChange::Unchanged => label.bright_black().to_string(),
        FileChange::Edited => label.yellow().to_string(),
        FileChange::Added => label.green().to_string(),
        FileChange::Removed => label.red().to_string(),
        FileChange::Renamed { .. } => label.cyan().to_string(),
    }
}
