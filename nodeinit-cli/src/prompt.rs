//! Interactive prompt session.
//!
//! States: Prompting → (answers complete) done, or Prompting → Cancelled.
//! From Cancelled the user either starts over (back to Prompting, without
//! the intro) or exits. End of input, or a line holding only ESC, cancels
//! the question being asked.
//!
//! Questions go to `out`, never to stdout, so `--json` output stays clean.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use nodeinit_core::selection::is_valid_swagger_path;
use nodeinit_core::{
    is_valid_package_name, ApiMethod, DatabaseKind, FeatureSelection, InstallationType,
    LanguageVariant, DEFAULT_SWAGGER_PATH, MIN_PROJECT_NAME_LEN,
};

const DEFAULT_NAME: &str = "my-project";
const SUGGESTED_SWAGGER_PATH: &str = "/swagger";
const ESC: &str = "\u{1b}";

enum State {
    Prompting { restarted: bool },
    Cancelled,
}

/// Run the session until the user finishes or gives up.
///
/// `Ok(None)` means the user cancelled and declined to start over.
pub fn run_session<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<FeatureSelection>> {
    let mut prompter = Prompter { input, out };
    let mut state = State::Prompting { restarted: false };
    loop {
        state = match state {
            State::Prompting { restarted } => {
                if !restarted {
                    prompter.intro()?;
                }
                match prompter.ask_selection()? {
                    Some(selection) => return Ok(Some(selection)),
                    None => {
                        writeln!(prompter.out, "{}", "Cancelled by user".yellow())?;
                        State::Cancelled
                    }
                }
            }
            State::Cancelled => match prompter.confirm("Do you want to start over?", false)? {
                Some(true) => State::Prompting { restarted: true },
                _ => return Ok(None),
            },
        };
    }
}

struct Prompter<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    fn intro(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "nodeinit".bold())?;
        writeln!(
            self.out,
            "Sets up an Express backend with your database, socket.io, cron, swagger and docker."
        )?;
        writeln!(
            self.out,
            "{}",
            "Press Enter to accept a default. End of input cancels.".bright_black()
        )
    }

    /// `None` on cancellation at any question.
    fn ask_selection(&mut self) -> io::Result<Option<FeatureSelection>> {
        let Some(project_name) = self.text("What is your project name?", DEFAULT_NAME, |v| {
            if v.chars().count() < MIN_PROJECT_NAME_LEN {
                Err(format!(
                    "Name must be at least {MIN_PROJECT_NAME_LEN} characters long"
                ))
            } else if !is_valid_package_name(v) {
                Err("Name must be lowercase with no spaces".to_string())
            } else {
                Ok(())
            }
        })?
        else {
            return Ok(None);
        };

        let languages = [
            (LanguageVariant::Ts, "TypeScript", "Recommended"),
            (LanguageVariant::Js, "JavaScript", ""),
        ];
        let Some(language) = self.select("Pick a language.", &languages)? else {
            return Ok(None);
        };

        let databases: Vec<(DatabaseKind, &str, &str)> = DatabaseKind::ALL
            .iter()
            .map(|&kind| (kind, kind.label(), database_hint(kind)))
            .collect();
        let Some(database) = self.select("Pick a database.", &databases)? else {
            return Ok(None);
        };

        let kinds = [
            (InstallationType::All, "All", "Recommended"),
            (InstallationType::Custom, "Custom", "Select what you want"),
        ];
        let Some(installation_type) = self.select("Pick an installation type.", &kinds)? else {
            return Ok(None);
        };

        let mut selection = FeatureSelection::all(project_name, database);
        selection.language = language;
        if installation_type == InstallationType::All {
            return Ok(Some(selection));
        }
        selection.installation_type = InstallationType::Custom;

        let Some(methods) = self.methods()? else {
            return Ok(None);
        };
        selection.api_methods = methods;

        let Some(socket) = self.confirm("Do you want to use socket?", true)? else {
            return Ok(None);
        };
        let Some(cron) = self.confirm("Do you want to use cron jobs?", true)? else {
            return Ok(None);
        };
        let Some(swagger) = self.confirm("Do you want to use swagger?", true)? else {
            return Ok(None);
        };
        let swagger_path = if swagger {
            let answer = self.text("What is your swagger path?", SUGGESTED_SWAGGER_PATH, |v| {
                if !v.starts_with('/') {
                    Err("Path must start with /".to_string())
                } else if !is_valid_swagger_path(v) {
                    Err("Invalid path".to_string())
                } else {
                    Ok(())
                }
            })?;
            match answer {
                Some(path) => path,
                None => return Ok(None),
            }
        } else {
            DEFAULT_SWAGGER_PATH.to_string()
        };
        let Some(docker) = self.confirm("Do you want to use docker?", true)? else {
            return Ok(None);
        };

        selection.socket = socket;
        selection.cron = cron;
        selection.swagger.enabled = swagger;
        selection.swagger.path = swagger_path;
        selection.docker = docker;
        Ok(Some(selection))
    }

    // ---- primitives

    /// Next answer line without its line ending; `None` on cancellation.
    fn read_answer(&mut self) -> io::Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\r', '\n']);
        if answer.trim() == ESC {
            return Ok(None);
        }
        Ok(Some(answer.trim().to_string()))
    }

    fn question(&mut self, message: &str, default: &str) -> io::Result<()> {
        if default.is_empty() {
            write!(self.out, "{} {} ", "?".cyan().bold(), message.bold())
        } else {
            write!(
                self.out,
                "{} {} {} ",
                "?".cyan().bold(),
                message.bold(),
                format!("({default})").bright_black()
            )
        }
    }

    fn complain(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "  {}", message.red())
    }

    fn text(
        &mut self,
        message: &str,
        default: &str,
        validate: impl Fn(&str) -> Result<(), String>,
    ) -> io::Result<Option<String>> {
        loop {
            self.question(message, default)?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            let value = if answer.is_empty() {
                default.to_string()
            } else {
                answer
            };
            match validate(&value) {
                Ok(()) => return Ok(Some(value)),
                Err(reason) => self.complain(&reason)?,
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<Option<bool>> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            self.question(message, hint)?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(Some(default)),
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.complain("Please answer yes or no")?,
            }
        }
    }

    /// Options are listed numbered; the answer is a number or a label, and
    /// the first option is the default.
    fn select<T: Copy>(
        &mut self,
        message: &str,
        options: &[(T, &str, &str)],
    ) -> io::Result<Option<T>> {
        loop {
            self.question(message, options.first().map_or("", |o| o.1))?;
            writeln!(self.out)?;
            self.list(options)?;
            write!(self.out, "  > ")?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            if answer.is_empty() {
                if let Some(first) = options.first() {
                    return Ok(Some(first.0));
                }
            }
            match pick(options, &answer) {
                Some(value) => return Ok(Some(value)),
                None => self.complain(&format!("'{answer}' is not one of the options"))?,
            }
        }
    }

    fn methods(&mut self) -> io::Result<Option<Vec<ApiMethod>>> {
        let options: Vec<(ApiMethod, String, &str)> = ApiMethod::ALL
            .iter()
            .map(|&m| (m, m.to_string(), method_hint(m)))
            .collect();
        let borrowed: Vec<(ApiMethod, &str, &str)> = options
            .iter()
            .map(|(m, label, hint)| (*m, label.as_str(), *hint))
            .collect();
        loop {
            self.question("Select API types. (At least one is required)", "")?;
            writeln!(self.out)?;
            self.list(&borrowed)?;
            write!(self.out, "  comma separated > ")?;
            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            let picked: Option<Vec<ApiMethod>> = answer
                .split([',', ' '])
                .filter(|part| !part.is_empty())
                .map(|part| pick(&borrowed, part))
                .collect();
            match picked {
                Some(methods) if !methods.is_empty() => return Ok(Some(methods)),
                Some(_) => self.complain("At least one API type is required")?,
                None => self.complain(&format!("'{answer}' contains an unknown API type"))?,
            }
        }
    }

    fn list<T>(&mut self, options: &[(T, &str, &str)]) -> io::Result<()> {
        for (idx, (_, label, hint)) in options.iter().enumerate() {
            if hint.is_empty() {
                writeln!(self.out, "  {}) {}", idx + 1, label)?;
            } else {
                writeln!(
                    self.out,
                    "  {}) {} {}",
                    idx + 1,
                    label,
                    format!("({hint})").bright_black()
                )?;
            }
        }
        Ok(())
    }
}

/// Match `answer` against a 1-based index or a label, case-insensitively.
fn pick<T: Copy>(options: &[(T, &str, &str)], answer: &str) -> Option<T> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).map(|o| o.0);
    }
    options
        .iter()
        .find(|(_, label, _)| label.eq_ignore_ascii_case(answer))
        .map(|o| o.0)
}

fn database_hint(kind: DatabaseKind) -> &'static str {
    match kind {
        DatabaseKind::Mongo => "Recommended for beginners",
        DatabaseKind::Sqlite => "Recommended for testing",
        _ => "Recommended for production",
    }
}

fn method_hint(method: ApiMethod) -> &'static str {
    match method {
        ApiMethod::Get => "Get data from server",
        ApiMethod::Post => "Create data on server",
        ApiMethod::Put | ApiMethod::Patch => "Update data on server",
        ApiMethod::Delete => "Remove data from server",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(script: &str) -> (Option<FeatureSelection>, String) {
        colored::control::set_override(false);
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = run_session(&mut input, &mut out).expect("session");
        (result, String::from_utf8(out).expect("utf-8"))
    }

    #[test]
    fn defaults_give_a_full_typescript_install() {
        let (sel, _) = session("\n\n\n\n");
        let sel = sel.expect("completed");
        assert_eq!(sel.project_name, DEFAULT_NAME);
        assert_eq!(sel.language, LanguageVariant::Ts);
        assert_eq!(sel.database, DatabaseKind::Mongo);
        assert!(sel.is_all());
    }

    #[test]
    fn custom_answers() {
        let (sel, _) = session("billing-api\njavascript\n3\ncustom\nget, POST\nn\nno\ny\n/docs\nn\n");
        let sel = sel.expect("completed");
        assert_eq!(sel.project_name, "billing-api");
        assert_eq!(sel.language, LanguageVariant::Js);
        assert_eq!(sel.database, DatabaseKind::Postgres);
        assert_eq!(sel.installation_type, InstallationType::Custom);
        assert_eq!(sel.api_methods, vec![ApiMethod::Get, ApiMethod::Post]);
        assert!(!sel.socket);
        assert!(!sel.cron);
        assert!(sel.swagger.enabled);
        assert_eq!(sel.swagger.path, "/docs");
        assert!(!sel.docker);
        assert!(sel.validate().is_ok());
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let (sel, out) = session("ab\nshop\n\n10\nmysql\n2\n\nfoo\npatch\n\n\ny\nno-slash\n/api_v1\n\n");
        let sel = sel.expect("completed");
        assert_eq!(sel.project_name, "shop");
        assert_eq!(sel.database, DatabaseKind::Mysql);
        assert_eq!(sel.api_methods, vec![ApiMethod::Patch]);
        assert_eq!(sel.swagger.path, "/api_v1");
        assert!(out.contains("Name must be at least 3 characters long"));
        assert!(out.contains("'10' is not one of the options"));
        assert!(out.contains("At least one API type is required"));
        assert!(out.contains("Path must start with /"));
    }

    #[test]
    fn uppercase_names_are_asked_again() {
        let (sel, out) = session("MyApp\nmy-app\n\n\n\n");
        assert_eq!(sel.expect("completed").project_name, "my-app");
        assert!(out.contains("Name must be lowercase with no spaces"));
    }

    #[test]
    fn end_of_input_cancels_and_exits() {
        let (sel, out) = session("demo-app\n");
        assert!(sel.is_none());
        assert!(out.contains("Cancelled by user"));
        assert!(out.contains("Do you want to start over?"));
    }

    #[test]
    fn declining_to_start_over_exits() {
        let (sel, _) = session("\u{1b}\nn\n");
        assert!(sel.is_none());
    }

    #[test]
    fn start_over_skips_the_intro() {
        let (sel, out) = session("demo-app\n\u{1b}\ny\nsecond-try\n\n\n\n");
        assert_eq!(sel.expect("completed").project_name, "second-try");
        assert_eq!(out.matches("Press Enter to accept a default").count(), 1);
        assert_eq!(out.matches("What is your project name?").count(), 2);
    }
}
