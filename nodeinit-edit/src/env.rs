//! Line-based edits for dotenv files.

/// A single `.env` edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOp {
    /// Replace the first assignment of `key`, or append one.
    Set { key: String, value: String },
    /// Drop every assignment of `key`.
    Unset { key: String },
}

impl EnvOp {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        EnvOp::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn unset(key: impl Into<String>) -> Self {
        EnvOp::Unset { key: key.into() }
    }
}

fn assigned_key(line: &str) -> Option<&str> {
    let t = line.trim_start();
    if t.starts_with('#') {
        return None;
    }
    let t = t.strip_prefix("export ").unwrap_or(t);
    let (key, _) = t.split_once('=')?;
    Some(key.trim())
}

/// Apply `ops` to `text` in order. Comments and unrelated lines are kept.
pub fn patch_env(text: &str, ops: &[EnvOp]) -> String {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    for op in ops {
        match op {
            EnvOp::Set { key, value } => {
                let assignment = format!("{key}={value}");
                match lines.iter().position(|l| assigned_key(l) == Some(key.as_str())) {
                    Some(idx) => lines[idx] = assignment,
                    None => lines.push(assignment),
                }
            }
            EnvOp::Unset { key } => {
                lines.retain(|l| assigned_key(l) != Some(key.as_str()));
            }
        }
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_first_assignment() {
        let src = "# db\nDB_PORT=5432\nDB_NAME=test\n";
        let out = patch_env(src, &[EnvOp::set("DB_PORT", "3306")]);
        assert_eq!(out, "# db\nDB_PORT=3306\nDB_NAME=test\n");
    }

    #[test]
    fn set_appends_missing_key() {
        let out = patch_env("PORT=3000", &[EnvOp::set("DB_STORAGE", "database.sqlite")]);
        assert_eq!(out, "PORT=3000\nDB_STORAGE=database.sqlite\n");
    }

    #[test]
    fn unset_ignores_comments() {
        let src = "# DB_HOST=documented\nDB_HOST=localhost\nexport DB_HOST=again\n";
        let out = patch_env(src, &[EnvOp::unset("DB_HOST")]);
        assert_eq!(out, "# DB_HOST=documented\n");
    }
}
