//! Manifest Patcher for `package.json`.
//!
//! The manifest is parsed into an order-preserving JSON object, patched,
//! and re-serialized with two-space indentation and a trailing newline.
//! Dependency sections are sorted by package name on every write so the
//! output is stable regardless of the order operations ran in.

use serde_json::{Map, Value};

use crate::error::ManifestError;

/// Sections that hold `name → version` pairs.
pub const DEPENDENCY_SECTIONS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencySection {
    Dependencies,
    DevDependencies,
}

impl DependencySection {
    pub fn key(self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::DevDependencies => "devDependencies",
        }
    }
}

/// A single manifest edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestOp {
    SetName(String),
    /// Set a top-level field.
    SetField { key: String, value: Value },
    SetScript { name: String, command: String },
    RemoveScript(String),
    /// Inserts `name → "^" + version`, replacing any existing entry.
    AddDependency {
        section: DependencySection,
        name: String,
        version: String,
    },
    /// Deletes `name` from every dependency section; absent is a no-op.
    RemoveDependency(String),
    /// Deletes every dependency whose name starts with the prefix.
    RemoveDependencyPrefix(String),
}

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    root: Map<String, Value>,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_str(text).map_err(|source| ManifestError::ParseError { source })?;
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(ManifestError::NotAnObject {
                field: "<root>".to_string(),
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.root.get("name").and_then(Value::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.root
            .get("scripts")
            .and_then(Value::as_object)
            .and_then(|s| s.get(name))
            .and_then(Value::as_str)
    }

    /// Version spec of `name` in whichever section lists it first.
    pub fn dependency(&self, name: &str) -> Option<&str> {
        DEPENDENCY_SECTIONS.iter().find_map(|section| {
            self.root
                .get(*section)
                .and_then(Value::as_object)
                .and_then(|deps| deps.get(name))
                .and_then(Value::as_str)
        })
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependency(name).is_some()
    }

    /// Every dependency name across all sections, sorted and deduplicated.
    pub fn dependency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = DEPENDENCY_SECTIONS
            .iter()
            .filter_map(|section| self.root.get(*section).and_then(Value::as_object))
            .flat_map(|deps| deps.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn apply(&mut self, op: &ManifestOp) -> Result<(), ManifestError> {
        match op {
            ManifestOp::SetName(name) => {
                self.root
                    .insert("name".to_string(), Value::String(name.clone()));
            }
            ManifestOp::SetField { key, value } => {
                self.root.insert(key.clone(), value.clone());
            }
            ManifestOp::SetScript { name, command } => {
                self.section_mut("scripts")?
                    .insert(name.clone(), Value::String(command.clone()));
            }
            ManifestOp::RemoveScript(name) => {
                if let Some(scripts) = self.existing_section_mut("scripts")? {
                    scripts.shift_remove(name);
                }
            }
            ManifestOp::AddDependency {
                section,
                name,
                version,
            } => {
                let spec = format!("^{}", version.trim_start_matches(['^', '~', 'v']));
                self.section_mut(section.key())?
                    .insert(name.clone(), Value::String(spec));
            }
            ManifestOp::RemoveDependency(name) => {
                for section in DEPENDENCY_SECTIONS {
                    if let Some(deps) = self.existing_section_mut(section)? {
                        deps.shift_remove(name);
                    }
                }
            }
            ManifestOp::RemoveDependencyPrefix(prefix) => {
                for section in DEPENDENCY_SECTIONS {
                    if let Some(deps) = self.existing_section_mut(section)? {
                        deps.retain(|k, _| !k.starts_with(prefix.as_str()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Deterministic pretty JSON with a trailing newline.
    pub fn to_text(&self) -> Result<String, ManifestError> {
        let mut root = self.root.clone();
        for section in DEPENDENCY_SECTIONS {
            if let Some(Value::Object(deps)) = root.get_mut(section) {
                deps.sort_keys();
            }
        }
        let mut text =
            serde_json::to_string_pretty(&Value::Object(root)).map_err(ManifestError::Serialize)?;
        text.push('\n');
        Ok(text)
    }

    fn section_mut(&mut self, key: &str) -> Result<&mut Map<String, Value>, ManifestError> {
        let entry = self
            .root
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        entry.as_object_mut().ok_or_else(|| ManifestError::NotAnObject {
            field: key.to_string(),
        })
    }

    fn existing_section_mut(
        &mut self,
        key: &str,
    ) -> Result<Option<&mut Map<String, Value>>, ManifestError> {
        match self.root.get_mut(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(ManifestError::NotAnObject {
                field: key.to_string(),
            }),
        }
    }
}

/// Parse `text`, apply `ops` in order, re-serialize.
pub fn patch(text: &str, ops: &[ManifestOp]) -> Result<String, ManifestError> {
    let mut manifest = Manifest::parse(text)?;
    for op in ops {
        manifest.apply(op)?;
    }
    manifest.to_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG: &str = r#"{
  "name": "template",
  "main": "dist/server.js",
  "scripts": { "build": "tsc", "start": "node dist/server.js" },
  "dependencies": { "mongoose": "^8.0.0", "express": "^4.18.2", "pg": "^8.11.0" },
  "devDependencies": { "@types/node": "^20.0.0", "typescript": "^5.0.0" }
}"#;

    #[test]
    fn add_and_remove_dependencies() {
        let out = patch(
            PKG,
            &[
                ManifestOp::RemoveDependency("mongoose".to_string()),
                ManifestOp::RemoveDependency("not-there".to_string()),
                ManifestOp::AddDependency {
                    section: DependencySection::Dependencies,
                    name: "mysql2".to_string(),
                    version: "3.9.1".to_string(),
                },
            ],
        )
        .expect("patch");
        let m = Manifest::parse(&out).expect("reparse");
        assert_eq!(m.dependency("mysql2"), Some("^3.9.1"));
        assert!(!m.has_dependency("mongoose"));
        assert_eq!(
            m.dependency_names(),
            vec!["@types/node", "express", "mysql2", "pg", "typescript"]
        );
    }

    #[test]
    fn dependency_sections_are_sorted_on_output() {
        let out = patch(
            PKG,
            &[ManifestOp::AddDependency {
                section: DependencySection::Dependencies,
                name: "cron".to_string(),
                version: "^3.1.0".to_string(),
            }],
        )
        .expect("patch");
        let cron = out.find("\"cron\"").expect("cron");
        let express = out.find("\"express\"").expect("express");
        assert!(cron < express);
        assert!(out.ends_with("}\n"));
        assert!(out.contains("\"cron\": \"^3.1.0\""));
    }

    #[test]
    fn top_level_order_is_preserved() {
        let out = patch(PKG, &[ManifestOp::SetName("shop-api".to_string())]).expect("patch");
        let name = out.find("\"name\"").expect("name");
        let main = out.find("\"main\"").expect("main");
        assert!(name < main);
        assert!(out.contains("\"name\": \"shop-api\""));
    }

    #[test]
    fn scripts_and_prefix_removal() {
        let out = patch(
            PKG,
            &[
                ManifestOp::RemoveScript("build".to_string()),
                ManifestOp::SetScript {
                    name: "start".to_string(),
                    command: "node src/server.js".to_string(),
                },
                ManifestOp::RemoveDependencyPrefix("@types/".to_string()),
            ],
        )
        .expect("patch");
        let m = Manifest::parse(&out).expect("reparse");
        assert_eq!(m.script("build"), None);
        assert_eq!(m.script("start"), Some("node src/server.js"));
        assert!(!m.has_dependency("@types/node"));
        assert!(m.has_dependency("typescript"));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(
            patch("{ nope", &[]),
            Err(ManifestError::ParseError { .. })
        ));
        assert!(matches!(
            patch("[1, 2]", &[]),
            Err(ManifestError::NotAnObject { .. })
        ));
    }

    #[test]
    fn non_object_section_is_reported() {
        let err = patch(
            r#"{"scripts": "nope"}"#,
            &[ManifestOp::SetScript {
                name: "dev".to_string(),
                command: "x".to_string(),
            }],
        )
        .expect_err("scripts is a string");
        assert!(matches!(err, ManifestError::NotAnObject { field } if field == "scripts"));
    }
}
