//! The feature selection a project is generated from.
//!
//! A [`FeatureSelection`] is a plain value object. [`FeatureSelection::validate`]
//! checks it against the schema and returns every violation at once;
//! [`FeatureSelection::effective`] applies the `All` installation rule.
//!
//! Selections can also be read from YAML (see [`load`]):
//!
//! ```yaml
//! project_name: billing-api
//! installation_type: custom
//! language: ts
//! database: postgres
//! api_methods: [get, post]
//! socket: false
//! cron: true
//! swagger:
//!   enabled: true
//!   path: /docs
//! docker: false
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SettingsError, ValidationError};

/// Mount point the template ships Swagger UI at.
pub const DEFAULT_SWAGGER_PATH: &str = "/api-docs";

/// Minimum project name length accepted by [`FeatureSelection::validate`].
pub const MIN_PROJECT_NAME_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    /// Every optional feature kept, nothing pruned.
    #[default]
    All,
    /// Optional features chosen one by one.
    Custom,
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallationType::All => write!(f, "all"),
            InstallationType::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for InstallationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "unknown installation type '{other}'; expected: all, custom"
            )),
        }
    }
}

/// Source language of the generated project.
///
/// `Ts` is the primary variant, `Js` the alternate one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageVariant {
    #[default]
    Ts,
    Js,
}

impl LanguageVariant {
    /// Source file extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            LanguageVariant::Ts => "ts",
            LanguageVariant::Js => "js",
        }
    }

    /// Directory holding this variant in a dual-layout template.
    pub fn source_dir(self) -> &'static str {
        match self {
            LanguageVariant::Ts => "src-typescript",
            LanguageVariant::Js => "src-javascript",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LanguageVariant::Ts => "TypeScript",
            LanguageVariant::Js => "JavaScript",
        }
    }
}

impl fmt::Display for LanguageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for LanguageVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ts" | "typescript" => Ok(Self::Ts),
            "js" | "javascript" => Ok(Self::Js),
            other => Err(format!("unknown language '{other}'; expected: ts, js")),
        }
    }
}

/// ORM family a database backend is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrmFamily {
    Mongoose,
    Sequelize,
}

impl OrmFamily {
    /// File name prefix used by this family's repository and model files.
    pub fn prefix(self) -> &'static str {
        match self {
            OrmFamily::Mongoose => "mongoose",
            OrmFamily::Sequelize => "sequelize",
        }
    }

    pub fn other(self) -> OrmFamily {
        match self {
            OrmFamily::Mongoose => OrmFamily::Sequelize,
            OrmFamily::Sequelize => OrmFamily::Mongoose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Mongo,
    Mysql,
    Postgres,
    Sqlite,
    Mssql,
    Mariadb,
    Db2,
    Snowflake,
    Oracle,
}

impl DatabaseKind {
    /// All backends, in prompt order.
    pub const ALL: [DatabaseKind; 9] = [
        DatabaseKind::Mongo,
        DatabaseKind::Mysql,
        DatabaseKind::Postgres,
        DatabaseKind::Sqlite,
        DatabaseKind::Mssql,
        DatabaseKind::Mariadb,
        DatabaseKind::Db2,
        DatabaseKind::Snowflake,
        DatabaseKind::Oracle,
    ];

    pub fn family(self) -> OrmFamily {
        match self {
            DatabaseKind::Mongo => OrmFamily::Mongoose,
            _ => OrmFamily::Sequelize,
        }
    }

    /// npm packages that make up this backend's driver stack.
    pub fn drivers(self) -> &'static [&'static str] {
        match self {
            DatabaseKind::Mongo => &["mongoose"],
            DatabaseKind::Postgres => &["sequelize", "pg", "pg-hstore"],
            DatabaseKind::Mysql => &["sequelize", "mysql2"],
            DatabaseKind::Sqlite => &["sequelize", "sqlite3"],
            DatabaseKind::Mssql => &["sequelize", "tedious"],
            DatabaseKind::Mariadb => &["sequelize", "mariadb"],
            DatabaseKind::Db2 => &["sequelize", "ibm_db"],
            DatabaseKind::Snowflake => &["sequelize", "snowflake-sdk"],
            DatabaseKind::Oracle => &["sequelize", "oracledb"],
        }
    }

    /// Every driver package of every backend, deduplicated and sorted.
    pub fn driver_universe() -> Vec<&'static str> {
        let mut all: Vec<&'static str> = Self::ALL
            .iter()
            .flat_map(|kind| kind.drivers().iter().copied())
            .collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// Value written to `DB_DIALECT`.
    pub fn dialect(self) -> &'static str {
        match self {
            DatabaseKind::Mongo => "mongodb",
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::Mssql => "mssql",
            DatabaseKind::Mariadb => "mariadb",
            DatabaseKind::Db2 => "db2",
            DatabaseKind::Snowflake => "snowflake",
            DatabaseKind::Oracle => "oracle",
        }
    }

    /// Default server port; `None` for backends without one.
    pub fn default_port(self) -> Option<u16> {
        match self {
            DatabaseKind::Postgres => Some(5432),
            DatabaseKind::Mysql | DatabaseKind::Mariadb => Some(3306),
            DatabaseKind::Mssql => Some(1433),
            DatabaseKind::Oracle => Some(1521),
            DatabaseKind::Db2 => Some(50000),
            DatabaseKind::Snowflake => Some(443),
            DatabaseKind::Mongo | DatabaseKind::Sqlite => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DatabaseKind::Mongo => "MongoDB",
            DatabaseKind::Mysql => "MySQL",
            DatabaseKind::Postgres => "PostgreSQL",
            DatabaseKind::Sqlite => "SQLite",
            DatabaseKind::Mssql => "MSSQL",
            DatabaseKind::Mariadb => "MariaDB",
            DatabaseKind::Db2 => "DB2",
            DatabaseKind::Snowflake => "Snowflake",
            DatabaseKind::Oracle => "Oracle",
        }
    }

    fn key(self) -> &'static str {
        match self {
            DatabaseKind::Mongo => "mongo",
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::Sqlite => "sqlite",
            DatabaseKind::Mssql => "mssql",
            DatabaseKind::Mariadb => "mariadb",
            DatabaseKind::Db2 => "db2",
            DatabaseKind::Snowflake => "snowflake",
            DatabaseKind::Oracle => "oracle",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let alias = match lower.as_str() {
            "mongodb" => "mongo",
            "postgresql" | "pg" => "postgres",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == alias)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.key()).collect();
                format!("unknown database '{s}'; expected: {}", names.join(", "))
            })
    }
}

/// HTTP method the generated controllers expose.
///
/// Declaration order is the canonical order used when a pruned call site
/// needs a replacement method.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl ApiMethod {
    pub const ALL: [ApiMethod; 5] = [
        ApiMethod::Get,
        ApiMethod::Post,
        ApiMethod::Put,
        ApiMethod::Delete,
        ApiMethod::Patch,
    ];

    /// Lowercase name, as used for the controller member and region name.
    pub fn as_str(self) -> &'static str {
        match self {
            ApiMethod::Get => "get",
            ApiMethod::Post => "post",
            ApiMethod::Put => "put",
            ApiMethod::Delete => "delete",
            ApiMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for ApiMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| {
                format!("unknown API method '{s}'; expected: get, post, put, delete, patch")
            })
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwaggerConfig {
    pub enabled: bool,
    #[serde(default = "default_swagger_path")]
    pub path: String,
}

fn default_swagger_path() -> String {
    DEFAULT_SWAGGER_PATH.to_string()
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_swagger_path(),
        }
    }
}

/// Everything the engine needs to know to prune the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSelection {
    pub project_name: String,
    #[serde(default)]
    pub installation_type: InstallationType,
    #[serde(default)]
    pub language: LanguageVariant,
    #[serde(default)]
    pub database: DatabaseKind,
    #[serde(default = "all_methods")]
    pub api_methods: Vec<ApiMethod>,
    #[serde(default = "enabled")]
    pub socket: bool,
    #[serde(default = "enabled")]
    pub cron: bool,
    #[serde(default)]
    pub swagger: SwaggerConfig,
    #[serde(default = "enabled")]
    pub docker: bool,
}

fn all_methods() -> Vec<ApiMethod> {
    ApiMethod::ALL.to_vec()
}

fn enabled() -> bool {
    true
}

impl FeatureSelection {
    /// A full installation: every feature kept.
    pub fn all(project_name: impl Into<String>, database: DatabaseKind) -> Self {
        Self {
            project_name: project_name.into(),
            installation_type: InstallationType::All,
            language: LanguageVariant::Ts,
            database,
            api_methods: all_methods(),
            socket: true,
            cron: true,
            swagger: SwaggerConfig::default(),
            docker: true,
        }
    }

    /// A custom installation starting from everything enabled.
    pub fn custom(project_name: impl Into<String>, database: DatabaseKind) -> Self {
        Self {
            installation_type: InstallationType::Custom,
            ..Self::all(project_name, database)
        }
    }

    pub fn is_all(&self) -> bool {
        self.installation_type == InstallationType::All
    }

    /// The selection the engine actually runs.
    ///
    /// For `All` every optional feature is forced on, the method set is the
    /// full set and Swagger is served at [`DEFAULT_SWAGGER_PATH`]. Methods are
    /// sorted into canonical order and deduplicated.
    pub fn effective(&self) -> FeatureSelection {
        if self.is_all() {
            return FeatureSelection {
                language: self.language,
                ..FeatureSelection::all(self.project_name.clone(), self.database)
            };
        }
        let mut out = self.clone();
        out.api_methods.sort_unstable();
        out.api_methods.dedup();
        out
    }

    /// Methods in canonical order that are not selected.
    pub fn pruned_methods(&self) -> Vec<ApiMethod> {
        ApiMethod::ALL
            .iter()
            .copied()
            .filter(|m| !self.api_methods.contains(m))
            .collect()
    }

    /// Check the selection against the schema.
    ///
    /// Returns every violation found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = self.project_name.as_str();
        if name.trim().chars().count() < MIN_PROJECT_NAME_LEN {
            errors.push(ValidationError::ProjectNameTooShort {
                name: self.project_name.clone(),
            });
        } else if !is_valid_package_name(name) {
            errors.push(ValidationError::ProjectNameInvalid {
                name: self.project_name.clone(),
            });
        }

        if !self.is_all() {
            if self.api_methods.is_empty() {
                errors.push(ValidationError::EmptyApiMethods);
            }
            let mut seen = Vec::new();
            for method in &self.api_methods {
                if seen.contains(method) {
                    errors.push(ValidationError::DuplicateApiMethod { method: *method });
                } else {
                    seen.push(*method);
                }
            }
            if self.swagger.enabled && !is_valid_swagger_path(&self.swagger.path) {
                errors.push(ValidationError::InvalidSwaggerPath {
                    path: self.swagger.path.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// `^/[A-Za-z0-9_-]+$`
pub fn is_valid_swagger_path(path: &str) -> bool {
    match path.strip_prefix('/') {
        Some(rest) => {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

/// Whether npm would accept `name` for a new package: lowercase, no
/// whitespace anywhere (surrounding included), no leading `.` or `_`.
pub fn is_valid_package_name(name: &str) -> bool {
    !name.starts_with('.')
        && !name.starts_with('_')
        && !name.chars().any(|c| {
            c.is_uppercase()
                || c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\\' | '<' | '>')
        })
}

// ---------------------------------------------------------------------------
// YAML
// ---------------------------------------------------------------------------

/// Read a selection from a YAML file.
///
/// Only parses; call [`FeatureSelection::validate`] before use.
pub fn load(path: &Path) -> Result<FeatureSelection, SettingsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn all_forces_every_feature_on() {
        let mut sel = FeatureSelection::all("shop-api", DatabaseKind::Postgres);
        sel.socket = false;
        sel.api_methods = vec![ApiMethod::Post];
        sel.swagger.path = "/docs".to_string();

        let eff = sel.effective();
        assert!(eff.socket);
        assert_eq!(eff.api_methods, ApiMethod::ALL.to_vec());
        assert_eq!(eff.swagger.path, DEFAULT_SWAGGER_PATH);
        assert_eq!(eff.database, DatabaseKind::Postgres);
    }

    #[test]
    fn effective_sorts_methods_for_custom() {
        let mut sel = FeatureSelection::custom("shop-api", DatabaseKind::Mongo);
        sel.api_methods = vec![ApiMethod::Patch, ApiMethod::Get, ApiMethod::Patch];
        assert_eq!(
            sel.effective().api_methods,
            vec![ApiMethod::Get, ApiMethod::Patch]
        );
    }

    #[test]
    fn empty_methods_rejected_for_custom_only() {
        let mut sel = FeatureSelection::custom("shop-api", DatabaseKind::Mongo);
        sel.api_methods.clear();
        assert_eq!(sel.validate(), Err(vec![ValidationError::EmptyApiMethods]));

        sel.installation_type = InstallationType::All;
        assert!(sel.validate().is_ok());
    }

    #[test]
    fn validate_reports_every_violation() {
        let mut sel = FeatureSelection::custom("ab", DatabaseKind::Mongo);
        sel.api_methods.clear();
        sel.swagger.path = "docs".to_string();
        let errors = sel.validate().expect_err("invalid");
        assert_eq!(errors.len(), 3);
    }

    #[rstest]
    #[case("shop-api", true)]
    #[case("@acme/shop-api", true)]
    #[case("  my-app  ", false)]
    #[case("my-app\n", false)]
    #[case("my app", false)]
    #[case("MyApp", false)]
    #[case(".hidden", false)]
    #[case("_private", false)]
    fn package_name_rules(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(is_valid_package_name(name), ok);
    }

    #[test]
    fn padded_or_uppercase_names_fail_validation() {
        for name in ["  my-app  ", "MyApp"] {
            let sel = FeatureSelection::all(name, DatabaseKind::Mongo);
            assert_eq!(
                sel.validate(),
                Err(vec![ValidationError::ProjectNameInvalid {
                    name: name.to_string()
                }])
            );
        }
    }

    #[rstest]
    #[case("/docs", true)]
    #[case("/api-docs", true)]
    #[case("/Swagger_UI2", true)]
    #[case("/", false)]
    #[case("docs", false)]
    #[case("/docs/v1", false)]
    #[case("/do cs", false)]
    fn swagger_path_grammar(#[case] path: &str, #[case] ok: bool) {
        assert_eq!(is_valid_swagger_path(path), ok);
    }

    #[rstest]
    #[case("mongodb", DatabaseKind::Mongo)]
    #[case("PostgreSQL", DatabaseKind::Postgres)]
    #[case("db2", DatabaseKind::Db2)]
    fn database_aliases_parse(#[case] input: &str, #[case] expected: DatabaseKind) {
        assert_eq!(input.parse::<DatabaseKind>().expect("parse"), expected);
    }

    #[test]
    fn driver_universe_is_deduplicated() {
        let all = DatabaseKind::driver_universe();
        assert_eq!(all.iter().filter(|d| **d == "sequelize").count(), 1);
        assert!(all.contains(&"mongoose"));
        assert!(all.contains(&"oracledb"));
    }

    #[test]
    fn yaml_defaults_fill_missing_fields() {
        let sel: FeatureSelection =
            serde_yaml::from_str("project_name: shop-api\ninstallation_type: custom\n")
                .expect("parse");
        assert_eq!(sel.installation_type, InstallationType::Custom);
        assert_eq!(sel.api_methods.len(), 5);
        assert!(sel.swagger.enabled);
        assert_eq!(sel.swagger.path, DEFAULT_SWAGGER_PATH);
    }
}
