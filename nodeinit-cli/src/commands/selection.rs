//! Flags shared by `new` and `plan`, and everything derived from them:
//! the feature selection, the template location and the version resolver.

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use nodeinit_core::{
    selection, settings, ApiMethod, DatabaseKind, FeatureSelection, InstallationType,
    LanguageVariant, Settings,
};
use nodeinit_engine::{FixedVersions, NpmRegistry, ResolverError, VersionResolver};

use crate::{prompt, Cancelled};

/// Environment variable consulted for the template location when
/// `--template` is not given.
pub const TEMPLATE_ENV: &str = "NODEINIT_TEMPLATE";

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Template checkout to generate from.
    #[arg(long, value_name = "DIR")]
    pub template: Option<PathBuf>,

    /// Read the selection from a YAML file. Flags below override its fields.
    #[arg(long, value_name = "FILE")]
    pub selection: Option<PathBuf>,

    /// Project name written to package.json.
    #[arg(long)]
    pub name: Option<String>,

    /// Keep every optional feature.
    #[arg(long, conflicts_with = "custom")]
    pub all: bool,

    /// Choose optional features one by one.
    #[arg(long)]
    pub custom: bool,

    /// ts | js
    #[arg(long, value_name = "LANG")]
    pub language: Option<LanguageVariant>,

    /// mongo | mysql | postgres | sqlite | mssql | mariadb | db2 | snowflake | oracle
    #[arg(long, value_name = "DB")]
    pub database: Option<DatabaseKind>,

    /// Comma separated HTTP methods to keep, e.g. `get,post`.
    #[arg(long, value_delimiter = ',', value_name = "METHODS")]
    pub methods: Option<Vec<ApiMethod>>,

    #[arg(long)]
    pub no_socket: bool,

    #[arg(long)]
    pub no_cron: bool,

    #[arg(long)]
    pub no_swagger: bool,

    /// Where Swagger UI is served, e.g. `/docs`.
    #[arg(long, value_name = "PATH", conflicts_with = "no_swagger")]
    pub swagger_path: Option<String>,

    #[arg(long)]
    pub no_docker: bool,

    /// Never contact the registry; drivers must come from --pin.
    #[arg(long)]
    pub offline: bool,

    /// Use this version for a dependency instead of looking it up.
    #[arg(long = "pin", value_name = "NAME=VERSION")]
    pub pins: Vec<Pin>,
}

/// `name=version` from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub name: String,
    pub version: String,
}

impl FromStr for Pin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, version)) if !name.trim().is_empty() && !version.trim().is_empty() => {
                Ok(Pin {
                    name: name.trim().to_string(),
                    version: version.trim().to_string(),
                })
            }
            _ => Err(format!("expected NAME=VERSION, got '{s}'")),
        }
    }
}

impl SelectionArgs {
    /// True when any flag only meaningful for a custom installation is set.
    fn has_custom_flags(&self) -> bool {
        self.methods.is_some()
            || self.no_socket
            || self.no_cron
            || self.no_swagger
            || self.swagger_path.is_some()
            || self.no_docker
    }

    fn interactive(&self) -> bool {
        self.selection.is_none() && self.name.is_none()
    }

    /// Build the selection from the file, the flags, or the prompt session
    /// on stdin, in that order of preference.
    pub fn resolve_selection(&self) -> Result<FeatureSelection> {
        if self.interactive() {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stderr();
            return prompt::run_session(&mut input, &mut output)
                .context("prompt session failed")?
                .ok_or_else(|| anyhow!(Cancelled));
        }

        let base = match &self.selection {
            Some(path) => selection::load(path)
                .with_context(|| format!("cannot read selection from {}", path.display()))?,
            None => FeatureSelection::all(String::new(), DatabaseKind::default()),
        };
        Ok(self.apply(base))
    }

    /// Overlay the flags on `base`.
    pub fn apply(&self, mut sel: FeatureSelection) -> FeatureSelection {
        if let Some(name) = &self.name {
            sel.project_name = name.clone();
        }
        if self.all {
            sel.installation_type = InstallationType::All;
        } else if self.custom || self.has_custom_flags() {
            sel.installation_type = InstallationType::Custom;
        }
        if let Some(language) = self.language {
            sel.language = language;
        }
        if let Some(database) = self.database {
            sel.database = database;
        }
        if let Some(methods) = &self.methods {
            sel.api_methods = methods.clone();
        }
        if self.no_socket {
            sel.socket = false;
        }
        if self.no_cron {
            sel.cron = false;
        }
        if self.no_swagger {
            sel.swagger.enabled = false;
        }
        if let Some(path) = &self.swagger_path {
            sel.swagger.enabled = true;
            sel.swagger.path = path.clone();
        }
        if self.no_docker {
            sel.docker = false;
        }
        if sel.is_all() && self.has_custom_flags() {
            tracing::warn!("--all keeps every feature; custom flags are ignored");
        }
        sel
    }

    /// `--template` > `NODEINIT_TEMPLATE` > settings.
    pub fn template_dir(&self, settings: &Settings) -> Result<PathBuf> {
        let from_env = std::env::var_os(TEMPLATE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.template
            .clone()
            .or(from_env)
            .or_else(|| settings.template_dir.clone())
            .ok_or_else(|| {
                anyhow!(
                    "no template configured; pass --template, set {TEMPLATE_ENV} \
                     or run `nodeinit config set-template <DIR>`"
                )
            })
    }

    pub fn resolver(&self, settings: &Settings) -> PinnedResolver {
        let pins: FixedVersions = self
            .pins
            .iter()
            .map(|p| (p.name.clone(), p.version.clone()))
            .collect();
        let registry = if self.offline {
            None
        } else {
            Some(NpmRegistry::from_settings(settings))
        };
        PinnedResolver { pins, registry }
    }
}

/// Pins first, then the registry unless running offline.
#[derive(Debug)]
pub struct PinnedResolver {
    pins: FixedVersions,
    registry: Option<NpmRegistry>,
}

impl VersionResolver for PinnedResolver {
    fn resolve(&self, name: &str) -> std::result::Result<String, ResolverError> {
        match (self.pins.resolve(name), &self.registry) {
            (Ok(version), _) => Ok(version),
            (Err(_), Some(registry)) => registry.resolve(name),
            (Err(unpinned), None) => Err(unpinned),
        }
    }
}

pub fn load_settings() -> Result<Settings> {
    settings::load().context("failed to load ~/.nodeinit/config.yaml")
}
