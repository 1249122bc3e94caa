//! User settings at `~/.nodeinit/config.yaml`.
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home, used by tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! A missing file yields [`Settings::default`]. Saves go through a `.tmp`
//! sibling and a rename, so a crash never leaves a half-written file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, SettingsError};

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Local checkout of the base template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
    #[serde(default = "default_timeout")]
    pub resolver_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub resolver_retries: u32,
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_dir: None,
            registry_url: default_registry_url(),
            resolver_timeout_secs: default_timeout(),
            resolver_retries: default_retries(),
        }
    }
}

// ---------------------------------------------------------------------------
// 1. Paths
// ---------------------------------------------------------------------------

/// `<home>/.nodeinit/config.yaml`, pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".nodeinit").join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load settings, falling back to defaults when the file does not exist.
pub fn load_at(home: &Path) -> Result<Settings, SettingsError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, SettingsError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save
// ---------------------------------------------------------------------------

/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let path = settings_path_at(home);
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
            set_dir_permissions(dir)?;
        }
    }
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(settings: &Settings) -> Result<(), SettingsError> {
    save_at(&home()?, settings)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub fn home() -> Result<PathBuf, SettingsError> {
    dirs::home_dir().ok_or(SettingsError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), SettingsError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), SettingsError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), SettingsError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), SettingsError> {
    Ok(())
}
