//! Settings and selection-file persistence, always through the `_at` forms.

use std::fs;
use std::path::PathBuf;

use nodeinit_core::{
    selection, settings, ApiMethod, DatabaseKind, InstallationType, LanguageVariant,
    SettingsError,
};
use tempfile::TempDir;

#[test]
fn missing_settings_file_yields_defaults() {
    let home = TempDir::new().expect("home");
    let loaded = settings::load_at(home.path()).expect("load");
    assert_eq!(loaded, settings::Settings::default());
    assert_eq!(loaded.registry_url, "https://registry.npmjs.org");
    assert_eq!(loaded.resolver_timeout_secs, 10);
    assert_eq!(loaded.resolver_retries, 2);
}

#[test]
fn save_then_load_keeps_template_dir() {
    let home = TempDir::new().expect("home");
    let mut s = settings::Settings::default();
    s.template_dir = Some(PathBuf::from("/opt/templates/node"));
    s.resolver_retries = 5;
    settings::save_at(home.path(), &s).expect("save");

    let loaded = settings::load_at(home.path()).expect("load");
    assert_eq!(loaded, s);
    assert!(!home.path().join(".nodeinit/config.yaml.tmp").exists());
}

#[cfg(unix)]
#[test]
fn saved_settings_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let home = TempDir::new().expect("home");
    settings::save_at(home.path(), &settings::Settings::default()).expect("save");
    let mode = fs::metadata(settings::settings_path_at(home.path()))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn malformed_settings_report_path() {
    let home = TempDir::new().expect("home");
    let path = settings::settings_path_at(home.path());
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "resolver_retries: [not a number\n").expect("write");

    match settings::load_at(home.path()) {
        Err(SettingsError::Parse { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn selection_file_uses_lowercase_enums() {
    let dir = TempDir::new().expect("dir");
    let path = dir.path().join("selection.yaml");
    fs::write(
        &path,
        "project_name: billing-api\n\
         installation_type: custom\n\
         language: js\n\
         database: mariadb\n\
         api_methods: [post, get]\n\
         socket: false\n\
         cron: false\n\
         swagger:\n  enabled: true\n  path: /docs\n\
         docker: false\n",
    )
    .expect("write");

    let sel = selection::load(&path).expect("load");
    assert_eq!(sel.installation_type, InstallationType::Custom);
    assert_eq!(sel.language, LanguageVariant::Js);
    assert_eq!(sel.database, DatabaseKind::Mariadb);
    assert_eq!(sel.api_methods, vec![ApiMethod::Post, ApiMethod::Get]);
    assert!(!sel.socket && !sel.cron && !sel.docker);
    assert_eq!(sel.swagger.path, "/docs");
    assert!(sel.validate().is_ok());
}

#[test]
fn selection_file_missing_reports_io_path() {
    let dir = TempDir::new().expect("dir");
    let path = dir.path().join("nope.yaml");
    match selection::load(&path) {
        Err(SettingsError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected io error, got {other:?}"),
    }
}
