//! Template fetching: layouts, variant selection, skipped directories.
//!
//! Each test builds its own `TempDir`; the dual-layout cases also run
//! against the shared fixture template.

use std::fs;
use std::path::Path;

use nodeinit_core::{LanguageVariant, Node, TreePath};
use nodeinit_template::{
    detect_layout, load_dir, DirTemplate, Layout, TemplateError, TemplateProvider,
};
use rstest::rstest;
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/template");

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn make_dir() -> TempDir {
    TempDir::new().expect("tempdir")
}

fn write(dir: &TempDir, rel: &str, content: &[u8]) {
    let path = dir.path().join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write fixture");
}

// ---------------------------------------------------------------------------
// Fixture template
// ---------------------------------------------------------------------------

#[rstest]
#[case(LanguageVariant::Ts, "src/server.ts", "src/server.js")]
#[case(LanguageVariant::Js, "src/server.js", "src/server.ts")]
fn dual_layout_maps_variant_to_src(
    #[case] variant: LanguageVariant,
    #[case] present: &str,
    #[case] absent: &str,
) {
    let tree = DirTemplate::new(FIXTURE).fetch(variant).expect("fetch");
    assert!(tree.contains(&TreePath::new(present)));
    assert!(!tree.contains(&TreePath::new(absent)));
    assert!(tree.contains(&TreePath::new("package.json")));
    assert!(tree.contains(&TreePath::new("Dockerfile-prod")));
    assert!(tree
        .paths()
        .all(|p| !p.as_str().starts_with("src-typescript") && !p.as_str().starts_with("src-javascript")));
}

#[test]
fn fixture_is_detected_as_dual() {
    let tree = load_dir(Path::new(FIXTURE)).expect("load");
    assert_eq!(detect_layout(&tree).expect("layout"), Layout::Dual);
}

// ---------------------------------------------------------------------------
// Single layouts
// ---------------------------------------------------------------------------

#[rstest]
#[case("src/server.ts", Layout::Single(LanguageVariant::Ts))]
#[case("src/server.js", Layout::Single(LanguageVariant::Js))]
fn single_layout_language_from_extension(#[case] file: &str, #[case] expected: Layout) {
    let dir = make_dir();
    write(&dir, "package.json", b"{}");
    write(&dir, file, b"console.log(1)\n");
    let tree = load_dir(dir.path()).expect("load");
    assert_eq!(detect_layout(&tree).expect("layout"), expected);
}

#[test]
fn single_layout_rejects_other_variant() {
    let dir = make_dir();
    write(&dir, "package.json", b"{}");
    write(&dir, "src/server.js", b"\n");
    let err = DirTemplate::new(dir.path())
        .fetch(LanguageVariant::Ts)
        .expect_err("no ts sources");
    match err {
        TemplateError::MissingVariant { variant, path } => {
            assert_eq!(variant, LanguageVariant::Ts);
            assert_eq!(path, dir.path());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn no_sources_is_unknown_layout() {
    let dir = make_dir();
    write(&dir, "package.json", b"{}");
    assert!(matches!(
        DirTemplate::new(dir.path()).fetch(LanguageVariant::Ts),
        Err(TemplateError::UnknownLayout { .. })
    ));
}

// ---------------------------------------------------------------------------
// Loading rules
// ---------------------------------------------------------------------------

#[test]
fn git_and_node_modules_are_skipped() {
    let dir = make_dir();
    write(&dir, "package.json", b"{}");
    write(&dir, "src/server.ts", b"\n");
    write(&dir, ".git/HEAD", b"ref: refs/heads/main\n");
    write(&dir, "node_modules/x/index.js", b"\n");
    let tree = DirTemplate::new(dir.path())
        .fetch(LanguageVariant::Ts)
        .expect("fetch");
    assert_eq!(tree.len(), 2);
}

#[test]
fn binary_files_are_carried_through() {
    let dir = make_dir();
    write(&dir, "package.json", b"{}");
    write(&dir, "src/server.ts", b"\n");
    write(&dir, "public/logo.png", &[0x89, 0x50, 0xff, 0xfe]);
    let tree = DirTemplate::new(dir.path())
        .fetch(LanguageVariant::Ts)
        .expect("fetch");
    assert!(matches!(
        tree.get(&TreePath::new("public/logo.png")),
        Some(Node::Binary(_))
    ));
}

#[test]
fn binary_manifest_is_rejected() {
    let dir = make_dir();
    write(&dir, "package.json", &[0xff, 0xfe]);
    write(&dir, "src/server.ts", b"\n");
    assert!(matches!(
        DirTemplate::new(dir.path()).fetch(LanguageVariant::Ts),
        Err(TemplateError::NonUtf8 { .. })
    ));
}

#[test]
fn unbalanced_markers_are_rejected() {
    let dir = make_dir();
    write(&dir, "package.json", b"{}");
    write(&dir, "src/server.ts", b"// @nodeinit:begin socket-init\nx\n");
    match DirTemplate::new(dir.path()).fetch(LanguageVariant::Ts) {
        Err(TemplateError::Marker { path, .. }) => assert_eq!(path.as_str(), "src/server.ts"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_directory_is_not_found() {
    let dir = make_dir();
    assert!(matches!(
        DirTemplate::new(dir.path().join("nope")).fetch(LanguageVariant::Ts),
        Err(TemplateError::NotFound { .. })
    ));
}
