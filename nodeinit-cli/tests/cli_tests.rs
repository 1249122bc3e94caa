use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::predicate;
use predicates::str::contains;
use tempfile::TempDir;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/template");

fn nodeinit_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nodeinit"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("NODEINIT_TEMPLATE")
        .env_remove("NODEINIT_LOG");
    cmd
}

#[test]
fn new_full_install_from_flags() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(target.path())
        .args(["--template", FIXTURE, "--name", "demo-app", "--offline"])
        .assert()
        .success()
        .stdout(contains("Created 'demo-app'"))
        .stdout(contains("renamed"));

    target.child("package.json").assert(contains("\"name\": \"demo-app\""));
    target.child("src/app/models/user.model.ts").assert(predicate::path::is_file());
    target.child("src/config/socketConfig.ts").assert(predicate::path::is_file());
    target
        .child("src/config/sequelizeConfig.ts")
        .assert(predicate::path::missing());
}

#[test]
fn new_custom_install_reports_json() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("orders");

    let output = nodeinit_cmd(home.path())
        .args(["new"])
        .arg(target.path())
        .args([
            "--template",
            FIXTURE,
            "--name",
            "orders",
            "--database",
            "mysql",
            "--methods",
            "get,post",
            "--no-socket",
            "--no-docker",
            "--swagger-path",
            "/docs",
            "--offline",
            "--pin",
            "mysql2=3.6.5",
            "--json",
        ])
        .output()
        .expect("run nodeinit");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["project_name"], "orders");
    assert_eq!(report["installation_type"], "custom");
    assert_eq!(report["database"], "mysql");
    assert_eq!(report["resolved"]["mysql2"], "3.6.5");
    let files = report["files"].as_array().expect("files");
    assert!(files
        .iter()
        .any(|f| f["path"] == "Dockerfile-dev" && f["change"] == "removed"));
    assert!(files.iter().any(|f| f["path"] == "src/app/models/user.model.ts"
        && f["change"] == "renamed"
        && f["from"] == "src/app/models/sequelize.user.model.ts"));

    target.child("package.json").assert(contains("\"mysql2\": \"^3.6.5\""));
    target
        .child("src/config/expressConfig.ts")
        .assert(contains("app.use('/docs'"));
    target.child("docker-compose.yml").assert(predicate::path::missing());
}

#[test]
fn unpinned_driver_offline_fails_without_output() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("orders");

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(target.path())
        .args([
            "--template", FIXTURE, "--name", "orders", "--database", "mssql", "--offline",
        ])
        .assert()
        .code(2)
        .stderr(contains("no version pinned for 'tedious'"));
    target.assert(predicate::path::missing());
}

#[test]
fn non_empty_target_is_refused() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    out.child("notes.md").write_str("mine").expect("write");

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(out.path())
        .args(["--template", FIXTURE, "--name", "demo-app", "--offline"])
        .assert()
        .code(2)
        .stderr(contains("is not an empty directory"));
    out.child("notes.md").assert("mine");
    out.child("package.json").assert(predicate::path::missing());
}

#[test]
fn invalid_selection_exits_with_failure() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(out.child("x").path())
        .args(["--template", FIXTURE, "--name", "ab", "--offline"])
        .assert()
        .code(2)
        .stderr(contains("at least 3 characters"));
}

#[test]
fn uppercase_name_is_rejected() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("my-app");

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(target.path())
        .args(["--template", FIXTURE, "--name", "MyApp", "--offline"])
        .assert()
        .code(2)
        .stderr(contains("not a valid npm package name"));
    target.assert(predicate::path::missing());
}

#[test]
fn end_of_input_during_prompts_exits_with_one() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");

    assert_cmd::Command::from_std(nodeinit_cmd(home.path()))
        .args(["new"])
        .arg(target.path())
        .args(["--template", FIXTURE, "--offline"])
        .write_stdin("demo-app\n")
        .assert()
        .code(1)
        .stderr(contains("Do you want to start over?"))
        .stderr(contains("Exited from nodeinit"));
    target.assert(predicate::path::missing());
}

#[test]
fn prompt_session_generates_project() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");

    assert_cmd::Command::from_std(nodeinit_cmd(home.path()))
        .args(["new"])
        .arg(target.path())
        .args(["--template", FIXTURE, "--offline"])
        .write_stdin("demo-app\n2\n3\n\n")
        .assert()
        .success();

    target.child("src/server.js").assert(predicate::path::is_file());
    target.child("tsconfig.json").assert(predicate::path::missing());
    target.child(".env").assert(contains("DB_DIALECT=postgres"));
}

#[test]
fn plan_prints_diff_and_writes_nothing() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");

    nodeinit_cmd(home.path())
        .args(["plan"])
        .arg(target.path())
        .args(["--template", FIXTURE, "--name", "demo-app", "--offline"])
        .assert()
        .success()
        .stdout(contains("+++ b/package.json"))
        .stdout(contains("+  \"name\": \"demo-app\","))
        .stdout(contains("Dry run: nothing was written."));
    target.assert(predicate::path::missing());
}

#[test]
fn check_flags_leftover_feature_files() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");
    let selection = out.child("selection.yaml");
    selection
        .write_str(
            "project_name: demo-app\n\
             installation_type: custom\n\
             database: mongo\n\
             api_methods: [get, post]\n\
             socket: false\n",
        )
        .expect("write selection");

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(target.path())
        .args(["--template", FIXTURE, "--offline", "--selection"])
        .arg(selection.path())
        .assert()
        .success();

    nodeinit_cmd(home.path())
        .args(["check"])
        .arg(target.path())
        .arg("--selection")
        .arg(selection.path())
        .assert()
        .success()
        .stdout(contains("is consistent"));

    fs::write(
        target.path().join("src/config/socketConfig.ts"),
        "export default {}\n",
    )
    .expect("write stray file");

    nodeinit_cmd(home.path())
        .args(["check"])
        .arg(target.path())
        .arg("--selection")
        .arg(selection.path())
        .assert()
        .code(2)
        .stdout(contains("src/config/socketConfig.ts"));
}

#[test]
fn config_set_template_is_used_by_new() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");

    nodeinit_cmd(home.path())
        .args(["config", "set-template", FIXTURE])
        .assert()
        .success()
        .stdout(contains("TypeScript + JavaScript"));

    nodeinit_cmd(home.path())
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .stdout(contains("template_dir"))
        .stdout(contains("https://registry.npmjs.org"));

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(target.path())
        .args(["--name", "demo-app", "--offline"])
        .assert()
        .success();
    target.child("package.json").assert(predicate::path::is_file());
}

#[test]
fn template_env_var_is_honoured() {
    let home = TempDir::new().expect("home");
    let out = assert_fs::TempDir::new().expect("out");
    let target = out.child("demo-app");

    nodeinit_cmd(home.path())
        .env("NODEINIT_TEMPLATE", FIXTURE)
        .args(["new"])
        .arg(target.path())
        .args(["--name", "demo-app", "--offline"])
        .assert()
        .success();

    nodeinit_cmd(home.path())
        .args(["new"])
        .arg(out.child("other").path())
        .args(["--name", "demo-app", "--offline"])
        .assert()
        .code(2)
        .stderr(contains("no template configured"));
}
