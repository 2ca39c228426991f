//! Integration tests for the arduino-lint binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A command isolated from the user's global config and the network.
fn arduino_lint(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("arduino-lint"));
    cmd.env("ARDUINO_LINT_CONFIG_DIR", config_dir.path())
        .env("ARDUINO_LINT_LIBRARY_MANAGER_INDEX", "/nonexistent/library_index.json")
        .env_remove("ARDUINO_LINT_OFFICIAL");
    cmd
}

fn sketch(root: &Path, name: &str, extension: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{name}.{extension}")),
        "void setup() {}\nvoid loop() {}\n",
    )
    .unwrap();
}

// ── Linting ──

#[test]
fn passing_sketch_exits_zero() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "ino");

    arduino_lint(&global)
        .arg(tmp.path().join("Foo"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Linting sketch in"))
        .stdout(predicate::str::contains("Rules passed: true"));
}

#[test]
fn error_level_failure_exits_one() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("avr");
    fs::create_dir(&root).unwrap();
    fs::write(
        root.join("boards.txt"),
        "uno.name=\nuno.build.board=AVR_UNO\nuno.build.core=arduino\nuno.upload.tool=avrdude\n",
    )
    .unwrap();

    arduino_lint(&global)
        .arg(&root)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("(Rule PB004)"))
        .stdout(predicate::str::contains("More info: https://"))
        .stdout(predicate::str::contains("Rules passed: false"));
}

#[test]
fn strict_compliance_escalates_warnings() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "pde");
    let root = tmp.path().join("Foo");

    arduino_lint(&global).arg(&root).assert().success();
    arduino_lint(&global)
        .args(["--compliance", "strict"])
        .arg(&root)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR:"))
        .stdout(predicate::str::contains("(Rule SS004)"));
}

#[test]
fn config_file_disables_rule() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "pde");
    let root = tmp.path().join("Foo");
    fs::write(
        root.join("arduino-lint.toml"),
        "compliance = \"strict\"\n\n[rules.SS004]\nenabled = false\n",
    )
    .unwrap();

    arduino_lint(&global)
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("SS004").not());
}

#[test]
fn json_report_and_report_file() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "ino");
    let report_file = tmp.path().join("report.json");

    let output = arduino_lint(&global)
        .args(["--format", "json", "--report-file"])
        .arg(&report_file)
        .arg(tmp.path().join("Foo"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["summary"]["pass"], true);
    assert_eq!(stdout["projects"][0]["projectType"], "sketch");

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_file).unwrap()).unwrap();
    let rules = written["projects"][0]["rules"].as_array().unwrap();
    assert!(rules.iter().any(|r| r["ID"] == "SS001" && r["result"] == "pass"));
}

#[test]
fn official_environment_overrides_config_file() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "ino");
    let root = tmp.path().join("Foo");
    fs::write(root.join("arduino-lint.toml"), "official = true\n").unwrap();

    let official = |cmd: &mut Command| {
        let output = cmd.args(["--format", "json"]).arg(&root).output().unwrap();
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        report["projects"][0]["configuration"]["official"].clone()
    };

    assert_eq!(official(&mut arduino_lint(&global)), true);
    assert_eq!(
        official(arduino_lint(&global).env("ARDUINO_LINT_OFFICIAL", "false")),
        false
    );
    assert_eq!(
        official(arduino_lint(&global).args(["--official", "false"])),
        false
    );
}

#[test]
fn lints_current_directory_by_default() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "ino");

    arduino_lint(&global)
        .current_dir(tmp.path().join("Foo"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Rules passed: true"));
}

// ── Fatal errors ──

#[test]
fn folder_without_projects_is_fatal() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes.txt"), "nothing here").unwrap();

    arduino_lint(&global)
        .arg("--recursive=false")
        .arg(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(tmp.path().display().to_string()));
}

#[test]
fn invalid_compliance_is_a_configuration_error() {
    let global = TempDir::new().unwrap();
    let tmp = TempDir::new().unwrap();
    sketch(tmp.path(), "Foo", "ino");

    arduino_lint(&global)
        .args(["--compliance", "lenient"])
        .arg(tmp.path().join("Foo"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid compliance level"));
}

#[test]
fn invalid_format_exits_one() {
    let global = TempDir::new().unwrap();
    arduino_lint(&global)
        .args(["--format", "yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn help_exits_zero() {
    let global = TempDir::new().unwrap();
    arduino_lint(&global)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--compliance"));
}

// ── Information ──

#[test]
fn version_text_and_json() {
    let global = TempDir::new().unwrap();
    arduino_lint(&global)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(env!("CARGO_PKG_VERSION")));

    let output = arduino_lint(&global)
        .args(["--version", "--format", "json"])
        .output()
        .unwrap();
    let version: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
    assert!(version["buildTimestamp"].is_string());
}

#[test]
fn list_rules_prints_catalog() {
    let global = TempDir::new().unwrap();
    arduino_lint(&global)
        .arg("--list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("LP013"))
        .stdout(predicate::str::contains("IT018"));
}
