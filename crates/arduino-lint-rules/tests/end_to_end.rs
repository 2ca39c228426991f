//! Integration test: the full catalog end-to-end via Linter.
//!
//! Builds small project trees in temporary folders and checks that
//! discovery, data loading, mode resolution and the rule catalog agree
//! on the recorded outcomes.

use arduino_lint_core::{
    ComplianceLevel, LibraryManagerMode, Linter, ModeSettings, ProjectKind, Report, RuleLevel,
    RuleReport, RuleVerdict,
};
use httpmock::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

fn lint(target: &Path, settings: ModeSettings) -> Report {
    Linter::builder()
        .rules(arduino_lint_rules::catalog())
        .settings(settings)
        .library_index("/nonexistent/library_index.json")
        .build()
        .expect("linter should build")
        .lint(&[target.to_path_buf()])
        .expect("lint should succeed")
}

fn outcome<'a>(report: &'a Report, project: usize, id: &str) -> &'a RuleReport {
    report.projects[project]
        .rules
        .iter()
        .find(|r| r.id == id)
        .unwrap_or_else(|| panic!("no outcome for {id}"))
}

fn library(server: &MockServer, name: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("FooBar");
    let properties = format!(
        "name={name}\nversion=1.0.0\nauthor=Jane\nmaintainer=Jane <jane@example.com>\n\
         sentence=Does foo.\nparagraph=Handles every foo.\ncategory=Other\n\
         url={}\narchitectures=*\n",
        server.url("/foo")
    );
    write_tree(
        &root,
        &[
            ("library.properties", properties.as_str()),
            ("src/FooBar.h", "#pragma once\n"),
            ("examples/Demo/Demo.ino", "void setup() {}\nvoid loop() {}\n"),
        ],
    );
    (tmp, root)
}

// ── Sketches ──

#[test]
fn sketch_named_after_its_folder_passes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("Foo");
    write_tree(&root, &[("Foo.ino", "void setup() {}\nvoid loop() {}\n")]);

    let report = lint(&root, ModeSettings::default());
    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.projects[0].project_type, ProjectKind::Sketch);
    assert_eq!(outcome(&report, 0, "SS001").result, RuleVerdict::Pass);
    assert!(report.passed());
}

#[test]
fn sketch_with_pde_file_warns_without_failing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("Foo");
    write_tree(&root, &[("Foo.pde", "void setup() {}\nvoid loop() {}\n")]);

    let report = lint(&root, ModeSettings::default());
    let pde = outcome(&report, 0, "SS004");
    assert_eq!(pde.result, RuleVerdict::Fail);
    assert_eq!(pde.level, RuleLevel::Warning);
    assert!(report.passed());
    assert_eq!(report.summary.warning_count, report.projects[0].summary.warning_count);
}

// ── Libraries ──

#[test]
fn library_examples_are_linted_as_subprojects() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("HEAD").path("/foo");
        then.status(200);
    });
    let (_tmp, root) = library(&server, "FooBar");

    let report = lint(&root, ModeSettings::default());
    let kinds: Vec<ProjectKind> = report.projects.iter().map(|p| p.project_type).collect();
    assert_eq!(kinds, vec![ProjectKind::Library, ProjectKind::Sketch]);
    assert_eq!(
        report.projects[1].configuration.library_manager,
        report.projects[0].configuration.library_manager
    );
}

#[test]
fn name_with_spaces_depends_on_compliance() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("HEAD").path("/foo");
        then.status(200);
    });
    let (_tmp, root) = library(&server, "Foo Bar");
    let settings = |compliance| ModeSettings {
        compliance: Some(compliance),
        library_manager: Some(LibraryManagerMode::False),
        official: Some(false),
    };

    let strict = lint(&root, settings(ComplianceLevel::Strict));
    let spaces = outcome(&strict, 0, "LP013");
    assert_eq!(spaces.result, RuleVerdict::Fail);
    assert_eq!(spaces.level, RuleLevel::Error);
    assert!(spaces.message.contains("Foo Bar"), "{}", spaces.message);
    assert!(!strict.passed());

    let specification = lint(&root, settings(ComplianceLevel::Specification));
    assert_eq!(outcome(&specification, 0, "LP013").result, RuleVerdict::Pass);
}

#[test]
fn unreachable_library_index_does_not_fail_the_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("HEAD").path("/foo");
        then.status(200);
    });
    let (_tmp, root) = library(&server, "FooBar");

    let report = lint(&root, ModeSettings::default());
    let duplicate = outcome(&report, 0, "LP015");
    assert_eq!(duplicate.result, RuleVerdict::NotRun);
    assert_eq!(duplicate.level, RuleLevel::Notice);
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("HEAD").path("/foo");
        then.status(200);
    });
    let (_tmp, root) = library(&server, "FooBar");

    let first = lint(&root, ModeSettings::default()).to_json(true).unwrap();
    let second = lint(&root, ModeSettings::default()).to_json(true).unwrap();
    assert_eq!(first, second);
}

// ── Platforms and package indexes ──

#[test]
fn platform_with_empty_board_name_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("avr");
    write_tree(
        &root,
        &[(
            "boards.txt",
            "uno.name=\nuno.build.board=AVR_UNO\nuno.build.core=arduino\nuno.upload.tool=avrdude\n",
        )],
    );

    let report = lint(&root, ModeSettings::default());
    assert_eq!(report.projects[0].project_type, ProjectKind::Platform);
    let name = outcome(&report, 0, "PB004");
    assert_eq!(name.result, RuleVerdict::Fail);
    assert!(name.message.contains("uno"), "{}", name.message);
    assert!(!report.passed());
}

#[test]
fn package_index_file_target() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), &[("package_foo_index.json", "{\"packages\": []}")]);

    let report = lint(&tmp.path().join("package_foo_index.json"), ModeSettings::default());
    assert_eq!(report.projects[0].project_type, ProjectKind::PackageIndex);
    assert_eq!(outcome(&report, 0, "IR002").result, RuleVerdict::Pass);
    assert_eq!(outcome(&report, 0, "IR004").result, RuleVerdict::Pass);
}

#[test]
fn package_index_file_target_ignores_sibling_indexes() {
    let tmp = TempDir::new().unwrap();
    write_tree(
        tmp.path(),
        &[
            ("foo.json", "{\"packages\": []}"),
            ("package_bar_index.json", "{not json"),
        ],
    );

    let report = Linter::builder()
        .rules(arduino_lint_rules::catalog())
        .project_type(ProjectKind::PackageIndex)
        .library_index("/nonexistent/library_index.json")
        .build()
        .unwrap()
        .lint(&[tmp.path().join("foo.json")])
        .unwrap();
    assert_eq!(report.projects.len(), 1);
    assert_eq!(report.projects[0].path, tmp.path().join("foo.json"));
    assert_eq!(outcome(&report, 0, "IR004").result, RuleVerdict::Pass);
    assert_eq!(outcome(&report, 0, "IR002").result, RuleVerdict::Fail);
}

// ── Discovery failures ──

#[test]
fn folder_without_projects_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path(), &[("notes.txt", "nothing here")]);

    let error = Linter::builder()
        .rules(arduino_lint_rules::catalog())
        .recursive(false)
        .build()
        .unwrap()
        .lint(&[tmp.path().to_path_buf()])
        .unwrap_err();
    assert!(error.to_string().contains(&tmp.path().display().to_string()));
}
