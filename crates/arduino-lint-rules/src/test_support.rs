//! Fixtures shared by the rule tests.

use arduino_lint_core::http::HttpClient;
use arduino_lint_core::library_index::{LibraryIndex, LibraryIndexCache};
use arduino_lint_core::{
    CheckModes, ModeSettings, Project, ProjectContext, ProjectKind, RuleOutput, Services,
};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

/// Writes `files` below `root`, creating parent folders.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

/// Services that never touch the network.
pub fn offline() -> Services {
    Services::new(HttpClient::new(), "/nonexistent/library_index.json")
}

/// Services with an already loaded Library Manager index.
pub fn with_index(json: &str) -> Services {
    Services {
        http: HttpClient::new(),
        library_index: Arc::new(LibraryIndexCache::preloaded(
            LibraryIndex::parse(json).unwrap(),
        )),
    }
}

/// Loads a context for a top-level project.
pub fn context(
    kind: ProjectKind,
    path: &Path,
    settings: ModeSettings,
    services: Services,
) -> ProjectContext {
    let modes = CheckModes::resolve(settings, kind);
    ProjectContext::load(Project::new(path, kind), modes, services).unwrap()
}

/// Runs the catalog rule `id`.
pub fn run(id: &str, ctx: &ProjectContext) -> RuleOutput {
    crate::catalog()
        .into_iter()
        .find(|r| r.id == id)
        .unwrap_or_else(|| panic!("no rule {id}"))
        .run(ctx)
}

/// Returns `true` if a usable `git` is installed.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// Runs git in `dir` with a fixed identity.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Jane Developer", "-c", "user.email=jane@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?}: {output:?}");
}
