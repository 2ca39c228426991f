//! Read-only queries against a git repository through the `git` executable.

use std::path::Path;
use std::process::{Command, Stdio};

/// Errors from running git.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// `git` could not be started.
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// `git` exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    Failed {
        /// The subcommand.
        command: String,
        /// Captured stderr.
        stderr: String,
    },
}

/// A tag resolved to the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Short tag name.
    pub name: String,
    /// Commit hash; annotated tags are peeled.
    pub commit: String,
}

/// Returns `true` if `path` is the root of a git repository.
#[must_use]
pub fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

fn run(path: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(args)
        .stdin(Stdio::null())
        .output()?;
    if !output.status.success() {
        return Err(GitError::Failed {
            command: args.first().copied().unwrap_or_default().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Commits reachable from HEAD, newest first by commit time.
///
/// # Errors
///
/// Returns an error if git fails.
pub fn commits_from_head(path: &Path) -> Result<Vec<String>, GitError> {
    Ok(run(path, &["rev-list", "--date-order", "HEAD"])?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// All tags of the repository.
///
/// # Errors
///
/// Returns an error if git fails.
pub fn tags(path: &Path) -> Result<Vec<Tag>, GitError> {
    let out = run(
        path,
        &[
            "for-each-ref",
            "--format=%(refname:strip=2)%09%(*objectname)%09%(objectname)",
            "refs/tags",
        ],
    )?;
    Ok(out
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let name = fields.next()?.to_string();
            let peeled = fields.next().unwrap_or_default();
            let direct = fields.next().unwrap_or_default();
            let commit = if peeled.is_empty() { direct } else { peeled };
            (!name.is_empty() && !commit.is_empty()).then(|| Tag {
                name,
                commit: commit.to_string(),
            })
        })
        .collect())
}
