//! Sorted directory listings and small file helpers.

use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

fn listing(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
}

/// Files directly inside `dir`, sorted by name. Symlinks to files count.
#[must_use]
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    listing(dir)
        .filter(|e| e.path().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Subdirectories directly inside `dir`, sorted by name.
#[must_use]
pub fn dirs_in(dir: &Path) -> Vec<PathBuf> {
    listing(dir)
        .filter(|e| e.path().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Every entry below `dir`, recursively, without following symlinks.
pub fn walk(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
}

/// Final path component as a string, empty when absent.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Makes `path` absolute against the working directory and drops `.` and
/// `..` components, so the final component is the real folder or file name.
#[must_use]
pub fn absolute(path: &Path) -> PathBuf {
    let joined = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

/// Reads and parses a JSON file, returning the error text on failure.
///
/// # Errors
///
/// Returns the IO or parse error message.
pub fn read_json(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}
