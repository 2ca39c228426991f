//! Project discovery.
//!
//! A directory is classified by its direct child files; a file target by its
//! own name. Classified projects are never descended into except to find
//! their subprojects: example sketches of a library and bundled libraries of
//! a platform. Subprojects inherit the kind of the apex superproject.

use crate::fs::{absolute, dirs_in, files_in};
use crate::project::{Project, ProjectKind};
use crate::{library, package_index, platform, sketch};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

const MAX_SYMLINK_DEPTH: usize = 10;

/// Fatal discovery errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DiscoveryError {
    /// The target path does not exist.
    #[error("Target path {0} does not exist")]
    #[diagnostic(code(arduino_lint::discovery::not_found))]
    NotFound(PathBuf),

    /// A file target is not a project indicator file.
    #[error("Target path {path} is not an Arduino {kind} indicator file")]
    #[diagnostic(
        code(arduino_lint::discovery::not_a_project),
        help("pass the project folder, or a sketch, header, boards.txt or package index file")
    )]
    NotAProject {
        /// The target file.
        path: PathBuf,
        /// The kind hint in effect.
        kind: &'static str,
    },

    /// Nothing was found.
    #[error("No projects found with project path {0}")]
    #[diagnostic(
        code(arduino_lint::discovery::no_projects),
        help("check the path, or use --recursive to search subfolders")
    )]
    NoProjects(PathBuf),
}

/// Finds the projects under `target`.
///
/// `kind` restricts which kinds are recognised. A target with a concrete
/// `kind` is taken as a project of that kind without classification when it
/// is a file, or a directory searched with `recursive` off. Project paths are
/// absolute. A package index file target is itself the project path; any
/// other file target stands for its parent folder.
///
/// # Errors
///
/// Returns an error if the target does not exist, a file target is not an
/// indicator file, or no project is found.
pub fn find_projects(
    target: &Path,
    kind: ProjectKind,
    recursive: bool,
) -> Result<Vec<Project>, DiscoveryError> {
    if !target.exists() {
        return Err(DiscoveryError::NotFound(target.to_path_buf()));
    }
    let path = absolute(target);

    let parents = if path.is_file() {
        debug!("Project path {} is a file", path.display());
        let found = if kind == ProjectKind::All {
            classify_file(&path, kind).ok_or_else(|| DiscoveryError::NotAProject {
                path: target.to_path_buf(),
                kind: kind.display_name(),
            })?
        } else {
            kind
        };
        let project_path = match (found, path.parent()) {
            (ProjectKind::PackageIndex, _) | (_, None) => path.clone(),
            (_, Some(parent)) => parent.to_path_buf(),
        };
        vec![Project::new(project_path, found)]
    } else if kind == ProjectKind::All || recursive {
        find_under(&path, kind, recursive, 0)
    } else {
        vec![Project::new(path, kind)]
    };

    let mut projects = Vec::new();
    for parent in parents {
        let subprojects = find_subprojects(&parent);
        projects.push(parent);
        projects.extend(subprojects);
    }

    if projects.is_empty() {
        return Err(DiscoveryError::NoProjects(target.to_path_buf()));
    }
    for project in &projects {
        debug!(
            "Found {} {} (superproject {})",
            project.kind,
            project.path.display(),
            project.super_kind
        );
    }
    Ok(projects)
}

fn find_under(
    dir: &Path,
    filter: ProjectKind,
    recursive: bool,
    symlink_depth: usize,
) -> Vec<Project> {
    if let Some(kind) = classify_dir(dir, filter) {
        trace!("{} is {kind}", dir.display());
        return vec![Project::new(dir, kind)];
    }
    if !recursive {
        return Vec::new();
    }
    if symlink_depth > MAX_SYMLINK_DEPTH {
        warn!("Symlink depth exceeded while searching {}", dir.display());
        return Vec::new();
    }

    dirs_in(dir)
        .into_iter()
        .flat_map(|sub| {
            let delta = usize::from(sub.is_symlink());
            find_under(&sub, filter, recursive, symlink_depth + delta)
        })
        .collect()
}

fn find_subprojects(superproject: &Project) -> Vec<Project> {
    let (folders, kind, recursive): (&[&str], ProjectKind, bool) = match superproject.kind {
        ProjectKind::Library => (&library::EXAMPLES_FOLDER_NAMES, ProjectKind::Sketch, true),
        ProjectKind::Platform => (
            &[platform::BUNDLED_LIBRARIES_FOLDER],
            ProjectKind::Library,
            false,
        ),
        _ => return Vec::new(),
    };

    let mut found = Vec::new();
    for folder in folders {
        let path = superproject.path.join(folder);
        if !path.is_dir() {
            continue;
        }
        for candidate in dirs_in(&path) {
            for sub in find_under(&candidate, kind, recursive, 0) {
                let sub = Project::subproject(superproject, sub.path, sub.kind);
                let nested = find_subprojects(&sub);
                found.push(sub);
                found.extend(nested);
            }
        }
    }
    found
}

/// Classifies a directory by its direct child files.
#[must_use]
pub fn classify_dir(dir: &Path, filter: ProjectKind) -> Option<ProjectKind> {
    let files = files_in(dir);
    let any = |pred: fn(&Path) -> bool| files.iter().any(|f| pred(f));

    if filter.matches(ProjectKind::Sketch) && any(sketch::has_main_extension) {
        Some(ProjectKind::Sketch)
    } else if filter.matches(ProjectKind::Library)
        && any(|f| library::is_metadata_file(f) || library::has_header_extension(f))
    {
        Some(ProjectKind::Library)
    } else if filter.matches(ProjectKind::Platform)
        && any(platform::is_required_configuration_file)
    {
        Some(ProjectKind::Platform)
    } else if filter.matches(ProjectKind::PackageIndex)
        && any(|f| package_index::has_valid_filename(f, true))
    {
        Some(ProjectKind::PackageIndex)
    } else {
        None
    }
}

/// Classifies a file target by its name.
#[must_use]
pub fn classify_file(file: &Path, filter: ProjectKind) -> Option<ProjectKind> {
    if filter.matches(ProjectKind::Sketch) && sketch::has_main_extension(file) {
        Some(ProjectKind::Sketch)
    } else if filter.matches(ProjectKind::Library)
        && (library::is_metadata_file(file) || library::has_header_extension(file))
    {
        Some(ProjectKind::Library)
    } else if filter.matches(ProjectKind::Platform) && platform::is_configuration_file(file) {
        Some(ProjectKind::Platform)
    } else if filter.matches(ProjectKind::PackageIndex)
        && package_index::has_valid_extension(file)
    {
        Some(ProjectKind::PackageIndex)
    } else {
        None
    }
}
