//! Per-project context handed to rule functions.
//!
//! A [`ProjectContext`] is built immediately before a project's rules run and
//! is only ever read by them. It bundles the project record, its resolved
//! check modes, the loaded project data and the shared [`Services`].

use crate::http::HttpClient;
use crate::library::LibraryData;
use crate::library_index::{LibraryIndex, LibraryIndexCache, DEFAULT_URL};
use crate::mode::{CheckModes, ComplianceLevel};
use crate::package_index::PackageIndexData;
use crate::platform::PlatformData;
use crate::project::{Project, ProjectKind};
use crate::schema::SchemaError;
use crate::sketch::SketchData;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Network-backed services shared by every project of a run.
#[derive(Debug, Clone)]
pub struct Services {
    /// Client for URL checks.
    pub http: HttpClient,
    /// Lazily loaded Library Manager index.
    pub library_index: Arc<LibraryIndexCache>,
}

impl Services {
    /// Creates services reading the Library Manager index from `index_location`.
    #[must_use]
    pub fn new(http: HttpClient, index_location: impl Into<String>) -> Self {
        let library_index = Arc::new(LibraryIndexCache::new(index_location, http.clone()));
        Self {
            http,
            library_index,
        }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(HttpClient::new(), DEFAULT_URL)
    }
}

/// Data loaded for one project, by kind.
#[derive(Debug, Clone)]
pub enum ProjectData {
    /// Sketch data.
    Sketch(SketchData),
    /// Library data.
    Library(LibraryData),
    /// Platform data.
    Platform(PlatformData),
    /// Package index data.
    PackageIndex(PackageIndexData),
}

impl ProjectData {
    /// Loads the data for a project of `kind` at `path`.
    ///
    /// Per-file load failures are kept inside the data; only schema
    /// compilation failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a schema fails to compile.
    pub fn load(kind: ProjectKind, path: &Path) -> Result<Self, SchemaError> {
        debug!("Loading {kind} data from {}", path.display());
        Ok(match kind {
            ProjectKind::Library => Self::Library(LibraryData::load(path)?),
            ProjectKind::Platform => Self::Platform(PlatformData::load(path)?),
            ProjectKind::PackageIndex => Self::PackageIndex(PackageIndexData::load(path)?),
            ProjectKind::Sketch | ProjectKind::All | ProjectKind::None => {
                Self::Sketch(SketchData::load(path)?)
            }
        })
    }
}

/// Everything a rule function may read about the project under lint.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    project: Project,
    modes: CheckModes,
    data: ProjectData,
    services: Services,
}

impl ProjectContext {
    /// Assembles a context from already loaded data.
    #[must_use]
    pub fn new(project: Project, modes: CheckModes, data: ProjectData, services: Services) -> Self {
        Self {
            project,
            modes,
            data,
            services,
        }
    }

    /// Loads the project data and assembles a context.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a schema fails to compile.
    pub fn load(
        project: Project,
        modes: CheckModes,
        services: Services,
    ) -> Result<Self, SchemaError> {
        let data = ProjectData::load(project.kind, &project.path)?;
        Ok(Self::new(project, modes, data, services))
    }

    /// The project record.
    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The project root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.project.path
    }

    /// Resolved check modes.
    #[must_use]
    pub fn modes(&self) -> &CheckModes {
        &self.modes
    }

    /// Effective compliance level.
    #[must_use]
    pub fn compliance(&self) -> ComplianceLevel {
        self.modes.compliance()
    }

    /// Loaded data.
    #[must_use]
    pub fn data(&self) -> &ProjectData {
        &self.data
    }

    /// Sketch data, if this is a sketch.
    #[must_use]
    pub fn sketch(&self) -> Option<&SketchData> {
        match &self.data {
            ProjectData::Sketch(d) => Some(d),
            _ => None,
        }
    }

    /// Library data, if this is a library.
    #[must_use]
    pub fn library(&self) -> Option<&LibraryData> {
        match &self.data {
            ProjectData::Library(d) => Some(d),
            _ => None,
        }
    }

    /// Platform data, if this is a platform.
    #[must_use]
    pub fn platform(&self) -> Option<&PlatformData> {
        match &self.data {
            ProjectData::Platform(d) => Some(d),
            _ => None,
        }
    }

    /// Package index data, if this is a package index.
    #[must_use]
    pub fn package_index(&self) -> Option<&PackageIndexData> {
        match &self.data {
            ProjectData::PackageIndex(d) => Some(d),
            _ => None,
        }
    }

    /// The Library Manager index, loading it on first use.
    #[must_use]
    pub fn library_index(&self) -> Option<&LibraryIndex> {
        self.services.library_index.get()
    }

    /// HTTP client for URL checks.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.services.http
    }
}
