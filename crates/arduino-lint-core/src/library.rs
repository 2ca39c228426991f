//! Library file classification and data loading.

use crate::properties::Properties;
use crate::schema::{self, MetadataSchema, SchemaError, ValidationResults};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the library metadata file.
pub const METADATA_FILENAME: &str = "library.properties";

/// Header file extensions.
pub const HEADER_EXTENSIONS: [&str; 3] = ["h", "hpp", "hh"];

/// Folder names under which example sketches are found.
pub const EXAMPLES_FOLDER_NAMES: [&str; 2] = ["examples", "example"];

/// Returns `true` if `path` is named like the metadata file.
#[must_use]
pub fn is_metadata_file(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == METADATA_FILENAME)
}

/// Returns `true` if `path` has a header extension.
#[must_use]
pub fn has_header_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| HEADER_EXTENSIONS.contains(&e))
}

/// Returns `true` if `dir` directly contains a header file.
#[must_use]
pub fn contains_header_file(dir: &Path) -> bool {
    crate::fs::files_in(dir).iter().any(|f| has_header_extension(f))
}

/// Source layout of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryLayout {
    /// Sources in the library root.
    Flat,
    /// Sources under `src/`.
    Recursive,
}

/// Data loaded for a library project.
#[derive(Debug, Clone)]
pub struct LibraryData {
    /// `library.properties`, or `None` for a legacy library.
    pub properties: Option<Result<Properties, String>>,
    /// Validation results when the properties loaded.
    pub validation: Option<ValidationResults>,
    /// Source layout.
    pub layout: LibraryLayout,
    /// Directory holding the library's sources.
    pub source_dir: PathBuf,
    /// File names of the headers in the source directory.
    pub source_headers: Vec<String>,
}

impl LibraryData {
    /// Loads library data from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the metadata schemas fail to compile.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let metadata_path = path.join(METADATA_FILENAME);
        let properties = metadata_path.is_file().then(|| {
            Properties::load(&metadata_path).map_err(|e| {
                debug!(
                    path = %metadata_path.display(),
                    error = %e,
                    "library.properties did not load"
                );
                e.to_string()
            })
        });

        let validation = match &properties {
            Some(Ok(props)) => Some(schema::validate(
                MetadataSchema::LibraryProperties,
                &props.to_json(1),
            )?),
            _ => None,
        };

        let layout = if properties.is_some() && path.join("src").is_dir() {
            LibraryLayout::Recursive
        } else {
            LibraryLayout::Flat
        };
        let source_dir = match layout {
            LibraryLayout::Recursive => path.join("src"),
            LibraryLayout::Flat => path.to_path_buf(),
        };
        let source_headers = crate::fs::files_in(&source_dir)
            .iter()
            .filter(|f| has_header_extension(f))
            .map(|f| crate::fs::file_name(f))
            .collect();

        Ok(Self {
            properties,
            validation,
            layout,
            source_dir,
            source_headers,
        })
    }

    /// Returns `true` if the library has no metadata file.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.properties.is_none()
    }

    /// Returns the properties if they loaded.
    #[must_use]
    pub fn loaded(&self) -> Option<&Properties> {
        self.properties.as_ref().and_then(|p| p.as_ref().ok())
    }

    /// Returns the load error text, if loading failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        match &self.properties {
            Some(Err(e)) => Some(e),
            _ => None,
        }
    }

    /// Returns a metadata field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.loaded().and_then(|p| p.get(key))
    }

    /// Returns `true` if `dot_a_linkage` is enabled.
    #[must_use]
    pub fn dot_a_linkage(&self) -> bool {
        self.field("dot_a_linkage") == Some("true")
    }

    /// Returns `true` if `precompiled` is enabled.
    #[must_use]
    pub fn precompiled(&self) -> bool {
        matches!(self.field("precompiled"), Some("true" | "full"))
    }
}
