//! Sketch file classification and data loading.

use crate::schema::{self, MetadataSchema, SchemaError, ValidationResults};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extensions of primary sketch files.
pub const MAIN_EXTENSIONS: [&str; 2] = ["ino", "pde"];

/// Extensions of additional sketch files.
pub const ADDITIONAL_EXTENSIONS: [&str; 11] = [
    "h", "c", "hpp", "hh", "cpp", "S", "adoc", "md", "json", "tpp", "ipp",
];

/// Name of the optional sketch metadata file.
pub const METADATA_FILENAME: &str = "sketch.json";

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Returns `true` if `path` has a primary sketch file extension.
#[must_use]
pub fn has_main_extension(path: &Path) -> bool {
    extension(path).is_some_and(|e| MAIN_EXTENSIONS.contains(&e))
}

/// Returns `true` if `path` has any extension a sketch may contain.
#[must_use]
pub fn has_supported_extension(path: &Path) -> bool {
    has_main_extension(path) || extension(path).is_some_and(|e| ADDITIONAL_EXTENSIONS.contains(&e))
}

/// Returns `true` if `dir` directly contains a primary sketch file.
#[must_use]
pub fn contains_main_file(dir: &Path) -> bool {
    crate::fs::files_in(dir).iter().any(|f| has_main_extension(f))
}

/// The sketch metadata file, when present.
#[derive(Debug, Clone)]
pub struct SketchMetadata {
    /// Path of the file.
    pub path: PathBuf,
    /// Parsed document or the parse error text.
    pub document: Result<Value, String>,
    /// Validation results when the document parsed.
    pub validation: Option<ValidationResults>,
}

/// Data loaded for a sketch project.
#[derive(Debug, Clone)]
pub struct SketchData {
    /// Primary sketch files in the sketch root.
    pub main_files: Vec<PathBuf>,
    /// Supported files in the root and, recursively, under `src/`.
    pub code_files: Vec<PathBuf>,
    /// `sketch.json`, when present.
    pub metadata: Option<SketchMetadata>,
}

impl SketchData {
    /// Loads sketch data from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the metadata schemas fail to compile.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let root_files = crate::fs::files_in(path);
        let main_files: Vec<PathBuf> = root_files
            .iter()
            .filter(|f| has_main_extension(f))
            .cloned()
            .collect();

        let mut code_files: Vec<PathBuf> = root_files
            .into_iter()
            .filter(|f| has_supported_extension(f))
            .collect();
        let src = path.join("src");
        if src.is_dir() {
            code_files.extend(
                WalkDir::new(&src)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file() && has_supported_extension(e.path()))
                    .map(walkdir::DirEntry::into_path),
            );
        }

        let metadata_path = path.join(METADATA_FILENAME);
        let metadata = if metadata_path.is_file() {
            let document = crate::fs::read_json(&metadata_path);
            let validation = match &document {
                Ok(value) => Some(schema::validate(MetadataSchema::SketchMetadata, value)?),
                Err(e) => {
                    debug!(path = %metadata_path.display(), error = %e, "sketch.json did not load");
                    None
                }
            };
            Some(SketchMetadata {
                path: metadata_path,
                document,
                validation,
            })
        } else {
            None
        };

        Ok(Self {
            main_files,
            code_files,
            metadata,
        })
    }
}
