//! Boards Manager package index: classification, loading and collection
//! enumeration.

use crate::pointer;
use crate::schema::{self, MetadataSchema, SchemaError, ValidationResults};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static OFFICIAL_FILENAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^package_(.+_)*index\.json$").ok());
static THIRD_PARTY_FILENAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^package_(.+_)+index\.json$").ok());

/// Returns `true` if `path` has a `.json` extension.
#[must_use]
pub fn has_valid_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

/// Returns `true` if the file name follows the package index naming rules.
///
/// Official indexes may be named `package_index.json`; third party indexes
/// need a `package_<name>_index.json` name.
#[must_use]
pub fn has_valid_filename(path: &Path, official: bool) -> bool {
    let regex = if official {
        &OFFICIAL_FILENAME
    } else {
        &THIRD_PARTY_FILENAME
    };
    let name = crate::fs::file_name(path);
    regex.as_ref().is_some_and(|r| r.is_match(&name))
}

/// Locates the package index file for a project path.
///
/// A file path is returned as is. In a directory, a file with a valid
/// filename wins over any other `.json` file.
#[must_use]
pub fn find(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let files = crate::fs::files_in(path);
    files
        .iter()
        .find(|f| has_valid_filename(f, true))
        .or_else(|| files.iter().find(|f| has_valid_extension(f)))
        .cloned()
}

/// One element of a package index collection.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// Human readable identifier.
    pub id: String,
    /// JSON pointer to the element.
    pub pointer: String,
    /// The element, when it is an object.
    pub object: Option<Value>,
}

/// The collections enumerated from a package index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `/packages/N`.
    Packages,
    /// `/packages/N/platforms/N`.
    Platforms,
    /// `/packages/N/platforms/N/boards/N`.
    Boards,
    /// `/packages/N/platforms/N/toolsDependencies/N`.
    ToolsDependencies,
    /// `/packages/N/platforms/N/discoveryDependencies/N`.
    DiscoveryDependencies,
    /// `/packages/N/platforms/N/monitorDependencies/N`.
    MonitorDependencies,
    /// `/packages/N/tools/N`.
    Tools,
    /// `/packages/N/tools/N/systems/N`.
    Systems,
}

/// Data loaded for a package index project.
#[derive(Debug, Clone)]
pub struct PackageIndexData {
    /// The index file, if one was found.
    pub path: Option<PathBuf>,
    /// Parsed document or the load error text.
    pub document: Result<Value, String>,
    /// Validation results when the document parsed.
    pub validation: Option<ValidationResults>,
    packages: Vec<IndexEntry>,
    platforms: Vec<IndexEntry>,
    boards: Vec<IndexEntry>,
    tools_dependencies: Vec<IndexEntry>,
    discovery_dependencies: Vec<IndexEntry>,
    monitor_dependencies: Vec<IndexEntry>,
    tools: Vec<IndexEntry>,
    systems: Vec<IndexEntry>,
}

impl PackageIndexData {
    /// Loads the package index for a project path.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schemas fail to compile.
    pub fn load(project_path: &Path) -> Result<Self, SchemaError> {
        let path = find(project_path);
        let document = match &path {
            Some(p) => crate::fs::read_json(p),
            None => Err(format!(
                "No package index file found in {}",
                project_path.display()
            )),
        };
        if let Err(e) = &document {
            debug!(path = %project_path.display(), error = %e, "package index did not load");
        }
        Self::from_document(path, document)
    }

    /// Builds the data from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schemas fail to compile.
    pub fn from_document(
        path: Option<PathBuf>,
        document: Result<Value, String>,
    ) -> Result<Self, SchemaError> {
        let mut data = Self {
            path,
            document,
            validation: None,
            packages: Vec::new(),
            platforms: Vec::new(),
            boards: Vec::new(),
            tools_dependencies: Vec::new(),
            discovery_dependencies: Vec::new(),
            monitor_dependencies: Vec::new(),
            tools: Vec::new(),
            systems: Vec::new(),
        };
        let Ok(root) = &data.document else {
            return Ok(data);
        };

        data.validation = Some(schema::validate(MetadataSchema::PackageIndex, root)?);
        data.packages =
            enumerate(Some(root), "", "packages", None, &["name"], |c| c[0].to_string());
        for package in &data.packages {
            data.platforms.extend(enumerate(
                package.object.as_ref(),
                &package.pointer,
                "platforms",
                Some(&package.id),
                &["architecture", "version"],
                |c| format!(":{}@{}", c[0], c[1]),
            ));
            data.tools.extend(enumerate(
                package.object.as_ref(),
                &package.pointer,
                "tools",
                Some(&package.id),
                &["name", "version"],
                |c| format!(":{}@{}", c[0], c[1]),
            ));
        }
        for platform in &data.platforms {
            let parent = platform.object.as_ref();
            let id = Some(platform.id.as_str());
            data.boards.extend(enumerate(parent, &platform.pointer, "boards", id, &["name"], |c| {
                format!(" >> {}", c[0])
            }));
            data.tools_dependencies.extend(enumerate(
                parent,
                &platform.pointer,
                "toolsDependencies",
                id,
                &["packager", "name", "version"],
                |c| format!(" >> {}:{}@{}", c[0], c[1], c[2]),
            ));
            data.discovery_dependencies.extend(enumerate(
                parent,
                &platform.pointer,
                "discoveryDependencies",
                id,
                &["packager", "name"],
                |c| format!(" >> {}:{}", c[0], c[1]),
            ));
            data.monitor_dependencies.extend(enumerate(
                parent,
                &platform.pointer,
                "monitorDependencies",
                id,
                &["packager", "name"],
                |c| format!(" >> {}:{}", c[0], c[1]),
            ));
        }
        for tool in &data.tools {
            data.systems.extend(enumerate(
                tool.object.as_ref(),
                &tool.pointer,
                "systems",
                Some(&tool.id),
                &["host"],
                |c| format!(" - {}", c[0]),
            ));
        }

        Ok(data)
    }

    /// Returns the parsed document if it loaded.
    #[must_use]
    pub fn loaded(&self) -> Option<&Value> {
        self.document.as_ref().ok()
    }

    /// Returns the entries of a collection.
    #[must_use]
    pub fn collection(&self, collection: Collection) -> &[IndexEntry] {
        match collection {
            Collection::Packages => &self.packages,
            Collection::Platforms => &self.platforms,
            Collection::Boards => &self.boards,
            Collection::ToolsDependencies => &self.tools_dependencies,
            Collection::DiscoveryDependencies => &self.discovery_dependencies,
            Collection::MonitorDependencies => &self.monitor_dependencies,
            Collection::Tools => &self.tools,
            Collection::Systems => &self.systems,
        }
    }
}

/// Enumerates the array at `parent[key]`.
///
/// The ID is the parent ID followed by `suffix` built from the string
/// fields `id_keys`. It falls back to the element's pointer when a field is
/// missing or empty, or when the parent itself has a pointer ID.
fn enumerate(
    parent: Option<&Value>,
    parent_pointer: &str,
    key: &str,
    parent_id: Option<&str>,
    id_keys: &[&str],
    suffix: impl Fn(&[&str]) -> String,
) -> Vec<IndexEntry> {
    let Some(items) = parent.and_then(|p| p.get(key)).and_then(Value::as_array) else {
        return Vec::new();
    };
    let collection_pointer = pointer::join(parent_pointer, key);

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let element_pointer = pointer::join(&collection_pointer, &index.to_string());
            let object = item.is_object().then(|| item.clone());
            let components: Option<Vec<&str>> = id_keys
                .iter()
                .map(|k| item.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
                .collect();
            let parent_is_fallback = parent_id.is_some_and(|id| id == parent_pointer);
            let id = match components {
                Some(c) if !parent_is_fallback => {
                    format!("{}{}", parent_id.unwrap_or_default(), suffix(&c))
                }
                _ => element_pointer.clone(),
            };
            IndexEntry {
                id,
                pointer: element_pointer,
                object,
            }
        })
        .collect()
}
