//! Platform configuration files: classification, loading and the JSON
//! views the schemas validate.
//!
//! `boards.txt` becomes one object per board ID (flat keys, with the board's
//! `menu.*` keys nested three levels deep) plus the root `menu` titles.
//! `platform.txt` stays flat except for `tools` and `pluggable_discovery`,
//! which hold arbitrary nested subproperties. A key may be both a value and a
//! parent in these files, which JSON cannot express, hence the selective
//! nesting.

use crate::properties::Properties;
use crate::schema::{self, MetadataSchema, SchemaError, ValidationResults};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Boards definition file name; required in every platform.
pub const BOARDS_TXT: &str = "boards.txt";
/// Programmers definition file name.
pub const PROGRAMMERS_TXT: &str = "programmers.txt";
/// Platform configuration file name.
pub const PLATFORM_TXT: &str = "platform.txt";

/// Every recognised platform configuration file name.
pub const CONFIGURATION_FILENAMES: [&str; 5] = [
    BOARDS_TXT,
    "boards.local.txt",
    PLATFORM_TXT,
    "platform.local.txt",
    PROGRAMMERS_TXT,
];

/// Folder holding bundled libraries.
pub const BUNDLED_LIBRARIES_FOLDER: &str = "libraries";

/// Returns `true` if `path` is named like a platform configuration file.
#[must_use]
pub fn is_configuration_file(path: &Path) -> bool {
    let name = crate::fs::file_name(path);
    CONFIGURATION_FILENAMES.contains(&name.as_str())
}

/// Returns `true` if `path` is named like the required configuration file.
#[must_use]
pub fn is_required_configuration_file(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == BOARDS_TXT)
}

/// A loaded `.txt` configuration file.
#[derive(Debug, Clone)]
pub struct TxtFile {
    /// Parsed properties or the load error text.
    pub properties: Result<Properties, String>,
    /// Validation results when the file parsed.
    pub validation: Option<ValidationResults>,
}

impl TxtFile {
    fn load(
        path: &Path,
        kind: MetadataSchema,
        to_json: fn(&Properties) -> Value,
    ) -> Result<Option<Self>, SchemaError> {
        if !path.is_file() {
            return Ok(None);
        }
        let properties = Properties::load(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "configuration file did not load");
            e.to_string()
        });
        let validation = match &properties {
            Ok(props) => Some(schema::validate(kind, &to_json(props))?),
            Err(_) => None,
        };
        Ok(Some(Self {
            properties,
            validation,
        }))
    }

    /// Returns the properties if they loaded.
    #[must_use]
    pub fn loaded(&self) -> Option<&Properties> {
        self.properties.as_ref().ok()
    }
}

/// Data loaded for a platform project.
#[derive(Debug, Clone, Default)]
pub struct PlatformData {
    /// `boards.txt`, when present.
    pub boards: Option<TxtFile>,
    /// `programmers.txt`, when present.
    pub programmers: Option<TxtFile>,
    /// `platform.txt`, when present.
    pub platform: Option<TxtFile>,
    /// Board IDs in order of appearance.
    pub board_ids: Vec<String>,
    /// Board IDs without a `hide` property.
    pub visible_board_ids: Vec<String>,
    /// Root menu IDs.
    pub menu_ids: Vec<String>,
    /// Programmer IDs.
    pub programmer_ids: Vec<String>,
    /// Pluggable discovery names, excluding `required`.
    pub pluggable_discovery_names: Vec<String>,
    /// Upload field names keyed by tool.
    pub user_provided_field_names: BTreeMap<String, Vec<String>>,
    /// Tool names.
    pub tool_names: Vec<String>,
}

impl PlatformData {
    /// Loads platform data from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a schema fails to compile.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let mut data = Self {
            boards: TxtFile::load(
                &path.join(BOARDS_TXT),
                MetadataSchema::BoardsTxt,
                boards_to_json,
            )?,
            programmers: TxtFile::load(
                &path.join(PROGRAMMERS_TXT),
                MetadataSchema::ProgrammersTxt,
                programmers_to_json,
            )?,
            platform: TxtFile::load(
                &path.join(PLATFORM_TXT),
                MetadataSchema::PlatformTxt,
                platform_to_json,
            )?,
            ..Self::default()
        };

        if let Some(boards) = data.boards.as_ref().and_then(TxtFile::loaded) {
            data.board_ids = board_ids(boards);
            data.visible_board_ids = data
                .board_ids
                .iter()
                .filter(|id| !boards.contains_key(&format!("{id}.hide")))
                .cloned()
                .collect();
            data.menu_ids = boards.subtree("menu").first_level_keys();
        }
        if let Some(programmers) = data.programmers.as_ref().and_then(TxtFile::loaded) {
            data.programmer_ids = programmers.first_level_keys();
        }
        if let Some(platform) = data.platform.as_ref().and_then(TxtFile::loaded) {
            data.pluggable_discovery_names = platform
                .subtree("pluggable_discovery")
                .first_level_keys()
                .into_iter()
                .filter(|n| n != "required")
                .collect();
            let tools = platform.subtree("tools");
            data.tool_names = tools.first_level_keys();
            for tool in &data.tool_names {
                let fields = tools.subtree(&format!("{tool}.upload.field")).first_level_keys();
                if !fields.is_empty() {
                    data.user_provided_field_names.insert(tool.clone(), fields);
                }
            }
        }

        Ok(data)
    }
}

fn board_ids(boards: &Properties) -> Vec<String> {
    boards
        .first_level_keys()
        .into_iter()
        .filter(|k| k != "menu")
        .collect()
}

/// Converts `boards.txt` to the object validated by the boards schema.
#[must_use]
pub fn boards_to_json(boards: &Properties) -> Value {
    let mut root = Map::new();
    for key in boards.first_level_keys() {
        let sub = boards.subtree(&key);
        if key == "menu" {
            root.insert(key, sub.to_json(1));
            continue;
        }
        let mut board = Map::new();
        for (k, v) in sub.iter() {
            if !k.starts_with("menu.") {
                board.insert(k.to_string(), Value::String(v.to_string()));
            }
        }
        board.insert("menu".to_string(), sub.subtree("menu").to_json(3));
        root.insert(key, Value::Object(board));
    }
    Value::Object(root)
}

/// Converts `programmers.txt` to the object validated by its schema.
#[must_use]
pub fn programmers_to_json(programmers: &Properties) -> Value {
    programmers.to_json(2)
}

/// Converts `platform.txt` to the object validated by its schema.
#[must_use]
pub fn platform_to_json(platform: &Properties) -> Value {
    let mut root = Map::new();
    for (key, value) in platform.iter() {
        if key.starts_with("pluggable_discovery.") || key.starts_with("tools.") {
            continue;
        }
        root.insert(key.to_string(), Value::String(value.to_string()));
    }

    let discovery = platform.subtree("pluggable_discovery");
    if !discovery.is_empty() {
        let mut object = match discovery.to_json(2) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let required: Vec<Value> = discovery
            .iter()
            .filter(|(k, _)| *k == "required" || k.starts_with("required."))
            .map(|(_, v)| Value::String(v.to_string()))
            .collect();
        if required.is_empty() {
            object.remove("required");
        } else {
            object.insert("required".to_string(), Value::Array(required));
        }
        root.insert("pluggable_discovery".to_string(), Value::Object(object));
    }

    let tools = platform.subtree("tools");
    if !tools.is_empty() {
        root.insert("tools".to_string(), tools.to_json(4));
    }
    Value::Object(root)
}
