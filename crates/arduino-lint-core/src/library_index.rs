//! The Library Manager index.

use crate::http::HttpClient;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Default location of the Library Manager index.
pub const DEFAULT_URL: &str = "https://downloads.arduino.cc/libraries/library_index.json";

/// Errors from loading the index.
#[derive(Debug, thiserror::Error)]
pub enum LibraryIndexError {
    /// Download or read failure.
    #[error("Unable to load Library Manager index from {source_location}: {message}")]
    Load {
        /// URL or path.
        source_location: String,
        /// Underlying error text.
        message: String,
    },

    /// The document is not a library index.
    #[error("Unable to parse Library Manager index: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One release in the index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedRelease {
    /// Library name.
    pub name: String,
    /// Release version.
    #[serde(default)]
    pub version: String,
    /// Repository URL.
    #[serde(default)]
    pub repository: Option<String>,
}

/// The parsed index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryIndex {
    /// Every release of every library.
    #[serde(default)]
    pub libraries: Vec<IndexedRelease>,
    #[serde(skip)]
    names: BTreeSet<String>,
}

impl LibraryIndex {
    /// Parses an index document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an index.
    pub fn parse(content: &str) -> Result<Self, LibraryIndexError> {
        let mut index: Self = serde_json::from_str(content)?;
        index.names = index.libraries.iter().map(|r| r.name.clone()).collect();
        Ok(index)
    }

    /// Loads an index from a URL or a local file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be fetched or parsed.
    pub fn load(location: &str, http: &HttpClient) -> Result<Self, LibraryIndexError> {
        let load_error = |message: String| LibraryIndexError::Load {
            source_location: location.to_string(),
            message,
        };
        let content = if location.starts_with("http://") || location.starts_with("https://") {
            http.get_text(location).map_err(load_error)?
        } else {
            std::fs::read_to_string(Path::new(location)).map_err(|e| load_error(e.to_string()))?
        };
        let index = Self::parse(&content)?;
        debug!(location, releases = index.libraries.len(), "Loaded Library Manager index");
        Ok(index)
    }

    /// Returns `true` if a library named `name` is in the index.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Loads the index at most once and hands out shared references.
#[derive(Debug)]
pub struct LibraryIndexCache {
    location: String,
    http: HttpClient,
    index: OnceLock<Option<LibraryIndex>>,
}

impl LibraryIndexCache {
    /// Creates a cache for `location`; nothing is loaded yet.
    #[must_use]
    pub fn new(location: impl Into<String>, http: HttpClient) -> Self {
        Self {
            location: location.into(),
            http,
            index: OnceLock::new(),
        }
    }

    /// Creates a cache already holding `index`.
    #[must_use]
    pub fn preloaded(index: LibraryIndex) -> Self {
        let cache = Self::new("", HttpClient::new());
        let _ = cache.index.set(Some(index));
        cache
    }

    /// Returns the index, loading it on first use. `None` when loading failed.
    pub fn get(&self) -> Option<&LibraryIndex> {
        self.index
            .get_or_init(|| match LibraryIndex::load(&self.location, &self.http) {
                Ok(index) => Some(index),
                Err(e) => {
                    warn!("{e}");
                    None
                }
            })
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const INDEX: &str = r#"{"libraries": [
        {"name": "Servo", "version": "1.1.8", "repository": "https://github.com/arduino-libraries/Servo.git"},
        {"name": "Servo", "version": "1.2.0"},
        {"name": "ArduinoJson", "version": "6.21.0"}
    ]}"#;

    #[test]
    fn parse_collects_names() {
        let index = LibraryIndex::parse(INDEX).unwrap();
        assert_eq!(index.libraries.len(), 3);
        assert!(index.contains("Servo"));
        assert!(!index.contains("servo"));
        assert!(!index.contains("NotIndexed"));
    }

    #[test]
    fn load_from_url_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET").path("/library_index.json");
            then.status(200).body(INDEX);
        });
        let cache = LibraryIndexCache::new(server.url("/library_index.json"), HttpClient::new());
        assert!(cache.get().is_some_and(|i| i.contains("ArduinoJson")));
        assert!(cache.get().is_some());
        mock.assert_calls(1);
    }

    #[test]
    fn load_failure_is_cached_as_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/library_index.json");
            then.status(500);
        });
        let cache = LibraryIndexCache::new(server.url("/library_index.json"), HttpClient::new());
        assert!(cache.get().is_none());
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        std::fs::write(&path, INDEX).unwrap();
        let index = LibraryIndex::load(&path.to_string_lossy(), &HttpClient::new()).unwrap();
        assert!(index.contains("Servo"));
    }
}
