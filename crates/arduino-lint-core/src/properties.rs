//! Ordered `key=value` properties files (`library.properties`, `boards.txt`, ...).
//!
//! Keys are dot-separated paths. Duplicate keys are last-write-wins while the
//! key keeps the position of its first occurrence. Blank lines and lines
//! starting with `#` are ignored.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Errors from loading a properties file.
#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
    /// IO error reading the file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A line is neither blank, a comment, nor `key=value`.
    #[error("Invalid line format on line {line}, should be 'key=value': {text}")]
    Malformed {
        /// 1-indexed line number.
        line: usize,
        /// The offending line.
        text: String,
    },
}

/// An ordered properties map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    keys: Vec<String>,
    values: HashMap<String, String>,
}

impl Properties {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a properties file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains a malformed line.
    pub fn load(path: &Path) -> Result<Self, PropertiesError> {
        let content = std::fs::read_to_string(path).map_err(|e| PropertiesError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses properties text.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError::Malformed`] for a line without `=` or with
    /// an empty key.
    pub fn parse(content: &str) -> Result<Self, PropertiesError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut properties = Self::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(PropertiesError::Malformed {
                    line: index + 1,
                    text: raw.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(PropertiesError::Malformed {
                    line: index + 1,
                    text: raw.to_string(),
                });
            }
            properties.set(key, value.trim());
        }

        Ok(properties)
    }

    /// Sets a key, keeping its original position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.insert(key, value.into());
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.values.remove(key)?;
        self.keys.retain(|k| k != key);
        Some(removed)
    }

    /// Returns the value of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v.as_str())))
    }

    /// Returns the distinct first key segments, in order of appearance.
    #[must_use]
    pub fn first_level_keys(&self) -> Vec<String> {
        let mut seen = Vec::<String>::new();
        for key in &self.keys {
            let first = key.split('.').next().unwrap_or(key);
            if !seen.iter().any(|s| s == first) {
                seen.push(first.to_string());
            }
        }
        seen
    }

    /// Returns the keys below `prefix.` with the prefix stripped.
    #[must_use]
    pub fn subtree(&self, prefix: &str) -> Self {
        let dotted = format!("{prefix}.");
        let mut sub = Self::new();
        for (key, value) in self.iter() {
            if let Some(rest) = key.strip_prefix(&dotted) {
                sub.set(rest, value);
            }
        }
        sub
    }

    /// Converts to a JSON object, nesting `levels` key segments deep.
    ///
    /// A `levels` of 1 keeps every key flat as a string; any value below 1
    /// recurses fully. When nesting, a key with both a value and children
    /// becomes an object and loses its own value.
    #[must_use]
    pub fn to_json(&self, levels: i32) -> Value {
        let mut map = Map::new();
        if levels == 1 {
            for (key, value) in self.iter() {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            return Value::Object(map);
        }

        for key in self.first_level_keys() {
            let sub = self.subtree(&key);
            if sub.is_empty() {
                let value = self.get(&key).unwrap_or_default().to_string();
                map.insert(key, Value::String(value));
            } else {
                map.insert(key, sub.to_json(levels - 1));
            }
        }
        Value::Object(map)
    }

    /// Serializes back to `key=value` text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Self::new();
        for (k, v) in iter {
            properties.set(k, v);
        }
        properties
    }
}

/// Splits a comma-separated field into trimmed, non-empty items.
#[must_use]
pub fn comma_separated_to_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
