//! Configuration file for arduino-lint.

use crate::mode::{ComplianceLevel, LibraryManagerMode, ModeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
///
/// Every key is optional; command line flags and environment variables
/// override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Compliance level.
    #[serde(default)]
    pub compliance: Option<ComplianceLevel>,

    /// Library Manager context: `submit`, `update`, `false`.
    #[serde(default)]
    pub library_manager: Option<String>,

    /// Whether projects are official Arduino projects.
    #[serde(default)]
    pub official: Option<bool>,

    /// URL or path of the Library Manager index.
    #[serde(default)]
    pub library_index: Option<String>,

    /// Timeout for URL checks and index downloads, in seconds.
    #[serde(default)]
    pub url_timeout_secs: Option<u64>,

    /// Per-rule configurations keyed by rule ID.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled. Unlisted rules are.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.rules
            .get(rule_id)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Parses the `library_manager` key.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown value.
    pub fn library_manager_mode(&self) -> Result<Option<LibraryManagerMode>, ModeError> {
        match &self.library_manager {
            Some(value) => LibraryManagerMode::parse_flag(value),
            None => Ok(None),
        }
    }

    /// URL check timeout, if configured.
    #[must_use]
    pub fn url_timeout(&self) -> Option<Duration> {
        self.url_timeout_secs.map(Duration::from_secs)
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled. `false` disables it regardless of modes.
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(arduino_lint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(
        code(arduino_lint::config::parse),
        help("see `arduino-lint --help` for the supported keys")
    )]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.compliance.is_none());
        assert!(config.rules.is_empty());
        assert!(config.is_rule_enabled("LP013"));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
compliance = "strict"
library_manager = "update"
official = true
library_index = "/tmp/library_index.json"
url_timeout_secs = 5

[rules.LP013]
enabled = false
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.compliance, Some(ComplianceLevel::Strict));
        assert_eq!(config.library_manager_mode(), Ok(Some(LibraryManagerMode::Update)));
        assert_eq!(config.official, Some(true));
        assert_eq!(config.url_timeout(), Some(Duration::from_secs(5)));
        assert!(!config.is_rule_enabled("LP013"));
        assert!(config.is_rule_enabled("LP014"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::parse("compliance = \"lenient\"").is_err());
        assert!(Config::parse("unknown_key = 1").is_err());

        let config = Config::parse("library_manager = \"sometimes\"").unwrap();
        assert!(config.library_manager_mode().is_err());
    }
}
