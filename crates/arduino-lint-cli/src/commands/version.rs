//! Version command implementation.

use anyhow::Result;
use serde::Serialize;

use crate::OutputFormat;

const UNKNOWN: &str = "unknown";

/// Build metadata of this binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Package version.
    pub version: &'static str,
    /// Source commit, when the build recorded one.
    pub commit: &'static str,
    /// Build time, when the build recorded one.
    pub build_timestamp: &'static str,
}

impl VersionInfo {
    /// Metadata captured at compile time.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("ARDUINO_LINT_COMMIT").unwrap_or(UNKNOWN),
            build_timestamp: option_env!("ARDUINO_LINT_BUILD_TIMESTAMP").unwrap_or(UNKNOWN),
        }
    }

    fn text(&self) -> String {
        format!("{} {} {}", self.version, self.commit, self.build_timestamp)
    }
}

/// Runs the version command.
pub fn run(format: OutputFormat) -> Result<()> {
    let info = VersionInfo::current();
    match format {
        OutputFormat::Text => println!("{}", info.text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- rendering tests ---

    #[test]
    fn text_joins_fields() {
        let info = VersionInfo {
            version: "1.3.0",
            commit: "abc1234",
            build_timestamp: UNKNOWN,
        };
        assert_eq!(info.text(), "1.3.0 abc1234 unknown");
    }

    #[test]
    fn json_uses_camel_case() {
        let value = serde_json::to_value(VersionInfo::current()).unwrap();
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert!(value.get("buildTimestamp").is_some());
        assert!(value.get("commit").is_some());
    }
}
