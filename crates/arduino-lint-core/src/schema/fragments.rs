//! Schema fragments shared by several metadata schemas.

use serde_json::{json, Value};

/// Semantic version 2.0.0.
pub const SEMVER: &str = r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(-((0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(\.(0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?(\+([0-9a-zA-Z-]+(\.[0-9a-zA-Z-]+)*))?$";

/// Semantic version with the minor and patch components optional.
pub const RELAXED_SEMVER: &str = r"^(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*)){0,2}(-((0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(\.(0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?(\+([0-9a-zA-Z-]+(\.[0-9a-zA-Z-]+)*))?$";

/// Adds a `$comment` label to a schema object.
pub fn labelled(label: &str, schema: Value) -> Value {
    let mut schema = schema;
    if let Value::Object(map) = &mut schema {
        map.insert("$comment".to_string(), Value::String(label.to_string()));
    }
    schema
}

/// Adds `checks` under `allOf`, leaving the schema untouched when there are none.
pub fn with_checks(schema: Value, checks: Vec<Value>) -> Value {
    let mut schema = schema;
    if let (Value::Object(map), false) = (&mut schema, checks.is_empty()) {
        map.insert("allOf".to_string(), Value::Array(checks));
    }
    schema
}

/// A non-empty string.
pub fn non_empty_string() -> Value {
    json!({"type": "string", "minLength": 1})
}

/// A string with a version pattern chosen for `strict`.
pub fn version_string(strict: bool) -> Value {
    json!({
        "type": "string",
        "pattern": if strict { SEMVER } else { RELAXED_SEMVER }
    })
}

/// Fails when the value starts with "arduino" in any case.
pub fn not_starts_with_arduino() -> Value {
    labelled(
        "notStartsWithArduino",
        json!({"not": {"pattern": "^[aA][rR][dD][uU][iI][nN][oO]"}}),
    )
}

/// Fails when the value contains "arduino" in any case.
pub fn not_contains_arduino() -> Value {
    labelled(
        "notContainsArduino",
        json!({"not": {"pattern": "[aA][rR][dD][uU][iI][nN][oO]"}}),
    )
}

/// Fails when the value contains a space.
pub fn not_contains_spaces() -> Value {
    labelled("notContainsSpaces", json!({"not": {"pattern": " "}}))
}

/// A `"true"`/`"false"` string.
pub fn boolean_string() -> Value {
    json!({"type": "string", "enum": ["true", "false"]})
}

/// A decimal integer string.
pub fn integer_string() -> Value {
    json!({"type": "string", "pattern": "^[0-9]+$"})
}

/// An archive checksum; the strict variant also requires SHA-256.
pub fn checksum(strict: bool) -> Value {
    let mut checks = vec![labelled(
        "checksumFormat",
        json!({"pattern": "^(SHA-256|SHA-1|MD5):[0-9a-fA-F]+$"}),
    )];
    if strict {
        checks.push(labelled("usesSHA256", json!({"pattern": "^SHA-256:"})));
    }
    json!({"type": "string", "allOf": checks})
}

/// Rejects property names matching `pattern`.
pub fn prohibited_property_names(label: &str, pattern: &str) -> Value {
    labelled(label, json!({"propertyNames": {"not": {"pattern": pattern}}}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn semver_patterns_classify_versions() {
        let strict = Regex::new(SEMVER).unwrap();
        let relaxed = Regex::new(RELAXED_SEMVER).unwrap();
        for v in ["1.0.0", "1.0.0-rc1", "1.2.3+build.5"] {
            assert!(strict.is_match(v), "{v}");
            assert!(relaxed.is_match(v), "{v}");
        }
        for v in ["1.0", "1"] {
            assert!(!strict.is_match(v), "{v}");
            assert!(relaxed.is_match(v), "{v}");
        }
        for v in ["v1.0.0", "1.0.0.0", "01.0.0", ""] {
            assert!(!strict.is_match(v), "{v}");
            assert!(!relaxed.is_match(v), "{v}");
        }
    }

    #[test]
    fn labelled_inserts_comment() {
        let v = labelled("x", json!({"pattern": "a"}));
        assert_eq!(v["$comment"], "x");
    }
}
