//! `sketch.json` schemas.

use crate::mode::ComplianceLevel;
use serde_json::{json, Value};

pub(super) fn schema(level: ComplianceLevel) -> Value {
    let strict = level == ComplianceLevel::Strict;
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": format!("sketch.json {level} compliance"),
        "type": "object",
        "properties": {
            "cpu": {
                "type": "object",
                "properties": {
                    "fqbn": {
                        "type": "string",
                        "pattern": "^[a-zA-Z0-9_.-]+:[a-zA-Z0-9_.-]+:[a-zA-Z0-9_.-]+(:.*)?$"
                    },
                    "name": {"type": "string"},
                    "port": {"type": "string"}
                },
                "additionalProperties": !strict
            },
            "secrets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "minLength": 1},
                        "value": {"type": "string"}
                    },
                    "required": ["name"]
                }
            },
            "included_libs": {
                "type": "array",
                "items": {"type": "string", "minLength": 1}
            }
        }
    })
}
