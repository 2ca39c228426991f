//! Boards Manager package index schemas.

use super::fragments::{
    checksum, integer_string, labelled, non_empty_string, not_starts_with_arduino,
    version_string, with_checks,
};
use crate::mode::ComplianceLevel;
use serde_json::{json, Value};

/// Host triplets recognised for tool systems.
pub const HOST_PATTERN: &str = r"^(i[3-6]86|x86_64|amd64|arm|armv[67][a-z]*|aarch64|arm64)-[a-zA-Z0-9_.-]*(linux-gnu|linux-gnueabihf|mingw32|cygwin|apple-darwin[0-9.]*|freebsd[0-9]*)$";

fn closed(strict: bool, schema: Value) -> Value {
    let mut schema = schema;
    if strict {
        if let Value::Object(map) = &mut schema {
            map.insert("additionalProperties".into(), Value::Bool(false));
        }
    }
    schema
}

fn help(strict: bool) -> Value {
    closed(
        strict,
        json!({
            "type": "object",
            "properties": {"online": {"type": "string", "format": "uri"}},
            "required": ["online"]
        }),
    )
}

fn dependency(strict: bool, with_version: bool) -> Value {
    let mut required = vec!["packager", "name"];
    let mut properties = json!({
        "packager": non_empty_string(),
        "name": non_empty_string()
    });
    if with_version {
        required.push("version");
        properties["version"] = version_string(false);
    }
    closed(
        strict,
        json!({"type": "object", "properties": properties, "required": required}),
    )
}

fn system(strict: bool) -> Value {
    closed(
        strict,
        json!({
            "type": "object",
            "properties": {
                "host": {"type": "string", "pattern": HOST_PATTERN},
                "url": {"type": "string", "format": "uri"},
                "archiveFileName": non_empty_string(),
                "checksum": checksum(strict),
                "size": integer_string()
            },
            "required": ["host", "url", "archiveFileName", "checksum", "size"]
        }),
    )
}

fn platform(strict: bool) -> Value {
    closed(
        strict,
        json!({
            "type": "object",
            "properties": {
                "name": non_empty_string(),
                "architecture": non_empty_string(),
                "version": version_string(strict),
                "category": {"type": "string"},
                "help": help(strict),
                "url": {"type": "string", "format": "uri"},
                "archiveFileName": non_empty_string(),
                "checksum": checksum(strict),
                "size": integer_string(),
                "boards": {
                    "type": "array",
                    "items": closed(strict, json!({
                        "type": "object",
                        "properties": {"name": non_empty_string()},
                        "required": ["name"]
                    }))
                },
                "toolsDependencies": {"type": "array", "items": dependency(strict, true)},
                "discoveryDependencies": {"type": "array", "items": dependency(strict, false)},
                "monitorDependencies": {"type": "array", "items": dependency(strict, false)}
            },
            "required": [
                "name", "architecture", "version", "category", "url",
                "archiveFileName", "checksum", "size", "boards", "toolsDependencies"
            ]
        }),
    )
}

fn tool(strict: bool) -> Value {
    closed(
        strict,
        json!({
            "type": "object",
            "properties": {
                "name": non_empty_string(),
                "version": version_string(false),
                "systems": {"type": "array", "items": system(strict)}
            },
            "required": ["name", "version", "systems"]
        }),
    )
}

pub(super) fn schema(level: ComplianceLevel) -> Value {
    let spec = level >= ComplianceLevel::Specification;
    let strict = level == ComplianceLevel::Strict;

    let mut name_checks = Vec::new();
    let mut maintainer_checks = Vec::new();
    if spec {
        name_checks.push(labelled(
            "notReservedName",
            json!({"not": {"pattern": "^[aA][rR][dD][uU][iI][nN][oO]$"}}),
        ));
        maintainer_checks.push(not_starts_with_arduino());
    }

    let package = closed(
        strict,
        json!({
            "type": "object",
            "properties": {
                "name": with_checks(non_empty_string(), name_checks),
                "maintainer": with_checks(non_empty_string(), maintainer_checks),
                "websiteURL": {"type": "string", "format": "uri"},
                "email": {"type": "string"},
                "help": help(strict),
                "platforms": {"type": "array", "items": platform(strict)},
                "tools": {"type": "array", "items": tool(strict)}
            },
            "required": ["name", "maintainer", "websiteURL", "email", "help", "platforms", "tools"]
        }),
    );

    closed(
        strict,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": format!("package index {level} compliance"),
            "type": "object",
            "properties": {
                "packages": {"type": "array", "items": package}
            },
            "required": ["packages"]
        }),
    )
}
