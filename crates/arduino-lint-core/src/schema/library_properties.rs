//! `library.properties` schemas.

use super::fragments::{
    labelled, non_empty_string, with_checks, not_contains_arduino, not_contains_spaces,
    not_starts_with_arduino, prohibited_property_names, version_string,
};
use crate::mode::ComplianceLevel;
use serde_json::{json, Map, Value};

/// Library Manager categories.
pub const CATEGORIES: [&str; 10] = [
    "Display",
    "Communication",
    "Signal Input/Output",
    "Sensors",
    "Device Control",
    "Timing",
    "Data Storage",
    "Data Processing",
    "Other",
    "Uncategorized",
];

/// Characters allowed in a library name.
pub const NAME_PATTERN: &str = "^(([a-zA-Z0-9])+([a-zA-Z0-9._ -])*)?$";

/// Comma separated dependency list with optional version constraints.
pub const DEPENDS_PATTERN: &str = r"^$|^([a-zA-Z0-9](([a-zA-Z0-9 ._-])*[a-zA-Z0-9._-])?( \([^,]*\))? *, *)*[a-zA-Z0-9](([a-zA-Z0-9 ._-])*[a-zA-Z0-9._-])?( \([^,]*\))?$";

const MISSPELLED_OPTIONAL: &str = "^(depend|D[eE][pP][eE][nN][dD][sS]?|dot-a-linkages?|dot_a_linkages|D[oO][tT][_-][aA][_-][lL][iI][nN][kK][aA][gG][eE][sS]?|include|I[nN][cC][lL][uU][dD][eE][sS]?|precompile|pre-compiled?|P[rR][eE]-?[cC][oO][mM][pP][iI][lL][eE][dD]?|ld_flags?|ldflag|L[dD]_?[fF][lL][aA][gG][sS]?)$";

/// Maximum length of a library name.
pub const NAME_MAX_LENGTH: usize = 63;

/// Recommended maximum length of a library name.
pub const NAME_RECOMMENDED_MAX_LENGTH: usize = 16;

pub(super) fn schema(level: ComplianceLevel) -> Value {
    let spec = level >= ComplianceLevel::Specification;
    let strict = level == ComplianceLevel::Strict;

    let mut name_checks = vec![labelled(
        "allowedCharacters",
        json!({"pattern": NAME_PATTERN}),
    )];
    if spec {
        name_checks.push(not_starts_with_arduino());
    }
    if strict {
        name_checks.push(not_contains_spaces());
        name_checks.push(not_contains_arduino());
        name_checks.push(labelled(
            "notContainsSuperfluousTerms",
            json!({"not": {"pattern": "[lL][iI][bB][rR][aA][rR][yY]"}}),
        ));
    }
    let name_max = if strict {
        NAME_RECOMMENDED_MAX_LENGTH
    } else {
        NAME_MAX_LENGTH
    };

    let mut maintainer_checks = Vec::new();
    if spec {
        maintainer_checks.push(not_starts_with_arduino());
    }
    if strict {
        maintainer_checks.push(not_contains_arduino());
    }

    let mut email_checks = Vec::new();
    if spec {
        email_checks.push(not_starts_with_arduino());
    }

    let mut properties = Map::new();
    properties.insert(
        "name".into(),
        with_checks(
            json!({"type": "string", "minLength": 1, "maxLength": name_max}),
            name_checks,
        ),
    );
    properties.insert("version".into(), version_string(strict));
    properties.insert("author".into(), non_empty_string());
    properties.insert(
        "maintainer".into(),
        with_checks(non_empty_string(), maintainer_checks),
    );
    properties.insert(
        "email".into(),
        with_checks(non_empty_string(), email_checks),
    );
    properties.insert("sentence".into(), non_empty_string());
    properties.insert("paragraph".into(), json!({"type": "string"}));
    properties.insert(
        "category".into(),
        if spec {
            json!({"type": "string", "enum": CATEGORIES})
        } else {
            json!({"type": "string"})
        },
    );
    properties.insert(
        "url".into(),
        if spec {
            json!({"type": "string", "format": "uri"})
        } else {
            json!({"type": "string", "minLength": 1})
        },
    );
    properties.insert(
        "architectures".into(),
        if spec {
            non_empty_string()
        } else {
            json!({"type": "string"})
        },
    );
    properties.insert(
        "depends".into(),
        json!({"type": "string", "pattern": DEPENDS_PATTERN}),
    );
    properties.insert(
        "dot_a_linkage".into(),
        json!({"type": "string", "enum": ["true", "false"]}),
    );
    properties.insert("includes".into(), non_empty_string());
    properties.insert(
        "precompiled".into(),
        json!({"type": "string", "enum": ["true", "full", "false"]}),
    );
    properties.insert(
        "ldflags".into(),
        if spec {
            json!({"type": "string", "minLength": 3})
        } else {
            json!({"type": "string"})
        },
    );

    let mut required = vec!["name", "version", "author", "sentence", "paragraph", "url"];
    if spec {
        required.push("maintainer");
    }
    if strict {
        required.push("category");
        required.push("architectures");
    }

    let mut root_checks = Vec::new();
    if !spec {
        root_checks.push(labelled(
            "maintainerOrEmailRequired",
            json!({"anyOf": [{"required": ["maintainer"]}, {"required": ["email"]}]}),
        ));
    }
    if strict {
        root_checks.push(prohibited_property_names(
            "misspelledOptionalProperties",
            MISSPELLED_OPTIONAL,
        ));
    }

    with_checks(
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": format!("library.properties {level} compliance"),
            "type": "object",
            "properties": properties,
            "required": required
        }),
        root_checks,
    )
}
