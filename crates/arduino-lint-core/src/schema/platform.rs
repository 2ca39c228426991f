//! Schemas for the platform configuration files.
//!
//! The instances are the JSON views built by
//! [`crate::platform`]: board and programmer objects keyed by ID, and the
//! flattened `platform.txt` with `tools` and `pluggable_discovery` nested.

use super::fragments::{
    boolean_string, labelled, non_empty_string, prohibited_property_names, version_string,
    with_checks,
};
use crate::mode::ComplianceLevel;
use serde_json::{json, Value};

/// `compiler.*.extra_flags` properties are reserved for users.
pub const USER_EXTRA_FLAGS_PATTERN: &str = r"^compiler\.[^.]+\.extra_flags$";

/// A `vid.N`/`pid.N` property name.
pub const USB_ID_PROPERTY_PATTERN: &str = r"^[vp]id\.[0-9]+$";

/// Maximum length of an upload field label.
pub const UPLOAD_FIELD_LABEL_MAX_LENGTH: usize = 50;

/// Recipes every platform must define.
pub const REQUIRED_RECIPES: [&str; 7] = [
    "recipe.c.o.pattern",
    "recipe.cpp.o.pattern",
    "recipe.S.o.pattern",
    "recipe.ar.pattern",
    "recipe.c.combine.pattern",
    "recipe.output.tmp_file",
    "recipe.output.save_file",
];

/// Warning flag levels a platform should define.
pub const WARNING_FLAGS: [&str; 4] = [
    "compiler.warning_flags.none",
    "compiler.warning_flags.default",
    "compiler.warning_flags.more",
    "compiler.warning_flags.all",
];

pub(super) fn boards_txt_schema(level: ComplianceLevel) -> Value {
    let spec = level >= ComplianceLevel::Specification;
    let strict = level == ComplianceLevel::Strict;

    let mut required = vec!["name", "build.core"];
    if strict {
        required.extend(["build.board", "upload.maximum_size", "upload.maximum_data_size"]);
    }

    let mut board_checks = vec![labelled(
        "uploadToolRequired",
        json!({"anyOf": [{"required": ["upload.tool"]}, {"required": ["upload.tool.default"]}]}),
    )];
    if strict {
        board_checks.push(prohibited_property_names(
            "userExtraFlagsUsage",
            USER_EXTRA_FLAGS_PATTERN,
        ));
    }

    let usb_id = if spec {
        json!({"type": "string", "pattern": "^0[xX][0-9a-fA-F]{4}$"})
    } else {
        json!({"type": "string"})
    };

    let board = with_checks(
        json!({
            "type": "object",
            "properties": {
                "name": non_empty_string(),
                "build.board": non_empty_string(),
                "build.core": non_empty_string(),
                "debug.tool": non_empty_string(),
                "hide": {"type": "string", "enum": ["", "true"]},
                "serial.disableDTR": boolean_string(),
                "serial.disableRTS": boolean_string(),
                "upload.tool": non_empty_string(),
                "upload.tool.default": non_empty_string(),
                "upload.maximum_size": {"type": "string", "pattern": "^[0-9]+$"},
                "upload.maximum_data_size": {"type": "string", "pattern": "^[0-9]+$"},
                "upload.use_1200bps_touch": boolean_string(),
                "upload.wait_for_upload_port": boolean_string(),
                "menu": {
                    "type": "object",
                    "additionalProperties": {"type": "object"}
                }
            },
            "patternProperties": {
                USB_ID_PROPERTY_PATTERN: usb_id
            },
            "required": required
        }),
        board_checks,
    );

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": format!("boards.txt {level} compliance"),
        "type": "object",
        "properties": {
            "menu": {
                "type": "object",
                "additionalProperties": non_empty_string()
            }
        },
        "additionalProperties": board
    })
}

pub(super) fn programmers_txt_schema(level: ComplianceLevel) -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": format!("programmers.txt {level} compliance"),
        "type": "object",
        "additionalProperties": {
            "type": "object",
            "properties": {
                "name": non_empty_string(),
                "program.tool": non_empty_string(),
                "program.tool.default": non_empty_string()
            },
            "required": ["name"],
            "allOf": [labelled(
                "programToolRequired",
                json!({"anyOf": [
                    {"required": ["program.tool"]},
                    {"required": ["program.tool.default"]}
                ]}),
            )]
        }
    })
}

pub(super) fn platform_txt_schema(level: ComplianceLevel) -> Value {
    let strict = level == ComplianceLevel::Strict;

    let mut required: Vec<&str> = vec!["name", "version"];
    required.extend(REQUIRED_RECIPES);
    if strict {
        required.extend(WARNING_FLAGS);
    }

    let field_label = if strict {
        json!({"type": "string", "maxLength": UPLOAD_FIELD_LABEL_MAX_LENGTH})
    } else {
        json!({"type": "string"})
    };

    let mut root_checks = Vec::new();
    if strict {
        root_checks.push(labelled(
            "userExtraFlagsEmpty",
            json!({"patternProperties": {USER_EXTRA_FLAGS_PATTERN: {"maxLength": 0}}}),
        ));
    }

    with_checks(
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": format!("platform.txt {level} compliance"),
            "type": "object",
            "properties": {
                "name": non_empty_string(),
                "version": version_string(strict),
                "pluggable_discovery": {
                    "type": "object",
                    "properties": {
                        "required": {
                            "type": "array",
                            "items": {
                                "type": "string",
                                "pattern": "^[a-zA-Z0-9_.-]+:[a-zA-Z0-9_.-]+$"
                            }
                        }
                    },
                    "additionalProperties": {
                        "type": "object",
                        "required": ["pattern"]
                    }
                },
                "tools": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "object",
                        "properties": {
                            "upload": {
                                "type": "object",
                                "properties": {
                                    "field": {
                                        "type": "object",
                                        "patternProperties": {
                                            r"^[^.]+$": field_label,
                                            r"^[^.]+\.secret$": boolean_string()
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "required": required
        }),
        root_checks,
    )
}

#[cfg(test)]
mod tests {
    use crate::mode::ComplianceLevel;
    use crate::schema::{validate, MetadataSchema};
    use serde_json::json;

    #[test]
    fn empty_board_name_fails_min_length() {
        let boards = json!({
            "uno": {"name": "", "build.core": "arduino", "upload.tool": "avrdude"}
        });
        let r = validate(MetadataSchema::BoardsTxt, &boards).unwrap();
        for level in ComplianceLevel::ALL {
            assert!(r.get(level).property_less_than_min_length("/uno/name"));
        }
    }

    #[test]
    fn upload_tool_default_satisfies_requirement() {
        let boards = json!({
            "uno": {"name": "Uno", "build.core": "arduino", "upload.tool.default": "avrdude"},
            "mega": {"name": "Mega", "build.core": "arduino"}
        });
        let r = validate(MetadataSchema::BoardsTxt, &boards).unwrap();
        assert!(!r.specification.labelled_check_failed("/uno", "uploadToolRequired"));
        assert!(r.specification.labelled_check_failed("/mega", "uploadToolRequired"));
    }

    #[test]
    fn usb_ids_are_checked() {
        let boards = json!({
            "uno": {
                "name": "Uno", "build.core": "arduino", "upload.tool": "avrdude",
                "vid.0": "0x2341", "pid.0": "43"
            }
        });
        let r = validate(MetadataSchema::BoardsTxt, &boards).unwrap();
        assert!(!r.specification.property_pattern_mismatch("/uno/vid.0"));
        assert!(r.specification.property_pattern_mismatch("/uno/pid.0"));
    }

    #[test]
    fn menu_titles_must_not_be_empty() {
        let boards = json!({"menu": {"cpu": ""}});
        let r = validate(MetadataSchema::BoardsTxt, &boards).unwrap();
        assert!(r.permissive.property_less_than_min_length("/menu/cpu"));
    }

    #[test]
    fn platform_txt_requirements() {
        let platform = json!({"name": "My Boards", "version": "1.0"});
        let r = validate(MetadataSchema::PlatformTxt, &platform).unwrap();
        assert!(r.specification.required_property_missing("/recipe.c.o.pattern"));
        assert!(!r.specification.property_pattern_mismatch("/version"));
        assert!(r.strict.property_pattern_mismatch("/version"));
        assert!(r.strict.required_property_missing("/compiler.warning_flags.all"));
    }

    #[test]
    fn upload_field_secret_enum() {
        let platform = json!({
            "tools": {"bossac": {"upload": {"field": {"pw": "Password", "pw.secret": "yes"}}}}
        });
        let r = validate(MetadataSchema::PlatformTxt, &platform).unwrap();
        assert!(r
            .specification
            .property_enum_mismatch("/tools/bossac/upload/field/pw.secret"));
    }

    #[test]
    fn programmer_tool_required() {
        let programmers = json!({"usbasp": {"name": "USBasp"}});
        let r = validate(MetadataSchema::ProgrammersTxt, &programmers).unwrap();
        assert!(r.specification.labelled_check_failed("/usbasp", "programToolRequired"));
    }
}
