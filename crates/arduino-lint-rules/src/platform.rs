//! Platform configuration file rules (`PB`, `PR`, `PT`).

use crate::helpers::{DEFAULT, PLATFORM_SPEC_URL, STRICT};
use arduino_lint_core::platform::{PlatformData, TxtFile, BOARDS_TXT, PLATFORM_TXT, PROGRAMMERS_TXT};
use arduino_lint_core::pointer;
use arduino_lint_core::properties::Properties;
use arduino_lint_core::schema::platform::{
    REQUIRED_RECIPES, USER_EXTRA_FLAGS_PATTERN, WARNING_FLAGS,
};
use arduino_lint_core::schema::{ValidationResult, ValidationResults};
use arduino_lint_core::{
    ComplianceLevel, ProjectContext, ProjectKind, RuleDescriptor, RuleFn, RuleOutput,
};
use regex::Regex;
use std::sync::LazyLock;

const SPECIFICATION: ComplianceLevel = ComplianceLevel::Specification;
const STRICT_LEVEL: ComplianceLevel = ComplianceLevel::Strict;
const FIELD_NOT_PRESENT: &str = "Field not present";

static USER_EXTRA_FLAGS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(USER_EXTRA_FLAGS_PATTERN).ok());

/// Returns the platform rules in catalog order.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn rules() -> Vec<RuleDescriptor> {
    let rule = |id: &'static str, brief: &'static str, file: &'static str, func: RuleFn| {
        RuleDescriptor::new(ProjectKind::Platform, id, brief, func)
            .category("configuration files", file)
            .reference(PLATFORM_SPEC_URL)
    };
    vec![
        rule("PB001", "missing boards.txt", "boards.txt", boards_missing)
            .message("Required boards.txt is missing. Expected at: {}"),
        rule("PB002", "boards.txt format", "boards.txt", boards_format)
            .message("boards.txt has an invalid format: {}"),
        rule("PB003", "missing board name", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.required_property_missing(&pointer::join(b, "name"))
            })
        })
        .message("Missing name property for board ID(s) {}"),
        rule("PB004", "board name too short", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_less_than_min_length(&pointer::join(b, "name"))
            })
        })
        .message("Board ID(s) {} have a name property less than the minimum length."),
        rule("PB005", "missing build.board", "boards.txt", |ctx| {
            board_check(ctx, STRICT_LEVEL, false, |r, b| {
                r.required_property_missing(&pointer::join(b, "build.board"))
            })
        })
        .message("Missing build.board property for board ID(s) {}. The board's default build.board value is not conventional.")
        .warning(DEFAULT),
        rule("PB006", "build.board too short", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_less_than_min_length(&pointer::join(b, "build.board"))
            })
        })
        .message("Board ID(s) {} have a build.board property less than the minimum length."),
        rule("PB007", "missing build.core", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.required_property_missing(&pointer::join(b, "build.core"))
            })
        })
        .message("Missing build.core property for board ID(s) {}"),
        rule("PB008", "build.core too short", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_less_than_min_length(&pointer::join(b, "build.core"))
            })
        })
        .message("Board ID(s) {} have a build.core property less than the minimum length."),
        rule("PB009", "user extra flags in boards.txt", "boards.txt", |ctx| {
            board_check(ctx, STRICT_LEVEL, false, |r, b| {
                r.validation_error_match(&descendant_of(b), "", "^userExtraFlagsUsage$", "")
            })
        })
        .message("Board ID(s) {} use compiler.x.extra_flags properties. These are reserved for the user.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("PB010", "debug.tool too short", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_less_than_min_length(&pointer::join(b, "debug.tool"))
            })
        })
        .message("Board ID(s) {} have a debug.tool property less than the minimum length."),
        rule("PB011", "invalid hide", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_enum_mismatch(&pointer::join(b, "hide"))
            })
        })
        .message("Board ID(s) {} have an invalid hide property value. Leave it empty or set it to true."),
        rule("PB012", "menu title too short", "boards.txt", menu_title_too_short)
            .message("Menu ID(s) {} have a title less than the minimum length."),
        rule("PB013", "menu option name too short", "boards.txt", menu_option_too_short)
            .message("Board ID(s) {} have a custom board option with a name less than the minimum length."),
        rule("PB014", "invalid serial.disableDTR", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_enum_mismatch(&pointer::join(b, "serial.disableDTR"))
            })
        })
        .message("Board ID(s) {} have an invalid serial.disableDTR property value. Must be true or false."),
        rule("PB015", "invalid serial.disableRTS", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_enum_mismatch(&pointer::join(b, "serial.disableRTS"))
            })
        })
        .message("Board ID(s) {} have an invalid serial.disableRTS property value. Must be true or false."),
        rule("PB016", "missing upload.tool", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.labelled_check_failed(b, "uploadToolRequired")
            })
        })
        .message("Missing upload.tool property for board ID(s) {}"),
        rule("PB017", "upload.tool too short", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_less_than_min_length(&pointer::join(b, "upload.tool"))
            })
        })
        .message("Board ID(s) {} have an upload.tool property less than the minimum length."),
        rule("PB018", "missing upload.maximum_size", "boards.txt", |ctx| {
            board_check(ctx, STRICT_LEVEL, true, |r, b| {
                r.required_property_missing(&pointer::join(b, "upload.maximum_size"))
            })
        })
        .message("Missing upload.maximum_size property for board ID(s) {}. The sketch size will not be checked against the flash capacity.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("PB019", "invalid upload.maximum_size", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_pattern_mismatch(&pointer::join(b, "upload.maximum_size"))
            })
        })
        .message("Board ID(s) {} have an invalid upload.maximum_size property value. Must be an integer."),
        rule("PB020", "missing upload.maximum_data_size", "boards.txt", |ctx| {
            board_check(ctx, STRICT_LEVEL, true, |r, b| {
                r.required_property_missing(&pointer::join(b, "upload.maximum_data_size"))
            })
        })
        .message("Missing upload.maximum_data_size property for board ID(s) {}. Global variable memory use will not be checked.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("PB021", "invalid upload.maximum_data_size", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_pattern_mismatch(&pointer::join(b, "upload.maximum_data_size"))
            })
        })
        .message("Board ID(s) {} have an invalid upload.maximum_data_size property value. Must be an integer."),
        rule("PB022", "invalid upload.use_1200bps_touch", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_enum_mismatch(&pointer::join(b, "upload.use_1200bps_touch"))
            })
        })
        .message("Board ID(s) {} have an invalid upload.use_1200bps_touch property value. Must be true or false."),
        rule("PB023", "invalid upload.wait_for_upload_port", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| {
                r.property_enum_mismatch(&pointer::join(b, "upload.wait_for_upload_port"))
            })
        })
        .message("Board ID(s) {} have an invalid upload.wait_for_upload_port property value. Must be true or false."),
        rule("PB024", "invalid vid.n", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| usb_id_invalid(r, b, "vid"))
        })
        .message("Board ID(s) {} have an invalid vid.n property value. Must be a 16 bit hexadecimal number like 0x2341."),
        rule("PB025", "invalid pid.n", "boards.txt", |ctx| {
            board_check(ctx, SPECIFICATION, false, |r, b| usb_id_invalid(r, b, "pid"))
        })
        .message("Board ID(s) {} have an invalid pid.n property value. Must be a 16 bit hexadecimal number like 0x0043."),
        rule("PR001", "programmers.txt format", "programmers.txt", |ctx| {
            file_format(ctx, ConfigFile::Programmers)
        })
        .message("programmers.txt has an invalid format: {}"),
        rule("PR002", "missing programmer name", "programmers.txt", |ctx| {
            programmer_check(ctx, |r, p| r.required_property_missing(&pointer::join(p, "name")))
        })
        .message("Missing name property for programmer ID(s) {}"),
        rule("PR003", "programmer name too short", "programmers.txt", |ctx| {
            programmer_check(ctx, |r, p| r.property_less_than_min_length(&pointer::join(p, "name")))
        })
        .message("Programmer ID(s) {} have a name property less than the minimum length."),
        rule("PR004", "missing program.tool", "programmers.txt", |ctx| {
            programmer_check(ctx, |r, p| r.labelled_check_failed(p, "programToolRequired"))
        })
        .message("Missing program.tool property for programmer ID(s) {}"),
        rule("PR005", "program.tool too short", "programmers.txt", |ctx| {
            programmer_check(ctx, |r, p| {
                r.property_less_than_min_length(&pointer::join(p, "program.tool"))
            })
        })
        .message("Programmer ID(s) {} have a program.tool property less than the minimum length."),
        rule("PT001", "platform.txt format", "platform.txt", |ctx| {
            file_format(ctx, ConfigFile::Platform)
        })
        .message("platform.txt has an invalid format: {}"),
        rule("PT002", "missing name", "platform.txt", |ctx| {
            platform_check(ctx, |f| {
                RuleOutput::pass_if(!f.at(SPECIFICATION).required_property_missing("/name"), "")
            })
        })
        .message("Missing name property in platform.txt"),
        rule("PT003", "name too short", "platform.txt", |ctx| {
            platform_field(ctx, "name", |f, _| {
                RuleOutput::pass_if(!f.at(SPECIFICATION).property_less_than_min_length("/name"), "")
            })
        })
        .message("platform.txt name property value is less than the minimum length."),
        rule("PT004", "missing version", "platform.txt", |ctx| {
            platform_check(ctx, |f| {
                RuleOutput::pass_if(!f.at(SPECIFICATION).required_property_missing("/version"), "")
            })
        })
        .message("Missing version property in platform.txt"),
        rule("PT005", "invalid version", "platform.txt", |ctx| {
            platform_field(ctx, "version", |f, value| {
                RuleOutput::pass_if(
                    !f.at(SPECIFICATION).property_pattern_mismatch("/version"),
                    value,
                )
            })
        })
        .message("platform.txt version value {} is not compliant with the relaxed semver specification."),
        rule("PT006", "non-semver version", "platform.txt", |ctx| {
            platform_field(ctx, "version", |f, value| {
                RuleOutput::pass_if(
                    !f.at(STRICT_LEVEL).property_pattern_mismatch("/version"),
                    value,
                )
            })
        })
        .message("platform.txt version value {} is not compliant with the semver specification.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("PT007", "missing recipe", "platform.txt", |ctx| {
            platform_check(ctx, |f| missing_properties(f.at(SPECIFICATION), &REQUIRED_RECIPES))
        })
        .message("Missing required recipe property(s) in platform.txt: {}"),
        rule("PT008", "missing warning flags", "platform.txt", |ctx| {
            platform_check(ctx, |f| missing_properties(f.at(STRICT_LEVEL), &WARNING_FLAGS))
        })
        .message("Missing compiler.warning_flags property(s) in platform.txt: {}. The compiler warnings preference will have no effect.")
        .warning(DEFAULT)
        .error(STRICT),
        rule(
            "PT009",
            "invalid pluggable_discovery.required",
            "platform.txt",
            discovery_required_invalid,
        )
        .message("Invalid pluggable_discovery.required property value(s) in platform.txt: {}. Must be VENDOR:DISCOVERY."),
        rule("PT010", "missing discovery pattern", "platform.txt", discovery_pattern_missing)
            .message("Missing pluggable_discovery.DISCOVERY_ID.pattern property for discovery(s) {}"),
        rule("PT011", "upload field label too long", "platform.txt", |ctx| {
            upload_field_check(ctx, STRICT_LEVEL, |r, field| {
                r.property_greater_than_max_length(field)
            })
        })
        .message("platform.txt upload field label(s) {} longer than the maximum of 50 characters. The label will be truncated.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("PT012", "invalid upload field secret", "platform.txt", |ctx| {
            upload_field_check(ctx, SPECIFICATION, |r, field| {
                r.property_enum_mismatch(&format!("{field}.secret"))
            })
        })
        .message("platform.txt upload field(s) {} have an invalid secret property value. Must be true or false."),
        rule("PT013", "user extra flags in platform.txt", "platform.txt", user_extra_flags_defined)
            .message("platform.txt defines compiler.x.extra_flags property(s) {}. These are reserved for the user.")
            .warning(DEFAULT)
            .error(STRICT),
    ]
}

/// One of the platform configuration files.
#[derive(Debug, Clone, Copy)]
enum ConfigFile {
    Boards,
    Programmers,
    Platform,
}

impl ConfigFile {
    fn name(self) -> &'static str {
        match self {
            Self::Boards => BOARDS_TXT,
            Self::Programmers => PROGRAMMERS_TXT,
            Self::Platform => PLATFORM_TXT,
        }
    }

    fn select(self, data: &PlatformData) -> Option<&TxtFile> {
        match self {
            Self::Boards => data.boards.as_ref(),
            Self::Programmers => data.programmers.as_ref(),
            Self::Platform => data.platform.as_ref(),
        }
    }

    /// Output of a rule for a file that does not exist.
    fn absent(self) -> RuleOutput {
        match self {
            Self::Boards => self.load_error(),
            Self::Programmers | Self::Platform => {
                RuleOutput::skip(format!("{} not present", self.name()))
            }
        }
    }

    fn load_error(self) -> RuleOutput {
        RuleOutput::not_run(format!("Couldn't load {}", self.name()))
    }
}

/// A configuration file that parsed.
struct Loaded<'a> {
    data: &'a PlatformData,
    properties: &'a Properties,
    validation: &'a ValidationResults,
}

impl<'a> Loaded<'a> {
    fn at(&self, level: ComplianceLevel) -> &'a ValidationResult {
        self.validation.get(level)
    }
}

fn with_file(
    ctx: &ProjectContext,
    file: ConfigFile,
    check: impl FnOnce(&Loaded<'_>) -> RuleOutput,
) -> RuleOutput {
    let Some(data) = ctx.platform() else {
        return file.load_error();
    };
    let Some(txt) = file.select(data) else {
        return file.absent();
    };
    match (txt.loaded(), txt.validation.as_ref()) {
        (Some(properties), Some(validation)) => check(&Loaded {
            data,
            properties,
            validation,
        }),
        _ => file.load_error(),
    }
}

/// Instance pointers at or below `object`.
fn descendant_of(object: &str) -> String {
    format!("^{}(/.*)?$", regex::escape(object))
}

fn board_check(
    ctx: &ProjectContext,
    level: ComplianceLevel,
    visible_only: bool,
    failed: impl Fn(&ValidationResult, &str) -> bool,
) -> RuleOutput {
    with_file(ctx, ConfigFile::Boards, |f| {
        let ids = if visible_only {
            &f.data.visible_board_ids
        } else {
            &f.data.board_ids
        };
        let result = f.at(level);
        RuleOutput::fail_if_any(
            ids.iter()
                .filter(|id| failed(result, &pointer::join("", id))),
        )
    })
}

fn programmer_check(
    ctx: &ProjectContext,
    failed: impl Fn(&ValidationResult, &str) -> bool,
) -> RuleOutput {
    with_file(ctx, ConfigFile::Programmers, |f| {
        let result = f.at(SPECIFICATION);
        RuleOutput::fail_if_any(
            f.data
                .programmer_ids
                .iter()
                .filter(|id| failed(result, &pointer::join("", id))),
        )
    })
}

fn platform_check(
    ctx: &ProjectContext,
    check: impl FnOnce(&Loaded<'_>) -> RuleOutput,
) -> RuleOutput {
    with_file(ctx, ConfigFile::Platform, check)
}

fn platform_field(
    ctx: &ProjectContext,
    key: &str,
    check: impl FnOnce(&Loaded<'_>, &str) -> RuleOutput,
) -> RuleOutput {
    platform_check(ctx, |f| match f.properties.get(key) {
        Some(value) => check(f, value),
        None => RuleOutput::not_run(FIELD_NOT_PRESENT),
    })
}

fn file_format(ctx: &ProjectContext, file: ConfigFile) -> RuleOutput {
    let Some(data) = ctx.platform() else {
        return file.load_error();
    };
    match file.select(data) {
        Some(TxtFile {
            properties: Err(e), ..
        }) => RuleOutput::fail(e.as_str()),
        Some(_) => RuleOutput::pass(),
        None => file.absent(),
    }
}

// --- boards.txt ---

fn boards_missing(ctx: &ProjectContext) -> RuleOutput {
    let path = ctx.path().join(BOARDS_TXT);
    RuleOutput::pass_if(path.is_file(), path.display().to_string())
}

fn boards_format(ctx: &ProjectContext) -> RuleOutput {
    file_format(ctx, ConfigFile::Boards)
}

fn usb_id_invalid(result: &ValidationResult, board: &str, prefix: &str) -> bool {
    let instance = format!(r"^{}/{prefix}\.[0-9]+$", regex::escape(board));
    result.validation_error_match(&instance, "/pattern$", "", "")
}

fn menu_title_too_short(ctx: &ProjectContext) -> RuleOutput {
    with_file(ctx, ConfigFile::Boards, |f| {
        let result = f.at(SPECIFICATION);
        let menus = pointer::join("", "menu");
        RuleOutput::fail_if_any(
            f.data
                .menu_ids
                .iter()
                .filter(|id| result.property_less_than_min_length(&pointer::join(&menus, id))),
        )
    })
}

fn menu_option_too_short(ctx: &ProjectContext) -> RuleOutput {
    with_file(ctx, ConfigFile::Boards, |f| {
        RuleOutput::fail_if_any(f.data.board_ids.iter().filter(|id| {
            f.properties
                .subtree(&format!("{id}.menu"))
                .iter()
                .any(|(key, value)| key.split('.').count() == 2 && value.is_empty())
        }))
    })
}

// --- platform.txt ---

fn missing_properties(result: &ValidationResult, keys: &[&str]) -> RuleOutput {
    RuleOutput::fail_if_any(
        keys.iter()
            .filter(|key| result.required_property_missing(&pointer::join("", key))),
    )
}

fn discovery_required_invalid(ctx: &ProjectContext) -> RuleOutput {
    platform_check(ctx, |f| {
        let result = f.at(SPECIFICATION);
        let required = descendant_of("/pluggable_discovery/required");
        if !result.validation_error_match(&required, "", "", "") {
            return RuleOutput::pass();
        }
        RuleOutput::fail_if_any(
            f.properties
                .iter()
                .filter(|(key, _)| {
                    *key == "pluggable_discovery.required"
                        || key.starts_with("pluggable_discovery.required.")
                })
                .map(|(_, value)| value),
        )
    })
}

fn discovery_pattern_missing(ctx: &ProjectContext) -> RuleOutput {
    platform_check(ctx, |f| {
        let result = f.at(SPECIFICATION);
        let discoveries = pointer::join("", "pluggable_discovery");
        RuleOutput::fail_if_any(f.data.pluggable_discovery_names.iter().filter(|name| {
            result.required_property_missing(
                &pointer::join(&pointer::join(&discoveries, name), "pattern"),
            )
        }))
    })
}

/// Checks every upload field; `failed` receives the field's pointer.
fn upload_field_check(
    ctx: &ProjectContext,
    level: ComplianceLevel,
    failed: impl Fn(&ValidationResult, &str) -> bool,
) -> RuleOutput {
    platform_check(ctx, |f| {
        let result = f.at(level);
        let mut found = Vec::new();
        for (tool, fields) in &f.data.user_provided_field_names {
            let base = pointer::from_tokens(["tools", tool.as_str(), "upload", "field"]);
            for field in fields {
                if failed(result, &pointer::join(&base, field)) {
                    found.push(format!("tools.{tool}.upload.field.{field}"));
                }
            }
        }
        RuleOutput::fail_if_any(found)
    })
}

fn user_extra_flags_defined(ctx: &ProjectContext) -> RuleOutput {
    platform_check(ctx, |f| {
        if !f.at(STRICT_LEVEL).validation_error_match("", "", "^userExtraFlagsEmpty$", "") {
            return RuleOutput::pass();
        }
        let Some(re) = USER_EXTRA_FLAGS.as_ref() else {
            return RuleOutput::pass();
        };
        RuleOutput::fail_if_any(
            f.properties
                .iter()
                .filter(|(key, value)| re.is_match(key) && !value.is_empty())
                .map(|(key, _)| key),
        )
    })
}
