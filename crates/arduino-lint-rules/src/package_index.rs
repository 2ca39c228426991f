//! Boards Manager package index rules (`IR`, `IP`, `IF`, `IT`).
//!
//! Collection rules run one schema query per enumerated element and report
//! the IDs of the failing elements. Rules on a field the ID is built from
//! report the element's JSON pointer instead.

use crate::helpers::{DEFAULT, OFFICIAL, PACKAGE_INDEX_SPEC_URL, STRICT};
use arduino_lint_core::fs::file_name;
use arduino_lint_core::package_index::{
    has_valid_filename, Collection, IndexEntry, PackageIndexData,
};
use arduino_lint_core::pointer;
use arduino_lint_core::schema::{ValidationResult, ValidationResults};
use arduino_lint_core::{
    ComplianceLevel, ProjectContext, ProjectKind, RuleDescriptor, RuleFn, RuleOutput,
};
use serde_json::Value;
use tracing::debug;

const LOAD_ERROR: &str = "Error loading package index";
const NOT_FOUND: &str = "Package index not found";

const PERMISSIVE: ComplianceLevel = ComplianceLevel::Permissive;
const SPECIFICATION: ComplianceLevel = ComplianceLevel::Specification;
const STRICT_LEVEL: ComplianceLevel = ComplianceLevel::Strict;

/// Category every third party platform must use.
const THIRD_PARTY_CATEGORY: &str = "Contributed";

/// How a collection rule identifies failing elements.
#[derive(Debug, Clone, Copy)]
enum Report {
    Id,
    Pointer,
}

/// Returns the package index rules in catalog order.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn rules() -> Vec<RuleDescriptor> {
    let rule = |id: &'static str, brief: &'static str, subcategory: &'static str, func: RuleFn| {
        RuleDescriptor::new(ProjectKind::PackageIndex, id, brief, func)
            .category("package index", subcategory)
            .reference(PACKAGE_INDEX_SPEC_URL)
    };
    vec![
        // --- root ---
        rule("IR001", "missing package index", "root", index_missing)
            .message("No package index file found."),
        rule("IR002", "invalid filename", "root", |ctx| filename_invalid(ctx, false))
            .message("Invalid package index filename {}. The filename must be package_YOURNAME_index.json.")
            .disable(OFFICIAL),
        rule("IR003", "invalid official filename", "root", |ctx| filename_invalid(ctx, true))
            .message("Invalid package index filename {}. The filename must be package_index.json or package_YOURNAME_index.json.")
            .disable(DEFAULT)
            .enable(OFFICIAL),
        rule("IR004", "invalid JSON format", "root", json_format)
            .message("Invalid package index JSON format: {}"),
        rule("IR005", "invalid data format", "root", data_format)
            .message("Invalid package index data format: {}"),
        rule("IR006", "root additional properties", "root", |ctx| {
            with_index(ctx, |i| {
                RuleOutput::pass_if(!i.at(STRICT_LEVEL).prohibited_additional_properties(""), "")
            })
        })
        .message("Unknown properties found in package index root. Check for misspelled property names.")
        .warning(DEFAULT)
        .error(STRICT),
        // --- packages ---
        rule("IP001", "missing packages", "packages", |ctx| {
            with_index(ctx, |i| {
                RuleOutput::pass_if(!i.at(SPECIFICATION).required_property_missing("/packages"), "")
            })
        })
        .message("Missing packages property in package index."),
        rule("IP002", "incorrect packages type", "packages", |ctx| {
            with_index(ctx, |i| {
                RuleOutput::pass_if(!i.at(SPECIFICATION).property_type_mismatch("/packages"), "")
            })
        })
        .message("Incorrect packages property type in package index. It must be an array."),
        rule("IP003", "package additional properties", "packages", |ctx| {
            elements(ctx, Collection::Packages, STRICT_LEVEL, |r, p| {
                r.prohibited_additional_properties(p)
            })
        })
        .message("Unknown properties found in package(s) {}. Check for misspelled property names.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IP004", "missing package name", "packages", |ctx| {
            field(ctx, Collection::Packages, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing name property in package(s) {}"),
        rule("IP005", "incorrect package name type", "packages", |ctx| {
            field(ctx, Collection::Packages, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect name property type in package(s) {}"),
        rule("IP006", "package name too short", "packages", |ctx| {
            field(ctx, Collection::Packages, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.property_less_than_min_length(p)
            })
        })
        .message("Package(s) {} have a name less than the minimum length."),
        rule("IP007", "package name is \"arduino\"", "packages", |ctx| {
            field(ctx, Collection::Packages, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.labelled_check_failed(p, "notReservedName")
            })
        })
        .message("Package name \"arduino\" is reserved for official packages. Found in {}")
        .disable(OFFICIAL),
        rule("IP008", "missing maintainer", "packages", |ctx| {
            field(ctx, Collection::Packages, "maintainer", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing maintainer property in package(s) {}"),
        rule("IP009", "incorrect maintainer type", "packages", |ctx| {
            field(ctx, Collection::Packages, "maintainer", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect maintainer property type in package(s) {}"),
        rule("IP010", "maintainer too short", "packages", |ctx| {
            field(ctx, Collection::Packages, "maintainer", SPECIFICATION, Report::Id, |r, p| {
                r.property_less_than_min_length(p)
            })
        })
        .message("Package(s) {} have a maintainer less than the minimum length."),
        rule("IP011", "maintainer starts with \"Arduino\"", "packages", |ctx| {
            field(ctx, Collection::Packages, "maintainer", SPECIFICATION, Report::Id, |r, p| {
                r.labelled_check_failed(p, "notStartsWithArduino")
            })
        })
        .message("Maintainer of package(s) {} starts with \"Arduino\". 3rd party packages are not maintained by Arduino.")
        .disable(OFFICIAL),
        rule("IP012", "missing websiteURL", "packages", |ctx| {
            field(ctx, Collection::Packages, "websiteURL", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing websiteURL property in package(s) {}"),
        rule("IP013", "incorrect websiteURL type", "packages", |ctx| {
            field(ctx, Collection::Packages, "websiteURL", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect websiteURL property type in package(s) {}"),
        rule("IP014", "invalid websiteURL format", "packages", |ctx| {
            field(ctx, Collection::Packages, "websiteURL", SPECIFICATION, Report::Id, |r, p| {
                r.property_format_mismatch(p)
            })
        })
        .message("Invalid websiteURL format in package(s) {}"),
        rule("IP015", "dead websiteURL", "packages", |ctx| {
            dead_links(ctx, Collection::Packages, "/websiteURL")
        })
        .message("Unable to load the websiteURL of package(s) {}")
        .warning(DEFAULT),
        rule("IP016", "missing email", "packages", |ctx| {
            field(ctx, Collection::Packages, "email", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing email property in package(s) {}"),
        rule("IP017", "incorrect email type", "packages", |ctx| {
            field(ctx, Collection::Packages, "email", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect email property type in package(s) {}"),
        rule("IP018", "incorrect help type", "packages", |ctx| {
            field(ctx, Collection::Packages, "help", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect help property type in package(s) {}"),
        rule("IP019", "help additional properties", "packages", |ctx| {
            field(ctx, Collection::Packages, "help", STRICT_LEVEL, Report::Id, |r, p| {
                r.prohibited_additional_properties(p)
            })
        })
        .message("Unknown properties found in help of package(s) {}. Check for misspelled property names.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IP020", "missing help.online", "packages", |ctx| {
            field(ctx, Collection::Packages, "help/online", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing help.online property in package(s) {}"),
        rule("IP021", "incorrect help.online type", "packages", |ctx| {
            field(ctx, Collection::Packages, "help/online", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect help.online property type in package(s) {}"),
        rule("IP022", "invalid help.online format", "packages", |ctx| {
            field(ctx, Collection::Packages, "help/online", SPECIFICATION, Report::Id, |r, p| {
                r.property_format_mismatch(p)
            })
        })
        .message("Invalid help.online format in package(s) {}"),
        rule("IP023", "dead help.online", "packages", |ctx| {
            dead_links(ctx, Collection::Packages, "/help/online")
        })
        .message("Unable to load the help.online URL of package(s) {}")
        .warning(DEFAULT),
        // --- platforms ---
        rule("IF001", "incorrect platforms type", "platforms", |ctx| {
            field(ctx, Collection::Packages, "platforms", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect platforms property type in package(s) {}. It must be an array."),
        rule("IF002", "platform additional properties", "platforms", |ctx| {
            elements(ctx, Collection::Platforms, STRICT_LEVEL, |r, p| {
                r.prohibited_additional_properties(p)
            })
        })
        .message("Unknown properties found in platform(s) {}. Check for misspelled property names.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IF003", "missing platform name", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "name", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing name property in platform(s) {}"),
        rule("IF004", "platform name too short", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "name", SPECIFICATION, Report::Id, |r, p| {
                r.property_less_than_min_length(p)
            })
        })
        .message("Platform(s) {} have a name less than the minimum length."),
        rule("IF005", "missing architecture", "platforms", |ctx| {
            field(
                ctx,
                Collection::Platforms,
                "architecture",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing architecture property in platform(s) {}"),
        rule("IF006", "architecture too short", "platforms", |ctx| {
            field(
                ctx,
                Collection::Platforms,
                "architecture",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.property_less_than_min_length(p),
            )
        })
        .message("Platform(s) {} have an architecture less than the minimum length."),
        rule("IF007", "missing platform version", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "version", SPECIFICATION, Report::Pointer, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing version property in platform(s) {}"),
        rule("IF008", "invalid platform version", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "version", SPECIFICATION, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Platform version(s) {} are not compliant with the relaxed semver specification."),
        rule("IF009", "non-semver platform version", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "version", STRICT_LEVEL, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Platform version(s) {} are not compliant with the semver specification.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IF010", "invalid category", "platforms", third_party_category_invalid)
            .message("Platform(s) {} use a category other than Contributed. 3rd party platforms must use the Contributed category.")
            .disable(OFFICIAL)
            .warning(DEFAULT)
            .error(STRICT),
        rule("IF011", "dead help.online", "platforms", |ctx| {
            dead_links(ctx, Collection::Platforms, "/help/online")
        })
        .message("Unable to load the help.online URL of platform(s) {}")
        .warning(DEFAULT),
        rule("IF012", "missing url", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "url", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing url property in platform(s) {}"),
        rule("IF013", "invalid url format", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "url", SPECIFICATION, Report::Id, |r, p| {
                r.property_format_mismatch(p)
            })
        })
        .message("Invalid url format in platform(s) {}"),
        rule("IF014", "dead url", "platforms", |ctx| dead_links(ctx, Collection::Platforms, "/url"))
            .message("Unable to load the archive url of platform(s) {}")
            .warning(DEFAULT),
        rule("IF015", "missing archiveFileName", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "archiveFileName", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing archiveFileName property in platform(s) {}"),
        rule("IF016", "missing checksum", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "checksum", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing checksum property in platform(s) {}"),
        rule("IF017", "invalid checksum", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "checksum", SPECIFICATION, Report::Id, |r, p| {
                r.labelled_check_failed(p, "checksumFormat")
            })
        })
        .message("Invalid checksum format in platform(s) {}. Must be ALGORITHM:HEXDIGEST."),
        rule("IF018", "discouraged checksum algorithm", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "checksum", ctx.compliance(), Report::Id, |r, p| {
                r.labelled_check_failed(p, "usesSHA256")
            })
        })
        .message("Platform(s) {} use a discouraged checksum algorithm. SHA-256 is recommended.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IF019", "missing size", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "size", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing size property in platform(s) {}"),
        rule("IF020", "invalid size", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "size", SPECIFICATION, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Invalid size in platform(s) {}. Must be the archive size in bytes."),
        rule("IF021", "incorrect boards type", "platforms", |ctx| {
            field(ctx, Collection::Platforms, "boards", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect boards property type in platform(s) {}. It must be an array."),
        rule("IF022", "missing board name", "platforms", |ctx| {
            field(ctx, Collection::Boards, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing name property in board(s) {}"),
        rule("IF023", "board name too short", "platforms", |ctx| {
            field(ctx, Collection::Boards, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.property_less_than_min_length(p)
            })
        })
        .message("Board(s) {} have a name less than the minimum length."),
        rule("IF024", "missing tool dependency packager", "platforms", |ctx| {
            field(
                ctx,
                Collection::ToolsDependencies,
                "packager",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing packager property in tool dependency(s) {}"),
        rule("IF025", "missing tool dependency name", "platforms", |ctx| {
            field(
                ctx,
                Collection::ToolsDependencies,
                "name",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing name property in tool dependency(s) {}"),
        rule("IF026", "missing tool dependency version", "platforms", |ctx| {
            field(
                ctx,
                Collection::ToolsDependencies,
                "version",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing version property in tool dependency(s) {}"),
        rule("IF027", "invalid tool dependency version", "platforms", |ctx| {
            field(ctx, Collection::ToolsDependencies, "version", SPECIFICATION, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Tool dependency version(s) {} are not compliant with the relaxed semver specification."),
        rule("IF028", "missing discovery dependency packager", "platforms", |ctx| {
            field(
                ctx,
                Collection::DiscoveryDependencies,
                "packager",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing packager property in discovery dependency(s) {}"),
        rule("IF029", "missing discovery dependency name", "platforms", |ctx| {
            field(
                ctx,
                Collection::DiscoveryDependencies,
                "name",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing name property in discovery dependency(s) {}"),
        rule("IF030", "missing monitor dependency packager", "platforms", |ctx| {
            field(
                ctx,
                Collection::MonitorDependencies,
                "packager",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing packager property in monitor dependency(s) {}"),
        rule("IF031", "missing monitor dependency name", "platforms", |ctx| {
            field(
                ctx,
                Collection::MonitorDependencies,
                "name",
                SPECIFICATION,
                Report::Pointer,
                |r, p| r.required_property_missing(p),
            )
        })
        .message("Missing name property in monitor dependency(s) {}"),
        // --- tools ---
        rule("IT001", "incorrect tools type", "tools", |ctx| {
            field(ctx, Collection::Packages, "tools", SPECIFICATION, Report::Id, |r, p| {
                r.property_type_mismatch(p)
            })
        })
        .message("Incorrect tools property type in package(s) {}. It must be an array."),
        rule("IT002", "tool additional properties", "tools", |ctx| {
            elements(ctx, Collection::Tools, STRICT_LEVEL, |r, p| {
                r.prohibited_additional_properties(p)
            })
        })
        .message("Unknown properties found in tool(s) {}. Check for misspelled property names.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IT003", "missing tool name", "tools", |ctx| {
            field(ctx, Collection::Tools, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing name property in tool(s) {}"),
        rule("IT004", "tool name too short", "tools", |ctx| {
            field(ctx, Collection::Tools, "name", SPECIFICATION, Report::Pointer, |r, p| {
                r.property_less_than_min_length(p)
            })
        })
        .message("Tool(s) {} have a name less than the minimum length."),
        rule("IT005", "missing tool version", "tools", |ctx| {
            field(ctx, Collection::Tools, "version", SPECIFICATION, Report::Pointer, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing version property in tool(s) {}"),
        rule("IT006", "invalid tool version", "tools", |ctx| {
            field(ctx, Collection::Tools, "version", SPECIFICATION, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Tool version(s) {} are not compliant with the relaxed semver specification."),
        rule("IT007", "missing systems", "tools", |ctx| {
            field(ctx, Collection::Tools, "systems", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing systems property in tool(s) {}"),
        rule("IT008", "missing system host", "tools", |ctx| {
            field(ctx, Collection::Systems, "host", SPECIFICATION, Report::Pointer, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing host property in tool system(s) {}"),
        rule("IT009", "invalid system host", "tools", |ctx| {
            field(ctx, Collection::Systems, "host", SPECIFICATION, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Invalid host value in tool system(s) {}"),
        rule("IT010", "missing system url", "tools", |ctx| {
            field(ctx, Collection::Systems, "url", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing url property in tool system(s) {}"),
        rule("IT011", "invalid system url format", "tools", |ctx| {
            field(ctx, Collection::Systems, "url", SPECIFICATION, Report::Id, |r, p| {
                r.property_format_mismatch(p)
            })
        })
        .message("Invalid url format in tool system(s) {}"),
        rule("IT012", "dead system url", "tools", |ctx| {
            dead_links(ctx, Collection::Systems, "/url")
        })
        .message("Unable to load the archive url of tool system(s) {}")
        .warning(DEFAULT),
        rule("IT013", "missing system archiveFileName", "tools", |ctx| {
            field(ctx, Collection::Systems, "archiveFileName", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing archiveFileName property in tool system(s) {}"),
        rule("IT014", "missing system checksum", "tools", |ctx| {
            field(ctx, Collection::Systems, "checksum", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing checksum property in tool system(s) {}"),
        rule("IT015", "invalid system checksum", "tools", |ctx| {
            field(ctx, Collection::Systems, "checksum", SPECIFICATION, Report::Id, |r, p| {
                r.labelled_check_failed(p, "checksumFormat")
            })
        })
        .message("Invalid checksum format in tool system(s) {}. Must be ALGORITHM:HEXDIGEST."),
        rule("IT016", "discouraged system checksum algorithm", "tools", |ctx| {
            field(ctx, Collection::Systems, "checksum", ctx.compliance(), Report::Id, |r, p| {
                r.labelled_check_failed(p, "usesSHA256")
            })
        })
        .message("Tool system(s) {} use a discouraged checksum algorithm. SHA-256 is recommended.")
        .warning(DEFAULT)
        .error(STRICT),
        rule("IT017", "missing system size", "tools", |ctx| {
            field(ctx, Collection::Systems, "size", SPECIFICATION, Report::Id, |r, p| {
                r.required_property_missing(p)
            })
        })
        .message("Missing size property in tool system(s) {}"),
        rule("IT018", "invalid system size", "tools", |ctx| {
            field(ctx, Collection::Systems, "size", SPECIFICATION, Report::Id, |r, p| {
                r.property_pattern_mismatch(p)
            })
        })
        .message("Invalid size in tool system(s) {}. Must be the archive size in bytes."),
    ]
}

/// A package index that parsed as JSON.
struct Index<'a> {
    data: &'a PackageIndexData,
    validation: &'a ValidationResults,
}

impl<'a> Index<'a> {
    fn at(&self, level: ComplianceLevel) -> &'a ValidationResult {
        self.validation.get(level)
    }

    fn entries(&self, collection: Collection) -> &'a [IndexEntry] {
        self.data.collection(collection)
    }
}

fn with_index(ctx: &ProjectContext, check: impl FnOnce(&Index<'_>) -> RuleOutput) -> RuleOutput {
    let Some(data) = ctx.package_index() else {
        return RuleOutput::not_run(LOAD_ERROR);
    };
    match (data.loaded(), data.validation.as_ref()) {
        (Some(_), Some(validation)) => check(&Index { data, validation }),
        _ => RuleOutput::not_run(LOAD_ERROR),
    }
}

/// Runs `failed` against each element pointer of `collection`.
fn elements(
    ctx: &ProjectContext,
    collection: Collection,
    level: ComplianceLevel,
    failed: impl Fn(&ValidationResult, &str) -> bool,
) -> RuleOutput {
    with_index(ctx, |index| {
        let result = index.at(level);
        RuleOutput::fail_if_any(
            index
                .entries(collection)
                .iter()
                .filter(|entry| failed(result, &entry.pointer))
                .map(|entry| entry.id.as_str()),
        )
    })
}

/// Runs `failed` against the pointer of `path` below each element.
///
/// `path` is a relative pointer such as `help/online`.
fn field(
    ctx: &ProjectContext,
    collection: Collection,
    path: &str,
    level: ComplianceLevel,
    report: Report,
    failed: impl Fn(&ValidationResult, &str) -> bool,
) -> RuleOutput {
    with_index(ctx, |index| {
        let result = index.at(level);
        RuleOutput::fail_if_any(
            index
                .entries(collection)
                .iter()
                .filter(|entry| {
                    let target = path
                        .split('/')
                        .fold(entry.pointer.clone(), |acc, token| pointer::join(&acc, token));
                    failed(result, &target)
                })
                .map(|entry| match report {
                    Report::Id => entry.id.as_str(),
                    Report::Pointer => entry.pointer.as_str(),
                }),
        )
    })
}

/// Checks the URL at `url_pointer` of each element that has one.
fn dead_links(ctx: &ProjectContext, collection: Collection, url_pointer: &str) -> RuleOutput {
    with_index(ctx, |index| {
        let mut dead = Vec::new();
        for entry in index.entries(collection) {
            let Some(url) = entry
                .object
                .as_ref()
                .and_then(|o| o.pointer(url_pointer))
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
            else {
                continue;
            };
            if let Err(e) = ctx.http().check_url(url) {
                debug!(id = %entry.id, url, error = %e, "dead link");
                dead.push(entry.id.as_str());
            }
        }
        RuleOutput::fail_if_any(dead)
    })
}

// --- root ---

fn index_missing(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(ctx.package_index().is_some_and(|d| d.path.is_some()), "")
}

fn filename_invalid(ctx: &ProjectContext, official: bool) -> RuleOutput {
    let Some(path) = ctx.package_index().and_then(|d| d.path.as_deref()) else {
        return RuleOutput::not_run(NOT_FOUND);
    };
    RuleOutput::pass_if(has_valid_filename(path, official), file_name(path))
}

fn json_format(ctx: &ProjectContext) -> RuleOutput {
    let Some(data) = ctx.package_index().filter(|d| d.path.is_some()) else {
        return RuleOutput::not_run(NOT_FOUND);
    };
    match &data.document {
        Ok(_) => RuleOutput::pass(),
        Err(e) => RuleOutput::fail(e.as_str()),
    }
}

/// Fails when values have types no index reader could decode.
fn data_format(ctx: &ProjectContext) -> RuleOutput {
    let Some(data) = ctx.package_index().filter(|d| d.path.is_some()) else {
        return RuleOutput::not_run(NOT_FOUND);
    };
    let Some(validation) = data.validation.as_ref() else {
        return RuleOutput::not_run(LOAD_ERROR);
    };
    let mismatch = validation
        .get(PERMISSIVE)
        .failures()
        .iter()
        .find(|f| f.schema_path.ends_with("/type"));
    match mismatch {
        Some(f) if f.instance_path.is_empty() => RuleOutput::fail(f.message.as_str()),
        Some(f) => RuleOutput::fail(format!("{}: {}", f.instance_path, f.message)),
        None => RuleOutput::pass(),
    }
}

// --- platforms ---

fn third_party_category_invalid(ctx: &ProjectContext) -> RuleOutput {
    with_index(ctx, |index| {
        RuleOutput::fail_if_any(
            index
                .entries(Collection::Platforms)
                .iter()
                .filter(|entry| {
                    entry
                        .object
                        .as_ref()
                        .and_then(|o| o.get("category"))
                        .and_then(Value::as_str)
                        .is_some_and(|category| category != THIRD_PARTY_CATEGORY)
                })
                .map(|entry| entry.id.as_str()),
        )
    })
}
