//! `library.properties` rules (`LP`).
//!
//! Most field rules ask the schema validation results a single question at a
//! fixed compliance level. Rules comparing against the Library Manager index
//! or the git history of the project compute their verdicts directly.

use crate::helpers::{
    DEFAULT, INDEXED, LIBRARY_MANAGER, LIBRARY_MANAGER_FAQ_URL, LIBRARY_MANAGER_OR_STRICT,
    LIBRARY_SPEC_URL, OFFICIAL, STRICT, SUBMISSION,
};
use arduino_lint_core::fs::{file_name, files_in};
use arduino_lint_core::git;
use arduino_lint_core::library::{LibraryData, LibraryLayout, METADATA_FILENAME};
use arduino_lint_core::properties::{comma_separated_to_list, Properties};
use arduino_lint_core::schema::{ValidationResult, ValidationResults};
use arduino_lint_core::spell;
use arduino_lint_core::version::Version;
use arduino_lint_core::{
    ComplianceLevel, ProjectContext, ProjectKind, RuleDescriptor, RuleFn, RuleOutput,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

const LOAD_ERROR: &str = "Couldn't load library.properties";
const LEGACY: &str = "Library has legacy format";
const FIELD_NOT_PRESENT: &str = "Field not present";
const INDEX_ERROR: &str = "Unable to load Library Manager index";

const PERMISSIVE: ComplianceLevel = ComplianceLevel::Permissive;
const SPECIFICATION: ComplianceLevel = ComplianceLevel::Specification;
const STRICT_LEVEL: ComplianceLevel = ComplianceLevel::Strict;

static MISSPELLED_FILE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^librar((y)|(ie))s?[.-_]?propert((y)|(ie))s?$").ok()
});

static UNSAFE_NAME_CHARACTERS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_.-]").ok());

static DEPENDENCY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([^()]*?)\s*(\(.*\))?$").ok());

/// Architecture aliases and the true names that make them redundant.
const ARCHITECTURE_ALIASES: [(&str, &[&str]); 8] = [
    ("atmelavr", &["avr"]),
    ("atmelmegaavr", &["megaavr"]),
    ("atmelsam", &["sam", "samd"]),
    ("espressif32", &["esp32"]),
    ("espressif8266", &["esp8266"]),
    ("intel_arc32", &["arc32"]),
    ("nordicnrf52", &["nRF5", "nrf52", "mbed", "mbed_edge", "mbed_nano"]),
    ("raspberrypi", &["mbed_nano", "mbed_rp2040", "rp2040"]),
];

/// Architecture names in common use, in their correct case.
const COMMON_ARCHITECTURES: [&str; 22] = [
    "apollo3",
    "arc32",
    "avr",
    "esp32",
    "esp8266",
    "i586",
    "i686",
    "k210",
    "mbed",
    "mbed_edge",
    "mbed_nano",
    "mbed_portenta",
    "mbed_rp2040",
    "megaavr",
    "mraa",
    "nRF5",
    "nrf52",
    "pic32",
    "sam",
    "samd",
    "wiced",
    "win10",
];

/// Returns the `library.properties` rules in catalog order.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn rules() -> Vec<RuleDescriptor> {
    let rule = |id: &'static str, brief: &'static str, subcategory: &'static str, func: RuleFn| {
        RuleDescriptor::new(ProjectKind::Library, id, brief, func)
            .category("library.properties", subcategory)
            .reference(LIBRARY_SPEC_URL)
    };
    vec![
        rule("LP001", "missing library.properties", "general", metadata_missing)
            .message("library.properties not found. Library Manager and the Arduino IDE require it.")
            .warning(DEFAULT)
            .error(LIBRARY_MANAGER_OR_STRICT),
        rule("LP002", "incorrect library.properties file name", "general", misspelled_file_name)
            .message("Incorrectly spelled library.properties file name found: {}. The correct spelling is \"library.properties\"."),
        rule(
            "LP003",
            "incorrect library.properties file name case",
            "general",
            incorrect_file_name_case,
        )
        .message("Incorrect case of library.properties file name: {}. The file must be named \"library.properties\"."),
        rule("LP004", "invalid format", "general", format)
            .description("library.properties must be a valid key=value properties file.")
            .message("library.properties has an invalid format: {}"),
        rule("LP005", "missing name field", "name field", name_missing)
            .message("Missing required name field in library.properties"),
        rule("LP006", "name too short", "name field", name_too_short)
            .message("library.properties name value is less than the minimum length."),
        rule("LP007", "name too long", "name field", name_too_long)
            .message("library.properties name value {} is longer than the maximum length of 63 characters."),
        rule("LP008", "name longer than recommended", "name field", name_longer_than_recommended)
            .message("library.properties name value {} is longer than the recommended length of 16 characters.")
            .warning(DEFAULT),
        rule("LP009", "disallowed characters in name", "name field", name_disallowed_characters)
            .message("Disallowed characters in library.properties name value: {}. Only letters, numbers, spaces, dots, underscores and dashes are allowed."),
        rule("LP010", "name starts with \"Arduino\"", "name field", name_starts_with_arduino)
            .description("Library names starting with \"Arduino\" are reserved for official libraries.")
            .message("Library name {} starts with \"Arduino\". These names are reserved for official Arduino libraries.")
            .reference(LIBRARY_MANAGER_FAQ_URL)
            .disable(OFFICIAL)
            .warning(DEFAULT)
            .error(SUBMISSION),
        rule("LP011", "missing official prefix", "name field", name_missing_official_prefix)
            .message("Library name {} is missing the \"Arduino_\" prefix. All new official library names must use this prefix.")
            .disable(DEFAULT)
            .enable(OFFICIAL),
        rule("LP012", "name contains \"Arduino\"", "name field", name_contains_arduino)
            .message("Library name {} contains \"Arduino\". This is superfluous.")
            .disable(OFFICIAL)
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP013", "name has spaces", "name field", name_has_spaces)
            .message("Library name {} contains spaces. Although supported, underscores are recommended.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP014", "name contains \"library\"", "name field", name_contains_library)
            .message("Library name {} contains \"library\". This is superfluous.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP015", "duplicate name", "name field", name_duplicate)
            .description("A new submission must not reuse the name of a library already in Library Manager.")
            .message("Library name {} is in use by a library in the Library Manager index. Each library must have a unique name.")
            .reference(LIBRARY_MANAGER_FAQ_URL)
            .disable(DEFAULT)
            .enable(SUBMISSION),
        rule("LP016", "name not in index", "name field", name_not_in_index)
            .description("An update of an indexed library must keep the name it was indexed under.")
            .message("Library name {} not found in the Library Manager index. Library names are not allowed to change after being added to the index.")
            .reference(LIBRARY_MANAGER_FAQ_URL)
            .disable(DEFAULT)
            .enable(INDEXED),
        rule("LP017", "name header mismatch", "name field", name_header_mismatch)
            .description("The Library Manager installation folder is named after the sanitized library name; a matching header makes the library discoverable.")
            .message("No header file found matching library name. Best practices are for primary header filename to match library name: {}")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP018", "missing version field", "version field", version_missing)
            .message("Missing required version field in library.properties"),
        rule("LP019", "invalid version", "version field", version_not_relaxed_semver)
            .message("library.properties version value {} is not compliant with the relaxed semver specification."),
        rule("LP020", "non-semver version", "version field", version_not_semver)
            .message("library.properties version value {} is not compliant with the semver specification.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP021", "tag mismatch", "version field", version_behind_tag)
            .description("Library Manager only indexes a release whose version is newer than the previous release.")
            .message("The latest Git tag appears to be greater than the library.properties version value: {}. You must update the version value before making the tag.")
            .reference(LIBRARY_MANAGER_FAQ_URL)
            .warning(DEFAULT)
            .error(INDEXED),
        rule("LP022", "missing author field", "author field", author_missing)
            .message("Missing required author field in library.properties"),
        rule("LP023", "author too short", "author field", author_too_short)
            .message("library.properties author value is less than the minimum length."),
        rule("LP024", "missing maintainer field", "maintainer field", maintainer_missing)
            .message("Missing required maintainer field in library.properties"),
        rule("LP025", "maintainer too short", "maintainer field", maintainer_too_short)
            .message("library.properties maintainer value is less than the minimum length."),
        rule(
            "LP026",
            "maintainer starts with \"Arduino\"",
            "maintainer field",
            maintainer_starts_with_arduino,
        )
        .message("library.properties maintainer value {} starts with \"Arduino\". 3rd party libraries are not maintained by Arduino.")
        .disable(OFFICIAL)
        .warning(DEFAULT)
        .error(SUBMISSION),
        rule("LP027", "use of email field", "email field", email_as_maintainer_alias)
            .message("Use of undocumented email field in library.properties. Please use the maintainer field instead.")
            .warning(DEFAULT),
        rule("LP028", "email too short", "email field", email_too_short)
            .message("library.properties email value is less than the minimum length."),
        rule("LP029", "email starts with \"Arduino\"", "email field", email_starts_with_arduino)
            .message("library.properties email value {} starts with \"Arduino\". 3rd party libraries are not maintained by Arduino.")
            .disable(OFFICIAL)
            .warning(DEFAULT),
        rule("LP030", "missing sentence field", "sentence field", sentence_missing)
            .message("Missing required sentence field in library.properties"),
        rule("LP031", "sentence too short", "sentence field", sentence_too_short)
            .message("library.properties sentence value is less than the minimum length."),
        rule("LP032", "sentence spell check", "sentence field", sentence_misspelled)
            .message("A commonly misspelled word was found in the library.properties sentence field. Suggested correction: {}")
            .warning(DEFAULT),
        rule("LP033", "missing paragraph field", "paragraph field", paragraph_missing)
            .message("Missing required paragraph field in library.properties"),
        rule("LP034", "paragraph spell check", "paragraph field", paragraph_misspelled)
            .message("A commonly misspelled word was found in the library.properties paragraph field. Suggested correction: {}")
            .warning(DEFAULT),
        rule("LP035", "paragraph repeats sentence", "paragraph field", paragraph_repeats_sentence)
            .description("The Library Manager listing shows the paragraph right after the sentence.")
            .message("The library.properties paragraph field repeats the sentence field. These are displayed together so redundancy is not needed.")
            .warning(DEFAULT),
        rule("LP036", "missing category field", "category field", category_missing)
            .message("Missing category field in library.properties. The library will be listed as Uncategorized.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP037", "invalid category", "category field", category_invalid)
            .message("Invalid category field value {} in library.properties. The library will be listed as Uncategorized.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP038", "\"Uncategorized\" category", "category field", category_uncategorized)
            .message("Use of category value Uncategorized. Please use a more specific category.")
            .warning(DEFAULT),
        rule("LP039", "missing url field", "url field", url_missing)
            .message("Missing required url field in library.properties"),
        rule("LP040", "url too short", "url field", url_too_short)
            .message("library.properties url value is less than the minimum length.")
            .compliance(&[ComplianceLevel::Permissive]),
        rule("LP041", "invalid url format", "url field", url_invalid)
            .message("library.properties url value {} does not have a valid URL format."),
        rule("LP042", "dead url", "url field", url_dead)
            .message("Unable to load the library.properties url: {}")
            .warning(DEFAULT),
        rule("LP043", "missing architectures field", "architectures field", architectures_missing)
            .message("Missing architectures field in library.properties. Defaults to * (all architectures).")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP044", "architectures too short", "architectures field", architectures_too_short)
            .message("library.properties architectures value is less than the minimum length."),
        rule("LP045", "architecture alias", "architectures field", architectures_solo_alias)
            .message("Alias architecture names in library.properties architectures field without the true name: {}. Use the true architecture name as well for compatibility with the Arduino tools.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LP046", "miscased architecture", "architectures field", architectures_incorrect_case)
            .message("Incorrect case of common architecture names in library.properties architectures field: {}. Architecture names are case sensitive.")
            .warning(DEFAULT)
            .error(STRICT),
        rule(
            "LP047",
            "disallowed characters in depends",
            "depends field",
            depends_disallowed_characters,
        )
        .message("Disallowed characters in library.properties depends value: {}"),
        rule("LP048", "depends not in index", "depends field", depends_not_in_index)
            .message("library.properties depends field item(s) {} not found in the Library Manager index.")
            .warning(DEFAULT)
            .error(LIBRARY_MANAGER),
        rule("LP049", "invalid dot_a_linkage", "dot_a_linkage field", dot_a_linkage_invalid)
            .message("Invalid library.properties dot_a_linkage value: {}. Must be true or false."),
        rule(
            "LP050",
            "dot_a_linkage with flat layout",
            "dot_a_linkage field",
            dot_a_linkage_with_flat_layout,
        )
        .message("library.properties dot_a_linkage field enabled but library is not in recursive layout."),
        rule("LP051", "includes too short", "includes field", includes_too_short)
            .message("library.properties includes value is less than the minimum length."),
        rule("LP052", "includes file not found", "includes field", includes_item_not_found)
            .message("library.properties includes field item(s) {} not found in the library.")
            .warning(DEFAULT),
        rule("LP053", "invalid precompiled", "precompiled field", precompiled_invalid)
            .message("Invalid library.properties precompiled value: {}. Must be true, full or false."),
        rule(
            "LP054",
            "precompiled with flat layout",
            "precompiled field",
            precompiled_with_flat_layout,
        )
        .message("library.properties precompiled value {} enabled but library is not in recursive layout."),
        rule("LP055", "ldflags too short", "ldflags field", ldflags_too_short)
            .message("library.properties ldflags value is less than the minimum length."),
        rule("LP056", "misspelled field name", "general", misspelled_optional_field)
            .message("Potentially misspelled library.properties field name detected.")
            .warning(DEFAULT)
            .error(STRICT),
    ]
}

/// The loaded metadata of a library with a readable `library.properties`.
struct Metadata<'a> {
    library: &'a LibraryData,
    properties: &'a Properties,
    validation: &'a ValidationResults,
}

impl<'a> Metadata<'a> {
    fn get(ctx: &'a ProjectContext) -> Result<Self, RuleOutput> {
        let Some(library) = ctx.library() else {
            return Err(RuleOutput::not_run(LOAD_ERROR));
        };
        if library.is_legacy() {
            return Err(RuleOutput::skip(LEGACY));
        }
        match (library.loaded(), library.validation.as_ref()) {
            (Some(properties), Some(validation)) => Ok(Self {
                library,
                properties,
                validation,
            }),
            _ => Err(RuleOutput::not_run(LOAD_ERROR)),
        }
    }

    fn field(&self, key: &str) -> Option<&'a str> {
        self.properties.get(key)
    }

    fn at(&self, level: ComplianceLevel) -> &'a ValidationResult {
        self.validation.get(level)
    }
}

/// What a value rule reports when its field is absent.
#[derive(Clone, Copy)]
enum Absent {
    NotRun,
    Skip,
}

fn with_metadata(
    ctx: &ProjectContext,
    check: impl FnOnce(&Metadata<'_>) -> RuleOutput,
) -> RuleOutput {
    match Metadata::get(ctx) {
        Ok(metadata) => check(&metadata),
        Err(out) => out,
    }
}

fn with_field(
    ctx: &ProjectContext,
    field: &str,
    absent: Absent,
    check: impl FnOnce(&Metadata<'_>, &str) -> RuleOutput,
) -> RuleOutput {
    with_metadata(ctx, |metadata| match metadata.field(field) {
        Some(value) => check(metadata, value),
        None => match absent {
            Absent::NotRun => RuleOutput::not_run(FIELD_NOT_PRESENT),
            Absent::Skip => RuleOutput::skip(FIELD_NOT_PRESENT),
        },
    })
}

fn pointer(field: &str) -> String {
    arduino_lint_core::pointer::join("", field)
}

fn required_field_missing(ctx: &ProjectContext, field: &str, level: ComplianceLevel) -> RuleOutput {
    with_metadata(ctx, |m| {
        RuleOutput::pass_if(!m.at(level).required_property_missing(&pointer(field)), "")
    })
}

fn field_too_short(
    ctx: &ProjectContext,
    field: &str,
    absent: Absent,
    level: ComplianceLevel,
) -> RuleOutput {
    with_field(ctx, field, absent, |m, _| {
        RuleOutput::pass_if(!m.at(level).property_less_than_min_length(&pointer(field)), "")
    })
}

fn labelled_value_check(
    ctx: &ProjectContext,
    field: &str,
    label: &str,
    level: ComplianceLevel,
) -> RuleOutput {
    with_field(ctx, field, Absent::NotRun, |m, value| {
        RuleOutput::pass_if(!m.at(level).labelled_check_failed(&pointer(field), label), value)
    })
}

fn spell_check(ctx: &ProjectContext, field: &str) -> RuleOutput {
    with_field(ctx, field, Absent::Skip, |_, value| match spell::check(value) {
        Some(corrected) => RuleOutput::fail(corrected),
        None => RuleOutput::pass(),
    })
}

// --- general ---

fn metadata_missing(ctx: &ProjectContext) -> RuleOutput {
    match ctx.library() {
        Some(library) => RuleOutput::pass_if(!library.is_legacy(), ""),
        None => RuleOutput::not_run(LOAD_ERROR),
    }
}

fn misspelled_file_name(ctx: &ProjectContext) -> RuleOutput {
    let Some(re) = MISSPELLED_FILE_NAME.as_ref() else {
        return RuleOutput::pass();
    };
    let files = files_in(ctx.path());
    if files.iter().any(|f| file_name(f) == METADATA_FILENAME) {
        return RuleOutput::pass();
    }
    match files.iter().map(|f| file_name(f)).find(|name| re.is_match(name)) {
        Some(name) => RuleOutput::fail(name),
        None => RuleOutput::pass(),
    }
}

fn incorrect_file_name_case(ctx: &ProjectContext) -> RuleOutput {
    match crate::helpers::incorrect_case(&files_in(ctx.path()), METADATA_FILENAME) {
        Some(path) => RuleOutput::fail(file_name(&path)),
        None => RuleOutput::pass(),
    }
}

fn format(ctx: &ProjectContext) -> RuleOutput {
    let Some(library) = ctx.library() else {
        return RuleOutput::not_run(LOAD_ERROR);
    };
    if library.is_legacy() {
        return RuleOutput::skip("Library has no library.properties");
    }
    match library.load_error() {
        Some(error) => RuleOutput::fail(error),
        None => RuleOutput::pass(),
    }
}

fn misspelled_optional_field(ctx: &ProjectContext) -> RuleOutput {
    with_metadata(ctx, |m| {
        RuleOutput::pass_if(!m.at(STRICT_LEVEL).misspelled_optional_property_found(), "")
    })
}

// --- name ---

fn name_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "name", SPECIFICATION)
}

fn name_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "name", Absent::NotRun, SPECIFICATION)
}

fn name_too_long(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "name", Absent::NotRun, |m, value| {
        RuleOutput::pass_if(
            !m.at(SPECIFICATION).property_greater_than_max_length("/name"),
            value,
        )
    })
}

fn name_longer_than_recommended(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "name", Absent::NotRun, |m, value| {
        RuleOutput::pass_if(
            !m.at(STRICT_LEVEL).property_greater_than_max_length("/name"),
            value,
        )
    })
}

fn name_disallowed_characters(ctx: &ProjectContext) -> RuleOutput {
    labelled_value_check(ctx, "name", "allowedCharacters", SPECIFICATION)
}

fn name_starts_with_arduino(ctx: &ProjectContext) -> RuleOutput {
    labelled_value_check(ctx, "name", "notStartsWithArduino", SPECIFICATION)
}

fn name_missing_official_prefix(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "name", Absent::NotRun, |_, value| {
        RuleOutput::pass_if(value.starts_with("Arduino_"), value)
    })
}

fn name_contains_arduino(ctx: &ProjectContext) -> RuleOutput {
    labelled_value_check(ctx, "name", "notContainsArduino", ctx.compliance())
}

fn name_has_spaces(ctx: &ProjectContext) -> RuleOutput {
    labelled_value_check(ctx, "name", "notContainsSpaces", ctx.compliance())
}

fn name_contains_library(ctx: &ProjectContext) -> RuleOutput {
    labelled_value_check(ctx, "name", "notContainsSuperfluousTerms", ctx.compliance())
}

fn name_duplicate(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "name", Absent::NotRun, |_, value| match ctx.library_index() {
        Some(index) => RuleOutput::pass_if(!index.contains(value), value),
        None => RuleOutput::not_run(INDEX_ERROR),
    })
}

fn name_not_in_index(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "name", Absent::NotRun, |_, value| match ctx.library_index() {
        Some(index) => RuleOutput::pass_if(index.contains(value), value),
        None => RuleOutput::not_run(INDEX_ERROR),
    })
}

/// The installation folder name Library Manager derives from a library name.
fn sanitize_name(name: &str) -> String {
    match UNSAFE_NAME_CHARACTERS.as_ref() {
        Some(re) => re.replace_all(name, "_").into_owned(),
        None => name.to_string(),
    }
}

fn name_header_mismatch(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "name", Absent::NotRun, |m, value| {
        let sanitized = sanitize_name(value);
        let matched = m.library.source_headers.iter().any(|header| {
            std::path::Path::new(header)
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy() == sanitized)
        });
        RuleOutput::pass_if(matched, format!("{sanitized}.h"))
    })
}

// --- version ---

fn version_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "version", SPECIFICATION)
}

fn version_not_relaxed_semver(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "version", Absent::NotRun, |m, value| {
        RuleOutput::pass_if(!m.at(SPECIFICATION).property_pattern_mismatch("/version"), value)
    })
}

fn version_not_semver(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "version", Absent::NotRun, |m, value| {
        RuleOutput::pass_if(!m.at(STRICT_LEVEL).property_pattern_mismatch("/version"), value)
    })
}

fn version_behind_tag(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "version", Absent::NotRun, |_, value| {
        let Some(version) = Version::parse_relaxed(value) else {
            return RuleOutput::not_run("Can't parse version value");
        };
        let path = ctx.path();
        if !git::is_repository(path) {
            return RuleOutput::skip("Project path is not a repository");
        }
        let history = git::commits_from_head(path).and_then(|c| Ok((c, git::tags(path)?)));
        let (commits, tags) = match history {
            Ok(history) => history,
            Err(e) => {
                warn!("Unable to read repository history of {}: {e}", path.display());
                return RuleOutput::not_run(format!("Unable to read repository history: {e}"));
            }
        };

        for commit in &commits {
            for tag in tags.iter().filter(|t| &t.commit == commit) {
                let name = tag.name.strip_prefix('v').unwrap_or(&tag.name);
                let Some(tag_version) = Version::parse_relaxed(name) else {
                    trace!("Ignoring tag {} with unparsable name", tag.name);
                    continue;
                };
                if tag_version > version {
                    if tag_version.is_prerelease() {
                        continue;
                    }
                    return RuleOutput::fail(format!("{name} vs {value}"));
                }
                return RuleOutput::pass();
            }
        }
        RuleOutput::pass()
    })
}

// --- author and maintainer ---

fn author_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "author", SPECIFICATION)
}

fn author_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "author", Absent::NotRun, SPECIFICATION)
}

fn maintainer_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "maintainer", SPECIFICATION)
}

fn maintainer_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "maintainer", Absent::NotRun, SPECIFICATION)
}

fn maintainer_starts_with_arduino(ctx: &ProjectContext) -> RuleOutput {
    labelled_value_check(ctx, "maintainer", "notStartsWithArduino", SPECIFICATION)
}

fn email_as_maintainer_alias(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "email", Absent::Skip, |m, _| {
        RuleOutput::pass_if(m.field("maintainer").is_some(), "")
    })
}

fn email_too_short(ctx: &ProjectContext) -> RuleOutput {
    with_metadata(ctx, |m| {
        if m.field("maintainer").is_some() || m.field("email").is_none() {
            return RuleOutput::skip(FIELD_NOT_PRESENT);
        }
        RuleOutput::pass_if(!m.at(SPECIFICATION).property_less_than_min_length("/email"), "")
    })
}

fn email_starts_with_arduino(ctx: &ProjectContext) -> RuleOutput {
    with_metadata(ctx, |m| {
        if m.field("maintainer").is_some() {
            return RuleOutput::skip("No email alias field");
        }
        let Some(email) = m.field("email") else {
            return RuleOutput::skip(FIELD_NOT_PRESENT);
        };
        RuleOutput::pass_if(
            !m.at(SPECIFICATION).labelled_check_failed("/email", "notStartsWithArduino"),
            email,
        )
    })
}

// --- sentence and paragraph ---

fn sentence_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "sentence", SPECIFICATION)
}

fn sentence_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "sentence", Absent::NotRun, SPECIFICATION)
}

fn sentence_misspelled(ctx: &ProjectContext) -> RuleOutput {
    spell_check(ctx, "sentence")
}

fn paragraph_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "paragraph", SPECIFICATION)
}

fn paragraph_misspelled(ctx: &ProjectContext) -> RuleOutput {
    spell_check(ctx, "paragraph")
}

fn paragraph_repeats_sentence(ctx: &ProjectContext) -> RuleOutput {
    with_metadata(ctx, |m| match (m.field("sentence"), m.field("paragraph")) {
        (Some(sentence), Some(paragraph)) => {
            RuleOutput::pass_if(!paragraph.starts_with(sentence), "")
        }
        _ => RuleOutput::not_run(FIELD_NOT_PRESENT),
    })
}

// --- category ---

fn category_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "category", STRICT_LEVEL)
}

fn category_invalid(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "category", Absent::Skip, |m, value| {
        RuleOutput::pass_if(!m.at(SPECIFICATION).property_enum_mismatch("/category"), value)
    })
}

fn category_uncategorized(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "category", Absent::Skip, |_, value| {
        RuleOutput::pass_if(value != "Uncategorized", value)
    })
}

// --- url ---

fn url_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "url", SPECIFICATION)
}

fn url_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "url", Absent::NotRun, PERMISSIVE)
}

fn url_invalid(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "url", Absent::NotRun, |m, value| {
        RuleOutput::pass_if(!m.at(SPECIFICATION).property_format_mismatch("/url"), value)
    })
}

fn url_dead(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "url", Absent::NotRun, |_, value| {
        debug!("Checking library URL {value}");
        match ctx.http().check_url(value) {
            Ok(()) => RuleOutput::pass(),
            Err(e) => RuleOutput::fail(e),
        }
    })
}

// --- architectures ---

fn architectures_missing(ctx: &ProjectContext) -> RuleOutput {
    required_field_missing(ctx, "architectures", STRICT_LEVEL)
}

fn architectures_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "architectures", Absent::Skip, SPECIFICATION)
}

fn architectures_solo_alias(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "architectures", Absent::Skip, |_, value| {
        let architectures = comma_separated_to_list(&value.to_lowercase());
        let present = |names: &[&str]| {
            names
                .iter()
                .any(|name| architectures.iter().any(|a| a.eq_ignore_ascii_case(name)))
        };
        RuleOutput::fail_if_any(architectures.iter().filter(|a| {
            ARCHITECTURE_ALIASES
                .iter()
                .any(|(alias, true_names)| *alias == a.as_str() && !present(true_names))
        }))
    })
}

fn architectures_incorrect_case(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "architectures", Absent::Skip, |_, value| {
        let architectures = comma_separated_to_list(value);
        let miscased = architectures.iter().filter(|a| {
            COMMON_ARCHITECTURES.iter().any(|common| {
                a.as_str() != *common
                    && a.eq_ignore_ascii_case(common)
                    && !architectures.iter().any(|other| other.as_str() == *common)
            })
        });
        RuleOutput::fail_if_any(miscased)
    })
}

// --- depends ---

fn depends_disallowed_characters(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "depends", Absent::Skip, |m, value| {
        RuleOutput::pass_if(!m.at(SPECIFICATION).property_pattern_mismatch("/depends"), value)
    })
}

/// The library name of a `depends` item, without its version constraint.
fn dependency_name(item: &str) -> &str {
    DEPENDENCY
        .as_ref()
        .and_then(|re| re.captures(item))
        .and_then(|caps| caps.get(1))
        .map_or(item, |m| m.as_str().trim())
}

fn depends_not_in_index(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "depends", Absent::Skip, |_, value| {
        let Some(index) = ctx.library_index() else {
            return RuleOutput::not_run(INDEX_ERROR);
        };
        let items = comma_separated_to_list(value);
        RuleOutput::fail_if_any(
            items
                .iter()
                .map(|item| dependency_name(item))
                .filter(|name| !name.is_empty())
                .filter(|name| {
                    trace!("Checking if dependency {name} is in index");
                    !index.contains(name)
                }),
        )
    })
}

// --- dot_a_linkage, includes, precompiled, ldflags ---

fn dot_a_linkage_invalid(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "dot_a_linkage", Absent::Skip, |m, value| {
        RuleOutput::pass_if(
            !m.at(SPECIFICATION).property_enum_mismatch("/dot_a_linkage"),
            value,
        )
    })
}

fn dot_a_linkage_with_flat_layout(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "dot_a_linkage", Absent::Skip, |m, _| {
        RuleOutput::pass_if(
            !(m.library.dot_a_linkage() && m.library.layout == LibraryLayout::Flat),
            "",
        )
    })
}

fn includes_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "includes", Absent::Skip, SPECIFICATION)
}

fn includes_item_not_found(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "includes", Absent::Skip, |m, value| {
        RuleOutput::fail_if_any(
            comma_separated_to_list(value)
                .into_iter()
                .filter(|include| !m.library.source_headers.contains(include)),
        )
    })
}

fn precompiled_invalid(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "precompiled", Absent::Skip, |m, value| {
        RuleOutput::pass_if(!m.at(SPECIFICATION).property_enum_mismatch("/precompiled"), value)
    })
}

fn precompiled_with_flat_layout(ctx: &ProjectContext) -> RuleOutput {
    with_field(ctx, "precompiled", Absent::Skip, |m, value| {
        RuleOutput::pass_if(
            !(m.library.precompiled() && m.library.layout == LibraryLayout::Flat),
            value,
        )
    })
}

fn ldflags_too_short(ctx: &ProjectContext) -> RuleOutput {
    field_too_short(ctx, "ldflags", Absent::Skip, SPECIFICATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, git, git_available, offline, run, with_index, write_tree};
    use arduino_lint_core::{LibraryManagerMode, ModeSettings, RuleVerdict, Services};
    use httpmock::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const INDEX: &str = r#"{"libraries": [
        {"name": "Servo", "version": "1.1.8"},
        {"name": "Adafruit GFX Library", "version": "1.11.9"}
    ]}"#;

    fn properties(overrides: &[(&str, &str)], removed: &[&str]) -> String {
        let mut props = Properties::parse(
            "name=Foo\nversion=1.0.0\nauthor=Jane\nmaintainer=Jane <jane@example.com>\n\
             sentence=Does foo.\nparagraph=Handles every foo.\ncategory=Other\n\
             url=https://example.com/foo\narchitectures=*\n",
        )
        .unwrap();
        for key in removed {
            props.remove(key);
        }
        for (key, value) in overrides {
            props.set(*key, *value);
        }
        props.to_text()
    }

    fn library(props: &str, extra: &[(&str, &str)]) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("Foo");
        std::fs::create_dir(&root).unwrap();
        write_tree(&root, &[("library.properties", props), ("src/Foo.h", "")]);
        write_tree(&root, extra);
        (tmp, root)
    }

    fn check_with(id: &str, root: &Path, settings: ModeSettings, services: Services) -> RuleOutput {
        let ctx = context(ProjectKind::Library, root, settings, services);
        run(id, &ctx)
    }

    fn check(id: &str, root: &Path) -> RuleOutput {
        check_with(id, root, ModeSettings::default(), offline())
    }

    fn at(level: ComplianceLevel) -> ModeSettings {
        ModeSettings {
            compliance: Some(level),
            ..ModeSettings::default()
        }
    }

    // --- general tests ---

    #[test]
    fn legacy_library() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("Foo.h", "")]);
        assert_eq!(check("LP001", tmp.path()).verdict, RuleVerdict::Fail);
        assert_eq!(check("LP004", tmp.path()).verdict, RuleVerdict::Skip);
        assert_eq!(check("LP005", tmp.path()).context, LEGACY);
    }

    #[test]
    fn malformed_properties_surface_load_error() {
        let (_tmp, root) = library("name=Foo\nthis line is broken\n", &[]);
        let out = check("LP004", &root);
        assert_eq!(out.verdict, RuleVerdict::Fail);
        assert!(!out.context.is_empty());

        let field = check("LP005", &root);
        assert_eq!(field.verdict, RuleVerdict::NotRun);
        assert_eq!(field.context, LOAD_ERROR);
    }

    #[test]
    fn misspelled_and_miscased_file_names() {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), &[("Foo.h", ""), ("libraries.properties", "")]);
        assert_eq!(check("LP002", tmp.path()).context, "libraries.properties");

        let other = TempDir::new().unwrap();
        write_tree(other.path(), &[("Foo.h", ""), ("Library.Properties", "")]);
        assert_eq!(check("LP003", other.path()).context, "Library.Properties");
    }

    #[test]
    fn complete_properties_pass_field_rules() {
        let (_tmp, root) = library(&properties(&[], &[]), &[]);
        for id in [
            "LP005", "LP006", "LP007", "LP009", "LP010", "LP013", "LP017", "LP018", "LP019",
            "LP020", "LP024", "LP037", "LP041", "LP056",
        ] {
            assert_eq!(check(id, &root).verdict, RuleVerdict::Pass, "{id}");
        }
    }

    // --- name tests ---

    #[test]
    fn name_with_spaces_fails_only_at_strict() {
        let (_tmp, root) = library(&properties(&[("name", "Foo Bar")], &[]), &[]);
        let strict = check_with("LP013", &root, at(ComplianceLevel::Strict), offline());
        assert_eq!(strict.verdict, RuleVerdict::Fail);
        assert_eq!(strict.context, "Foo Bar");

        let spec = check_with("LP013", &root, at(ComplianceLevel::Specification), offline());
        assert_eq!(spec.verdict, RuleVerdict::Pass);
    }

    #[test]
    fn name_missing_and_empty() {
        let (_tmp, root) = library(&properties(&[], &["name"]), &[]);
        assert_eq!(check("LP005", &root).verdict, RuleVerdict::Fail);
        assert_eq!(check("LP006", &root).verdict, RuleVerdict::NotRun);

        let (_tmp2, root2) = library(&properties(&[("name", "")], &[]), &[]);
        assert_eq!(check("LP006", &root2).verdict, RuleVerdict::Fail);
    }

    #[test]
    fn reserved_and_official_names() {
        let (_tmp, root) = library(&properties(&[("name", "ArduinoFoo")], &[]), &[]);
        assert_eq!(check("LP010", &root).context, "ArduinoFoo");
        assert_eq!(check("LP011", &root).context, "ArduinoFoo");

        let (_tmp2, root2) = library(&properties(&[("name", "Arduino_Foo")], &[]), &[]);
        assert_eq!(check("LP011", &root2).verdict, RuleVerdict::Pass);
    }

    #[test]
    fn header_must_match_sanitized_name() {
        let (_tmp, root) = library(&properties(&[("name", "Foo Bar")], &[]), &[]);
        let out = check("LP017", &root);
        assert_eq!(out.verdict, RuleVerdict::Fail);
        assert_eq!(out.context, "Foo_Bar.h");

        let (_tmp2, root2) = library(&properties(&[("name", "Foo Bar")], &[]), &[("src/Foo_Bar.h", "")]);
        assert_eq!(check("LP017", &root2).verdict, RuleVerdict::Pass);
    }

    #[test]
    fn index_lookups() {
        let (_tmp, root) = library(&properties(&[("name", "Servo")], &[]), &[]);
        let duplicate = check_with("LP015", &root, ModeSettings::default(), with_index(INDEX));
        assert_eq!(duplicate.verdict, RuleVerdict::Fail);
        assert_eq!(duplicate.context, "Servo");

        let update = ModeSettings {
            library_manager: Some(LibraryManagerMode::Update),
            ..ModeSettings::default()
        };
        let indexed = check_with("LP016", &root, update, with_index(INDEX));
        assert_eq!(indexed.verdict, RuleVerdict::Pass);

        let unavailable = check("LP015", &root);
        assert_eq!(unavailable.verdict, RuleVerdict::NotRun);
        assert_eq!(unavailable.context, INDEX_ERROR);
    }

    // --- version tests ---

    #[test]
    fn version_patterns() {
        let (_tmp, root) = library(&properties(&[("version", "1.0")], &[]), &[]);
        assert_eq!(check("LP019", &root).verdict, RuleVerdict::Pass);
        assert_eq!(check("LP020", &root).context, "1.0");

        let (_tmp2, root2) = library(&properties(&[("version", "latest")], &[]), &[]);
        assert_eq!(check("LP019", &root2).context, "latest");
    }

    #[test]
    fn version_behind_tag_outside_repository_skips() {
        let (_tmp, root) = library(&properties(&[], &[]), &[]);
        assert_eq!(check("LP021", &root).verdict, RuleVerdict::Skip);
    }

    #[test]
    fn version_behind_annotated_tag() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }
        let (_tmp, root) = library(&properties(&[("version", "1.0.0")], &[]), &[]);
        git(&root, &["init", "--quiet"]);
        git(&root, &["add", "."]);
        git(&root, &["commit", "--quiet", "-m", "Initial commit"]);
        git(&root, &["tag", "-a", "v1.0.1", "-m", "Release 1.0.1"]);

        let out = check("LP021", &root);
        assert_eq!(out.verdict, RuleVerdict::Fail);
        assert_eq!(out.context, "1.0.1 vs 1.0.0");
    }

    #[test]
    fn prerelease_and_older_tags_pass() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }
        let (_tmp, root) = library(&properties(&[("version", "1.0.0")], &[]), &[]);
        git(&root, &["init", "--quiet"]);
        git(&root, &["add", "."]);
        git(&root, &["commit", "--quiet", "-m", "Initial commit"]);
        git(&root, &["tag", "0.9.0"]);
        git(&root, &["tag", "2.0.0-rc.1"]);

        assert_eq!(check("LP021", &root).verdict, RuleVerdict::Pass);
    }

    // --- maintainer and email tests ---

    #[test]
    fn email_alias_rules() {
        let (_tmp, root) = library(
            &properties(&[("email", "Arduino <info@example.com>")], &["maintainer"]),
            &[],
        );
        assert_eq!(check("LP027", &root).verdict, RuleVerdict::Fail);
        assert_eq!(check("LP028", &root).verdict, RuleVerdict::Pass);
        assert_eq!(check("LP029", &root).context, "Arduino <info@example.com>");

        let (_tmp2, root2) = library(&properties(&[], &[]), &[]);
        assert_eq!(check("LP027", &root2).verdict, RuleVerdict::Skip);
        assert_eq!(check("LP029", &root2).context, "No email alias field");
    }

    // --- sentence and paragraph tests ---

    #[test]
    fn spell_check_reports_correction() {
        let (_tmp, root) = library(&properties(&[("sentence", "A libary for foo.")], &[]), &[]);
        let out = check("LP032", &root);
        assert_eq!(out.verdict, RuleVerdict::Fail);
        assert_eq!(out.context, "A library for foo.");
    }

    #[test]
    fn paragraph_repeating_sentence() {
        let (_tmp, root) = library(
            &properties(&[("paragraph", "Does foo. And also bar.")], &[]),
            &[],
        );
        assert_eq!(check("LP035", &root).verdict, RuleVerdict::Fail);
    }

    // --- category and url tests ---

    #[test]
    fn category_values() {
        let (_tmp, root) = library(&properties(&[("category", "Sensor")], &[]), &[]);
        assert_eq!(check("LP037", &root).context, "Sensor");

        let (_tmp2, root2) = library(&properties(&[("category", "Uncategorized")], &[]), &[]);
        assert_eq!(check("LP037", &root2).verdict, RuleVerdict::Pass);
        assert_eq!(check("LP038", &root2).verdict, RuleVerdict::Fail);
    }

    #[test]
    fn dead_url_reports_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("HEAD").path("/foo");
            then.status(404);
        });
        let url = server.url("/foo");
        let (_tmp, root) = library(&properties(&[("url", url.as_str())], &[]), &[]);

        let out = check("LP042", &root);
        assert_eq!(out.verdict, RuleVerdict::Fail);
        assert!(out.context.contains("404"), "{}", out.context);
    }

    #[test]
    fn live_url_passes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("HEAD").path("/foo");
            then.status(200);
        });
        let url = server.url("/foo");
        let (_tmp, root) = library(&properties(&[("url", url.as_str())], &[]), &[]);
        assert_eq!(check("LP042", &root).verdict, RuleVerdict::Pass);
    }

    // --- architectures tests ---

    #[test]
    fn architecture_aliases_and_case() {
        let (_tmp, root) = library(
            &properties(&[("architectures", "atmelavr, espressif32, esp32, AVR")], &[]),
            &[],
        );
        assert_eq!(check("LP045", &root).verdict, RuleVerdict::Pass);
        assert_eq!(check("LP046", &root).context, "AVR");

        let (_tmp2, root2) = library(&properties(&[("architectures", "atmelsam")], &[]), &[]);
        assert_eq!(check("LP045", &root2).context, "atmelsam");
    }

    // --- depends tests ---

    #[test]
    fn dependencies_checked_against_index() {
        let (_tmp, root) = library(
            &properties(&[("depends", "Servo (>=1.1.0), Adafruit GFX Library, NoSuchLib")], &[]),
            &[],
        );
        let out = check_with("LP048", &root, ModeSettings::default(), with_index(INDEX));
        assert_eq!(out.verdict, RuleVerdict::Fail);
        assert_eq!(out.context, "NoSuchLib");
        assert_eq!(check("LP047", &root).verdict, RuleVerdict::Pass);
    }

    #[test]
    fn dependency_names_drop_constraints() {
        assert_eq!(dependency_name("Servo (>=1.1.0)"), "Servo");
        assert_eq!(dependency_name("Adafruit GFX Library"), "Adafruit GFX Library");
    }

    // --- layout-dependent field tests ---

    #[test]
    fn flat_layout_conflicts() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                (
                    "library.properties",
                    &properties(&[("dot_a_linkage", "true"), ("precompiled", "full")], &[]),
                ),
                ("Foo.h", ""),
            ],
        );
        assert_eq!(check("LP050", tmp.path()).verdict, RuleVerdict::Fail);
        assert_eq!(check("LP054", tmp.path()).context, "full");
    }

    #[test]
    fn includes_must_exist() {
        let (_tmp, root) = library(&properties(&[("includes", "Foo.h, Missing.h")], &[]), &[]);
        assert_eq!(check("LP052", &root).context, "Missing.h");
    }

    #[test]
    fn misspelled_optional_field_name() {
        let (_tmp, root) = library(&properties(&[("include", "Foo.h")], &[]), &[]);
        assert_eq!(check("LP056", &root).verdict, RuleVerdict::Fail);
    }
}
