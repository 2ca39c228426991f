//! Schema validation facade.
//!
//! Metadata documents are validated against one JSON Schema (Draft 7) per
//! [`ComplianceLevel`]. Raw validator errors are converted into owned
//! [`SchemaFailure`] records, and rules only ever ask questions of a
//! [`ValidationResult`] through the query methods below.
//!
//! Named checks inside the schemas carry a `$comment` label such as
//! `notStartsWithArduino`. Every label found along a failure's schema path is
//! recorded so rules can match on it.

pub mod fragments;
pub mod library_properties;
pub mod package_index;
pub mod platform;
mod sketch_metadata;

use crate::mode::ComplianceLevel;
use crate::pointer;
use jsonschema::error::ValidationErrorKind;
use jsonschema::Draft;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{trace, warn};

/// The metadata document kinds that have schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataSchema {
    /// `library.properties`.
    LibraryProperties,
    /// `boards.txt`.
    BoardsTxt,
    /// `programmers.txt`.
    ProgrammersTxt,
    /// `platform.txt`.
    PlatformTxt,
    /// Boards Manager package index.
    PackageIndex,
    /// `sketch.json`.
    SketchMetadata,
}

impl MetadataSchema {
    /// Builds the schema document for `level`.
    #[must_use]
    pub fn document(self, level: ComplianceLevel) -> Value {
        match self {
            Self::LibraryProperties => library_properties::schema(level),
            Self::BoardsTxt => platform::boards_txt_schema(level),
            Self::ProgrammersTxt => platform::programmers_txt_schema(level),
            Self::PlatformTxt => platform::platform_txt_schema(level),
            Self::PackageIndex => package_index::schema(level),
            Self::SketchMetadata => sketch_metadata::schema(level),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::LibraryProperties => "library.properties",
            Self::BoardsTxt => "boards.txt",
            Self::ProgrammersTxt => "programmers.txt",
            Self::PlatformTxt => "platform.txt",
            Self::PackageIndex => "package index",
            Self::SketchMetadata => "sketch.json",
        }
    }
}

/// Schema compilation errors.
#[derive(Debug, Clone, thiserror::Error, miette::Diagnostic)]
#[error("Failed to compile {schema} schema for {level} compliance: {message}")]
#[diagnostic(help("this is a bug in arduino-lint, please report it"))]
pub struct SchemaError {
    /// Document kind.
    pub schema: &'static str,
    /// Compliance level of the schema.
    pub level: ComplianceLevel,
    /// Validator message.
    pub message: String,
}

/// A compiled schema plus its source document.
pub struct CompiledSchema {
    document: Arc<Value>,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Compiles the schema of `kind` at `level`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema document is invalid.
    pub fn compile(kind: MetadataSchema, level: ComplianceLevel) -> Result<Self, SchemaError> {
        let document = kind.document(level);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(&document)
            .map_err(|e| SchemaError {
                schema: kind.name(),
                level,
                message: e.to_string(),
            })?;
        Ok(Self {
            document: Arc::new(document),
            validator,
        })
    }

    /// Validates `instance`, converting every error into a [`SchemaFailure`].
    #[must_use]
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        let failures = self
            .validator
            .iter_errors(instance)
            .map(|err| {
                let schema_path = err.schema_path.to_string();
                let context = match &err.kind {
                    ValidationErrorKind::Required { property, .. } => property
                        .as_str()
                        .map(|p| format!("/{}", pointer::escape(p)))
                        .unwrap_or_default(),
                    ValidationErrorKind::AdditionalProperties { unexpected, .. } => {
                        unexpected.join(",")
                    }
                    _ => String::new(),
                };
                SchemaFailure {
                    instance_path: err.instance_path.to_string(),
                    labels: labels_along(&self.document, &schema_path),
                    sub_pointers: sub_pointers(&self.document, &schema_path),
                    schema_path,
                    context,
                    message: err.to_string(),
                }
            })
            .collect();
        ValidationResult { failures }
    }
}

/// Collects `$comment` labels of every schema object along `schema_path`.
fn labels_along(document: &Value, schema_path: &str) -> Vec<String> {
    let mut labels = Vec::new();
    let mut node = Some(document);
    for token in std::iter::once(String::new()).chain(pointer::tokens(schema_path)) {
        if !token.is_empty() {
            node = node.and_then(|n| match n {
                Value::Object(map) => map.get(&token),
                Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            });
        }
        if let Some(label) = node
            .and_then(|n| n.get("$comment"))
            .and_then(Value::as_str)
        {
            labels.push(label.to_string());
        }
    }
    labels
}

/// Lists every pointer below a logic-inversion keyword.
///
/// `not`, `anyOf` and `oneOf` failures only point at the keyword itself, so
/// the keywords beneath them are needed to tell what was violated.
fn sub_pointers(document: &Value, schema_path: &str) -> Vec<String> {
    let inverts = ["/not", "/anyOf", "/oneOf"]
        .iter()
        .any(|k| schema_path.ends_with(k));
    if !inverts {
        return Vec::new();
    }
    let mut out = Vec::new();
    if let Some(node) = document.pointer(schema_path) {
        walk_pointers(node, schema_path, &mut out);
    }
    out
}

fn walk_pointers(node: &Value, at: &str, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let child_ptr = pointer::join(at, key);
                out.push(child_ptr.clone());
                walk_pointers(child, &child_ptr, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let child_ptr = format!("{at}/{i}");
                out.push(child_ptr.clone());
                walk_pointers(child, &child_ptr, out);
            }
        }
        _ => {}
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFailure {
    /// JSON pointer of the offending instance node.
    pub instance_path: String,
    /// JSON pointer of the failing schema keyword.
    pub schema_path: String,
    /// Pointers of keywords nested under a failing `not`/`anyOf`/`oneOf`.
    pub sub_pointers: Vec<String>,
    /// `$comment` labels along the schema path.
    pub labels: Vec<String>,
    /// Missing property pointer for `required`, unexpected names for
    /// `additionalProperties`, empty otherwise.
    pub context: String,
    /// Validator message.
    pub message: String,
}

/// Outcome of validating one document against one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    failures: Vec<SchemaFailure>,
}

impl ValidationResult {
    /// Returns `true` if the document is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns all failures.
    #[must_use]
    pub fn failures(&self) -> &[SchemaFailure] {
        &self.failures
    }

    /// Property at `property` (a JSON pointer) is required but missing.
    #[must_use]
    pub fn required_property_missing(&self, property: &str) -> bool {
        let Some((parent, name)) = pointer::split_last(property) else {
            return false;
        };
        self.validation_error_match(
            &exact(parent),
            "/required$",
            "",
            &exact(&pointer::join("", &name)),
        )
    }

    /// Property has the wrong JSON type.
    #[must_use]
    pub fn property_type_mismatch(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/type$", "", "")
    }

    /// Property is shorter than the schema minimum.
    #[must_use]
    pub fn property_less_than_min_length(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/min(Length|Items)$", "", "")
    }

    /// Property is longer than the schema maximum.
    #[must_use]
    pub fn property_greater_than_max_length(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/max(Length|Items)$", "", "")
    }

    /// Property does not match a schema `pattern`.
    #[must_use]
    pub fn property_pattern_mismatch(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/pattern$", "", "")
    }

    /// Property is not one of the schema `enum` values.
    #[must_use]
    pub fn property_enum_mismatch(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/enum$", "", "")
    }

    /// Property does not match its schema `format`.
    #[must_use]
    pub fn property_format_mismatch(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/format$", "", "")
    }

    /// Object at `property` contains properties the schema prohibits.
    #[must_use]
    pub fn prohibited_additional_properties(&self, property: &str) -> bool {
        self.validation_error_match(&exact(property), "/additionalProperties$", "", "")
    }

    /// A check labelled `label` failed for `property`.
    #[must_use]
    pub fn labelled_check_failed(&self, property: &str, label: &str) -> bool {
        self.validation_error_match(&exact(property), "", &exact(label), "")
    }

    /// The document uses a misspelled name of an optional property.
    #[must_use]
    pub fn misspelled_optional_property_found(&self) -> bool {
        self.validation_error_match("", "", "^misspelledOptionalProperties$", "")
    }

    /// Generic matcher over the recorded failures.
    ///
    /// Each argument is a regular expression; an empty expression matches
    /// anything. The schema pointer expression is tried against the failing
    /// keyword and every keyword nested below a failing `not`, `anyOf` or
    /// `oneOf`. The label expression must match at least one `$comment`
    /// label on the schema path.
    #[must_use]
    pub fn validation_error_match(
        &self,
        instance_pointer: &str,
        schema_pointer: &str,
        schema_label: &str,
        failure_context: &str,
    ) -> bool {
        if self.failures.is_empty() {
            trace!("Schema validation passed. No match is possible.");
            return false;
        }
        let (Some(instance_re), Some(schema_re), Some(label_re), Some(context_re)) = (
            compile(instance_pointer),
            compile(schema_pointer),
            compile(schema_label),
            compile(failure_context),
        ) else {
            return false;
        };

        self.failures.iter().any(|f| {
            instance_re.is_match(&f.instance_path)
                && (schema_re.is_match(&f.schema_path)
                    || f.sub_pointers.iter().any(|p| schema_re.is_match(p)))
                && (schema_label.is_empty() || f.labels.iter().any(|l| label_re.is_match(l)))
                && context_re.is_match(&f.context)
        })
    }
}

fn exact(literal: &str) -> String {
    format!("^{}$", regex::escape(literal))
}

fn compile(expression: &str) -> Option<Regex> {
    match Regex::new(expression) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid schema query {:?}: {}", expression, e);
            None
        }
    }
}

/// Validation results for all three compliance levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResults {
    /// Result against the permissive schema.
    pub permissive: ValidationResult,
    /// Result against the specification schema.
    pub specification: ValidationResult,
    /// Result against the strict schema.
    pub strict: ValidationResult,
}

impl ValidationResults {
    /// Returns the result for `level`.
    #[must_use]
    pub fn get(&self, level: ComplianceLevel) -> &ValidationResult {
        match level {
            ComplianceLevel::Permissive => &self.permissive,
            ComplianceLevel::Specification => &self.specification,
            ComplianceLevel::Strict => &self.strict,
        }
    }
}

type CompiledLevels = [Result<CompiledSchema, SchemaError>; 3];

fn compile_levels(kind: MetadataSchema) -> CompiledLevels {
    ComplianceLevel::ALL.map(|level| CompiledSchema::compile(kind, level))
}

static LIBRARY_PROPERTIES: LazyLock<CompiledLevels> =
    LazyLock::new(|| compile_levels(MetadataSchema::LibraryProperties));
static BOARDS_TXT: LazyLock<CompiledLevels> =
    LazyLock::new(|| compile_levels(MetadataSchema::BoardsTxt));
static PROGRAMMERS_TXT: LazyLock<CompiledLevels> =
    LazyLock::new(|| compile_levels(MetadataSchema::ProgrammersTxt));
static PLATFORM_TXT: LazyLock<CompiledLevels> =
    LazyLock::new(|| compile_levels(MetadataSchema::PlatformTxt));
static PACKAGE_INDEX: LazyLock<CompiledLevels> =
    LazyLock::new(|| compile_levels(MetadataSchema::PackageIndex));
static SKETCH_METADATA: LazyLock<CompiledLevels> =
    LazyLock::new(|| compile_levels(MetadataSchema::SketchMetadata));

/// Returns the compiled `kind` schema for `level`.
///
/// The three levels of a kind are compiled together on first use and kept
/// for the rest of the process.
///
/// # Errors
///
/// Returns [`SchemaError`] if the schema failed to compile.
pub fn compiled(
    kind: MetadataSchema,
    level: ComplianceLevel,
) -> Result<&'static CompiledSchema, SchemaError> {
    let levels: &'static CompiledLevels = match kind {
        MetadataSchema::LibraryProperties => &LIBRARY_PROPERTIES,
        MetadataSchema::BoardsTxt => &BOARDS_TXT,
        MetadataSchema::ProgrammersTxt => &PROGRAMMERS_TXT,
        MetadataSchema::PlatformTxt => &PLATFORM_TXT,
        MetadataSchema::PackageIndex => &PACKAGE_INDEX,
        MetadataSchema::SketchMetadata => &SKETCH_METADATA,
    };
    let slot = match level {
        ComplianceLevel::Permissive => &levels[0],
        ComplianceLevel::Specification => &levels[1],
        ComplianceLevel::Strict => &levels[2],
    };
    slot.as_ref().map_err(Clone::clone)
}

/// Validates `instance` against the `kind` schemas of every compliance level.
///
/// # Errors
///
/// Returns [`SchemaError`] if a schema fails to compile.
pub fn validate(kind: MetadataSchema, instance: &Value) -> Result<ValidationResults, SchemaError> {
    let run = |level| compiled(kind, level).map(|s| s.validate(instance));
    Ok(ValidationResults {
        permissive: run(ComplianceLevel::Permissive)?,
        specification: run(ComplianceLevel::Specification)?,
        strict: run(ComplianceLevel::Strict)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(instance: &str, schema: &str) -> SchemaFailure {
        SchemaFailure {
            instance_path: instance.to_string(),
            schema_path: schema.to_string(),
            sub_pointers: Vec::new(),
            labels: Vec::new(),
            context: String::new(),
            message: String::new(),
        }
    }

    // --- query tests ---

    #[test]
    fn valid_result_matches_nothing() {
        let result = ValidationResult::default();
        assert!(result.is_valid());
        assert!(!result.validation_error_match("", "", "", ""));
    }

    #[test]
    fn min_length_query_is_anchored() {
        let result = ValidationResult {
            failures: vec![failure("/name", "/properties/name/minLength")],
        };
        assert!(result.property_less_than_min_length("/name"));
        assert!(!result.property_less_than_min_length("/nam"));
        assert!(!result.property_greater_than_max_length("/name"));
    }

    #[test]
    fn required_query_uses_context() {
        let mut f = failure("/packages/0", "/properties/packages/items/required");
        f.context = "/name".to_string();
        let result = ValidationResult { failures: vec![f] };
        assert!(result.required_property_missing("/packages/0/name"));
        assert!(!result.required_property_missing("/packages/0/maintainer"));
        assert!(!result.required_property_missing("/packages/1/name"));
    }

    #[test]
    fn sub_pointers_match_under_not() {
        let mut f = failure("/maintainer", "/properties/maintainer/allOf/0/not");
        f.sub_pointers = vec!["/properties/maintainer/allOf/0/not/pattern".to_string()];
        f.labels = vec!["notStartsWithArduino".to_string()];
        let result = ValidationResult { failures: vec![f] };
        assert!(result.property_pattern_mismatch("/maintainer"));
        assert!(result.labelled_check_failed("/maintainer", "notStartsWithArduino"));
        assert!(!result.labelled_check_failed("/maintainer", "notContainsArduino"));
    }

    // --- schema plumbing tests ---

    #[test]
    fn labels_are_collected_along_path() {
        let doc = json!({
            "properties": {
                "name": {
                    "allOf": [{"$comment": "notContainsSpaces", "not": {"pattern": " "}}]
                }
            }
        });
        assert_eq!(
            labels_along(&doc, "/properties/name/allOf/0/not"),
            vec!["notContainsSpaces".to_string()]
        );
        assert_eq!(
            sub_pointers(&doc, "/properties/name/allOf/0/not"),
            vec!["/properties/name/allOf/0/not/pattern".to_string()]
        );
        assert!(sub_pointers(&doc, "/properties/name/allOf/0").is_empty());
    }

    #[test]
    fn every_schema_compiles_at_every_level() {
        for kind in [
            MetadataSchema::LibraryProperties,
            MetadataSchema::BoardsTxt,
            MetadataSchema::ProgrammersTxt,
            MetadataSchema::PlatformTxt,
            MetadataSchema::PackageIndex,
            MetadataSchema::SketchMetadata,
        ] {
            for level in ComplianceLevel::ALL {
                assert!(
                    CompiledSchema::compile(kind, level).is_ok(),
                    "{kind:?} at {level}"
                );
            }
        }
    }

    #[test]
    fn compiled_schemas_are_reused_per_level() {
        let kind = MetadataSchema::LibraryProperties;
        for level in ComplianceLevel::ALL {
            let first = compiled(kind, level).unwrap();
            let second = compiled(kind, level).unwrap();
            assert!(std::ptr::eq(first, second));
            assert_eq!(*first.document, kind.document(level), "{level}");
        }
    }
}
