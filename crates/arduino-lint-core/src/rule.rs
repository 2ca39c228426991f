//! Rule descriptors.
//!
//! A rule is a row of static data plus a plain function reference. Which rows
//! run, and at what level their failures are reported, is decided by the
//! mode tables of the row against the project's [`CheckModes`].

use crate::context::ProjectContext;
use crate::mode::{CheckMode, CheckModes, ComplianceLevel};
use crate::project::ProjectKind;
use crate::types::{RuleLevel, RuleOutput, RuleVerdict};

/// Signature of every rule body.
pub type RuleFn = fn(&ProjectContext) -> RuleOutput;

/// Placeholder in message templates replaced by the rule's context string.
pub const CONTEXT_PLACEHOLDER: &str = "{}";

const NO_MODES: &[CheckMode] = &[];
const DEFAULT_ONLY: &[CheckMode] = &[CheckMode::Default];

/// Errors from resolving a rule's mode tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Neither the disable nor the enable table matched.
    #[error("Unable to resolve enable state of rule {0}")]
    UnresolvedEnable(&'static str),

    /// None of the level tables matched.
    #[error("Unable to resolve level of rule {0}")]
    UnresolvedLevel(&'static str),
}

/// One row of the rule catalog.
///
/// Rows are built with [`RuleDescriptor::new`] and the chained setters:
///
/// ```ignore
/// RuleDescriptor::new(ProjectKind::Sketch, "SS004", "use of .pde extension", pde_extension)
///     .category("structure", "file name")
///     .message("Use of .pde extension in sketch files: {}")
///     .warning(&[CheckMode::Default])
///     .error(&[CheckMode::Strict])
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    /// Kind of project this rule applies to.
    pub kind: ProjectKind,
    /// Report category, e.g. "library.properties".
    pub category: &'static str,
    /// Report subcategory, e.g. "name field".
    pub subcategory: &'static str,
    /// Unique identifier; the first character is the kind prefix.
    pub id: &'static str,
    /// Short name of the rule.
    pub brief: &'static str,
    /// Longer explanation.
    pub description: &'static str,
    /// Message shown on failure; [`CONTEXT_PLACEHOLDER`] is replaced by the context.
    pub message_template: &'static str,
    /// Documentation link shown on failure.
    pub reference_url: &'static str,
    /// Modes that disable the rule.
    pub disable_modes: &'static [CheckMode],
    /// Modes that enable the rule.
    pub enable_modes: &'static [CheckMode],
    /// Modes under which a failure is reported as info.
    pub info_modes: &'static [CheckMode],
    /// Modes under which a failure is reported as a warning.
    pub warning_modes: &'static [CheckMode],
    /// Modes under which a failure is reported as an error.
    pub error_modes: &'static [CheckMode],
    /// Compliance levels the rule runs at.
    pub compliance_levels: &'static [ComplianceLevel],
    /// The rule body.
    pub func: RuleFn,
}

impl RuleDescriptor {
    /// Creates a row enabled by default, erroring by default, at every compliance level.
    #[must_use]
    pub fn new(kind: ProjectKind, id: &'static str, brief: &'static str, func: RuleFn) -> Self {
        Self {
            kind,
            category: "",
            subcategory: "",
            id,
            brief,
            description: "",
            message_template: CONTEXT_PLACEHOLDER,
            reference_url: "",
            disable_modes: NO_MODES,
            enable_modes: DEFAULT_ONLY,
            info_modes: NO_MODES,
            warning_modes: NO_MODES,
            error_modes: DEFAULT_ONLY,
            compliance_levels: &ComplianceLevel::ALL,
            func,
        }
    }

    /// Sets category and subcategory.
    #[must_use]
    pub fn category(mut self, category: &'static str, subcategory: &'static str) -> Self {
        self.category = category;
        self.subcategory = subcategory;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the failure message template.
    #[must_use]
    pub fn message(mut self, template: &'static str) -> Self {
        self.message_template = template;
        self
    }

    /// Sets the reference URL.
    #[must_use]
    pub fn reference(mut self, url: &'static str) -> Self {
        self.reference_url = url;
        self
    }

    /// Sets the disable table.
    #[must_use]
    pub fn disable(mut self, modes: &'static [CheckMode]) -> Self {
        self.disable_modes = modes;
        self
    }

    /// Sets the enable table.
    #[must_use]
    pub fn enable(mut self, modes: &'static [CheckMode]) -> Self {
        self.enable_modes = modes;
        self
    }

    /// Sets the info table.
    #[must_use]
    pub fn info(mut self, modes: &'static [CheckMode]) -> Self {
        self.info_modes = modes;
        self.demote_default_error(modes);
        self
    }

    /// Sets the warning table.
    #[must_use]
    pub fn warning(mut self, modes: &'static [CheckMode]) -> Self {
        self.warning_modes = modes;
        self.demote_default_error(modes);
        self
    }

    // A lower table keyed on `Default` replaces the built-in error default.
    fn demote_default_error(&mut self, modes: &[CheckMode]) {
        if self.error_modes == DEFAULT_ONLY && modes.contains(&CheckMode::Default) {
            self.error_modes = NO_MODES;
        }
    }

    /// Sets the error table.
    #[must_use]
    pub fn error(mut self, modes: &'static [CheckMode]) -> Self {
        self.error_modes = modes;
        self
    }

    /// Restricts the compliance levels the rule runs at.
    #[must_use]
    pub fn compliance(mut self, levels: &'static [ComplianceLevel]) -> Self {
        self.compliance_levels = levels;
        self
    }

    /// Resolves whether the rule is enabled under `modes`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnresolvedEnable`] if no table entry matches.
    pub fn is_enabled(&self, modes: &CheckModes) -> Result<bool, RuleError> {
        resolve(
            &[(self.disable_modes, false), (self.enable_modes, true)],
            modes,
        )
        .ok_or(RuleError::UnresolvedEnable(self.id))
    }

    /// Resolves the level of an outcome with `verdict` under `modes`.
    ///
    /// Anything but a failure is reported as [`RuleLevel::Notice`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnresolvedLevel`] if a failure matches no table entry.
    pub fn level(&self, verdict: RuleVerdict, modes: &CheckModes) -> Result<RuleLevel, RuleError> {
        if verdict != RuleVerdict::Fail {
            return Ok(RuleLevel::Notice);
        }
        resolve(
            &[
                (self.error_modes, RuleLevel::Error),
                (self.warning_modes, RuleLevel::Warning),
                (self.info_modes, RuleLevel::Info),
            ],
            modes,
        )
        .ok_or(RuleError::UnresolvedLevel(self.id))
    }

    /// Returns whether the rule runs at `level`.
    #[must_use]
    pub fn applies_at(&self, level: ComplianceLevel) -> bool {
        self.compliance_levels.contains(&level)
    }

    /// Renders the failure message for `context`.
    #[must_use]
    pub fn render_message(&self, context: &str) -> String {
        self.message_template.replace(CONTEXT_PLACEHOLDER, context)
    }

    /// Runs the rule body.
    #[must_use]
    pub fn run(&self, ctx: &ProjectContext) -> RuleOutput {
        (self.func)(ctx)
    }
}

/// Scans specific true modes across all tables first, then `Default`.
fn resolve<T: Copy>(tables: &[(&[CheckMode], T)], modes: &CheckModes) -> Option<T> {
    tables
        .iter()
        .find(|(table, _)| {
            table
                .iter()
                .any(|m| *m != CheckMode::Default && modes.is_set(*m))
        })
        .or_else(|| {
            tables
                .iter()
                .find(|(table, _)| table.contains(&CheckMode::Default))
        })
        .map(|(_, value)| *value)
}
