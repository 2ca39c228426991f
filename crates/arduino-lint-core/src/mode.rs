//! Compliance levels and check modes.
//!
//! A run resolves, per project, a [`CheckModes`] value mapping every
//! [`CheckMode`] to a boolean. Rule descriptors key their enable and level
//! tables on these modes.

use crate::project::ProjectKind;
use serde::{Deserialize, Serialize};

/// Strictness band used for schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceLevel {
    /// Only fail on violations that break the tooling.
    Permissive,
    /// Fail on violations of the published specification.
    Specification,
    /// Fail on anything that goes against best practices.
    Strict,
}

impl ComplianceLevel {
    /// All levels, least strict first.
    pub const ALL: [Self; 3] = [Self::Permissive, Self::Specification, Self::Strict];

    /// Returns the check mode that mirrors this level.
    #[must_use]
    pub fn check_mode(self) -> CheckMode {
        match self {
            Self::Permissive => CheckMode::Permissive,
            Self::Specification => CheckMode::Specification,
            Self::Strict => CheckMode::Strict,
        }
    }
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::Specification => write!(f, "specification"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for ComplianceLevel {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "specification" => Ok(Self::Specification),
            "strict" => Ok(Self::Strict),
            _ => Err(ModeError::Compliance(s.to_string())),
        }
    }
}

/// A check mode key used in rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckMode {
    /// Strict compliance is in effect.
    Strict,
    /// Specification compliance is in effect.
    Specification,
    /// Permissive compliance is in effect.
    Permissive,
    /// Linting a library about to be submitted to Library Manager.
    LibraryManagerSubmission,
    /// Linting a release of a library already in Library Manager.
    LibraryManagerIndexed,
    /// Linting an official Arduino project.
    Official,
    /// Always true; the fallback key of every table.
    Default,
}

impl CheckMode {
    /// Every check mode.
    pub const ALL: [Self; 7] = [
        Self::Strict,
        Self::Specification,
        Self::Permissive,
        Self::LibraryManagerSubmission,
        Self::LibraryManagerIndexed,
        Self::Official,
        Self::Default,
    ];
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Strict => "strict",
            Self::Specification => "specification",
            Self::Permissive => "permissive",
            Self::LibraryManagerSubmission => "library-manager-submission",
            Self::LibraryManagerIndexed => "library-manager-indexed",
            Self::Official => "official",
            Self::Default => "default",
        };
        f.write_str(s)
    }
}

/// Library Manager context selected by `--library-manager`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryManagerMode {
    /// A new submission.
    Submit,
    /// An update of an already indexed library.
    Update,
    /// Not in a Library Manager context.
    False,
}

impl LibraryManagerMode {
    /// Parses a `--library-manager` value. The empty string means "unset".
    ///
    /// # Errors
    ///
    /// Returns [`ModeError::LibraryManager`] for unknown values.
    pub fn parse_flag(s: &str) -> Result<Option<Self>, ModeError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "submit" => Ok(Some(Self::Submit)),
            "update" => Ok(Some(Self::Update)),
            "false" => Ok(Some(Self::False)),
            _ => Err(ModeError::LibraryManager(s.to_string())),
        }
    }
}

impl std::fmt::Display for LibraryManagerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit => write!(f, "submit"),
            Self::Update => write!(f, "update"),
            Self::False => write!(f, "false"),
        }
    }
}

/// Errors raised while parsing mode settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ModeError {
    /// Unknown compliance level string.
    #[error("invalid compliance level {0:?}")]
    #[diagnostic(help("valid values are: permissive, specification, strict"))]
    Compliance(String),

    /// Unknown library manager mode string.
    #[error("invalid library manager mode {0:?}")]
    #[diagnostic(help("valid values are: submit, update, false"))]
    LibraryManager(String),
}

/// Mode settings supplied by the user, before per-project defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSettings {
    /// Requested compliance level, if any.
    pub compliance: Option<ComplianceLevel>,
    /// Requested Library Manager context, if any.
    pub library_manager: Option<LibraryManagerMode>,
    /// Whether the project is an official Arduino project, if requested.
    pub official: Option<bool>,
}

/// Resolved mode map for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckModes {
    compliance: ComplianceLevel,
    library_manager_submission: bool,
    library_manager_indexed: bool,
    official: bool,
}

impl CheckModes {
    /// Resolves the mode map for a project whose apex kind is `super_kind`.
    ///
    /// Every kind defaults to specification compliance. Libraries default to
    /// the Library Manager submission context unless the settings say
    /// otherwise.
    #[must_use]
    pub fn resolve(settings: ModeSettings, super_kind: ProjectKind) -> Self {
        let compliance = settings
            .compliance
            .unwrap_or(ComplianceLevel::Specification);

        let library_manager = settings.library_manager.unwrap_or(
            if super_kind == ProjectKind::Library {
                LibraryManagerMode::Submit
            } else {
                LibraryManagerMode::False
            },
        );

        Self {
            compliance,
            library_manager_submission: library_manager == LibraryManagerMode::Submit,
            library_manager_indexed: library_manager == LibraryManagerMode::Update,
            official: settings.official.unwrap_or(false),
        }
    }

    /// Returns whether `mode` is currently true.
    #[must_use]
    pub fn is_set(&self, mode: CheckMode) -> bool {
        match mode {
            CheckMode::Strict => self.compliance == ComplianceLevel::Strict,
            CheckMode::Specification => self.compliance == ComplianceLevel::Specification,
            CheckMode::Permissive => self.compliance == ComplianceLevel::Permissive,
            CheckMode::LibraryManagerSubmission => self.library_manager_submission,
            CheckMode::LibraryManagerIndexed => self.library_manager_indexed,
            CheckMode::Official => self.official,
            CheckMode::Default => true,
        }
    }

    /// Returns the effective compliance level.
    #[must_use]
    pub fn compliance(&self) -> ComplianceLevel {
        self.compliance
    }

    /// Returns the effective Library Manager context.
    #[must_use]
    pub fn library_manager(&self) -> LibraryManagerMode {
        if self.library_manager_submission {
            LibraryManagerMode::Submit
        } else if self.library_manager_indexed {
            LibraryManagerMode::Update
        } else {
            LibraryManagerMode::False
        }
    }

    /// Returns whether official mode is on.
    #[must_use]
    pub fn official(&self) -> bool {
        self.official
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- parsing tests ---

    #[test]
    fn compliance_parses_case_insensitively() {
        assert_eq!("STRICT".parse(), Ok(ComplianceLevel::Strict));
        assert_eq!("permissive".parse(), Ok(ComplianceLevel::Permissive));
        assert!("lenient".parse::<ComplianceLevel>().is_err());
    }

    #[test]
    fn library_manager_flag_values() {
        assert_eq!(LibraryManagerMode::parse_flag(""), Ok(None));
        assert_eq!(
            LibraryManagerMode::parse_flag("submit"),
            Ok(Some(LibraryManagerMode::Submit))
        );
        assert_eq!(
            LibraryManagerMode::parse_flag("update"),
            Ok(Some(LibraryManagerMode::Update))
        );
        assert_eq!(
            LibraryManagerMode::parse_flag("false"),
            Ok(Some(LibraryManagerMode::False))
        );
        assert!(matches!(
            LibraryManagerMode::parse_flag("yes"),
            Err(ModeError::LibraryManager(_))
        ));
    }

    #[test]
    fn compliance_levels_are_ordered() {
        assert!(ComplianceLevel::Permissive < ComplianceLevel::Specification);
        assert!(ComplianceLevel::Specification < ComplianceLevel::Strict);
    }

    // --- resolution tests ---

    #[test]
    fn exactly_one_compliance_mode_is_set() {
        for level in ComplianceLevel::ALL {
            let modes = CheckModes::resolve(
                ModeSettings {
                    compliance: Some(level),
                    ..ModeSettings::default()
                },
                ProjectKind::Sketch,
            );
            let set = [CheckMode::Strict, CheckMode::Specification, CheckMode::Permissive]
                .into_iter()
                .filter(|m| modes.is_set(*m))
                .count();
            assert_eq!(set, 1);
            assert!(modes.is_set(level.check_mode()));
        }
    }

    #[test]
    fn library_defaults_to_submission() {
        let modes = CheckModes::resolve(ModeSettings::default(), ProjectKind::Library);
        assert!(modes.is_set(CheckMode::LibraryManagerSubmission));
        assert!(!modes.is_set(CheckMode::LibraryManagerIndexed));
        assert!(modes.is_set(CheckMode::Specification));
    }

    #[test]
    fn non_library_defaults_outside_library_manager() {
        for kind in [ProjectKind::Sketch, ProjectKind::Platform, ProjectKind::PackageIndex] {
            let modes = CheckModes::resolve(ModeSettings::default(), kind);
            assert!(!modes.is_set(CheckMode::LibraryManagerSubmission));
            assert!(!modes.is_set(CheckMode::LibraryManagerIndexed));
        }
    }

    #[test]
    fn explicit_settings_override_defaults() {
        let settings = ModeSettings {
            compliance: Some(ComplianceLevel::Strict),
            library_manager: Some(LibraryManagerMode::Update),
            official: Some(true),
        };
        let modes = CheckModes::resolve(settings, ProjectKind::Library);
        assert!(modes.is_set(CheckMode::Strict));
        assert!(modes.is_set(CheckMode::LibraryManagerIndexed));
        assert!(!modes.is_set(CheckMode::LibraryManagerSubmission));
        assert!(modes.is_set(CheckMode::Official));

        let off = ModeSettings {
            library_manager: Some(LibraryManagerMode::False),
            ..ModeSettings::default()
        };
        let modes = CheckModes::resolve(off, ProjectKind::Library);
        assert_eq!(modes.library_manager(), LibraryManagerMode::False);
    }

    #[test]
    fn default_mode_is_always_set() {
        let modes = CheckModes::resolve(ModeSettings::default(), ProjectKind::Platform);
        assert!(modes.is_set(CheckMode::Default));
    }
}
