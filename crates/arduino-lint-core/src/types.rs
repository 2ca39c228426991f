//! Core types for rule verdicts, levels, and outputs.

use serde::{Deserialize, Serialize};

/// Severity level resolved for a rule outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleLevel {
    /// Informational failure, never affects the run.
    Info,
    /// Passed, skipped, or not run.
    Notice,
    /// Failure that should be addressed.
    Warning,
    /// Failure that fails the run.
    Error,
}

impl std::fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Notice => write!(f, "NOTICE"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Verdict returned by a rule function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleVerdict {
    /// The project complies.
    #[serde(rename = "pass")]
    Pass,
    /// The project violates the rule.
    #[serde(rename = "fail")]
    Fail,
    /// The rule does not apply to this project.
    #[serde(rename = "skipped")]
    Skip,
    /// The rule could not be evaluated.
    #[serde(rename = "unable to run")]
    NotRun,
}

impl std::fmt::Display for RuleVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skipped"),
            Self::NotRun => write!(f, "unable to run"),
        }
    }
}

/// Verdict plus the context string substituted into the rule message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutput {
    /// The verdict.
    pub verdict: RuleVerdict,
    /// Offending value, file list, or the reason a rule was skipped or not run.
    pub context: String,
}

impl RuleOutput {
    /// A passing output.
    #[must_use]
    pub fn pass() -> Self {
        Self {
            verdict: RuleVerdict::Pass,
            context: String::new(),
        }
    }

    /// A failing output with context.
    #[must_use]
    pub fn fail(context: impl Into<String>) -> Self {
        Self {
            verdict: RuleVerdict::Fail,
            context: context.into(),
        }
    }

    /// A skipped output with the reason.
    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            verdict: RuleVerdict::Skip,
            context: reason.into(),
        }
    }

    /// A not-run output with the reason.
    #[must_use]
    pub fn not_run(reason: impl Into<String>) -> Self {
        Self {
            verdict: RuleVerdict::NotRun,
            context: reason.into(),
        }
    }

    /// Fails with the items joined by `", "` when any exist, otherwise passes.
    #[must_use]
    pub fn fail_if_any<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
        if items.is_empty() {
            Self::pass()
        } else {
            Self::fail(items.join(", "))
        }
    }

    /// Passes when `condition` holds, otherwise fails with `context`.
    #[must_use]
    pub fn pass_if(condition: bool, context: impl Into<String>) -> Self {
        if condition {
            Self::pass()
        } else {
            Self::fail(context)
        }
    }
}
