//! Run report: rule outcomes per project, summaries, and renderings.

use crate::mode::{CheckModes, ComplianceLevel, LibraryManagerMode};
use crate::project::{Project, ProjectKind};
use crate::rule::RuleDescriptor;
use crate::types::{RuleLevel, RuleOutput, RuleVerdict};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Settings of the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfiguration {
    /// Target paths.
    pub paths: Vec<PathBuf>,
    /// Project type filter.
    pub project_type: ProjectKind,
    /// Whether discovery descended into subfolders.
    pub recursive: bool,
}

/// Modes a project was linted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    /// Effective compliance level.
    pub compliance: ComplianceLevel,
    /// Library Manager context.
    pub library_manager: LibraryManagerMode,
    /// Official mode.
    pub official: bool,
}

impl From<&CheckModes> for ProjectConfiguration {
    fn from(modes: &CheckModes) -> Self {
        Self {
            compliance: modes.compliance(),
            library_manager: modes.library_manager(),
            official: modes.official(),
        }
    }
}

/// Outcome of one rule on one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    /// Rule category.
    pub category: String,
    /// Rule subcategory.
    pub subcategory: String,
    /// Rule ID.
    #[serde(rename = "ID")]
    pub id: String,
    /// Rule brief.
    pub brief: String,
    /// Rule description.
    pub description: String,
    /// Verdict.
    pub result: RuleVerdict,
    /// Resolved level.
    pub level: RuleLevel,
    /// Rendered message for failures, the raw context otherwise.
    pub message: String,
    /// Documentation link.
    #[serde(rename = "referenceURL")]
    pub reference_url: String,
}

impl RuleReport {
    /// Builds the report entry for `rule` producing `output` at `level`.
    #[must_use]
    pub fn new(rule: &RuleDescriptor, output: &RuleOutput, level: RuleLevel) -> Self {
        let message = if output.verdict == RuleVerdict::Fail {
            rule.render_message(&output.context)
        } else {
            output.context.clone()
        };
        Self {
            category: rule.category.to_string(),
            subcategory: rule.subcategory.to_string(),
            id: rule.id.to_string(),
            brief: rule.brief.to_string(),
            description: rule.description.to_string(),
            result: output.verdict,
            level,
            message,
            reference_url: rule.reference_url.to_string(),
        }
    }
}

/// Counts of failures by level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// No error-level outcome.
    pub pass: bool,
    /// Warning-level failures.
    pub warning_count: usize,
    /// Error-level failures.
    pub error_count: usize,
}

impl Summary {
    fn of(rules: &[RuleReport]) -> Self {
        let count = |level| {
            rules
                .iter()
                .filter(|r| r.result == RuleVerdict::Fail && r.level == level)
                .count()
        };
        let error_count = count(RuleLevel::Error);
        Self {
            pass: error_count == 0,
            warning_count: count(RuleLevel::Warning),
            error_count,
        }
    }
}

/// Outcomes for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    /// Project root.
    pub path: PathBuf,
    /// Project kind.
    pub project_type: ProjectKind,
    /// Modes in effect.
    pub configuration: ProjectConfiguration,
    /// Every recorded outcome, in catalog order.
    pub rules: Vec<RuleReport>,
    /// Summary of the outcomes.
    pub summary: Summary,
}

impl ProjectReport {
    /// Starts an empty report for `project`.
    #[must_use]
    pub fn new(project: &Project, modes: &CheckModes) -> Self {
        Self {
            path: project.path.clone(),
            project_type: project.kind,
            configuration: modes.into(),
            rules: Vec::new(),
            summary: Summary {
                pass: true,
                ..Summary::default()
            },
        }
    }

    /// Records an outcome and updates the summary.
    pub fn record(&mut self, entry: RuleReport) {
        self.rules.push(entry);
        self.summary = Summary::of(&self.rules);
    }
}

/// The full run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Run settings.
    pub configuration: RunConfiguration,
    /// Per-project reports, in discovery order.
    pub projects: Vec<ProjectReport>,
    /// Overall summary.
    pub summary: Summary,
}

impl Report {
    /// Assembles the run report.
    #[must_use]
    pub fn new(configuration: RunConfiguration, projects: Vec<ProjectReport>) -> Self {
        let summary = Summary {
            pass: projects.iter().all(|p| p.summary.pass),
            warning_count: projects.iter().map(|p| p.summary.warning_count).sum(),
            error_count: projects.iter().map(|p| p.summary.error_count).sum(),
        };
        Self {
            configuration,
            projects,
            summary,
        }
    }

    /// Whether the run passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.summary.pass
    }

    /// Copy keeping the outcomes that are shown: failures always, and every
    /// non-skipped outcome when `verbose`. Summaries are unchanged.
    #[must_use]
    pub fn listing(&self, verbose: bool) -> Self {
        let mut listed = self.clone();
        for project in &mut listed.projects {
            project.rules.retain(|r| shown(r, verbose));
        }
        listed
    }

    /// Renders the JSON report.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, verbose: bool) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.listing(verbose))
    }

    /// Renders the text report.
    #[must_use]
    pub fn to_text(&self, verbose: bool) -> String {
        let mut out = String::new();
        for project in &self.projects {
            let _ = writeln!(
                out,
                "Linting {} in {}",
                project.project_type.display_name(),
                project.path.display()
            );
            for rule in project.rules.iter().filter(|r| shown(r, verbose)) {
                if verbose {
                    let _ = writeln!(out, "Rule {} result: {}", rule.id, rule.result);
                }
                if rule.result == RuleVerdict::Fail {
                    let _ = writeln!(out, "{}: {} (Rule {})", rule.level, rule.message, rule.id);
                    if !rule.reference_url.is_empty() {
                        let _ = writeln!(out, "  More info: {}", rule.reference_url);
                    }
                } else if verbose && !rule.message.is_empty() {
                    let _ = writeln!(out, "  {}", rule.message);
                }
            }
            out.push('\n');
            out.push_str("Finished linting project. Results:\n");
            write_summary(&mut out, &project.summary);
            out.push('\n');
        }
        if self.projects.len() > 1 {
            out.push_str("Finished linting projects. Results:\n");
            write_summary(&mut out, &self.summary);
        }
        out
    }
}

fn shown(rule: &RuleReport, verbose: bool) -> bool {
    rule.result == RuleVerdict::Fail || (verbose && rule.result != RuleVerdict::Skip)
}

fn write_summary(out: &mut String, summary: &Summary) {
    let _ = writeln!(out, "Warning count: {}", summary.warning_count);
    let _ = writeln!(out, "Error count: {}", summary.error_count);
    let _ = writeln!(out, "Rules passed: {}", summary.pass);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProjectContext;
    use crate::mode::ModeSettings;

    fn body(_: &ProjectContext) -> RuleOutput {
        RuleOutput::pass()
    }

    fn sketch_report(outcomes: &[(&'static str, RuleOutput, RuleLevel)]) -> ProjectReport {
        let project = Project::new("/work/Blink", ProjectKind::Sketch);
        let modes = CheckModes::resolve(ModeSettings::default(), ProjectKind::Sketch);
        let mut report = ProjectReport::new(&project, &modes);
        for (id, output, level) in outcomes {
            let rule = RuleDescriptor::new(ProjectKind::Sketch, *id, "brief", body)
                .message("Problem: {}")
                .reference("https://example.com/rules");
            report.record(RuleReport::new(&rule, output, *level));
        }
        report
    }

    fn run_configuration() -> RunConfiguration {
        RunConfiguration {
            paths: vec![PathBuf::from("/work")],
            project_type: ProjectKind::All,
            recursive: true,
        }
    }

    // --- summary tests ---

    #[test]
    fn only_errors_fail_a_project() {
        let report = sketch_report(&[
            ("SS004", RuleOutput::fail("Blink.pde"), RuleLevel::Warning),
            ("SD001", RuleOutput::fail(""), RuleLevel::Info),
            ("SM001", RuleOutput::skip("No metadata"), RuleLevel::Notice),
            ("SS006", RuleOutput::not_run("unreadable"), RuleLevel::Notice),
        ]);
        assert!(report.summary.pass);
        assert_eq!(report.summary.warning_count, 1);
        assert_eq!(report.summary.error_count, 0);
    }

    #[test]
    fn overall_pass_requires_every_project() {
        let ok = sketch_report(&[("SS001", RuleOutput::pass(), RuleLevel::Notice)]);
        let bad = sketch_report(&[("SS001", RuleOutput::fail("Blink.ino"), RuleLevel::Error)]);
        let report = Report::new(run_configuration(), vec![ok, bad]);
        assert!(!report.passed());
        assert_eq!(report.summary.error_count, 1);
    }

    #[test]
    fn failure_message_uses_template() {
        let report = sketch_report(&[
            ("SS001", RuleOutput::fail("Blink.ino"), RuleLevel::Error),
            ("SM001", RuleOutput::skip("No metadata"), RuleLevel::Notice),
        ]);
        assert_eq!(report.rules[0].message, "Problem: Blink.ino");
        assert_eq!(report.rules[1].message, "No metadata");
    }

    // --- rendering tests ---

    #[test]
    fn json_lists_failures_unless_verbose() {
        let project = sketch_report(&[
            ("SS001", RuleOutput::pass(), RuleLevel::Notice),
            ("SS004", RuleOutput::fail("Blink.pde"), RuleLevel::Warning),
            ("SM001", RuleOutput::skip("No metadata"), RuleLevel::Notice),
        ]);
        let report = Report::new(run_configuration(), vec![project]);

        let quiet: serde_json::Value =
            serde_json::from_str(&report.to_json(false).unwrap()).unwrap();
        let rules = quiet["projects"][0]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0]["ID"], "SS004");
        assert_eq!(rules[0]["result"], "fail");
        assert_eq!(rules[0]["level"], "WARNING");
        assert_eq!(rules[0]["referenceURL"], "https://example.com/rules");
        assert_eq!(quiet["projects"][0]["projectType"], "sketch");
        assert_eq!(quiet["projects"][0]["configuration"]["compliance"], "specification");
        assert_eq!(quiet["summary"]["warningCount"], 1);
        assert_eq!(quiet["configuration"]["projectType"], "all");

        let verbose: serde_json::Value =
            serde_json::from_str(&report.to_json(true).unwrap()).unwrap();
        assert_eq!(verbose["projects"][0]["rules"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn text_report() {
        let project = sketch_report(&[
            ("SS001", RuleOutput::fail("Blink.ino"), RuleLevel::Error),
            ("SM001", RuleOutput::skip("No metadata"), RuleLevel::Notice),
        ]);
        let report = Report::new(run_configuration(), vec![project]);
        insta::assert_snapshot!(report.to_text(false), @r"
        Linting sketch in /work/Blink
        ERROR: Problem: Blink.ino (Rule SS001)
          More info: https://example.com/rules

        Finished linting project. Results:
        Warning count: 0
        Error count: 1
        Rules passed: false
        ");
    }

    #[test]
    fn verbose_text_report_with_overall_summary() {
        let first = sketch_report(&[("SS001", RuleOutput::pass(), RuleLevel::Notice)]);
        let second = sketch_report(&[
            ("SS004", RuleOutput::fail("Blink.pde"), RuleLevel::Warning),
            ("SS006", RuleOutput::not_run("unreadable"), RuleLevel::Notice),
        ]);
        let report = Report::new(run_configuration(), vec![first, second]);
        insta::assert_snapshot!(report.to_text(true), @r"
        Linting sketch in /work/Blink
        Rule SS001 result: pass

        Finished linting project. Results:
        Warning count: 0
        Error count: 0
        Rules passed: true

        Linting sketch in /work/Blink
        Rule SS004 result: fail
        WARNING: Problem: Blink.pde (Rule SS004)
          More info: https://example.com/rules
        Rule SS006 result: unable to run
          unreadable

        Finished linting project. Results:
        Warning count: 1
        Error count: 0
        Rules passed: true

        Finished linting projects. Results:
        Warning count: 1
        Error count: 0
        Rules passed: true
        ");
    }
}
