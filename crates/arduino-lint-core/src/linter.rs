//! Rule scheduler: discovers projects, runs the catalog against each, and
//! aggregates the outcomes into a [`Report`].

use crate::config::{Config, ConfigError};
use crate::context::{ProjectContext, Services};
use crate::discovery::{self, DiscoveryError};
use crate::http::{HttpClient, DEFAULT_TIMEOUT};
use crate::library_index::DEFAULT_URL;
use crate::mode::{CheckModes, ModeError, ModeSettings};
use crate::project::{Project, ProjectKind};
use crate::report::{ProjectReport, Report, RuleReport, RunConfiguration};
use crate::rule::RuleDescriptor;
use crate::schema::SchemaError;
use crate::types::{RuleLevel, RuleOutput};

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LinterError {
    /// Project discovery failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A metadata schema failed to compile.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// The configuration file is invalid.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// A mode setting is invalid.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Mode(#[from] ModeError),
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    rules: Vec<RuleDescriptor>,
    settings: ModeSettings,
    config: Option<Config>,
    services: Option<Services>,
    library_index: Option<String>,
    url_timeout: Option<Duration>,
    project_type: Option<ProjectKind>,
    recursive: Option<bool>,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one rule.
    #[must_use]
    pub fn rule(mut self, rule: RuleDescriptor) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds rules in catalog order.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleDescriptor>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the mode settings from the command line.
    #[must_use]
    pub fn settings(mut self, settings: ModeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the configuration file contents.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses prebuilt services instead of building them from the settings.
    #[must_use]
    pub fn services(mut self, services: Services) -> Self {
        self.services = Some(services);
        self
    }

    /// Sets the Library Manager index location.
    #[must_use]
    pub fn library_index(mut self, location: impl Into<String>) -> Self {
        self.library_index = Some(location.into());
        self
    }

    /// Sets the timeout for URL checks.
    #[must_use]
    pub fn url_timeout(mut self, timeout: Duration) -> Self {
        self.url_timeout = Some(timeout);
        self
    }

    /// Restricts discovery to one project kind (default: all).
    #[must_use]
    pub fn project_type(mut self, kind: ProjectKind) -> Self {
        self.project_type = Some(kind);
        self
    }

    /// Sets whether discovery descends into subfolders (default: true).
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    /// Builds the linter. Builder values win over the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration value is invalid.
    pub fn build(self) -> Result<Linter, LinterError> {
        let config = self.config.unwrap_or_default();

        let settings = ModeSettings {
            compliance: self.settings.compliance.or(config.compliance),
            library_manager: match self.settings.library_manager {
                Some(mode) => Some(mode),
                None => config.library_manager_mode()?,
            },
            official: self.settings.official.or(config.official),
        };

        let services = match self.services {
            Some(services) => services,
            None => {
                let timeout = self
                    .url_timeout
                    .or_else(|| config.url_timeout())
                    .unwrap_or(DEFAULT_TIMEOUT);
                let location = self
                    .library_index
                    .or_else(|| config.library_index.clone())
                    .unwrap_or_else(|| DEFAULT_URL.to_string());
                Services::new(HttpClient::with_timeout(timeout), location)
            }
        };

        Ok(Linter {
            rules: self.rules,
            settings,
            config,
            services,
            project_type: self.project_type.unwrap_or(ProjectKind::All),
            recursive: self.recursive.unwrap_or(true),
        })
    }
}

/// Runs the rule catalog against discovered projects.
///
/// Use [`Linter::builder()`] to construct an instance.
pub struct Linter {
    rules: Vec<RuleDescriptor>,
    settings: ModeSettings,
    config: Config,
    services: Services,
    project_type: ProjectKind,
    recursive: bool,
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the merged mode settings.
    #[must_use]
    pub fn settings(&self) -> ModeSettings {
        self.settings
    }

    /// Discovers the projects under every target, in order.
    ///
    /// # Errors
    ///
    /// Returns the first discovery error.
    pub fn discover(&self, targets: &[PathBuf]) -> Result<Vec<Project>, LinterError> {
        let mut projects = Vec::new();
        for target in targets {
            projects.extend(discovery::find_projects(
                target,
                self.project_type,
                self.recursive,
            )?);
        }
        Ok(projects)
    }

    /// Lints every project under `targets`.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or a schema does not compile.
    pub fn lint(&self, targets: &[PathBuf]) -> Result<Report, LinterError> {
        info!("Linting {} target path(s)", targets.len());
        let projects = self.discover(targets)?;
        info!("Found {} project(s)", projects.len());

        let reports = projects
            .iter()
            .map(|project| self.lint_project(project))
            .collect::<Result<Vec<_>, _>>()?;

        let report = Report::new(
            RunConfiguration {
                paths: targets.to_vec(),
                project_type: self.project_type,
                recursive: self.recursive,
            },
            reports,
        );
        info!(
            "Linting complete: {} error(s), {} warning(s)",
            report.summary.error_count, report.summary.warning_count
        );
        Ok(report)
    }

    /// Runs the catalog against one project.
    ///
    /// # Errors
    ///
    /// Returns an error if a schema does not compile.
    pub fn lint_project(&self, project: &Project) -> Result<ProjectReport, LinterError> {
        let modes = CheckModes::resolve(self.settings, project.super_kind);
        let mut report = ProjectReport::new(project, &modes);
        let ctx = ProjectContext::load(project.clone(), modes, self.services.clone())?;
        info!("Linting {} in {}", project.kind, project.path.display());

        for rule in self.rules.iter().filter(|r| r.kind == project.kind) {
            if !self.config.is_rule_enabled(rule.id) {
                debug!("Skipping rule disabled by configuration: {}", rule.id);
                continue;
            }
            let output = match rule.is_enabled(&modes) {
                Ok(false) => {
                    debug!("Rule {} disabled by check modes", rule.id);
                    continue;
                }
                Ok(true) => self.run_rule(rule, &ctx),
                Err(e) => {
                    warn!("{e}");
                    RuleOutput::not_run(e.to_string())
                }
            };

            let (output, level) = match rule.level(output.verdict, &modes) {
                Ok(level) => (output, level),
                Err(e) => {
                    warn!("{e}");
                    (RuleOutput::not_run(e.to_string()), RuleLevel::Notice)
                }
            };
            debug!(
                "Rule {} result: {} ({})",
                rule.id, output.verdict, output.context
            );
            report.record(RuleReport::new(rule, &output, level));
        }

        Ok(report)
    }

    fn run_rule(&self, rule: &RuleDescriptor, ctx: &ProjectContext) -> RuleOutput {
        let compliance = ctx.compliance();
        if !rule.applies_at(compliance) {
            return RuleOutput::skip(format!(
                "Rule not run at {compliance} compliance level"
            ));
        }
        debug!("Running rule {}: {}", rule.id, rule.brief);
        rule.run(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{CheckMode, ComplianceLevel};
    use crate::types::RuleVerdict;
    use std::fs;
    use tempfile::TempDir;

    fn fails(_: &ProjectContext) -> RuleOutput {
        RuleOutput::fail("bad")
    }

    fn passes(_: &ProjectContext) -> RuleOutput {
        RuleOutput::pass()
    }

    fn sketch() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Blink")).unwrap();
        fs::write(tmp.path().join("Blink/Blink.ino"), "void setup() {}\n").unwrap();
        tmp
    }

    fn offline() -> Services {
        Services::new(HttpClient::new(), "/nonexistent/library_index.json")
    }

    #[test]
    fn test_builder() {
        let linter = Linter::builder()
            .rule(RuleDescriptor::new(ProjectKind::Sketch, "SX001", "passes", passes))
            .services(offline())
            .build()
            .unwrap();
        assert_eq!(linter.rule_count(), 1);
    }

    #[test]
    fn builder_settings_win_over_config() {
        let config = Config::parse("compliance = \"strict\"\nofficial = true\n").unwrap();
        let linter = Linter::builder()
            .config(config.clone())
            .settings(ModeSettings {
                compliance: Some(ComplianceLevel::Permissive),
                ..ModeSettings::default()
            })
            .services(offline())
            .build()
            .unwrap();
        assert_eq!(linter.settings().compliance, Some(ComplianceLevel::Permissive));
        assert_eq!(linter.settings().official, Some(true));

        let linter = Linter::builder().config(config).services(offline()).build().unwrap();
        assert_eq!(linter.settings().compliance, Some(ComplianceLevel::Strict));
    }

    #[test]
    fn explicit_official_false_overrides_config() {
        let tmp = sketch();
        let config = Config::parse("official = true\n").unwrap();
        let linter = Linter::builder()
            .config(config.clone())
            .settings(ModeSettings {
                official: Some(false),
                ..ModeSettings::default()
            })
            .services(offline())
            .build()
            .unwrap();
        assert_eq!(linter.settings().official, Some(false));
        let report = linter.lint(&[tmp.path().to_path_buf()]).unwrap();
        assert!(!report.projects[0].configuration.official);

        let linter = Linter::builder().config(config).services(offline()).build().unwrap();
        let report = linter.lint(&[tmp.path().to_path_buf()]).unwrap();
        assert!(report.projects[0].configuration.official);
    }

    #[test]
    fn invalid_library_manager_in_config_is_an_error() {
        let config = Config::parse("library_manager = \"sometimes\"").unwrap();
        let err = Linter::builder().config(config).build().err().unwrap();
        assert!(matches!(err, LinterError::Mode(_)));
    }

    #[test]
    fn schedules_only_matching_enabled_rules() {
        let tmp = sketch();
        let linter = Linter::builder()
            .rules([
                RuleDescriptor::new(ProjectKind::Sketch, "SX001", "fails", fails),
                RuleDescriptor::new(ProjectKind::Library, "LX001", "other kind", fails),
                RuleDescriptor::new(ProjectKind::Sketch, "SX002", "official only", fails)
                    .disable(&[CheckMode::Default])
                    .enable(&[CheckMode::Official]),
                RuleDescriptor::new(ProjectKind::Sketch, "SX003", "permissive only", fails)
                    .compliance(&[ComplianceLevel::Permissive]),
                RuleDescriptor::new(ProjectKind::Sketch, "SX004", "warns", fails)
                    .warning(&[CheckMode::Default]),
            ])
            .services(offline())
            .build()
            .unwrap();

        let report = linter.lint(&[tmp.path().to_path_buf()]).unwrap();
        let rules = &report.projects[0].rules;
        let ids: Vec<_> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["SX001", "SX003", "SX004"]);
        assert_eq!(rules[1].result, RuleVerdict::Skip);
        assert_eq!(rules[2].level, RuleLevel::Warning);
        assert!(!report.passed());
        assert_eq!(report.summary.error_count, 1);
        assert_eq!(report.summary.warning_count, 1);
    }

    #[test]
    fn config_disables_rule() {
        let tmp = sketch();
        let linter = Linter::builder()
            .rule(RuleDescriptor::new(ProjectKind::Sketch, "SX001", "fails", fails))
            .config(Config::parse("[rules.SX001]\nenabled = false\n").unwrap())
            .services(offline())
            .build()
            .unwrap();
        let report = linter.lint(&[tmp.path().to_path_buf()]).unwrap();
        assert!(report.projects[0].rules.is_empty());
        assert!(report.passed());
    }

    #[test]
    fn unresolvable_tables_record_not_run() {
        let tmp = sketch();
        let linter = Linter::builder()
            .rules([
                RuleDescriptor::new(ProjectKind::Sketch, "SX001", "no enable", fails).enable(&[]),
                RuleDescriptor::new(ProjectKind::Sketch, "SX002", "no level", fails).error(&[]),
            ])
            .services(offline())
            .build()
            .unwrap();
        let report = linter.lint(&[tmp.path().to_path_buf()]).unwrap();
        let rules = &report.projects[0].rules;
        assert!(rules.iter().all(|r| r.result == RuleVerdict::NotRun));
        assert!(rules.iter().all(|r| r.level == RuleLevel::Notice));
        assert!(report.passed());
    }

    #[test]
    fn discovery_errors_abort() {
        let tmp = TempDir::new().unwrap();
        let linter = Linter::builder()
            .recursive(false)
            .services(offline())
            .build()
            .unwrap();
        let err = linter.lint(&[tmp.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, LinterError::Discovery(DiscoveryError::NoProjects(_))));
    }
}
