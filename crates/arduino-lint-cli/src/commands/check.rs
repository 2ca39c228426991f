//! Lint command implementation.

use anyhow::{anyhow, Context, Result};
use arduino_lint_core::{
    ComplianceLevel, Config, LibraryManagerMode, Linter, ModeSettings, ProjectKind,
};
use std::path::PathBuf;

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Everything the lint command needs from the command line.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Project paths, never empty.
    pub paths: Vec<PathBuf>,
    /// Raw `--compliance` value.
    pub compliance: Option<String>,
    /// Raw `--library-manager` value.
    pub library_manager: Option<String>,
    /// Raw `--project-type` value.
    pub project_type: String,
    /// Search subfolders.
    pub recursive: bool,
    /// Official check mode, when given on the command line or environment.
    pub official: Option<bool>,
    /// Library Manager index override.
    pub library_index: Option<String>,
    /// Report format on stdout.
    pub format: OutputFormat,
    /// JSON report destination.
    pub report_file: Option<PathBuf>,
    /// List passing outcomes too.
    pub verbose: bool,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

/// Runs the lint command. Returns whether every project passed.
pub fn run(options: &CheckOptions) -> Result<bool> {
    let settings = ModeSettings {
        compliance: options
            .compliance
            .as_deref()
            .map(str::parse::<ComplianceLevel>)
            .transpose()?,
        library_manager: match options.library_manager.as_deref() {
            Some(value) => LibraryManagerMode::parse_flag(value)?,
            None => None,
        },
        official: options.official,
    };
    let project_type: ProjectKind = options
        .project_type
        .parse()
        .map_err(|e| anyhow!("Configuration error: {e}"))?;

    let config = load_config(options)?;

    let mut builder = Linter::builder()
        .rules(arduino_lint_rules::catalog())
        .settings(settings)
        .config(config)
        .project_type(project_type)
        .recursive(options.recursive);
    if let Some(location) = &options.library_index {
        builder = builder.library_index(location);
    }
    let linter = builder.build()?;

    tracing::debug!(
        "Linting {} path(s) with {} rules",
        options.paths.len(),
        linter.rule_count()
    );

    let report = linter.lint(&options.paths)?;

    super::output::print(&report, options.format, options.verbose)?;

    if let Some(path) = &options.report_file {
        super::output::write_report_file(&report, path)?;
    }

    Ok(report.passed())
}

fn load_config(options: &CheckOptions) -> Result<Config> {
    let first = options.paths.first().map_or(PathBuf::from("."), Clone::clone);
    let source = config_resolver::resolve(&first, options.config.as_deref());
    match source {
        ConfigSource::Default => Ok(Config::default()),
        ref other => {
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}
