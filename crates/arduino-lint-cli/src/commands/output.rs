//! Shared output formatting for lint reports and errors.

use anyhow::{Context, Result};
use arduino_lint_core::mode::ModeError;
use arduino_lint_core::{ConfigError, LinterError, Report};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use std::path::Path;

use crate::OutputFormat;

/// Prints the report to stdout in the specified format.
pub fn print(report: &Report, format: OutputFormat, verbose: bool) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_text(verbose)),
        OutputFormat::Json => println!("{}", report.to_json(verbose)?),
    }
    Ok(())
}

/// Writes the complete JSON report to `path`.
pub fn write_report_file(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write report file: {}", path.display()))?;
    tracing::debug!("Report written to {}", path.display());
    Ok(())
}

/// Renders a fatal error, using the diagnostic form when one is available.
pub fn render_error(error: &anyhow::Error) -> String {
    let diagnostic: Option<&dyn Diagnostic> = error
        .downcast_ref::<LinterError>()
        .map(|e| e as &dyn Diagnostic)
        .or_else(|| error.downcast_ref::<ConfigError>().map(|e| e as &dyn Diagnostic))
        .or_else(|| error.downcast_ref::<ModeError>().map(|e| e as &dyn Diagnostic));

    if let Some(diagnostic) = diagnostic {
        let mut out = String::new();
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(4096);
        if handler.render_report(&mut out, diagnostic).is_ok() {
            return out;
        }
    }
    format!("Error: {error:#}")
}
