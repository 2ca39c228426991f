//! arduino-lint CLI tool.
//!
//! Usage:
//! ```bash
//! arduino-lint [OPTIONS] [PROJECT_PATH]...
//! arduino-lint --list-rules
//! arduino-lint --version
//! ```

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter for Arduino sketches, libraries, platforms and package indexes
#[derive(Parser)]
#[command(name = "arduino-lint")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Project paths to lint (default: current directory)
    #[arg(value_name = "PROJECT_PATH")]
    paths: Vec<PathBuf>,

    /// Compliance level: strict, specification or permissive
    #[arg(long)]
    compliance: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Library Manager context: submit, update or false
    #[arg(long)]
    library_manager: Option<String>,

    /// Only lint projects of this type: sketch, library, platform, package-index or all
    #[arg(long, default_value = "all")]
    project_type: String,

    /// Search project paths recursively
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    recursive: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    report_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print version information and exit
    #[arg(long)]
    version: bool,

    /// List the rule catalog and exit
    #[arg(long)]
    list_rules: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lint as an official Arduino project
    #[arg(long, env = "ARDUINO_LINT_OFFICIAL", hide = true, action = ArgAction::Set)]
    official: Option<bool>,

    /// URL or path of the Library Manager index
    #[arg(long, env = "ARDUINO_LINT_LIBRARY_MANAGER_INDEX", hide = true)]
    library_index: Option<String>,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprint!("{e}");
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", commands::output::render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the invocation. Returns whether the run passed.
fn run(cli: Cli) -> Result<bool> {
    if cli.version {
        commands::version::run(cli.format)?;
        return Ok(true);
    }
    if cli.list_rules {
        commands::list_rules::run();
        return Ok(true);
    }

    let options = commands::check::CheckOptions {
        paths: if cli.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            cli.paths
        },
        compliance: cli.compliance,
        library_manager: cli.library_manager,
        project_type: cli.project_type,
        recursive: cli.recursive,
        official: cli.official,
        library_index: cli.library_index,
        format: cli.format,
        report_file: cli.report_file,
        verbose: cli.verbose,
        config: cli.config,
    };
    commands::check::run(&options)
}
