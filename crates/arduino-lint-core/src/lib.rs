//! # arduino-lint-core
//!
//! Core engine for linting Arduino projects.
//!
//! This crate provides everything the rule catalog runs on:
//!
//! - [`discovery`] to find sketches, libraries, platforms and package indexes
//!   and their subprojects
//! - per-kind loaders ([`sketch`], [`library`], [`platform`], [`package_index`])
//!   validating metadata against the [`schema`]s of every compliance level
//! - [`ProjectContext`], the read-only view a rule function receives
//! - [`RuleDescriptor`] with mode-driven enable and level resolution
//! - [`Linter`] for scheduling rules and building the [`Report`]
//!
//! ## Example
//!
//! ```ignore
//! use arduino_lint_core::Linter;
//!
//! let linter = Linter::builder()
//!     .rules(arduino_lint_rules::catalog())
//!     .build()?;
//!
//! let report = linter.lint(&["./MyLibrary".into()])?;
//! print!("{}", report.to_text(false));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod linter;
mod report;
mod rule;
mod types;

pub mod discovery;
pub mod fs;
pub mod git;
pub mod http;
pub mod library;
pub mod library_index;
pub mod mode;
pub mod package_index;
pub mod platform;
pub mod pointer;
pub mod project;
pub mod properties;
pub mod schema;
pub mod sketch;
pub mod spell;
pub mod version;

pub use config::{Config, ConfigError, RuleConfig};
pub use context::{ProjectContext, ProjectData, Services};
pub use linter::{Linter, LinterBuilder, LinterError};
pub use mode::{CheckMode, CheckModes, ComplianceLevel, LibraryManagerMode, ModeSettings};
pub use project::{Project, ProjectKind};
pub use report::{
    ProjectConfiguration, ProjectReport, Report, RuleReport, RunConfiguration, Summary,
};
pub use rule::{RuleDescriptor, RuleError, RuleFn, CONTEXT_PLACEHOLDER};
pub use types::{RuleLevel, RuleOutput, RuleVerdict};
