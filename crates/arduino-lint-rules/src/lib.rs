//! # arduino-lint-rules
//!
//! The rule catalog for arduino-lint.
//!
//! Every rule is a [`RuleDescriptor`] pairing its metadata and mode tables
//! with a plain function over a [`ProjectContext`]. Rules are grouped by the
//! kind of project they check:
//!
//! | Prefix | Project kind | Covers |
//! |--------|--------------|--------|
//! | `S` | sketch | structure, `sketch.json`, secrets |
//! | `L` | library | structure, `library.properties` fields |
//! | `P` | platform | `boards.txt`, `programmers.txt`, `platform.txt` |
//! | `I` | package index | root, packages, platforms, tools |
//!
//! ## Usage
//!
//! ```ignore
//! use arduino_lint_core::Linter;
//!
//! let linter = Linter::builder()
//!     .rules(arduino_lint_rules::catalog())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod helpers;
mod library;
mod library_properties;
mod package_index;
mod platform;
mod sketch;

#[cfg(test)]
mod test_support;

pub use catalog::{catalog, rules_for};

pub use arduino_lint_core::{ProjectContext, RuleDescriptor, RuleOutput};
