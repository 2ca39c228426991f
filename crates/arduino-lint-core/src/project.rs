//! Project kinds and discovered project records.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of Arduino project.
///
/// `All` is only meaningful as a discovery hint; discovered [`Project`]
/// records always carry one of the four concrete kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    /// An Arduino sketch.
    Sketch,
    /// An Arduino library.
    Library,
    /// A boards platform.
    Platform,
    /// A boards manager package index.
    PackageIndex,
    /// Any of the concrete kinds.
    All,
    /// No kind.
    None,
}

impl ProjectKind {
    /// The concrete kinds, in the order discovery tries them.
    pub const CONCRETE: [Self; 4] = [
        Self::Sketch,
        Self::Library,
        Self::Platform,
        Self::PackageIndex,
    ];

    /// Returns the rule ID prefix for this kind, if it is concrete.
    #[must_use]
    pub fn rule_prefix(self) -> Option<char> {
        match self {
            Self::Sketch => Some('S'),
            Self::Library => Some('L'),
            Self::Platform => Some('P'),
            Self::PackageIndex => Some('I'),
            Self::All | Self::None => None,
        }
    }

    /// Returns `true` if a project of kind `other` satisfies this hint.
    #[must_use]
    pub fn matches(self, other: Self) -> bool {
        match self {
            Self::All => other != Self::None,
            Self::None => false,
            _ => self == other,
        }
    }

    /// Returns the human-readable name used in report text.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Sketch => "sketch",
            Self::Library => "library",
            Self::Platform => "platform",
            Self::PackageIndex => "package index",
            Self::All => "any project type",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sketch => "sketch",
            Self::Library => "library",
            Self::Platform => "platform",
            Self::PackageIndex => "package-index",
            Self::All => "all",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Error returned when a project kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid project type: {0:?} (expected one of: sketch, library, platform, package-index, all)")]
pub struct ParseProjectKindError(pub String);

impl std::str::FromStr for ProjectKind {
    type Err = ParseProjectKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sketch" => Ok(Self::Sketch),
            "library" => Ok(Self::Library),
            "platform" => Ok(Self::Platform),
            "package-index" | "package_index" | "packageindex" => Ok(Self::PackageIndex),
            "all" => Ok(Self::All),
            _ => Err(ParseProjectKindError(s.to_string())),
        }
    }
}

/// A discovered project.
///
/// `super_kind` is the kind of the apex ancestor. It equals `kind` for
/// top-level projects and is inherited unchanged by every subproject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project root directory.
    pub path: PathBuf,
    /// Kind of this project.
    pub kind: ProjectKind,
    /// Kind of the apex superproject.
    pub super_kind: ProjectKind,
}

impl Project {
    /// Creates a top-level project.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ProjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
            super_kind: kind,
        }
    }

    /// Creates a subproject of `parent`.
    #[must_use]
    pub fn subproject(parent: &Self, path: impl Into<PathBuf>, kind: ProjectKind) -> Self {
        Self {
            path: path.into(),
            kind,
            super_kind: parent.super_kind,
        }
    }

    /// Returns the project root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if this is a top-level project.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.kind == self.super_kind
    }
}
