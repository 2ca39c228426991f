//! Mode tables, documentation links and checks shared by several rule families.

use arduino_lint_core::fs::{file_name, files_in, walk};
use arduino_lint_core::sketch::has_supported_extension;
use arduino_lint_core::CheckMode;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub(crate) const DEFAULT: &[CheckMode] = &[CheckMode::Default];
pub(crate) const STRICT: &[CheckMode] = &[CheckMode::Strict];
pub(crate) const OFFICIAL: &[CheckMode] = &[CheckMode::Official];
pub(crate) const SUBMISSION: &[CheckMode] = &[CheckMode::LibraryManagerSubmission];
pub(crate) const INDEXED: &[CheckMode] = &[CheckMode::LibraryManagerIndexed];
pub(crate) const LIBRARY_MANAGER: &[CheckMode] = &[
    CheckMode::LibraryManagerSubmission,
    CheckMode::LibraryManagerIndexed,
];
pub(crate) const LIBRARY_MANAGER_OR_STRICT: &[CheckMode] = &[
    CheckMode::LibraryManagerSubmission,
    CheckMode::LibraryManagerIndexed,
    CheckMode::Strict,
];

pub(crate) const SKETCH_SPEC_URL: &str =
    "https://arduino.github.io/arduino-cli/latest/sketch-specification/";
pub(crate) const LIBRARY_SPEC_URL: &str =
    "https://arduino.github.io/arduino-cli/latest/library-specification/";
pub(crate) const PLATFORM_SPEC_URL: &str =
    "https://arduino.github.io/arduino-cli/latest/platform-specification/";
pub(crate) const PACKAGE_INDEX_SPEC_URL: &str =
    "https://arduino.github.io/arduino-cli/latest/package_index_json-specification/";
pub(crate) const LIBRARY_MANAGER_FAQ_URL: &str =
    "https://github.com/arduino/library-registry/blob/main/FAQ.md";
pub(crate) const README_URL: &str =
    "https://docs.github.com/repositories/managing-your-repositorys-settings-and-features/customizing-your-repository/about-readmes";
pub(crate) const LICENSE_URL: &str =
    "https://docs.github.com/repositories/managing-your-repositorys-settings-and-features/customizing-your-repository/licensing-a-repository";

/// Longest file or folder name the Arduino tools accept.
pub(crate) const PATH_BASE_NAME_MAX_LENGTH: usize = 63;

static VALID_BASE_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_.-]*$").ok());

static README_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^readme\.(markdown|mdown|mkdn|md|textile|rdoc|org|creole|mediawiki|wiki|rst|asciidoc|adoc|asc|pod|txt)$",
    )
    .ok()
});

static LICENSE_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(((un)?licen[sc]e)|(copy(ing|right))|(ofl)|(patents))(\.((md)|(markdown)|(txt)|(html)))?$",
    )
    .ok()
});

static ARDUINO_H_INCLUDE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^\s*#\s*include\s*["<](a(?i:rduino)|ARDUINO)\.[hH][">]"#).ok());

/// Returns `true` if `name` only uses the characters allowed in file and folder names.
pub(crate) fn valid_base_name(name: &str) -> bool {
    VALID_BASE_NAME.as_ref().is_some_and(|r| r.is_match(name))
}

/// Finds a path whose name equals `correct` ignoring case but not exactly.
///
/// Nothing is reported when the correctly cased name is also present.
pub(crate) fn incorrect_case(paths: &[PathBuf], correct: &str) -> Option<PathBuf> {
    if paths.iter().any(|p| file_name(p) == correct) {
        return None;
    }
    paths
        .iter()
        .find(|p| file_name(p).eq_ignore_ascii_case(correct))
        .cloned()
}

/// Finds a path whose name matches a misspelling of `correct`.
pub(crate) fn misspelled_name(
    paths: &[PathBuf],
    correct: &str,
    misspelling: &Regex,
) -> Option<PathBuf> {
    if paths.iter().any(|p| file_name(p) == correct) {
        return None;
    }
    paths
        .iter()
        .find(|p| misspelling.is_match(&file_name(p)))
        .cloned()
}

/// Paths rendered relative to `root` when possible.
pub(crate) fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Returns `true` if a readme is in the project root, `docs/` or `.github/`.
pub(crate) fn has_readme(root: &Path) -> bool {
    let Some(re) = README_NAME.as_ref() else {
        return false;
    };
    [root.to_path_buf(), root.join("docs"), root.join(".github")]
        .iter()
        .flat_map(|dir| files_in(dir))
        .any(|f| re.is_match(&file_name(&f)))
}

/// Returns `true` if a license file is in the project root.
pub(crate) fn has_license(root: &Path) -> bool {
    let Some(re) = LICENSE_NAME.as_ref() else {
        return false;
    };
    files_in(root).iter().any(|f| re.is_match(&file_name(f)))
}

/// Symlinks below `root`, relative to it.
pub(crate) fn symlinks(root: &Path) -> Vec<String> {
    walk(root)
        .filter(walkdir::DirEntry::path_is_symlink)
        .map(|e| display_relative(root, e.path()))
        .collect()
}

/// `#include` directives of `Arduino.h` with the wrong case, as `file:line: text`.
pub(crate) fn incorrect_arduino_h_case<'a, I>(root: &Path, files: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Path>,
{
    let Some(re) = ARDUINO_H_INCLUDE.as_ref() else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for file in files {
        if !has_supported_extension(file) {
            continue;
        }
        let Ok(content) = std::fs::read(file) else {
            continue;
        };
        let content = String::from_utf8_lossy(&content);
        for (number, line) in content.lines().enumerate() {
            if re.is_match(line) {
                found.push(format!(
                    "{}:{}: {}",
                    display_relative(root, file),
                    number + 1,
                    line.trim()
                ));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // --- name tests ---

    #[test]
    fn base_name_characters() {
        assert!(valid_base_name("My_Library-2.0"));
        assert!(!valid_base_name("-leading"));
        assert!(!valid_base_name("has space"));
        assert!(!valid_base_name(""));
    }

    #[test]
    fn incorrect_case_ignores_exact_match() {
        let paths = vec![PathBuf::from("lib/Src"), PathBuf::from("lib/src")];
        assert_eq!(incorrect_case(&paths, "src"), None);
        assert_eq!(
            incorrect_case(&paths[..1], "src"),
            Some(PathBuf::from("lib/Src"))
        );
    }

    #[test]
    fn misspelled_name_matches_regex() {
        let re = Regex::new("(?i)^extra$").unwrap();
        let paths = vec![PathBuf::from("lib/Extra")];
        assert_eq!(misspelled_name(&paths, "extras", &re), Some(PathBuf::from("lib/Extra")));
        assert_eq!(misspelled_name(&[PathBuf::from("lib/extras")], "extras", &re), None);
    }

    // --- documentation tests ---

    #[test]
    fn readme_found_in_docs_folder() {
        let tmp = TempDir::new().unwrap();
        assert!(!has_readme(tmp.path()));
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs/README.adoc"), "").unwrap();
        assert!(has_readme(tmp.path()));
    }

    #[test]
    fn license_names() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("LICENSE.txt"), "").unwrap();
        assert!(has_license(tmp.path()));

        let other = TempDir::new().unwrap();
        fs::write(other.path().join("LICENSE.pdf"), "").unwrap();
        assert!(!has_license(other.path()));
    }

    // --- code tests ---

    #[test]
    fn arduino_h_case() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("Foo.ino");
        fs::write(
            &file,
            "#include <Arduino.h>\n#include \"arduino.h\"\n  #  include <ARDUINO.H>\n#include <ArduinoJson.h>\n",
        )
        .unwrap();

        let found = incorrect_arduino_h_case(tmp.path(), [file.as_path()]);
        assert_eq!(
            found,
            vec![
                "Foo.ino:2: #include \"arduino.h\"".to_string(),
                "Foo.ino:3: #  include <ARDUINO.H>".to_string(),
            ]
        );
    }
}
