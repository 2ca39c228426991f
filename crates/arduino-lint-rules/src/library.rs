//! Library structure (`LS`), documentation (`LD`) and code (`LC`) rules.

use crate::helpers::{
    display_relative, has_license, has_readme, incorrect_arduino_h_case, incorrect_case,
    misspelled_name, symlinks, valid_base_name, DEFAULT, LIBRARY_MANAGER,
    LIBRARY_MANAGER_FAQ_URL, LIBRARY_MANAGER_OR_STRICT, LIBRARY_SPEC_URL, LICENSE_URL,
    PATH_BASE_NAME_MAX_LENGTH, README_URL, STRICT,
};
use arduino_lint_core::fs::{dirs_in, file_name, walk};
use arduino_lint_core::library::{
    contains_header_file, LibraryLayout, EXAMPLES_FOLDER_NAMES, METADATA_FILENAME,
};
use arduino_lint_core::sketch::contains_main_file;
use arduino_lint_core::{ProjectContext, ProjectKind, RuleDescriptor, RuleFn, RuleOutput};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::trace;

static MISSPELLED_EXTRAS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^extra$").ok());

static MISSPELLED_EXAMPLES: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^e((x)|(xs)|(s))((am)|(ma))p((le)|(el))s?$").ok()
});

/// Returns the library structure, documentation and code rules in catalog order.
#[must_use]
pub fn rules() -> Vec<RuleDescriptor> {
    let rule = |id: &'static str, brief: &'static str, func: RuleFn| {
        RuleDescriptor::new(ProjectKind::Library, id, brief, func).reference(LIBRARY_SPEC_URL)
    };
    vec![
        rule("LS001", "invalid library", invalid_library)
            .category("structure", "general")
            .description("A library must contain a header file in its source folder to be recognised by the Arduino tools.")
            .message("No header files found in the library's source folder. A library must contain a header file."),
        rule("LS002", "folder name too long", folder_name_too_long)
            .category("structure", "general")
            .description("The library folder name may be at most 63 characters.")
            .message("Library folder name {} exceeds the maximum length of 63 characters."),
        rule("LS003", "prohibited characters in folder name", prohibited_characters_in_folder_name)
            .category("structure", "general")
            .description("Library folder names may only contain letters, numbers, underscores, dots and dashes.")
            .message("Prohibited characters in folder name: {}. Folder names may only contain letters, numbers, underscores, dots and dashes."),
        rule("LS004", "submodule", has_submodule)
            .category("structure", "general")
            .description("Library Manager downloads releases without submodule content.")
            .message("Git submodule detected. Library Manager installations and downloads do not include submodule files.")
            .reference(LIBRARY_MANAGER_FAQ_URL)
            .disable(DEFAULT)
            .enable(LIBRARY_MANAGER),
        rule("LS005", "symlink", has_symlinks)
            .category("structure", "general")
            .description("Symlinks are not supported in Library Manager installations.")
            .message("Symlink(s) found: {}. Symlinks are not supported in libraries.")
            .warning(DEFAULT)
            .error(LIBRARY_MANAGER_OR_STRICT),
        rule("LS006", ".development file", has_dot_development)
            .category("structure", "general")
            .description("A .development file marks a library as unreleased; Library Manager rejects it.")
            .message(".development file found. Library Manager does not index libraries with this file.")
            .reference(LIBRARY_MANAGER_FAQ_URL)
            .disable(DEFAULT)
            .enable(LIBRARY_MANAGER),
        rule("LS007", ".exe file", has_exe)
            .category("structure", "general")
            .description("Executables are not allowed in Library Manager releases.")
            .message(".exe file(s) found: {}. Executables are not allowed in libraries."),
        rule("LS008", "incorrect src folder case", incorrect_src_folder_case)
            .category("structure", "src folder")
            .description("The source folder of a recursive layout library must be named exactly \"src\".")
            .message("Incorrect src folder name case: {}. This causes the library to not be recognised on a filename case-sensitive OS such as Linux."),
        rule("LS009", "utility folder in recursive layout", recursive_with_utility_folder)
            .category("structure", "utility folder")
            .description("The utility folder only has special meaning for flat layout libraries.")
            .message("utility folder found in a recursive layout library. Place all source files under src.")
            .warning(DEFAULT),
        rule("LS010", "misspelled extras folder name", misspelled_extras)
            .category("structure", "miscellaneous")
            .description("The extras folder is reserved for material that should not be compiled.")
            .message("Potentially misspelled extras folder name: {}. The correct spelling is \"extras\".")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LS011", "incorrect extras folder case", incorrect_extras_case)
            .category("structure", "miscellaneous")
            .description("The extras folder must be named exactly \"extras\".")
            .message("Incorrect extras folder name case: {}. The folder must be named \"extras\".")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LS012", "stray sketch", stray_sketches)
            .category("structure", "miscellaneous")
            .description("Sketches belong in the examples or extras folder of a library.")
            .message("Sketch(es) found outside examples and extras folders: {}")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LS013", "redundant library.properties", redundant_library_properties)
            .category("structure", "miscellaneous")
            .description("library.properties belongs in the library root, not in src.")
            .message("Redundant library.properties file found at {}")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LD001", "no readme", no_readme)
            .category("documentation", "")
            .description("A readme file explains what the library does and how to use it.")
            .message("No readme found. Please document your library.")
            .reference(README_URL)
            .warning(DEFAULT)
            .error(STRICT),
        rule("LD002", "no license file", no_license)
            .category("documentation", "")
            .description("A license file tells others what they may do with the library.")
            .message("No license file found.")
            .reference(LICENSE_URL)
            .warning(DEFAULT)
            .error(STRICT),
        rule("LD003", "no examples", no_examples)
            .category("documentation", "")
            .description("Example sketches demonstrate how to use the library.")
            .message("No example sketches found. Please provide examples.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LD004", "misspelled examples folder name", misspelled_examples)
            .category("documentation", "")
            .description("The examples folder must be spelled \"examples\" for the Arduino IDE to show them.")
            .message("Potentially misspelled examples folder name: {}. The correct spelling is \"examples\".")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LD005", "incorrect examples folder case", incorrect_examples_case)
            .category("documentation", "")
            .description("The examples folder must be named exactly \"examples\".")
            .message("Incorrect examples folder name case: {}. The folder must be named \"examples\".")
            .warning(DEFAULT)
            .error(STRICT),
        rule("LC001", "incorrect Arduino.h case", incorrect_arduino_h)
            .category("code", "")
            .description("The core library header is named Arduino.h; other cases fail on case sensitive file systems.")
            .message("Incorrect case of Arduino.h in #include directive: {}"),
    ]
}

fn invalid_library(ctx: &ProjectContext) -> RuleOutput {
    let valid = ctx
        .library()
        .is_some_and(|lib| lib.load_error().is_none() && contains_header_file(&lib.source_dir));
    RuleOutput::pass_if(valid, "")
}

fn folder_name_too_long(ctx: &ProjectContext) -> RuleOutput {
    let name = file_name(ctx.path());
    RuleOutput::pass_if(name.chars().count() <= PATH_BASE_NAME_MAX_LENGTH, name)
}

fn prohibited_characters_in_folder_name(ctx: &ProjectContext) -> RuleOutput {
    let name = file_name(ctx.path());
    RuleOutput::pass_if(valid_base_name(&name), name)
}

fn has_submodule(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(!ctx.path().join(".gitmodules").is_file(), "")
}

fn has_symlinks(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::fail_if_any(symlinks(ctx.path()))
}

fn has_dot_development(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(!ctx.path().join(".development").is_file(), "")
}

fn has_exe(ctx: &ProjectContext) -> RuleOutput {
    let root = ctx.path();
    let pattern = format!(
        "{}/**/*.exe",
        glob::Pattern::escape(&root.to_string_lossy())
    );
    let Ok(paths) = glob::glob(&pattern) else {
        return RuleOutput::not_run("Unable to search the library for executables");
    };
    RuleOutput::fail_if_any(
        paths
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .map(|p| display_relative(root, &p)),
    )
}

fn incorrect_src_folder_case(ctx: &ProjectContext) -> RuleOutput {
    let root = ctx.path();
    let has_metadata = root.join(METADATA_FILENAME).is_file();
    if has_metadata && contains_header_file(root) {
        return RuleOutput::skip("Not applicable due to layout type");
    }
    match incorrect_case(&dirs_in(root), "src") {
        Some(dir) => RuleOutput::fail(file_name(&dir)),
        None => RuleOutput::pass(),
    }
}

fn recursive_with_utility_folder(ctx: &ProjectContext) -> RuleOutput {
    let Some(library) = ctx.library() else {
        return RuleOutput::not_run("Library not loaded");
    };
    if library.load_error().is_some() {
        return RuleOutput::not_run("Library not loaded");
    }
    if library.layout == LibraryLayout::Flat {
        return RuleOutput::skip("Not applicable due to layout type");
    }
    RuleOutput::pass_if(!ctx.path().join("utility").exists(), "")
}

fn misspelled_folder(
    root: &Path,
    correct: &str,
    misspelling: &LazyLock<Option<Regex>>,
) -> RuleOutput {
    let Some(re) = misspelling.as_ref() else {
        return RuleOutput::pass();
    };
    match misspelled_name(&dirs_in(root), correct, re) {
        Some(dir) => RuleOutput::fail(file_name(&dir)),
        None => RuleOutput::pass(),
    }
}

fn misspelled_extras(ctx: &ProjectContext) -> RuleOutput {
    misspelled_folder(ctx.path(), "extras", &MISSPELLED_EXTRAS)
}

fn incorrect_extras_case(ctx: &ProjectContext) -> RuleOutput {
    match incorrect_case(&dirs_in(ctx.path()), "extras") {
        Some(dir) => RuleOutput::fail(file_name(&dir)),
        None => RuleOutput::pass(),
    }
}

fn stray_sketches(ctx: &ProjectContext) -> RuleOutput {
    let root = ctx.path();
    let mut stray = Vec::new();
    if contains_main_file(root) {
        stray.push(root.display().to_string());
    }
    for top in dirs_in(root) {
        let name = file_name(&top);
        if name == "examples" || name == "extras" {
            continue;
        }
        stray.extend(
            walk(&top)
                .filter(|e| e.file_type().is_dir() && contains_main_file(e.path()))
                .map(|e| display_relative(root, e.path())),
        );
    }
    RuleOutput::fail_if_any(stray)
}

fn redundant_library_properties(ctx: &ProjectContext) -> RuleOutput {
    let path = ctx.path().join("src").join(METADATA_FILENAME);
    RuleOutput::pass_if(!path.exists(), display_relative(ctx.path(), &path))
}

fn no_readme(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(has_readme(ctx.path()), "")
}

fn no_license(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(has_license(ctx.path()), "")
}

fn no_examples(ctx: &ProjectContext) -> RuleOutput {
    let found = EXAMPLES_FOLDER_NAMES.iter().any(|folder| {
        let dir = ctx.path().join(folder);
        trace!("Looking for examples in {}", dir.display());
        walk(&dir).any(|e| e.file_type().is_dir() && contains_main_file(e.path()))
    });
    RuleOutput::pass_if(found, "")
}

fn misspelled_examples(ctx: &ProjectContext) -> RuleOutput {
    misspelled_folder(ctx.path(), "examples", &MISSPELLED_EXAMPLES)
}

fn incorrect_examples_case(ctx: &ProjectContext) -> RuleOutput {
    match incorrect_case(&dirs_in(ctx.path()), "examples") {
        Some(dir) => RuleOutput::fail(file_name(&dir)),
        None => RuleOutput::pass(),
    }
}

fn incorrect_arduino_h(ctx: &ProjectContext) -> RuleOutput {
    let root = ctx.path();
    let files: Vec<_> = walk(root)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();
    RuleOutput::fail_if_any(incorrect_arduino_h_case(
        root,
        files.iter().map(std::path::PathBuf::as_path),
    ))
}
