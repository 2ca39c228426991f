//! Sketch rules (`S` prefix).
//!
//! Structure (`SS`), metadata (`SM`), documentation (`SD`) and code (`SC`)
//! checks against the sketch specification.

use crate::helpers::{
    has_license, has_readme, incorrect_arduino_h_case, incorrect_case, symlinks,
    valid_base_name, DEFAULT, LICENSE_URL, PATH_BASE_NAME_MAX_LENGTH, README_URL,
    SKETCH_SPEC_URL, STRICT,
};
use arduino_lint_core::fs::{dirs_in, file_name, files_in};
use arduino_lint_core::sketch::{has_supported_extension, MAIN_EXTENSIONS};
use arduino_lint_core::{
    ComplianceLevel, ProjectContext, ProjectKind, RuleDescriptor, RuleFn, RuleOutput,
};
use std::path::PathBuf;

const NO_SKETCH_DATA: &str = "Sketch data not loaded";

/// Returns the sketch rules in catalog order.
#[must_use]
pub fn rules() -> Vec<RuleDescriptor> {
    let rule = |id: &'static str, brief: &'static str, func: RuleFn| {
        RuleDescriptor::new(ProjectKind::Sketch, id, brief, func).reference(SKETCH_SPEC_URL)
    };
    vec![
        rule("SS001", "name mismatch", name_mismatch)
            .category("structure", "")
            .description("The primary sketch file name must match the sketch folder name.")
            .message("Sketch file/folder name mismatch. The primary sketch file name must match the folder: {}"),
        rule("SS002", "prohibited characters in file name", prohibited_characters_in_file_name)
            .category("structure", "file name")
            .description("Sketch file names may only contain letters, numbers, underscores, dots and dashes, and must not start with a dot or dash.")
            .message("Prohibited characters in file name(s): {}. File names may only contain letters, numbers, underscores, dots and dashes."),
        rule("SS003", "file name too long", file_name_too_long)
            .category("structure", "file name")
            .description("Sketch file names must be 63 characters or less, not counting the extension.")
            .message("File name(s): {} exceed maximum length. Sketch file names must be 63 characters or less."),
        rule("SS004", ".pde extension", pde_extension)
            .category("structure", "file name")
            .description("The .pde extension is still supported but deprecated. The recommended extension is .ino.")
            .message("Use of deprecated .pde extension in: {}. Use .ino for sketch files.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("SS005", "incorrect src folder case", incorrect_src_folder_case)
            .category("structure", "folder")
            .description("The src subfolder of a sketch must be named exactly \"src\"; other cases are not compiled on case sensitive file systems.")
            .message("Incorrect case of src subfolder name: {}. The subfolder must be named \"src\"."),
        rule("SS006", "symlink", contains_symlinks)
            .category("structure", "")
            .description("Symlinks are not supported in Arduino sketches.")
            .message("Symlink(s) found: {}. Symlinks are not supported.")
            .warning(DEFAULT)
            .error(STRICT),
        rule("SM001", "sketch.json JSON format", metadata_json_format)
            .category("metadata", "")
            .description("The sketch.json metadata file must be valid JSON.")
            .message("sketch.json is not a valid JSON document: {}"),
        rule("SM002", "sketch.json data format", metadata_data_format)
            .category("metadata", "")
            .description("The sketch.json metadata file must match its schema.")
            .message("sketch.json has an invalid data format. It should be left for the Arduino IDE to manage."),
        rule("SD001", "no readme", no_readme)
            .category("documentation", "")
            .description("A readme file explains what the sketch does and how to use it.")
            .message("No readme found. Please document your sketch.")
            .reference(README_URL)
            .info(DEFAULT)
            .warning(STRICT),
        rule("SD002", "no license file", no_license)
            .category("documentation", "")
            .description("A license file tells others what they may do with the sketch.")
            .message("No license file found.")
            .reference(LICENSE_URL)
            .info(DEFAULT)
            .warning(STRICT),
        rule("SC001", "incorrect Arduino.h case", incorrect_arduino_h)
            .category("code", "")
            .description("The core library header is named Arduino.h; other cases fail on case sensitive file systems.")
            .message("Incorrect case of Arduino.h in #include directive: {}"),
    ]
}

fn root_sketch_files(ctx: &ProjectContext) -> Vec<PathBuf> {
    files_in(ctx.path())
        .into_iter()
        .filter(|f| has_supported_extension(f))
        .collect()
}

fn name_mismatch(ctx: &ProjectContext) -> RuleOutput {
    let Some(sketch) = ctx.sketch() else {
        return RuleOutput::not_run(NO_SKETCH_DATA);
    };
    let folder = file_name(ctx.path());
    let matched = sketch.main_files.iter().any(|f| {
        MAIN_EXTENSIONS
            .iter()
            .any(|ext| file_name(f) == format!("{folder}.{ext}"))
    });
    RuleOutput::pass_if(matched, format!("{folder}.ino"))
}

fn prohibited_characters_in_file_name(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::fail_if_any(
        root_sketch_files(ctx)
            .iter()
            .map(|f| file_name(f))
            .filter(|name| !valid_base_name(name)),
    )
}

fn file_name_too_long(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::fail_if_any(root_sketch_files(ctx).iter().filter_map(|f| {
        let stem = f.file_stem()?.to_string_lossy().into_owned();
        (stem.chars().count() > PATH_BASE_NAME_MAX_LENGTH).then(|| file_name(f))
    }))
}

fn pde_extension(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::fail_if_any(
        files_in(ctx.path())
            .iter()
            .filter(|f| f.extension().is_some_and(|e| e == "pde"))
            .map(|f| file_name(f)),
    )
}

fn incorrect_src_folder_case(ctx: &ProjectContext) -> RuleOutput {
    match incorrect_case(&dirs_in(ctx.path()), "src") {
        Some(dir) => RuleOutput::fail(file_name(&dir)),
        None => RuleOutput::pass(),
    }
}

fn contains_symlinks(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::fail_if_any(symlinks(ctx.path()))
}

fn metadata_json_format(ctx: &ProjectContext) -> RuleOutput {
    let Some(sketch) = ctx.sketch() else {
        return RuleOutput::not_run(NO_SKETCH_DATA);
    };
    match &sketch.metadata {
        None => RuleOutput::skip("No metadata file"),
        Some(metadata) => match &metadata.document {
            Ok(_) => RuleOutput::pass(),
            Err(e) => RuleOutput::fail(e.clone()),
        },
    }
}

fn metadata_data_format(ctx: &ProjectContext) -> RuleOutput {
    let Some(sketch) = ctx.sketch() else {
        return RuleOutput::not_run(NO_SKETCH_DATA);
    };
    let Some(metadata) = &sketch.metadata else {
        return RuleOutput::skip("No metadata file");
    };
    match &metadata.validation {
        Some(results) => RuleOutput::pass_if(
            results.get(ComplianceLevel::Permissive).is_valid(),
            "",
        ),
        None => RuleOutput::not_run("Metadata file failed to load"),
    }
}

fn no_readme(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(has_readme(ctx.path()), "")
}

fn no_license(ctx: &ProjectContext) -> RuleOutput {
    RuleOutput::pass_if(has_license(ctx.path()), "")
}

fn incorrect_arduino_h(ctx: &ProjectContext) -> RuleOutput {
    let Some(sketch) = ctx.sketch() else {
        return RuleOutput::not_run(NO_SKETCH_DATA);
    };
    RuleOutput::fail_if_any(incorrect_arduino_h_case(
        ctx.path(),
        sketch.code_files.iter().map(PathBuf::as_path),
    ))
}
