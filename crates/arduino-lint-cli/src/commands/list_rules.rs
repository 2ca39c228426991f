//! List rules command implementation.

use arduino_lint_core::{ProjectKind, RuleDescriptor};
use std::fmt::Write;

/// Runs the list-rules command.
pub fn run() {
    print!("{}", table(&arduino_lint_rules::catalog()));
}

fn table(rules: &[RuleDescriptor]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available rules:\n");
    let _ = writeln!(out, "{:<8} {:<15} Brief", "ID", "Project type");
    let _ = writeln!(out, "{}", "-".repeat(80));

    for rule in rules {
        let _ = writeln!(
            out,
            "{:<8} {:<15} {}",
            rule.id,
            rule.kind.display_name(),
            rule.brief
        );
    }

    let _ = writeln!(out, "\nTotal: {} rules", rules.len());
    for kind in ProjectKind::CONCRETE {
        let count = rules.iter().filter(|r| r.kind == kind).count();
        let _ = writeln!(out, "  {:<15} {count}", kind.display_name());
    }
    out
}
