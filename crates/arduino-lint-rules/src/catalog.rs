//! The full rule catalog.

use arduino_lint_core::{ProjectKind, RuleDescriptor};

/// Returns every rule, grouped by project kind and ordered by ID within a family.
#[must_use]
pub fn catalog() -> Vec<RuleDescriptor> {
    let mut rules = crate::sketch::rules();
    rules.extend(crate::library::rules());
    rules.extend(crate::library_properties::rules());
    rules.extend(crate::platform::rules());
    rules.extend(crate::package_index::rules());
    rules
}

/// Returns the rules that apply to projects of `kind`.
#[must_use]
pub fn rules_for(kind: ProjectKind) -> Vec<RuleDescriptor> {
    catalog().into_iter().filter(|r| r.kind == kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arduino_lint_core::{
        CheckMode, CheckModes, ComplianceLevel, LibraryManagerMode, ModeSettings, RuleLevel,
        RuleVerdict,
    };
    use std::collections::HashSet;

    fn all_modes() -> Vec<CheckModes> {
        let mut modes = Vec::new();
        for compliance in ComplianceLevel::ALL {
            for library_manager in [
                LibraryManagerMode::Submit,
                LibraryManagerMode::Update,
                LibraryManagerMode::False,
            ] {
                for official in [false, true] {
                    let settings = ModeSettings {
                        compliance: Some(compliance),
                        library_manager: Some(library_manager),
                        official: Some(official),
                    };
                    modes.push(CheckModes::resolve(settings, ProjectKind::Library));
                }
            }
        }
        modes
    }

    // --- identity tests ---

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for rule in catalog() {
            assert!(seen.insert(rule.id), "duplicate rule ID {}", rule.id);
        }
    }

    #[test]
    fn ids_carry_their_kind_prefix() {
        for rule in catalog() {
            let prefix = rule.kind.rule_prefix();
            assert!(prefix.is_some(), "{} has no concrete kind", rule.id);
            assert_eq!(rule.id.chars().next(), prefix, "{}", rule.id);
            assert_eq!(rule.id.len(), 5, "{}", rule.id);
        }
    }

    #[test]
    fn every_rule_is_documented() {
        for rule in catalog() {
            assert!(!rule.brief.is_empty(), "{}", rule.id);
            assert!(!rule.category.is_empty(), "{}", rule.id);
            assert!(!rule.message_template.is_empty(), "{}", rule.id);
            assert!(rule.reference_url.starts_with("https://"), "{}", rule.id);
        }
    }

    #[test]
    fn every_kind_has_rules() {
        for kind in ProjectKind::CONCRETE {
            assert!(!rules_for(kind).is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn catalog_is_grouped_by_kind() {
        let summary: Vec<String> = ProjectKind::CONCRETE
            .iter()
            .map(|kind| {
                let rules = rules_for(*kind);
                format!(
                    "{}: {} rules, {} to {}",
                    kind.display_name(),
                    rules.len(),
                    rules.first().map_or("", |r| r.id),
                    rules.last().map_or("", |r| r.id)
                )
            })
            .collect();
        insta::assert_snapshot!(summary.join("\n"), @r"
        sketch: 11 rules, SS001 to SC001
        library: 75 rules, LS001 to LP056
        platform: 43 rules, PB001 to PT013
        package index: 78 rules, IR001 to IT018
        ");
    }

    // --- mode table tests ---

    #[test]
    fn mode_tables_do_not_overlap() {
        for rule in catalog() {
            for mode in CheckMode::ALL {
                assert!(
                    !(rule.disable_modes.contains(&mode) && rule.enable_modes.contains(&mode)),
                    "{} both disables and enables {mode:?}",
                    rule.id
                );
                let levels = [rule.info_modes, rule.warning_modes, rule.error_modes]
                    .iter()
                    .filter(|table| table.contains(&mode))
                    .count();
                assert!(levels <= 1, "{} lists {mode:?} in {levels} level tables", rule.id);
            }
        }
    }

    #[test]
    fn every_mode_combination_resolves() {
        let modes = all_modes();
        for rule in catalog() {
            for m in &modes {
                assert!(rule.is_enabled(m).is_ok(), "{} {m:?}", rule.id);
                assert!(rule.level(RuleVerdict::Fail, m).is_ok(), "{} {m:?}", rule.id);
            }
        }
    }

    #[test]
    fn submission_only_rules() {
        let rules = catalog();
        let find = |id: &str| rules.iter().find(|r| r.id == id).copied().unwrap();
        let modes = |library_manager| {
            CheckModes::resolve(
                ModeSettings {
                    library_manager: Some(library_manager),
                    ..ModeSettings::default()
                },
                ProjectKind::Library,
            )
        };

        let duplicate = find("LP015");
        assert!(duplicate.is_enabled(&modes(LibraryManagerMode::Submit)).unwrap());
        assert!(!duplicate.is_enabled(&modes(LibraryManagerMode::Update)).unwrap());
        assert!(!duplicate.is_enabled(&modes(LibraryManagerMode::False)).unwrap());

        let tag = find("LP021");
        assert_eq!(
            tag.level(RuleVerdict::Fail, &modes(LibraryManagerMode::Update)).unwrap(),
            RuleLevel::Error
        );
        assert_eq!(
            tag.level(RuleVerdict::Fail, &modes(LibraryManagerMode::False)).unwrap(),
            RuleLevel::Warning
        );
    }

    #[test]
    fn strict_escalates_warnings() {
        let rules = catalog();
        let spaces = rules.iter().find(|r| r.id == "LP013").unwrap();
        let at = |compliance| {
            CheckModes::resolve(
                ModeSettings {
                    compliance: Some(compliance),
                    library_manager: Some(LibraryManagerMode::False),
                    official: Some(false),
                },
                ProjectKind::Library,
            )
        };
        assert_eq!(
            spaces.level(RuleVerdict::Fail, &at(ComplianceLevel::Specification)).unwrap(),
            RuleLevel::Warning
        );
        assert_eq!(
            spaces.level(RuleVerdict::Fail, &at(ComplianceLevel::Strict)).unwrap(),
            RuleLevel::Error
        );
        assert_eq!(
            spaces.level(RuleVerdict::Pass, &at(ComplianceLevel::Strict)).unwrap(),
            RuleLevel::Notice
        );
    }

    #[test]
    fn official_mode_flips_reserved_name_rules() {
        let rules = catalog();
        let official = CheckModes::resolve(
            ModeSettings {
                official: Some(true),
                ..ModeSettings::default()
            },
            ProjectKind::PackageIndex,
        );
        let third_party = CheckModes::resolve(ModeSettings::default(), ProjectKind::PackageIndex);
        for (id, enabled_when_official) in [("IR002", false), ("IR003", true), ("IP007", false)] {
            let rule = rules.iter().find(|r| r.id == id).unwrap();
            assert_eq!(rule.is_enabled(&official).unwrap(), enabled_when_official, "{id}");
            assert_eq!(rule.is_enabled(&third_party).unwrap(), !enabled_when_official, "{id}");
        }
    }
}
