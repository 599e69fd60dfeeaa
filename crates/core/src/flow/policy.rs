//! Match strategies comparing a source and a target item list.
//!
//! Each strategy is a plain function so it can be tested on its own;
//! [`MatchPolicy::check`] dispatches to the one a rule names.

use std::collections::HashSet;

use serde_json::Value;

use super::rules::{DataFlowRule, MatchPolicy};
use crate::report::{ValidationReport, ValidationResult};

impl MatchPolicy {
    /// Compare `source` against `target` under this policy.
    pub fn check(
        &self,
        source: &[String],
        target: &[String],
        rule: &DataFlowRule,
    ) -> ValidationReport {
        match self {
            Self::Exact => exact_match(source, target, rule),
            Self::Contains => contains_match(source, target, rule),
            Self::Mapped => mapped_match(source, target, rule),
        }
    }
}

/// Set equality after trimming.
///
/// Source items missing downstream are errors; target items with no source
/// are warnings. A full match yields one summary success. Results follow the
/// order items first appear in their list.
pub fn exact_match(source: &[String], target: &[String], rule: &DataFlowRule) -> ValidationReport {
    let mut report = ValidationReport::new();
    let source_items = trimmed_unique(source);
    let target_items = trimmed_unique(target);
    let source_set: HashSet<&str> = source_items.iter().copied().collect();
    let target_set: HashSet<&str> = target_items.iter().copied().collect();

    let missing: Vec<&str> = source_items
        .iter()
        .copied()
        .filter(|item| !target_set.contains(item))
        .collect();
    let extra: Vec<&str> = target_items
        .iter()
        .copied()
        .filter(|item| !source_set.contains(item))
        .collect();

    for item in &missing {
        report.add(
            ValidationResult::error(
                rule.pair_label(),
                format!("'{item}' from {} missing in {}", rule.source_field, rule.target_field),
            )
            .with_detail("rule", rule.description.as_str()),
        );
    }

    for item in &extra {
        report.add(
            ValidationResult::warning(
                rule.target_step.as_str(),
                format!(
                    "'{item}' in {} not found in source {}",
                    rule.target_field, rule.source_field
                ),
            )
            .with_detail("rule", rule.description.as_str()),
        );
    }

    if missing.is_empty() && extra.is_empty() {
        report.add(
            ValidationResult::success(
                rule.pair_label(),
                format!(
                    "All {} {} items match exactly",
                    source_items.len(),
                    rule.source_field
                ),
            )
            .with_detail("matched", source_items.len()),
        );
    }

    report
}

/// Every source item must occur, case-insensitively, as a substring of the
/// space-joined target items.
pub fn contains_match(
    source: &[String],
    target: &[String],
    rule: &DataFlowRule,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let haystack = target.join(" ").to_lowercase();

    for item in source {
        let needle = item.trim().to_lowercase();
        if haystack.contains(&needle) {
            report.add_success(format!("{}.{item}", rule.pair_label()), "Found in target");
        } else {
            report.add(
                ValidationResult::error(
                    rule.pair_label(),
                    format!("'{item}' from {} not found in {}", rule.source_field, rule.target_field),
                )
                .with_detail("rule", Value::from(rule.description.as_str())),
            );
        }
    }

    report
}

/// Structural mapping. Checked exactly like [`contains_match`].
pub fn mapped_match(source: &[String], target: &[String], rule: &DataFlowRule) -> ValidationReport {
    contains_match(source, target, rule)
}

fn trimmed_unique(items: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| seen.insert(*s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    fn rule(policy: MatchPolicy) -> DataFlowRule {
        DataFlowRule::new(
            "step_5",
            "step_7",
            "requesters",
            "column_headers",
            policy,
            "Requester names must match exactly",
        )
    }

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    // -- exact ---------------------------------------------------------------

    #[test]
    fn exact_full_match_single_success() {
        let report = exact_match(
            &items(&["Alice", " Bob ", "Charlie"]),
            &items(&["Charlie", "Alice", "Bob"]),
            &rule(MatchPolicy::Exact),
        );
        assert_eq!(report.len(), 1);
        assert!(report.is_valid());
        assert_eq!(
            report.results()[0].message,
            "All 3 requesters items match exactly"
        );
    }

    #[test]
    fn exact_missing_and_extra() {
        let report = exact_match(
            &items(&["Alice", "Bob"]),
            &items(&["Alice", "Dana"]),
            &rule(MatchPolicy::Exact),
        );
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        let err = &report.results()[0];
        assert_eq!(err.field, "step_5->step_7");
        assert!(err.message.contains("'Bob'"));
        let warn = &report.results()[1];
        assert_eq!(warn.field, "step_7");
        assert!(warn.message.contains("'Dana'"));
    }

    #[test]
    fn exact_is_case_sensitive() {
        let report = exact_match(&items(&["alice"]), &items(&["Alice"]), &rule(MatchPolicy::Exact));
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn exact_duplicates_collapse() {
        let report = exact_match(
            &items(&["Alice", "Alice"]),
            &items(&["Alice"]),
            &rule(MatchPolicy::Exact),
        );
        assert_eq!(report.results()[0].detail_f64("matched"), Some(1.0));
    }

    // -- contains ------------------------------------------------------------

    #[test]
    fn contains_case_insensitive_substring() {
        let report = contains_match(
            &items(&["Clinic Staff", "Patients"]),
            &items(&["Regional clinic staff and managers", "Insurers"]),
            &rule(MatchPolicy::Contains),
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.results()[0].field, "step_5->step_7.Clinic Staff");
        assert_eq!(report.results()[0].severity, Severity::Info);
        assert!(report.results()[1].message.contains("'Patients'"));
    }

    #[test]
    fn contains_can_span_joined_items() {
        let report = contains_match(
            &items(&["alpha beta"]),
            &items(&["alpha", "beta"]),
            &rule(MatchPolicy::Contains),
        );
        assert!(report.is_valid());
    }

    // -- mapped --------------------------------------------------------------

    #[test]
    fn mapped_behaves_like_contains() {
        let source = items(&["Acme Logistics", "Northwind"]);
        let target = items(&["acme logistics (carrier)"]);
        let r = rule(MatchPolicy::Mapped);
        assert_eq!(mapped_match(&source, &target, &r), contains_match(&source, &target, &r));
    }

    // -- dispatch ------------------------------------------------------------

    #[test]
    fn every_policy_dispatches_to_its_strategy() {
        let source = items(&["Alice"]);
        let target = items(&["Alice"]);
        for policy in MatchPolicy::ALL {
            let r = rule(policy);
            let expected = match policy {
                MatchPolicy::Exact => exact_match(&source, &target, &r),
                MatchPolicy::Contains => contains_match(&source, &target, &r),
                MatchPolicy::Mapped => mapped_match(&source, &target, &r),
            };
            assert_eq!(policy.check(&source, &target, &r), expected);
        }
    }
}
