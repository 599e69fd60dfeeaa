//! Cross-step consistency checks.
//!
//! Runs the data-flow rules between two step records, or the configured
//! project pairs over a whole set of records.

use std::collections::BTreeMap;

use super::rules::{DataFlowRule, StepPair};
use crate::extract::extract_items;
use crate::report::ValidationReport;
use crate::types::{StepId, StepRecord};

/// Apply a single rule to a source and target record.
///
/// An empty side skips the rule with a warning.
pub fn validate_rule(
    source: &StepRecord,
    target: &StepRecord,
    rule: &DataFlowRule,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let source_items = extract_items(source, &rule.source_field);
    if source_items.is_empty() {
        tracing::debug!(
            rule = %rule.pair_label(),
            field = %rule.source_field,
            "Skipping rule, source field is empty",
        );
        report.add_warning(
            format!("{}.{}", rule.source_step, rule.source_field),
            "No items found in source",
        );
        return report;
    }

    let target_items = extract_items(target, &rule.target_field);
    if target_items.is_empty() {
        tracing::debug!(
            rule = %rule.pair_label(),
            field = %rule.target_field,
            "Skipping rule, target field is empty",
        );
        report.add_warning(
            format!("{}.{}", rule.target_step, rule.target_field),
            "No items found in target",
        );
        return report;
    }

    rule.policy.check(&source_items, &target_items, rule)
}

/// Apply every rule declared for `source_step -> target_step`.
pub fn validate_step_pair(
    source: &StepRecord,
    target: &StepRecord,
    source_step: &str,
    target_step: &str,
    rules: &[DataFlowRule],
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let mut applied = 0usize;

    for rule in rules.iter().filter(|r| r.applies_to(source_step, target_step)) {
        report.extend(validate_rule(source, target, rule));
        applied += 1;
    }

    tracing::debug!(
        source = source_step,
        target = target_step,
        rules = applied,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Step pair checked",
    );

    report
}

/// Check every configured pair over the supplied step records.
///
/// A pair whose source or target record is absent is skipped with a warning
/// naming the missing steps.
pub fn validate_project(
    steps: &BTreeMap<StepId, StepRecord>,
    pairs: &[StepPair],
    rules: &[DataFlowRule],
) -> ValidationReport {
    let mut report = ValidationReport::new();

    for pair in pairs {
        let source = steps.get(&pair.source);
        let target = steps.get(&pair.target);

        match (source, target) {
            (Some(source), Some(target)) => {
                report.extend(validate_step_pair(
                    source,
                    target,
                    &pair.source,
                    &pair.target,
                    rules,
                ));
            }
            _ => {
                let missing: Vec<&str> = [(&pair.source, source), (&pair.target, target)]
                    .into_iter()
                    .filter(|(_, record)| record.is_none())
                    .map(|(id, _)| id.as_str())
                    .collect();
                tracing::debug!(
                    source = %pair.source,
                    target = %pair.target,
                    missing = ?missing,
                    "Skipping project pair",
                );
                report.add_warning(
                    format!("{}->{}", pair.source, pair.target),
                    format!("Cannot validate: missing {}", missing.join(", ")),
                );
            }
        }
    }

    report
}
