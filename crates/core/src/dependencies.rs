//! Upstream prerequisite checks between workflow steps.

use std::collections::{BTreeMap, BTreeSet};

use crate::report::ValidationReport;
use crate::types::StepId;

/// Step id to the upstream steps it consumes.
pub type DependencyTable = BTreeMap<StepId, Vec<StepId>>;

pub fn default_step_dependencies() -> DependencyTable {
    [
        ("step_7", vec!["step_5"]),
        ("step_9", vec!["step_5", "step_8"]),
        ("step_11_needs", vec!["step_5", "step_7"]),
        ("step_11_means", vec!["step_4"]),
    ]
    .into_iter()
    .map(|(step, deps)| {
        (
            step.to_string(),
            deps.into_iter().map(str::to_string).collect(),
        )
    })
    .collect()
}

/// One result per prerequisite of `step`. Steps without prerequisites
/// produce an empty, valid report.
pub fn validate_step_dependencies(
    step: &str,
    available: &BTreeSet<StepId>,
    table: &DependencyTable,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    let Some(required) = table.get(step) else {
        tracing::debug!(step, "No prerequisites configured");
        return report;
    };

    for dep in required {
        let field = format!("dependency.{dep}");
        if available.contains(dep) {
            report.add_success(field, format!("Required step {dep} available"));
        } else {
            report.add_error(field, format!("Required upstream step {dep} not available"));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available(steps: &[&str]) -> BTreeSet<StepId> {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_prerequisites_present() {
        let report = validate_step_dependencies(
            "step_9",
            &available(&["step_5", "step_8"]),
            &default_step_dependencies(),
        );
        assert!(report.is_valid());
        assert_eq!(report.len(), 2);
        assert_eq!(report.results()[0].message, "Required step step_5 available");
    }

    #[test]
    fn missing_prerequisite_is_error() {
        let report = validate_step_dependencies(
            "step_11_needs",
            &available(&["step_5"]),
            &default_step_dependencies(),
        );
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        let err = &report.results()[1];
        assert_eq!(err.field, "dependency.step_7");
        assert_eq!(err.message, "Required upstream step step_7 not available");
    }

    #[test]
    fn unconfigured_step_trivially_passes() {
        let report =
            validate_step_dependencies("step_1", &available(&[]), &default_step_dependencies());
        assert!(report.is_empty());
        assert!(report.is_valid());
    }
}
