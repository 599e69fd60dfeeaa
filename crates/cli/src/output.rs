use serde::Serialize;
use vianeo_core::{ValidationReport, ValidationResult};

use crate::commands::Outcome;

#[derive(Serialize)]
struct JsonOut<'a> {
    valid: bool,
    errors: usize,
    warnings: usize,
    results: Vec<&'a ValidationResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
}

/// Print the outcome to stdout. Passing results are shown only with `verbose`.
pub fn print_outcome(outcome: &Outcome, json: bool, verbose: bool) -> anyhow::Result<()> {
    let report = &outcome.report;

    if json {
        let out = JsonOut {
            valid: report.is_valid(),
            errors: report.error_count(),
            warnings: report.warning_count(),
            results: shown(report, verbose),
            notes: outcome.notes.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", report.display(verbose));

    for note in &outcome.notes {
        println!("{note}");
    }
    println!("{}", if report.is_valid() { "PASSED" } else { "FAILED" });
    Ok(())
}

fn shown(report: &ValidationReport, verbose: bool) -> Vec<&ValidationResult> {
    if verbose {
        report.results().iter().collect()
    } else {
        report.non_info().collect()
    }
}
