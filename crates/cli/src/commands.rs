use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use vianeo_core::char_limits::validate_document;
use vianeo_core::dependencies::validate_step_dependencies;
use vianeo_core::evidence::{summarize, validate_document_evidence, EVIDENCE_LOG_KEY};
use vianeo_core::flow::consistency::{validate_project, validate_step_pair};
use vianeo_core::scoring::{collect_dimension_scores, recommendations, validate_all_dimensions};
use vianeo_core::types::as_record;
use vianeo_core::{EngineConfig, StepRecord, ValidationReport};

use crate::cli::Commands;
use crate::config::RunConfig;

/// A finished run: the report plus free-form notes printed after it.
#[derive(Debug)]
pub struct Outcome {
    pub report: ValidationReport,
    pub notes: Vec<String>,
}

impl From<ValidationReport> for Outcome {
    fn from(report: ValidationReport) -> Self {
        Self {
            report,
            notes: Vec::new(),
        }
    }
}

pub fn run(command: &Commands, engine: &EngineConfig, settings: &RunConfig) -> anyhow::Result<Outcome> {
    match command {
        Commands::Flow {
            source,
            target,
            source_step,
            target_step,
        } => {
            let source = load_record(source)?;
            let target = load_record(target)?;
            tracing::info!(source = %source_step, target = %target_step, "Checking step pair");
            Ok(validate_step_pair(&source, &target, source_step, target_step, &engine.data_flows).into())
        }
        Commands::Project { steps } => {
            let steps = load_steps(steps)?;
            tracing::info!(steps = steps.len(), "Checking project");
            Ok(validate_project(&steps, &engine.project_pairs, &engine.data_flows).into())
        }
        Commands::Scores { record, threshold } => {
            let record = load_record(record)?;
            let level = threshold.unwrap_or(settings.threshold);
            let scores = collect_dimension_scores(&record)?;
            tracing::info!(dimensions = scores.len(), threshold = level.as_str(), "Checking scores");
            let report = validate_all_dimensions(&scores, level, &engine.scores);
            let notes = recommendations(&report);
            Ok(Outcome { report, notes })
        }
        Commands::Evidence { record } => {
            let record = load_record(record)?;
            let report = validate_document_evidence(&record, &engine.evidence_requirements);
            let entries = record
                .get(EVIDENCE_LOG_KEY)
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let summary = summarize(entries);
            let notes = vec![format!(
                "{} evidence entries, average quality {:.1}",
                summary.count, summary.average_quality
            )];
            Ok(Outcome { report, notes })
        }
        Commands::Limits { record, doc_type } => {
            let record = load_record(record)?;
            Ok(validate_document(&record, *doc_type, &engine.char_limits).into())
        }
        Commands::Deps { step, available } => {
            let available: BTreeSet<String> = available
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            Ok(validate_step_dependencies(step, &available, &engine.step_dependencies).into())
        }
    }
}

/// Built-in tables, or the override at `path`.
pub fn load_engine_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::builtin().clone());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = EngineConfig::from_json_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded engine configuration");
    Ok(config)
}

fn load_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

fn load_record(path: &Path) -> anyhow::Result<StepRecord> {
    let value = load_json(path)?;
    let record = as_record(&value, &path.display().to_string())?;
    Ok(record.clone())
}

fn load_steps(path: &Path) -> anyhow::Result<BTreeMap<String, StepRecord>> {
    let value = load_json(path)?;
    let document = as_record(&value, &path.display().to_string())?;
    document
        .iter()
        .map(|(step, record)| -> anyhow::Result<(String, StepRecord)> {
            Ok((step.clone(), as_record(record, step)?.clone()))
        })
        .collect()
}
