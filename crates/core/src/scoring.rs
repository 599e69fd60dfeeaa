//! Dimension scores: range and threshold checks, status bands, weighted
//! overall score and improvement recommendations.
//!
//! Scores are on a 0.0 to 5.0 scale. A score below the selected threshold is
//! an error when the gap is at least [`HARD_GAP`] and a warning otherwise.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;
use crate::report::{Severity, ValidationReport, ValidationResult};
use crate::types::StepRecord;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 5.0;

/// Minimum viable score for every dimension.
pub const MIN_VIABLE_SCORE: f64 = 3.0;

/// Recommended minimum for investment consideration.
pub const INVESTMENT_READY_SCORE: f64 = 3.5;

/// Threshold gaps at or above this are errors; smaller gaps are warnings.
pub const HARD_GAP: f64 = 0.5;

/// Gaps at or above this are called out as critical in recommendations.
pub const CRITICAL_GAP: f64 = 1.0;

/// Allowed drift of the weight sum away from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Field label of the overall weighted score result.
pub const OVERALL_FIELD: &str = "overall";

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// The five evaluation axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Legitimacy,
    Desirability,
    Acceptability,
    Feasibility,
    Viability,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Self::Legitimacy,
        Self::Desirability,
        Self::Acceptability,
        Self::Feasibility,
        Self::Viability,
    ];

    /// Lowercase key used in records and result fields.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Legitimacy => "legitimacy",
            Self::Desirability => "desirability",
            Self::Acceptability => "acceptability",
            Self::Feasibility => "feasibility",
            Self::Viability => "viability",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Legitimacy => "Legitimacy",
            Self::Desirability => "Desirability",
            Self::Acceptability => "Acceptability",
            Self::Feasibility => "Feasibility",
            Self::Viability => "Viability",
        }
    }

    /// Case-insensitive lookup by key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dimension's share of the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DimensionWeight {
    pub dimension: Dimension,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

impl DimensionWeight {
    fn builtin(dimension: Dimension, weight: f64, description: &str) -> Self {
        Self {
            dimension,
            weight,
            description: description.to_string(),
        }
    }
}

/// Built-in weights; they sum to 1.0.
pub fn default_dimension_weights() -> Vec<DimensionWeight> {
    vec![
        DimensionWeight::builtin(
            Dimension::Legitimacy,
            0.20,
            "Real problem, genuine solution, capable team",
        ),
        DimensionWeight::builtin(
            Dimension::Desirability,
            0.25,
            "Customer want, validated need, market demand",
        ),
        DimensionWeight::builtin(
            Dimension::Acceptability,
            0.20,
            "Ecosystem support, stakeholder alignment, external validation",
        ),
        DimensionWeight::builtin(
            Dimension::Feasibility,
            0.15,
            "Technical capability, operational capacity, execution ability",
        ),
        DimensionWeight::builtin(
            Dimension::Viability,
            0.20,
            "Business model sustainability, financial health, scalability",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Threshold levels and status bands
// ---------------------------------------------------------------------------

/// Which minimum a score is held to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdLevel {
    #[default]
    Viable,
    Investment,
}

impl ThresholdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viable => "viable",
            Self::Investment => "investment",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "viable" => Ok(Self::Viable),
            "investment" => Ok(Self::Investment),
            _ => Err(format!(
                "Invalid threshold level '{s}'. Must be one of: viable, investment"
            )),
        }
    }
}

/// Qualitative bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    Strong,
    Promising,
    Developing,
    Problematic,
    NonViable,
}

impl ScoreStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Promising => "Promising",
            Self::Developing => "Developing",
            Self::Problematic => "Problematic",
            Self::NonViable => "Non-viable",
        }
    }
}

impl fmt::Display for ScoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A band covers `[lower, next band's lower)`; the top band includes 5.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StatusBand {
    #[validate(range(min = 0.0, max = 5.0))]
    pub lower: f64,
    pub status: ScoreStatus,
}

/// Built-in bands, highest first.
pub fn default_status_bands() -> Vec<StatusBand> {
    [
        (4.5, ScoreStatus::Strong),
        (3.5, ScoreStatus::Promising),
        (3.0, ScoreStatus::Developing),
        (2.0, ScoreStatus::Problematic),
        (0.0, ScoreStatus::NonViable),
    ]
    .into_iter()
    .map(|(lower, status)| StatusBand { lower, status })
    .collect()
}

/// Semantic color bucket for downstream renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreColor {
    Green,
    Yellow,
    Red,
}

/// Green from the investment-ready line, yellow from the viable line.
pub fn score_color(score: f64) -> ScoreColor {
    if score >= INVESTMENT_READY_SCORE {
        ScoreColor::Green
    } else if score >= MIN_VIABLE_SCORE {
        ScoreColor::Yellow
    } else {
        ScoreColor::Red
    }
}

// ---------------------------------------------------------------------------
// ScoreConfig
// ---------------------------------------------------------------------------

/// Weight, threshold and band tables used by the score checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScoreConfig {
    #[validate(length(min = 1), nested)]
    pub dimensions: Vec<DimensionWeight>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub min_viable: f64,
    #[validate(range(min = 0.0, max = 5.0))]
    pub investment_ready: f64,
    #[validate(range(exclusive_min = 0.0, max = 5.0))]
    pub hard_gap: f64,
    #[validate(length(min = 1), nested)]
    pub status_bands: Vec<StatusBand>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimension_weights(),
            min_viable: MIN_VIABLE_SCORE,
            investment_ready: INVESTMENT_READY_SCORE,
            hard_gap: HARD_GAP,
            status_bands: default_status_bands(),
        }
    }
}

impl ScoreConfig {
    pub fn threshold(&self, level: ThresholdLevel) -> f64 {
        match level {
            ThresholdLevel::Viable => self.min_viable,
            ThresholdLevel::Investment => self.investment_ready,
        }
    }

    /// Status for `score`: the first band whose lower bound it reaches.
    ///
    /// Scores below every band fall into the last one.
    pub fn status_for(&self, score: f64) -> ScoreStatus {
        self.status_bands
            .iter()
            .find(|band| score >= band.lower)
            .or(self.status_bands.last())
            .map(|band| band.status)
            .unwrap_or(ScoreStatus::NonViable)
    }

    /// Field-level checks plus the table invariants the derive cannot express.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;

        let mut seen = Vec::new();
        for w in &self.dimensions {
            if seen.contains(&w.dimension) {
                return Err(CoreError::Validation(format!(
                    "Dimension '{}' is weighted more than once",
                    w.dimension.key()
                )));
            }
            seen.push(w.dimension);
        }

        let sum: f64 = self.dimensions.iter().map(|w| w.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CoreError::Validation(format!(
                "Dimension weights must sum to 1.0 (±{WEIGHT_SUM_TOLERANCE}), got {sum:.3}"
            )));
        }

        if self
            .status_bands
            .windows(2)
            .any(|pair| pair[0].lower <= pair[1].lower)
        {
            return Err(CoreError::Validation(
                "Status bands must be ordered by strictly descending lower bound".to_string(),
            ));
        }
        if self.status_bands.last().map(|b| b.lower) != Some(SCORE_MIN) {
            return Err(CoreError::Validation(format!(
                "The lowest status band must start at {SCORE_MIN:.1}"
            )));
        }

        Ok(())
    }

    fn weight_of(&self, dimension: Dimension) -> Option<f64> {
        self.dimensions
            .iter()
            .find(|w| w.dimension == dimension)
            .map(|w| w.weight)
    }
}

// ---------------------------------------------------------------------------
// Weighted overall score
// ---------------------------------------------------------------------------

/// Outcome of the weighted overall computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OverallScore {
    Computed { score: f64, dimensions: usize },
    /// No weighted dimension was present; the score is defined as 0.0.
    NoDimensions,
}

impl OverallScore {
    pub fn value(&self) -> f64 {
        match self {
            Self::Computed { score, .. } => *score,
            Self::NoDimensions => 0.0,
        }
    }
}

/// Σ(score × weight) / Σ(weight) over the dimensions present in `scores`.
///
/// Absent dimensions are left out of both sums.
pub fn calculate_weighted_score(
    scores: &BTreeMap<Dimension, f64>,
    config: &ScoreConfig,
) -> OverallScore {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut dimensions = 0usize;

    for (dimension, score) in scores {
        if let Some(weight) = config.weight_of(*dimension) {
            weighted_sum += score * weight;
            total_weight += weight;
            dimensions += 1;
        }
    }

    if dimensions == 0 || total_weight == 0.0 {
        return OverallScore::NoDimensions;
    }
    OverallScore::Computed {
        score: weighted_sum / total_weight,
        dimensions,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check one score for range and against the `level` threshold.
///
/// `field` overrides the result label, which defaults to the dimension key.
pub fn validate_score(
    dimension: Dimension,
    score: f64,
    level: ThresholdLevel,
    field: Option<&str>,
    config: &ScoreConfig,
) -> ValidationResult {
    let field = field.unwrap_or(dimension.key());

    if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return ValidationResult::error(field, format!("Score {score} outside valid range (0-5)"))
            .with_detail("score", score)
            .with_detail("min", SCORE_MIN)
            .with_detail("max", SCORE_MAX);
    }

    let threshold = config.threshold(level);
    let status = config.status_for(score);

    if score >= threshold {
        ValidationResult::success(
            field,
            format!(
                "{score:.1}/5 ({status}) - meets {} threshold ({threshold:.1})",
                level.as_str()
            ),
        )
        .with_detail("score", score)
        .with_detail("threshold", threshold)
        .with_detail("status", status.label())
        .with_detail("margin", score - threshold)
    } else {
        let gap = threshold - score;
        let severity = if gap >= config.hard_gap {
            Severity::Error
        } else {
            Severity::Warning
        };
        ValidationResult::new(
            false,
            severity,
            field,
            format!(
                "{score:.1}/5 ({status}) - below {} threshold ({threshold:.1}, gap: {gap:.1})",
                level.as_str()
            ),
        )
        .with_detail("score", score)
        .with_detail("threshold", threshold)
        .with_detail("status", status.label())
        .with_detail("gap", gap)
    }
}

/// Check every configured dimension and report the weighted overall score.
///
/// Dimensions missing from `scores` are warnings.
pub fn validate_all_dimensions(
    scores: &BTreeMap<Dimension, f64>,
    level: ThresholdLevel,
    config: &ScoreConfig,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    for weight in &config.dimensions {
        match scores.get(&weight.dimension) {
            Some(score) => report.add(validate_score(weight.dimension, *score, level, None, config)),
            None => report.add_warning(weight.dimension.key(), "Dimension score not provided"),
        }
    }

    match calculate_weighted_score(scores, config) {
        OverallScore::Computed { score, dimensions } => report.add(
            ValidationResult::success(
                OVERALL_FIELD,
                format!(
                    "{score:.2}/5 weighted across {dimensions} dimensions ({})",
                    config.status_for(score)
                ),
            )
            .with_detail("score", score)
            .with_detail("dimensions", dimensions),
        ),
        OverallScore::NoDimensions => report.add(
            ValidationResult::warning(
                OVERALL_FIELD,
                "No dimension scores provided; overall score undefined (reported as 0.0)",
            )
            .with_detail("score", 0.0),
        ),
    }

    report
}

/// Read dimension scores from a record.
///
/// Accepts `dimension_scores: [{name, score}]` or top-level dimension keys,
/// matched case-insensitively. Unknown names are ignored. A score that is not
/// a number is a caller error.
pub fn collect_dimension_scores(
    record: &StepRecord,
) -> Result<BTreeMap<Dimension, f64>, CoreError> {
    let mut scores = BTreeMap::new();

    if let Some(entries) = record.get("dimension_scores") {
        let entries = entries.as_array().ok_or_else(|| {
            CoreError::InvalidInput("dimension_scores must be a sequence".to_string())
        })?;
        for entry in entries {
            let Some(dimension) = entry
                .get("name")
                .and_then(Value::as_str)
                .and_then(Dimension::from_key)
            else {
                continue;
            };
            let score = entry.get("score").unwrap_or(&Value::Null);
            scores.insert(dimension, numeric_score(dimension, score)?);
        }
        return Ok(scores);
    }

    for (key, value) in record {
        if let Some(dimension) = Dimension::from_key(key) {
            scores.insert(dimension, numeric_score(dimension, value)?);
        }
    }
    Ok(scores)
}

fn numeric_score(dimension: Dimension, value: &Value) -> Result<f64, CoreError> {
    value.as_f64().ok_or_else(|| {
        CoreError::InvalidInput(format!(
            "Score for {} must be a number, got {value}",
            dimension.key()
        ))
    })
}

/// Improvement advice for every below-threshold result in `report`.
pub fn recommendations(report: &ValidationReport) -> Vec<String> {
    report
        .results()
        .iter()
        .filter(|r| !r.is_valid)
        .filter_map(|r| r.detail_f64("gap").map(|gap| (r, gap)))
        .map(|(r, gap)| {
            if gap >= CRITICAL_GAP {
                format!(
                    "{}: Critical gap ({gap:.1}). Requires significant work before proceeding.",
                    r.field
                )
            } else if gap >= HARD_GAP {
                format!("{}: Moderate gap ({gap:.1}). Focus area for improvement.", r.field)
            } else {
                format!("{}: Minor gap ({gap:.1}). Close to threshold.", r.field)
            }
        })
        .collect()
}
