//! Evidence log validation.
//!
//! Entries are checked one by one (identifier, quality rating, date), then
//! as a collection (duplicates, minimum size), then per section against the
//! configured [`EvidenceRequirement`]s.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::report::{ValidationReport, ValidationResult};
use crate::types::StepRecord;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Evidence identifiers: `E` followed by exactly three digits.
pub const EVIDENCE_ID_PATTERN: &str = r"^E\d{3}$";

/// ISO calendar date, `YYYY-MM-DD`.
pub const ISO_DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// Fields every entry must carry.
pub const REQUIRED_ENTRY_FIELDS: &[&str] = &["id", "section", "source_type", "quality_rating"];

/// Below this many entries the log gets a soft warning.
pub const RECOMMENDED_MIN_ENTRIES: usize = 3;

/// Key of the evidence log inside a document record.
pub const EVIDENCE_LOG_KEY: &str = "evidence_log";

static EVIDENCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EVIDENCE_ID_PATTERN).expect("valid regex"));
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ISO_DATE_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Quality and confidence scales
// ---------------------------------------------------------------------------

/// Five-point evidence quality scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceQuality {
    VeryWeak = 1,
    Weak = 2,
    Moderate = 3,
    Strong = 4,
    GoldStandard = 5,
}

impl EvidenceQuality {
    pub const ALL: [EvidenceQuality; 5] = [
        Self::VeryWeak,
        Self::Weak,
        Self::Moderate,
        Self::Strong,
        Self::GoldStandard,
    ];

    pub fn from_rating(rating: i64) -> Option<Self> {
        match rating {
            1 => Some(Self::VeryWeak),
            2 => Some(Self::Weak),
            3 => Some(Self::Moderate),
            4 => Some(Self::Strong),
            5 => Some(Self::GoldStandard),
            _ => None,
        }
    }

    pub fn rating(&self) -> u8 {
        *self as u8
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GoldStandard => {
                "Gold Standard: Published research, audited financials, signed contracts"
            }
            Self::Strong => "Strong: Multiple testimonials, verified metrics",
            Self::Moderate => "Moderate: Single-source testimonials, founder-reported",
            Self::Weak => "Weak: Anecdotal evidence, unverified claims",
            Self::VeryWeak => "Very Weak: No supporting evidence",
        }
    }
}

/// How directly a claim is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    L1,
    L2,
    L3,
}

impl ConfidenceLevel {
    /// Case-insensitive parse of `L1`, `L2` or `L3`.
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim().to_uppercase().as_str() {
            "L1" => Some(Self::L1),
            "L2" => Some(Self::L2),
            "L3" => Some(Self::L3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::L1 => "Direct evidence (interviews, contracts, metrics)",
            Self::L2 => "Indirect evidence (market reports, benchmarks)",
            Self::L3 => "Inferred (assumptions, projections)",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries and requirements
// ---------------------------------------------------------------------------

/// A well-formed evidence entry.
///
/// Validation works on raw mappings so malformed entries can be reported;
/// this type is for callers that want the typed view of a clean log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub id: String,
    pub section: String,
    pub source_type: String,
    pub quality_rating: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EvidenceEntry {
    pub fn quality(&self) -> Option<EvidenceQuality> {
        EvidenceQuality::from_rating(i64::from(self.quality_rating))
    }
}

/// Coverage required for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EvidenceRequirement {
    #[validate(length(min = 1))]
    pub section: String,
    pub min_count: usize,
    #[validate(range(min = 1, max = 5))]
    pub min_quality: u8,
    #[serde(default)]
    pub preferred_types: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl EvidenceRequirement {
    fn builtin(
        section: &str,
        min_count: usize,
        min_quality: u8,
        preferred_types: &[&str],
        description: &str,
    ) -> Self {
        Self {
            section: section.to_string(),
            min_count,
            min_quality,
            preferred_types: preferred_types.iter().map(|s| s.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

/// Executive brief sections B1..B7.
pub fn default_evidence_requirements() -> Vec<EvidenceRequirement> {
    vec![
        EvidenceRequirement::builtin(
            "B1",
            0,
            3,
            &["trademark", "domain", "brand_assets"],
            "Project name - trademark/brand documentation",
        ),
        EvidenceRequirement::builtin(
            "B2",
            2,
            4,
            &["customer_interviews", "market_research", "industry_reports"],
            "Problem statement - customer validation required",
        ),
        EvidenceRequirement::builtin(
            "B3",
            1,
            3,
            &["prototype", "demo", "technical_spec"],
            "Solution - prototype or specification",
        ),
        EvidenceRequirement::builtin(
            "B4",
            2,
            4,
            &["industry_reports", "government_stats", "bottom_up_calc"],
            "Market - third-party validation of size",
        ),
        EvidenceRequirement::builtin(
            "B5",
            1,
            3,
            &["pricing_interviews", "competitive_analysis", "unit_economics"],
            "Business model - pricing validation",
        ),
        EvidenceRequirement::builtin(
            "B6",
            3,
            4,
            &["analytics", "contracts", "testimonials", "financials"],
            "Traction - verified metrics and commitments",
        ),
        EvidenceRequirement::builtin(
            "B7",
            1,
            4,
            &["linkedin", "publications", "company_records"],
            "Team - publicly verifiable credentials",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Single-value checks
// ---------------------------------------------------------------------------

pub fn validate_evidence_id(id: &str) -> ValidationResult {
    if EVIDENCE_ID_RE.is_match(id) {
        ValidationResult::success(id, "Valid evidence ID format")
    } else {
        ValidationResult::error(id, "Invalid format. Expected EXXX (e.g., E001)")
            .with_detail("expected_pattern", EVIDENCE_ID_PATTERN)
    }
}

/// Rating must be an integer on the 1-5 scale.
pub fn validate_quality_rating(rating: &Value, evidence_id: &str) -> ValidationResult {
    let field = format!("{evidence_id}.quality");
    let Some(n) = integer_rating(rating) else {
        return ValidationResult::error(field, format!("Rating {rating} must be an integer (1-5)"));
    };
    match EvidenceQuality::from_rating(n) {
        Some(quality) => ValidationResult::success(field, format!("Rating {n}: {}", quality.description())),
        None => ValidationResult::error(field, format!("Rating {n} outside valid range (1-5)")),
    }
}

pub fn validate_confidence_level(level: &str, field: &str) -> ValidationResult {
    match ConfidenceLevel::parse(level) {
        Some(c) => ValidationResult::success(field, format!("{}: {}", c.as_str(), c.description())),
        None => ValidationResult::error(
            field,
            format!("Invalid confidence level '{level}'. Use L1, L2, or L3"),
        ),
    }
}

// ---------------------------------------------------------------------------
// Entry and log checks
// ---------------------------------------------------------------------------

/// Check one entry: required fields, identifier, rating and optional date.
pub fn validate_evidence_entry(entry: &StepRecord) -> Vec<ValidationResult> {
    let mut results = Vec::new();

    for name in REQUIRED_ENTRY_FIELDS {
        if !entry.contains_key(*name) {
            results.push(ValidationResult::error(
                format!("evidence.{name}"),
                format!("Missing required field: {name}"),
            ));
        }
    }

    let id = entry_id(entry);
    if let Some(raw) = entry.get("id") {
        match raw.as_str() {
            Some(s) => results.push(validate_evidence_id(s)),
            None => results.push(ValidationResult::error(
                "evidence.id",
                format!("Evidence ID must be a string, got {raw}"),
            )),
        }
    }

    if let Some(rating) = entry.get("quality_rating") {
        results.push(validate_quality_rating(rating, &id));
    }

    if let Some(date) = entry.get("date").filter(|d| !d.is_null()) {
        let ok = date.as_str().is_some_and(|d| ISO_DATE_RE.is_match(d));
        if !ok {
            results.push(
                ValidationResult::warning(
                    format!("{id}.date"),
                    "Invalid date format. Expected YYYY-MM-DD",
                )
                .with_detail("value", date.clone()),
            );
        }
    }

    results
}

/// Check a whole log: each entry, unique identifiers, recommended size.
///
/// An empty log is a single warning, not an error.
pub fn validate_evidence_log(entries: &[Value]) -> ValidationReport {
    let mut report = ValidationReport::new();

    if entries.is_empty() {
        report.add_warning(
            EVIDENCE_LOG_KEY,
            "No supporting evidence: evidence log is empty, all claims should be supported",
        );
        return report;
    }

    for (i, entry) in entries.iter().enumerate() {
        match entry.as_object() {
            Some(map) => {
                for result in validate_evidence_entry(map) {
                    report.add(result);
                }
            }
            None => report.add_error(
                format!("{EVIDENCE_LOG_KEY}[{i}]"),
                "Evidence entry must be a mapping",
            ),
        }
    }

    let duplicates = duplicate_ids(entries);
    if !duplicates.is_empty() {
        report.add(
            ValidationResult::error(
                EVIDENCE_LOG_KEY,
                format!("Duplicate evidence IDs found: {}", duplicates.join(", ")),
            )
            .with_detail("duplicates", duplicates),
        );
    }

    if entries.len() < RECOMMENDED_MIN_ENTRIES {
        report.add_warning(
            EVIDENCE_LOG_KEY,
            format!(
                "Only {} evidence entries. Recommend minimum {RECOMMENDED_MIN_ENTRIES}.",
                entries.len()
            ),
        );
    }

    report
}

/// Check coverage and average quality for one section.
///
/// Sections without a configured requirement produce no results.
pub fn validate_section_evidence(
    entries: &[Value],
    section: &str,
    requirements: &[EvidenceRequirement],
) -> ValidationReport {
    let mut report = ValidationReport::new();
    let Some(requirement) = requirements
        .iter()
        .find(|r| r.section.eq_ignore_ascii_case(section))
    else {
        return report;
    };

    let matching: Vec<&Value> = entries
        .iter()
        .filter(|e| {
            e.get("section")
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_uppercase() == section.to_uppercase())
        })
        .collect();
    let count = matching.len();

    if count < requirement.min_count {
        report.add(
            ValidationResult::error(
                format!("{section}.evidence"),
                format!(
                    "Only {count} evidence entries (need {}). {}",
                    requirement.min_count, requirement.description
                ),
            )
            .with_detail("count", count)
            .with_detail("min_count", requirement.min_count)
            .with_detail("preferred_types", requirement.preferred_types.clone()),
        );
    } else {
        report.add_success(
            format!("{section}.evidence"),
            format!("{count} evidence entries meet requirement"),
        );
    }

    if !matching.is_empty() {
        let total: f64 = matching.iter().map(|e| rating_or_floor(e)).sum();
        let average = total / count as f64;
        if average < f64::from(requirement.min_quality) {
            report.add(
                ValidationResult::warning(
                    format!("{section}.evidence_quality"),
                    format!(
                        "Average quality {average:.1} below recommended {}",
                        requirement.min_quality
                    ),
                )
                .with_detail("average_quality", average)
                .with_detail("min_quality", requirement.min_quality),
            );
        }
    }

    report
}

/// Log checks followed by coverage for every configured section.
pub fn validate_document_evidence(
    record: &StepRecord,
    requirements: &[EvidenceRequirement],
) -> ValidationReport {
    let entries = record
        .get(EVIDENCE_LOG_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut report = validate_evidence_log(entries);
    for requirement in requirements {
        report.extend(validate_section_evidence(entries, &requirement.section, requirements));
    }
    report
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregate statistics over an evidence log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceSummary {
    pub count: usize,
    pub sections: BTreeMap<String, usize>,
    pub average_quality: f64,
    /// Entry count per rating 1..=5.
    pub by_quality: BTreeMap<u8, usize>,
}

pub fn summarize(entries: &[Value]) -> EvidenceSummary {
    let mut sections = BTreeMap::new();
    let mut by_quality: BTreeMap<u8, usize> =
        EvidenceQuality::ALL.iter().map(|q| (q.rating(), 0)).collect();
    let mut total_quality = 0.0;

    for entry in entries {
        let section = entry
            .get("section")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        *sections.entry(section).or_insert(0) += 1;

        total_quality += rating_or_floor(entry);
        if let Some(q) = entry
            .get("quality_rating")
            .and_then(integer_rating)
            .and_then(EvidenceQuality::from_rating)
        {
            *by_quality.entry(q.rating()).or_insert(0) += 1;
        }
    }

    let average_quality = if entries.is_empty() {
        0.0
    } else {
        total_quality / entries.len() as f64
    };

    EvidenceSummary {
        count: entries.len(),
        sections,
        average_quality,
        by_quality,
    }
}

fn entry_id(entry: &StepRecord) -> String {
    entry
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

/// Integer value of a rating; whole-number floats such as `5.0` count.
fn integer_rating(rating: &Value) -> Option<i64> {
    rating.as_i64().or_else(|| {
        rating
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Rating used in averages; missing or non-numeric ratings count as 1.
fn rating_or_floor(entry: &Value) -> f64 {
    entry
        .get("quality_rating")
        .and_then(Value::as_f64)
        .unwrap_or(1.0)
}

/// Identifiers seen more than once, in first-repeat order.
fn duplicate_ids(entries: &[Value]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = Vec::new();
    for id in entries
        .iter()
        .filter_map(|e| e.get("id").and_then(Value::as_str))
    {
        if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use serde_json::json;

    fn entry(id: &str, section: &str, rating: i64) -> Value {
        json!({"id": id, "section": section, "source_type": "customer_interviews", "quality_rating": rating})
    }

    fn as_map(value: &Value) -> &StepRecord {
        value.as_object().unwrap()
    }

    // -- identifiers and ratings ---------------------------------------------

    #[test]
    fn evidence_id_pattern() {
        assert!(validate_evidence_id("E001").is_valid);
        assert!(validate_evidence_id("E999").is_valid);
        assert!(!validate_evidence_id("E01").is_valid);
        assert!(!validate_evidence_id("E0001").is_valid);
        assert!(!validate_evidence_id("e001").is_valid);
        assert!(!validate_evidence_id("X001").is_valid);
    }

    #[test]
    fn quality_rating_scale() {
        let r = validate_quality_rating(&json!(5), "E001");
        assert!(r.is_valid);
        assert_eq!(r.field, "E001.quality");
        assert!(r.message.contains("Gold Standard"));
        assert!(!validate_quality_rating(&json!(0), "E001").is_valid);
        assert!(!validate_quality_rating(&json!(6), "E001").is_valid);
        assert!(!validate_quality_rating(&json!(3.5), "E001").is_valid);
        assert!(!validate_quality_rating(&json!("high"), "E001").is_valid);
    }

    #[test]
    fn whole_number_float_rating_accepted() {
        let r = validate_quality_rating(&json!(5.0), "E001");
        assert!(r.is_valid);
        assert!(r.message.starts_with("Rating 5: Gold Standard"));
        assert!(!validate_quality_rating(&json!(6.0), "E001").is_valid);
        assert!(validate_quality_rating(&json!(3.5), "E001").message.contains("must be an integer"));
    }

    #[test]
    fn confidence_levels() {
        let r = validate_confidence_level("l2", "B4.confidence");
        assert!(r.is_valid);
        assert!(r.message.starts_with("L2: Indirect"));
        assert!(!validate_confidence_level("L4", "B4.confidence").is_valid);
    }

    // -- entries -------------------------------------------------------------

    #[test]
    fn valid_entry_has_no_failures() {
        let e = entry("E001", "B2", 4);
        let results = validate_evidence_entry(as_map(&e));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_valid));
    }

    #[test]
    fn missing_fields_are_errors() {
        let e = json!({"id": "E001"});
        let results = validate_evidence_entry(as_map(&e));
        let missing: Vec<&str> = results
            .iter()
            .filter(|r| r.message.starts_with("Missing required field"))
            .map(|r| r.field.as_str())
            .collect();
        assert_eq!(
            missing,
            vec!["evidence.section", "evidence.source_type", "evidence.quality_rating"]
        );
    }

    #[test]
    fn bad_date_is_warning() {
        let mut e = entry("E002", "B3", 3);
        e["date"] = json!("03/04/2024");
        let results = validate_evidence_entry(as_map(&e));
        let date = results.iter().find(|r| r.field == "E002.date").unwrap();
        assert_eq!(date.severity, Severity::Warning);

        e["date"] = json!("2024-03-04");
        let results = validate_evidence_entry(as_map(&e));
        assert!(results.iter().all(|r| r.field != "E002.date"));
    }

    #[test]
    fn null_date_treated_as_absent() {
        let mut e = entry("E003", "B4", 4);
        e["date"] = Value::Null;
        let results = validate_evidence_entry(as_map(&e));
        assert!(results.iter().all(|r| r.field != "E003.date"));
        assert!(results.iter().all(|r| r.is_valid));
    }

    // -- log -----------------------------------------------------------------

    #[test]
    fn empty_log_single_warning() {
        let report = validate_evidence_log(&[]);
        assert_eq!(report.len(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.is_valid());
        assert!(report.results()[0].message.contains("No supporting evidence"));
    }

    #[test]
    fn duplicates_reported_once() {
        let log = vec![entry("E001", "B2", 5), entry("E001", "B2", 4), entry("E001", "B4", 4)];
        let report = validate_evidence_log(&log);
        let dup: Vec<_> = report
            .results()
            .iter()
            .filter(|r| r.message.starts_with("Duplicate"))
            .collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].details["duplicates"], json!(["E001"]));
        assert!(!report.is_valid());
    }

    #[test]
    fn small_log_gets_soft_warning() {
        let log = vec![entry("E001", "B2", 5), entry("E002", "B2", 4)];
        let report = validate_evidence_log(&log);
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn non_mapping_entry_is_error() {
        let log = vec![json!("E001"), entry("E002", "B2", 4), entry("E003", "B2", 4)];
        let report = validate_evidence_log(&log);
        assert_eq!(report.error_count(), 1);
        assert!(report.for_field("evidence_log[0]").next().is_some());
    }

    // -- sections ------------------------------------------------------------

    #[test]
    fn section_shortfall_is_error() {
        let log = vec![entry("E001", "b2", 5)];
        let report = validate_section_evidence(&log, "B2", &default_evidence_requirements());
        assert_eq!(report.error_count(), 1);
        let r = report.for_field("B2.evidence").next().unwrap();
        assert!(r.message.contains("need 2"));
        assert!(r.message.contains("customer validation"));
    }

    #[test]
    fn section_low_quality_is_warning() {
        let log = vec![entry("E001", "B2", 3), entry("E002", "B2", 4)];
        let report = validate_section_evidence(&log, "B2", &default_evidence_requirements());
        assert!(report.is_valid());
        let r = report.for_field("B2.evidence_quality").next().unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert!(r.message.contains("3.5 below recommended 4"));
    }

    #[test]
    fn unconfigured_section_is_silent() {
        let log = vec![entry("E001", "C9", 3)];
        assert!(validate_section_evidence(&log, "C9", &default_evidence_requirements()).is_empty());
    }

    #[test]
    fn zero_minimum_section_passes_when_empty() {
        let report = validate_section_evidence(&[], "B1", &default_evidence_requirements());
        assert!(report.is_valid());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn document_checks_every_section() {
        let record = json!({"evidence_log": [
            entry("E001", "B2", 5), entry("E002", "B2", 4), entry("E003", "B3", 4),
        ]});
        let report = validate_document_evidence(as_map(&record), &default_evidence_requirements());
        // B4, B5, B6, B7 fall short.
        assert_eq!(report.error_count(), 4);
    }

    // -- summary -------------------------------------------------------------

    #[test]
    fn summary_counts() {
        let log = vec![entry("E001", "B2", 5), entry("E002", "B2", 3), entry("E003", "B4", 4)];
        let summary = summarize(&log);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.sections["B2"], 2);
        assert_eq!(summary.by_quality[&5], 1);
        assert_eq!(summary.by_quality[&1], 0);
        assert!((summary.average_quality - 4.0).abs() < 1e-9);
    }

    #[test]
    fn typed_entry_deserializes() {
        let e: EvidenceEntry = serde_json::from_value(json!({
            "id": "E004", "section": "B6", "source_type": "contracts",
            "quality_rating": 5, "description": "Signed LOI", "date": "2024-05-01"
        }))
        .unwrap();
        assert_eq!(e.quality(), Some(EvidenceQuality::GoldStandard));
    }
}
