//! Character limits for deliverable text fields.
//!
//! Limits are selected by a semantic [`LimitTag`] and looked up in an
//! overridable [`CharLimitTable`]. Counting is by Unicode code point with
//! whitespace included.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::report::{ValidationReport, ValidationResult};
use crate::types::StepRecord;

/// Characters of offending text kept in overflow details.
const PREVIEW_CHARS: usize = 100;

/// Suffix marking a shortened string.
pub const TRUNCATION_SUFFIX: &str = "...";

// ---------------------------------------------------------------------------
// Limit tags
// ---------------------------------------------------------------------------

/// Semantic field kinds that carry a character limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitTag {
    /// Executive brief B1: project name and tagline combined.
    B1Combined,
    B2Problem,
    B3Solution,
    B4Market,
    B5Revenue,
    B6Traction,
    B7Team,
    NeedStatement,
    Task,
    Pain,
    Expectation,
    Means,
    Note,
    StrategicNote,
    OrganizationName,
    RoleDescription,
}

impl LimitTag {
    pub const ALL: [LimitTag; 16] = [
        Self::B1Combined,
        Self::B2Problem,
        Self::B3Solution,
        Self::B4Market,
        Self::B5Revenue,
        Self::B6Traction,
        Self::B7Team,
        Self::NeedStatement,
        Self::Task,
        Self::Pain,
        Self::Expectation,
        Self::Means,
        Self::Note,
        Self::StrategicNote,
        Self::OrganizationName,
        Self::RoleDescription,
    ];

    /// Stable string representation matching serde's `rename_all = "snake_case"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::B1Combined => "b1_combined",
            Self::B2Problem => "b2_problem",
            Self::B3Solution => "b3_solution",
            Self::B4Market => "b4_market",
            Self::B5Revenue => "b5_revenue",
            Self::B6Traction => "b6_traction",
            Self::B7Team => "b7_team",
            Self::NeedStatement => "need_statement",
            Self::Task => "task",
            Self::Pain => "pain",
            Self::Expectation => "expectation",
            Self::Means => "means",
            Self::Note => "note",
            Self::StrategicNote => "strategic_note",
            Self::OrganizationName => "organization_name",
            Self::RoleDescription => "role_description",
        }
    }

    /// The business limit for this tag.
    pub fn default_limit(&self) -> usize {
        match self {
            Self::B1Combined => 150,
            Self::B2Problem
            | Self::B3Solution
            | Self::B4Market
            | Self::B5Revenue
            | Self::B6Traction => 300,
            Self::B7Team => 200,
            Self::NeedStatement | Self::Task | Self::Pain | Self::Expectation | Self::Means => 60,
            Self::Note | Self::StrategicNote => 250,
            Self::OrganizationName => 60,
            Self::RoleDescription => 100,
        }
    }
}

/// Tag to limit lookup.
///
/// Deserializing layers the document over the built-in limits: listed tags
/// replace their default, a `null` value removes the tag, unlisted tags keep
/// their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CharLimitTable {
    limits: BTreeMap<LimitTag, usize>,
}

impl<'de> Deserialize<'de> for CharLimitTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<LimitTag, Option<usize>>::deserialize(deserializer)?;
        let mut table = Self::default();
        for (tag, limit) in overrides {
            table = match limit {
                Some(limit) => table.with_limit(tag, limit),
                None => table.without(tag),
            };
        }
        Ok(table)
    }
}

impl Default for CharLimitTable {
    fn default() -> Self {
        Self {
            limits: LimitTag::ALL
                .iter()
                .map(|tag| (*tag, tag.default_limit()))
                .collect(),
        }
    }
}

impl CharLimitTable {
    pub fn get(&self, tag: LimitTag) -> Option<usize> {
        self.limits.get(&tag).copied()
    }

    /// Replace (or add) the limit for one tag.
    pub fn with_limit(mut self, tag: LimitTag, limit: usize) -> Self {
        self.limits.insert(tag, limit);
        self
    }

    pub fn without(mut self, tag: LimitTag) -> Self {
        self.limits.remove(&tag);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (LimitTag, usize)> + '_ {
        self.limits.iter().map(|(tag, limit)| (*tag, *limit))
    }
}

// ---------------------------------------------------------------------------
// Counting and truncation
// ---------------------------------------------------------------------------

/// Number of Unicode code points, whitespace included.
pub fn count_characters(text: &str) -> usize {
    text.chars().count()
}

/// Shorten `text` to at most `limit` characters, ending with `suffix`.
///
/// Text already within the limit is returned unchanged. Trailing whitespace
/// before the suffix is dropped.
pub fn truncate_to_limit(text: &str, limit: usize, suffix: &str) -> String {
    if count_characters(text) <= limit {
        return text.to_string();
    }
    let suffix_len = count_characters(suffix);
    if limit <= suffix_len {
        return suffix.chars().take(limit).collect();
    }
    let kept: String = text.chars().take(limit - suffix_len).collect();
    format!("{}{suffix}", kept.trim_end())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check one value against the limit for `tag`.
pub fn validate_text(
    text: &str,
    tag: LimitTag,
    field: &str,
    table: &CharLimitTable,
) -> ValidationResult {
    let Some(limit) = table.get(tag) else {
        return ValidationResult::warning(field, format!("Unknown limit type: {}", tag.as_str()));
    };

    let count = count_characters(text);
    if count <= limit {
        ValidationResult::success(field, format!("{count}/{limit} characters (OK)"))
            .with_detail("count", count)
            .with_detail("limit", limit)
    } else {
        let over = count - limit;
        ValidationResult::error(field, format!("{count}/{limit} characters (OVER by {over})"))
            .with_detail("count", count)
            .with_detail("limit", limit)
            .with_detail("over", over)
            .with_detail("text", preview(text))
    }
}

/// Check each element, labelling results `list_name[index]`.
pub fn validate_list<S: AsRef<str>>(
    items: &[S],
    tag: LimitTag,
    list_name: &str,
    table: &CharLimitTable,
) -> Vec<ValidationResult> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_text(item.as_ref(), tag, &format!("{list_name}[{i}]"), table))
        .collect()
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}{TRUNCATION_SUFFIX}")
}

// ---------------------------------------------------------------------------
// Document checks
// ---------------------------------------------------------------------------

/// Record shapes with known text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ExecutiveBrief,
    Personas,
    ValueNetwork,
    NeedsMatrix,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutiveBrief => "executive_brief",
            Self::Personas => "personas",
            Self::ValueNetwork => "value_network",
            Self::NeedsMatrix => "needs_matrix",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "executive_brief" => Ok(Self::ExecutiveBrief),
            "personas" => Ok(Self::Personas),
            "value_network" => Ok(Self::ValueNetwork),
            "needs_matrix" => Ok(Self::NeedsMatrix),
            _ => Err(format!(
                "Invalid document type '{s}'. Must be one of: executive_brief, personas, \
                 value_network, needs_matrix"
            )),
        }
    }

    /// Guess the document type from the keys present.
    pub fn detect(record: &StepRecord) -> Option<Self> {
        if record.contains_key("problem_description") {
            Some(Self::ExecutiveBrief)
        } else if record.contains_key("personas") {
            Some(Self::Personas)
        } else if record.contains_key("enablers_influencers") {
            Some(Self::ValueNetwork)
        } else if record.contains_key("needs") {
            Some(Self::NeedsMatrix)
        } else {
            None
        }
    }
}

/// Value network sections holding organizations.
pub const VALUE_NETWORK_SECTIONS: &[&str] = &[
    "enablers_influencers",
    "products_solutions",
    "channels_partners",
    "buyers",
    "end_users",
];

/// Run the checks for `doc_type`, or auto-detect it when `None`.
///
/// A record whose type cannot be detected yields a single warning.
pub fn validate_document(
    record: &StepRecord,
    doc_type: Option<DocumentType>,
    table: &CharLimitTable,
) -> ValidationReport {
    match doc_type.or_else(|| DocumentType::detect(record)) {
        Some(DocumentType::ExecutiveBrief) => validate_executive_brief(record, table),
        Some(DocumentType::Personas) => validate_personas(record, table),
        Some(DocumentType::ValueNetwork) => validate_value_network(record, table),
        Some(DocumentType::NeedsMatrix) => validate_needs_matrix(record, table),
        None => {
            let mut report = ValidationReport::new();
            report.add_warning("document", "Could not detect document type; no limits checked");
            report
        }
    }
}

pub fn validate_executive_brief(record: &StepRecord, table: &CharLimitTable) -> ValidationReport {
    let mut report = ValidationReport::new();

    let name = str_field(record, "project_name");
    let tagline = str_field(record, "tagline");
    let combined = if tagline.is_empty() {
        name.to_string()
    } else {
        format!("{name}: {tagline}")
    };
    report.add(validate_text(&combined, LimitTag::B1Combined, "B1: Name + Tagline", table));

    let sections = [
        ("problem_description", LimitTag::B2Problem, "B2: Problem Description"),
        ("solution_description", LimitTag::B3Solution, "B3: Solution Description"),
        ("market_description", LimitTag::B4Market, "B4: Market Description"),
        ("revenue_description", LimitTag::B5Revenue, "B5: Revenue Description"),
        ("status_description", LimitTag::B6Traction, "B6: Status Description"),
        ("team_overview", LimitTag::B7Team, "B7: Team Overview"),
    ];
    for (key, tag, label) in sections {
        report.add(validate_text(str_field(record, key), tag, label, table));
    }

    report
}

pub fn validate_personas(record: &StepRecord, table: &CharLimitTable) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (i, persona) in array_field(record, "personas").iter().enumerate() {
        let Some(persona) = persona.as_object() else {
            report.add_error(format!("personas[{i}]"), "Persona entry must be a mapping");
            continue;
        };
        let name = persona
            .get("first_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Persona {}", i + 1));

        for (key, tag) in [
            ("tasks", LimitTag::Task),
            ("pains", LimitTag::Pain),
            ("expectations", LimitTag::Expectation),
        ] {
            let items = string_items(array_field(persona, key));
            for result in validate_list(&items, tag, &format!("{name}.{key}"), table) {
                report.add(result);
            }
        }
    }

    report
}

pub fn validate_value_network(record: &StepRecord, table: &CharLimitTable) -> ValidationReport {
    let mut report = ValidationReport::new();

    for section in VALUE_NETWORK_SECTIONS {
        for (i, org) in array_field(record, section).iter().enumerate() {
            let Some(org) = org.as_object() else {
                report.add_error(format!("{section}[{i}]"), "Organization entry must be a mapping");
                continue;
            };
            let default_name = format!("Org {}", i + 1);
            let name = org.get("name").and_then(Value::as_str).unwrap_or(&default_name);
            report.add(validate_text(
                name,
                LimitTag::OrganizationName,
                &format!("{section}[{i}].name"),
                table,
            ));
            report.add(validate_text(
                str_field(org, "role"),
                LimitTag::RoleDescription,
                &format!("{section}[{i}].role"),
                table,
            ));
            report.add(validate_text(
                str_field(org, "notes"),
                LimitTag::StrategicNote,
                &format!("{section}[{i}].notes"),
                table,
            ));
        }
    }

    report
}

pub fn validate_needs_matrix(record: &StepRecord, table: &CharLimitTable) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (i, need) in array_field(record, "needs").iter().enumerate() {
        let statement = match need {
            Value::String(s) => s.as_str(),
            Value::Object(map) => str_field(map, "statement"),
            _ => "",
        };
        report.add(validate_text(statement, LimitTag::NeedStatement, &format!("Need[{i}]"), table));
    }

    report
}

fn str_field<'a>(record: &'a StepRecord, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("")
}

fn array_field<'a>(record: &'a StepRecord, key: &str) -> &'a [Value] {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_items(values: &[Value]) -> Vec<&str> {
    values.iter().filter_map(Value::as_str).collect()
}
