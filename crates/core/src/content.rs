//! Content-quality checks for free-text fields.
//!
//! Presence, pattern and count checks plus wording signals: dash usage,
//! solution language in problem statements, missing quantification and
//! vague terms.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::report::{Severity, ValidationResult};

/// Words that signal a problem statement is describing a solution.
pub const SOLUTION_WORDS: &[&str] = &[
    "app",
    "platform",
    "software",
    "ai",
    "tool",
    "system",
    "solution",
    "service",
    "product",
    "technology",
    "algorithm",
];

/// Terms that weaken a claim unless quantified.
pub const VAGUE_TERMS: &[&str] = &[
    "many",
    "several",
    "some",
    "lots",
    "various",
    "numerous",
    "significant",
    "considerable",
    "substantial",
    "good",
    "great",
];

/// Default number of numeric tokens a quantified statement needs.
pub const DEFAULT_MIN_NUMBERS: usize = 2;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d{2})?|\d+(?:\.\d+)?%?|\d+[KMB]?").expect("valid regex")
});

/// Present and, unless `allow_empty`, not blank.
pub fn validate_required_field(
    value: Option<&Value>,
    field: &str,
    allow_empty: bool,
) -> ValidationResult {
    match value {
        None | Some(Value::Null) => ValidationResult::error(field, "Required field is missing"),
        Some(Value::String(s)) if !allow_empty && s.trim().is_empty() => {
            ValidationResult::error(field, "Required field is empty")
        }
        _ => ValidationResult::success(field, "Present and non-empty"),
    }
}

pub fn validate_pattern(
    text: &str,
    pattern: &Regex,
    field: &str,
    description: &str,
) -> ValidationResult {
    if pattern.is_match(text) {
        ValidationResult::success(field, format!("Matches {description}"))
    } else {
        ValidationResult::error(field, format!("Does not match {description}"))
            .with_detail("value", text)
            .with_detail("expected_pattern", pattern.as_str())
    }
}

/// Item count within `min..=max` (no upper bound when `max` is `None`).
pub fn validate_list_count(
    count: usize,
    field: &str,
    min: usize,
    max: Option<usize>,
) -> ValidationResult {
    match max {
        None if count >= min => {
            ValidationResult::success(field, format!("{count} items (min: {min})"))
        }
        None => ValidationResult::error(
            field,
            format!("Only {count} items (need at least {min})"),
        ),
        Some(max) if (min..=max).contains(&count) => {
            ValidationResult::success(field, format!("{count} items (range: {min}-{max})"))
        }
        Some(max) => ValidationResult::error(
            field,
            format!("{count} items outside range ({min}-{max})"),
        ),
    }
}

pub fn validate_no_em_dashes(text: &str, field: &str) -> ValidationResult {
    if text.contains('\u{2014}') || text.contains('\u{2013}') {
        ValidationResult::error(field, "Contains em dash or en dash (not allowed)")
    } else {
        ValidationResult::success(field, "No em/en dashes found")
    }
}

/// Problem statements must not name a solution.
pub fn validate_solution_neutral(text: &str, field: &str) -> ValidationResult {
    let found = whole_words_present(text, SOLUTION_WORDS);
    if found.is_empty() {
        ValidationResult::success(field, "Solution-neutral language")
    } else {
        ValidationResult::error(field, format!("Contains solution language: {}", found.join(", ")))
            .with_detail("found_words", found)
    }
}

pub fn validate_quantification(text: &str, field: &str, min_numbers: usize) -> ValidationResult {
    let numbers: Vec<String> = NUMBER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    if numbers.len() >= min_numbers {
        ValidationResult::success(field, format!("Contains {} quantified values", numbers.len()))
            .with_detail("numbers_found", numbers)
    } else {
        ValidationResult::error(
            field,
            format!("Only {} numbers (need at least {min_numbers})", numbers.len()),
        )
        .with_detail("numbers_found", numbers)
        .with_detail("required", min_numbers)
    }
}

pub fn validate_no_vague_terms(text: &str, field: &str) -> ValidationResult {
    let found = whole_words_present(text, VAGUE_TERMS);
    if found.is_empty() {
        ValidationResult::success(field, "No vague terms found")
    } else {
        ValidationResult::new(
            false,
            Severity::Warning,
            field,
            format!("Contains vague terms: {}", found.join(", ")),
        )
        .with_detail("found_terms", found)
    }
}

/// Vocabulary entries that occur as whole words, case-insensitively.
fn whole_words_present(text: &str, vocabulary: &[&str]) -> Vec<String> {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    vocabulary
        .iter()
        .filter(|term| words.iter().any(|w| w == *term))
        .map(|term| term.to_string())
        .collect()
}
