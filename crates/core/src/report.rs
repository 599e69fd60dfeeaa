//! Graded validation outcomes and the ordered report that collects them.
//!
//! Every validator in this crate produces [`ValidationResult`]s and appends
//! them to a [`ValidationReport`]. Report-level validity and the error and
//! warning counts are always derived from the current contents.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Width of the horizontal rule in rendered reports.
const RULE_WIDTH: usize = 60;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How serious a single result is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Stable string representation matching serde's `rename_all = "lowercase"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Tag used when rendering a result line.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
            Self::Info => "INFO",
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// One graded outcome.
///
/// `field` is a label for the checked item and need not be unique within a
/// report. `details` carries auxiliary data such as counts, gaps or the terms
/// that triggered a content warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub severity: Severity,
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl ValidationResult {
    pub fn new(
        is_valid: bool,
        severity: Severity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            is_valid,
            severity,
            field: field.into(),
            message: message.into(),
            details: Map::new(),
        }
    }

    /// A passing, informational result.
    pub fn success(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(true, Severity::Info, field, message)
    }

    /// A soft signal. Warnings never invalidate a report.
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(true, Severity::Warning, field, message)
    }

    /// A hard failure.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(false, Severity::Error, field, message)
    }

    /// Attach one detail entry.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Whether this result makes a report invalid.
    pub fn is_blocking(&self) -> bool {
        !self.is_valid && self.severity == Severity::Error
    }

    fn is_plain_success(&self) -> bool {
        self.is_valid && self.severity == Severity::Info
    }

    /// Look up a numeric detail.
    pub fn detail_f64(&self, key: &str) -> Option<f64> {
        self.details.get(key).and_then(Value::as_f64)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.tag(), self.field, self.message)
    }
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

/// Ordered collection of results from one validation run.
///
/// Results can be appended but never modified or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: ValidationResult) {
        self.results.push(result);
    }

    pub fn add_success(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationResult::success(field, message));
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationResult::warning(field, message));
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationResult::error(field, message));
    }

    /// Append every result of `other`, keeping its order.
    pub fn extend(&mut self, other: ValidationReport) {
        self.results.extend(other.results);
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True iff no result is an invalid error.
    pub fn is_valid(&self) -> bool {
        !self.results.iter().any(ValidationResult::is_blocking)
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_blocking()).count()
    }

    /// Counts every warning, including below-threshold near misses.
    pub fn warning_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Info)
            .count()
    }

    /// Results that are not plain informational successes.
    pub fn non_info(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.is_plain_success())
    }

    /// Results carrying the given field label.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationResult> {
        self.results.iter().filter(move |r| r.field == field)
    }

    /// Rendering limited to [`non_info`](Self::non_info) results unless
    /// `include_info` is set.
    pub fn display(&self, include_info: bool) -> ReportDisplay<'_> {
        ReportDisplay {
            report: self,
            include_info,
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display(true), f)
    }
}

/// Text rendering of a report, returned by [`ValidationReport::display`].
pub struct ReportDisplay<'a> {
    report: &'a ValidationReport,
    include_info: bool,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Validation Report: {} errors, {} warnings",
            self.report.error_count(),
            self.report.warning_count()
        )?;
        write!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for result in self
            .report
            .results
            .iter()
            .filter(|r| self.include_info || !r.is_plain_success())
        {
            write!(f, "\n{result}")?;
        }
        Ok(())
    }
}
