//! VIANEO step-record validation engine.
//!
//! Pure checks over already-deserialized step records:
//!
//! - [`extract`]: dotted-path field extraction into flat string lists.
//! - [`char_limits`]: character limits per semantic field tag.
//! - [`scoring`]: dimension score thresholds and the weighted overall score.
//! - [`evidence`]: evidence log format and per-section coverage.
//! - [`content`]: wording and presence checks for free text.
//! - [`flow`]: cross-step data-flow rules and match policies.
//! - [`dependencies`]: upstream step prerequisites.
//!
//! Every check returns [`ValidationResult`]s collected into a
//! [`ValidationReport`]. Only caller contract violations surface as
//! [`CoreError`].

pub mod char_limits;
pub mod config;
pub mod content;
pub mod dependencies;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod flow;
pub mod report;
pub mod scoring;
pub mod types;

pub use config::EngineConfig;
pub use error::CoreError;
pub use report::{Severity, ValidationReport, ValidationResult};
pub use types::{StepId, StepRecord};
