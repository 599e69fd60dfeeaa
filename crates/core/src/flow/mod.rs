//! Cross-step data-flow consistency.
//!
//! Provides the rule table, the match policies and the step-pair and
//! whole-project validators. Everything operates on deserialized records.

pub mod consistency;
pub mod policy;
pub mod rules;
