//! Engine configuration: every rule, limit and threshold table in one place.
//!
//! [`EngineConfig::default`] carries the built-in business tables.
//! [`EngineConfig::from_json_str`] accepts a partial override document;
//! tables it omits keep their built-in values.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::char_limits::CharLimitTable;
use crate::dependencies::{default_step_dependencies, DependencyTable};
use crate::error::CoreError;
use crate::evidence::{default_evidence_requirements, EvidenceRequirement};
use crate::flow::rules::{default_data_flows, default_project_pairs, DataFlowRule, StepPair};
use crate::scoring::ScoreConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    pub char_limits: CharLimitTable,
    #[validate(nested)]
    pub scores: ScoreConfig,
    #[validate(nested)]
    pub evidence_requirements: Vec<EvidenceRequirement>,
    #[validate(nested)]
    pub data_flows: Vec<DataFlowRule>,
    #[validate(nested)]
    pub project_pairs: Vec<StepPair>,
    pub step_dependencies: DependencyTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            char_limits: CharLimitTable::default(),
            scores: ScoreConfig::default(),
            evidence_requirements: default_evidence_requirements(),
            data_flows: default_data_flows(),
            project_pairs: default_project_pairs(),
            step_dependencies: default_step_dependencies(),
        }
    }
}

static BUILTIN: OnceLock<EngineConfig> = OnceLock::new();

impl EngineConfig {
    /// Shared built-in tables, initialised on first use.
    pub fn builtin() -> &'static EngineConfig {
        BUILTIN.get_or_init(EngineConfig::default)
    }

    /// Decode an override document and check it.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.check()?;

        if config != *Self::builtin() {
            tracing::warn!(
                rules = config.data_flows.len(),
                pairs = config.project_pairs.len(),
                limits = config.char_limits.iter().count(),
                "Using overridden engine configuration",
            );
        }
        Ok(config)
    }

    /// Derive-level validation plus the cross-field table invariants.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        self.scores.check()?;

        if let Some((tag, _)) = self.char_limits.iter().find(|(_, limit)| *limit == 0) {
            return Err(CoreError::Validation(format!(
                "Character limit for '{}' must be greater than 0",
                tag.as_str()
            )));
        }

        let mut sections: Vec<String> = Vec::new();
        for req in &self.evidence_requirements {
            let key = req.section.to_uppercase();
            if sections.contains(&key) {
                return Err(CoreError::Validation(format!(
                    "Evidence section '{}' is configured more than once",
                    req.section
                )));
            }
            sections.push(key);
        }

        if let Some((step, _)) = self
            .step_dependencies
            .iter()
            .find(|(step, deps)| deps.iter().any(|d| d == *step))
        {
            return Err(CoreError::Validation(format!(
                "Step '{step}' cannot depend on itself"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::char_limits::{validate_document, LimitTag};
    use crate::flow::rules::MatchPolicy;
    use assert_matches::assert_matches;

    #[test]
    fn builtin_tables_pass_check() {
        let config = EngineConfig::builtin();
        assert!(config.check().is_ok());
        assert_eq!(config.data_flows.len(), 7);
        assert_eq!(config.project_pairs.len(), 6);
        assert_eq!(config.step_dependencies.len(), 4);
        assert_eq!(config.evidence_requirements.len(), 7);
    }

    #[test]
    fn empty_document_is_builtin() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(&config, EngineConfig::builtin());
    }

    #[test]
    fn partial_override_keeps_other_tables() {
        let config = EngineConfig::from_json_str(
            r#"{
                "data_flows": [{
                    "source_step": "step_1", "target_step": "step_2",
                    "source_field": "items", "target_field": "items",
                    "policy": "contains"
                }],
                "char_limits": {"task": 80}
            }"#,
        )
        .unwrap();
        assert_eq!(config.data_flows.len(), 1);
        assert_eq!(config.data_flows[0].policy, MatchPolicy::Contains);
        assert_eq!(config.char_limits.get(LimitTag::Task), Some(80));
        assert_eq!(config.char_limits.get(LimitTag::Pain), Some(60));
        assert_eq!(config.scores, ScoreConfig::default());
    }

    #[test]
    fn single_limit_override_keeps_other_limits_enforced() {
        let config = EngineConfig::from_json_str(r#"{"char_limits": {"task": 80}}"#).unwrap();
        for tag in LimitTag::ALL.into_iter().filter(|t| *t != LimitTag::Task) {
            assert_eq!(config.char_limits.get(tag), Some(tag.default_limit()), "{tag:?}");
        }

        let needs = serde_json::json!({"needs": ["x".repeat(500)]});
        let report = validate_document(
            needs.as_object().unwrap(),
            None,
            &config.char_limits,
        );
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn null_limit_removes_tag() {
        let config = EngineConfig::from_json_str(r#"{"char_limits": {"note": null}}"#).unwrap();
        assert_eq!(config.char_limits.get(LimitTag::Note), None);
        assert_eq!(config.char_limits.get(LimitTag::StrategicNote), Some(250));
    }

    #[test]
    fn undecodable_document_is_config_error() {
        assert_matches!(
            EngineConfig::from_json_str("{\"data_flows\": 3}"),
            Err(CoreError::Config(_))
        );
    }

    #[test]
    fn bad_weights_rejected() {
        let result = EngineConfig::from_json_str(
            r#"{"scores": {"dimensions": [{"dimension": "legitimacy", "weight": 0.5}]}}"#,
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("sum to 1.0"));
    }

    #[test]
    fn zero_limit_rejected() {
        let config = EngineConfig {
            char_limits: CharLimitTable::default().with_limit(LimitTag::Note, 0),
            ..EngineConfig::default()
        };
        assert_matches!(config.check(), Err(CoreError::Validation(msg)) if msg.contains("note"));
    }

    #[test]
    fn empty_rule_field_rejected() {
        let mut config = EngineConfig::default();
        config.data_flows[0].target_field.clear();
        assert_matches!(config.check(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn self_dependency_rejected() {
        let mut config = EngineConfig::default();
        config
            .step_dependencies
            .insert("step_3".into(), vec!["step_3".into()]);
        assert_matches!(config.check(), Err(CoreError::Validation(msg)) if msg.contains("step_3"));
    }
}
