//! Data-flow rule and match-policy types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::StepId;

/// How a target field's values must relate to the source field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Same set of items after trimming.
    Exact,
    /// Every source item appears, case-insensitively, somewhere in the target.
    Contains,
    /// Structural mapping between steps; checked the same way as `Contains`.
    Mapped,
}

impl MatchPolicy {
    pub const ALL: [MatchPolicy; 3] = [Self::Exact, Self::Contains, Self::Mapped];

    /// Stable string representation matching serde's `rename_all = "lowercase"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::Mapped => "mapped",
        }
    }
}

/// One inter-step field flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DataFlowRule {
    #[validate(length(min = 1))]
    pub source_step: StepId,
    #[validate(length(min = 1))]
    pub target_step: StepId,
    #[validate(length(min = 1))]
    pub source_field: String,
    #[validate(length(min = 1))]
    pub target_field: String,
    #[serde(default = "default_policy")]
    pub policy: MatchPolicy,
    #[serde(default)]
    pub description: String,
}

fn default_policy() -> MatchPolicy {
    MatchPolicy::Exact
}

impl DataFlowRule {
    pub fn new(
        source_step: &str,
        target_step: &str,
        source_field: &str,
        target_field: &str,
        policy: MatchPolicy,
        description: &str,
    ) -> Self {
        Self {
            source_step: source_step.to_string(),
            target_step: target_step.to_string(),
            source_field: source_field.to_string(),
            target_field: target_field.to_string(),
            policy,
            description: description.to_string(),
        }
    }

    /// `source->target` label used in result fields.
    pub fn pair_label(&self) -> String {
        format!("{}->{}", self.source_step, self.target_step)
    }

    pub fn applies_to(&self, source_step: &str, target_step: &str) -> bool {
        self.source_step == source_step && self.target_step == target_step
    }
}

/// Built-in flows between workflow steps.
pub fn default_data_flows() -> Vec<DataFlowRule> {
    use MatchPolicy::*;
    vec![
        DataFlowRule::new(
            "step_5",
            "step_7",
            "requesters",
            "column_headers",
            Exact,
            "Requester names must match exactly",
        ),
        DataFlowRule::new(
            "step_5",
            "step_7",
            "needs",
            "row_labels",
            Exact,
            "Need statements must match exactly (60-char limit)",
        ),
        DataFlowRule::new(
            "step_5",
            "step_9",
            "requesters",
            "buyers_users",
            Contains,
            "Requesters must appear in Buyers/End Users columns",
        ),
        DataFlowRule::new(
            "step_8",
            "step_9",
            "players",
            "value_chain_nodes",
            Mapped,
            "Players must appear in value chain",
        ),
        DataFlowRule::new(
            "step_8",
            "step_9",
            "influencers",
            "enablers_influencers",
            Contains,
            "Influencers must appear at top of network",
        ),
        DataFlowRule::new(
            "step_5",
            "step_11",
            "needs",
            "needs_columns",
            Exact,
            "Needs become column headers in Features/Needs view",
        ),
        DataFlowRule::new(
            "step_4",
            "step_11",
            "means",
            "means_columns",
            Exact,
            "Means become column headers in Features/Means view",
        ),
    ]
}

/// An ordered (source, target) step pair checked in a project run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StepPair {
    #[validate(length(min = 1))]
    pub source: StepId,
    #[validate(length(min = 1))]
    pub target: StepId,
}

impl StepPair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Pairs checked by a whole-project run, in order.
pub fn default_project_pairs() -> Vec<StepPair> {
    [
        ("step_5", "step_7"),
        ("step_5", "step_9"),
        ("step_8", "step_9"),
        ("step_5", "step_11"),
        ("step_4", "step_11"),
        ("step_7", "step_11"),
    ]
    .into_iter()
    .map(|(s, t)| StepPair::new(s, t))
    .collect()
}
