use crate::domain::{PatternOptions, PatternPair, TargetDialect};
use serde::{Deserialize, Serialize};

/// Separates the find part from the replace part of a completion response.
pub const DELIMITER: &str = "|||";

pub const EXPLANATION_PLACEHOLDER: &str = "Could not generate explanation.";

pub const REFINE_ACKNOWLEDGMENT: &str =
    "Pattern updated based on your feedback. See the explanation for a breakdown of the new patterns.";

pub(super) const PATTERN_TEMPERATURE: f32 = 0.3;
pub(super) const EXPLAIN_TEMPERATURE: f32 = 0.3;
pub(super) const EXPLAIN_MAX_TOKENS: u32 = 1200;
pub(super) const CONVERT_TEMPERATURE: f32 = 0.2;

pub fn refine_failure_message(details: &str) -> String {
    format!("Error refining: {details}")
}

/// Result of a first-time generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub pair: PatternPair,
    pub explanation: String,
    /// The explanation call failed and [`EXPLANATION_PLACEHOLDER`] was used.
    pub explanation_degraded: bool,
    /// The rendered structured prompt. Refinement calls are grounded on it.
    pub generation_context: String,
}

/// Input for one refinement turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineInput {
    pub generation_context: String,
    /// The pair the user is currently looking at, local edits included.
    pub current: PatternPair,
    pub feedback: String,
    pub options: PatternOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementOutcome {
    pub pair: PatternPair,
    pub explanation: String,
    pub explanation_degraded: bool,
    /// The feedback that produced this pair, echoed back.
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertInput {
    pub pair: PatternPair,
    pub description: Option<String>,
    pub dialect: TargetDialect,
}
