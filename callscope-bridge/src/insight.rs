use callscope_pipeline::{Outcome, Sentiment};
use serde::{Deserialize, Serialize};

/// Per-call insight extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmCallInsight {
    pub call_id: String,
    pub upsell_attempted: bool,
    pub upsell_attached_to_recurring: bool,
    pub sale_outcome: Outcome,
    pub follow_up_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_phrase: Option<String>,
    #[serde(default)]
    pub objections: Vec<String>,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub key_moments: Vec<KeyMoment>,
    pub customer_intent: String,
    #[serde(default)]
    pub rep_performance: RepPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Agent,
    Customer,
}

/// A notable quote, with its `MM:SS` position in the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMoment {
    pub timestamp: String,
    pub speaker: Speaker,
    pub quote: String,
    pub significance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepPerformance {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}
