//! Prompt construction and lenient parsing of model replies.
//!
//! Models wrap JSON in Markdown fences, omit fields, and emit `null` where a
//! list belongs. Parsing accepts all of that and fills the gaps with
//! neutral defaults. Only an empty reply or text that is not JSON at all is
//! an error, and the caller falls back to keyword analysis.

use callscope_pipeline::{Outcome, Sentiment};
use serde::Deserialize;

use crate::error::{BridgeError, BridgeResult};
use crate::insight::{KeyMoment, LlmCallInsight, RepPerformance};

pub const UNKNOWN_INTENT: &str = "Unknown";

pub const ANALYSIS_PROMPT: &str = r#"You are analyzing a call center conversation transcript for a pest control company. Extract the following information and return ONLY valid JSON in this exact format:

{
  "upsellAttempted": boolean,
  "upsellAttachedToRecurring": boolean,
  "saleOutcome": "sale" | "inspection" | "no_action" | "follow_up",
  "followUpRequested": boolean,
  "followUpPhrase": string or null,
  "objections": array of strings (e.g., ["Price concern", "Need time to consider"]),
  "sentiment": "positive" | "neutral" | "negative",
  "keyMoments": [
    {
      "timestamp": "MM:SS",
      "speaker": "agent" | "customer",
      "quote": "exact quote from transcript",
      "significance": "brief description"
    }
  ],
  "customerIntent": "brief description of customer's intent",
  "repPerformance": {
    "strengths": ["strength 1", "strength 2"],
    "weaknesses": ["weakness 1", "weakness 2"]
  }
}

Key things to look for:
- Upsell attempts: mentions of "recurring plan", "monthly service", "subscription"
- Termite inspection: mentions of "termite", "termite inspection", "free termite"
- Follow-up requests: "call me back", "call back", "follow up", "talk to spouse", "think about it"
- Objections: price concerns, time to consider, need to discuss
- Sentiment: positive (enthusiastic, agreeing), negative (rejecting, complaining), neutral
- Key moments: important quotes that show upsell attempts, objections, decisions

Transcript:
"#;

/// Full prompt for one transcript.
pub fn build_prompt(transcript: &str) -> String {
    format!("{ANALYSIS_PROMPT}{transcript}")
}

/// Remove a surrounding Markdown code fence, optionally tagged `json`.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Reply shape with every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawInsight {
    upsell_attempted: Option<bool>,
    upsell_attached_to_recurring: Option<bool>,
    sale_outcome: Option<String>,
    follow_up_requested: Option<bool>,
    follow_up_phrase: Option<String>,
    objections: Option<Vec<String>>,
    sentiment: Option<String>,
    key_moments: Option<Vec<KeyMoment>>,
    customer_intent: Option<String>,
    rep_performance: Option<RawRepPerformance>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRepPerformance {
    strengths: Option<Vec<String>>,
    weaknesses: Option<Vec<String>>,
}

fn parse_or<T: std::str::FromStr>(call_id: &str, value: Option<&str>, default: T) -> T {
    match value.map(str::parse::<T>) {
        Some(Ok(parsed)) => parsed,
        Some(Err(_)) => {
            log::warn!("Unrecognised value {value:?} in reply for {call_id}");
            default
        }
        None => default,
    }
}

/// Parse a model reply into an insight for `call_id`.
///
/// Unrecognised outcome or sentiment strings become `no_action` and
/// `neutral`.
pub fn parse_insight_response(call_id: &str, text: &str) -> BridgeResult<LlmCallInsight> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(BridgeError::EmptyResponse {
            call_id: call_id.to_string(),
        });
    }
    let raw: RawInsight =
        serde_json::from_str(body).map_err(|source| BridgeError::MalformedResponse {
            call_id: call_id.to_string(),
            source,
        })?;

    let sale_outcome = parse_or(call_id, raw.sale_outcome.as_deref(), Outcome::NoAction);
    let sentiment = parse_or(call_id, raw.sentiment.as_deref(), Sentiment::Neutral);
    let rep = raw.rep_performance.unwrap_or_default();

    Ok(LlmCallInsight {
        call_id: call_id.to_string(),
        upsell_attempted: raw.upsell_attempted.unwrap_or(false),
        upsell_attached_to_recurring: raw.upsell_attached_to_recurring.unwrap_or(false),
        sale_outcome,
        follow_up_requested: raw.follow_up_requested.unwrap_or(false),
        follow_up_phrase: raw.follow_up_phrase.filter(|p| !p.is_empty()),
        objections: raw.objections.unwrap_or_default(),
        sentiment,
        key_moments: raw.key_moments.unwrap_or_default(),
        customer_intent: raw
            .customer_intent
            .filter(|i| !i.is_empty())
            .unwrap_or_else(|| UNKNOWN_INTENT.to_string()),
        rep_performance: RepPerformance {
            strengths: rep.strengths.unwrap_or_default(),
            weaknesses: rep.weaknesses.unwrap_or_default(),
        },
    })
}
