use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Terminal classification of a call. Exactly one applies per record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Sale,
    Inspection,
    NoAction,
    FollowUp,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Sale => "sale",
            Outcome::Inspection => "inspection",
            Outcome::NoAction => "no_action",
            Outcome::FollowUp => "follow_up",
        }
    }

    /// Sales and inspections are the outcomes an upsell could attach to.
    pub fn is_opportunity(&self) -> bool {
        matches!(self, Outcome::Sale | Outcome::Inspection)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sale" => Ok(Outcome::Sale),
            "inspection" => Ok(Outcome::Inspection),
            "no_action" => Ok(Outcome::NoAction),
            "follow_up" => Ok(Outcome::FollowUp),
            other => Err(PipelineError::InvalidFilter {
                field: "outcome",
                value: other.to_string(),
            }),
        }
    }
}

/// Coarse tone of the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(PipelineError::InvalidFilter {
                field: "sentiment",
                value: other.to_string(),
            }),
        }
    }
}

/// Direction of the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Inbound,
    Outbound,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Inbound => "inbound",
            CallType::Outbound => "outbound",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CallType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inbound" => Ok(CallType::Inbound),
            "outbound" => Ok(CallType::Outbound),
            other => Err(PipelineError::InvalidFilter {
                field: "callType",
                value: other.to_string(),
            }),
        }
    }
}

/// Severity of a missed-opportunity pattern, also used as coaching priority.
///
/// Ordered so that `High > Medium > Low`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

// ---------------------------------------------------------------------------
// Call record
// ---------------------------------------------------------------------------

/// One customer interaction and its post-hoc classification.
///
/// Records are immutable once loaded. Optional booleans are read through the
/// accessor methods, which treat an absent value as `false`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: String,
    pub agent_name: String,
    pub customer_name: String,
    /// ISO-8601 timestamp, passed through untouched.
    pub date: String,
    /// Call length in seconds.
    pub duration: u64,
    #[serde(default)]
    pub transcript: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub recurring_plan: bool,
    #[serde(default)]
    pub termite_inspection_upsold: bool,
    #[serde(default)]
    pub follow_up_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_reason: Option<String>,
    pub sentiment: Sentiment,
    pub call_type: CallType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsell_attempted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsell_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objections: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_objection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection_booked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_framed: Option<bool>,
}

impl CallRecord {
    pub fn upsell_attempted(&self) -> bool {
        self.upsell_attempted.unwrap_or(false)
    }

    pub fn upsell_success(&self) -> bool {
        self.upsell_success.unwrap_or(false)
    }

    pub fn price_objection(&self) -> bool {
        self.price_objection.unwrap_or(false)
    }

    pub fn objections(&self) -> &[String] {
        self.objections.as_deref().unwrap_or(&[])
    }

    pub fn is_sale(&self) -> bool {
        self.outcome == Outcome::Sale
    }

    pub fn is_inspection(&self) -> bool {
        self.outcome == Outcome::Inspection
    }
}

impl Default for CallRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            agent_name: String::new(),
            customer_name: String::new(),
            date: String::new(),
            duration: 0,
            transcript: String::new(),
            outcome: Outcome::NoAction,
            recurring_plan: false,
            termite_inspection_upsold: false,
            follow_up_requested: false,
            follow_up_reason: None,
            sentiment: Sentiment::Neutral,
            call_type: CallType::Inbound,
            upsell_attempted: None,
            upsell_success: None,
            objections: None,
            price_objection: None,
            inspection_booked: None,
            plan_framed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Literal accepted in place of any filter value to mean "no filter".
pub const ALL: &str = "all";

/// Conjunctive filter over call records.
///
/// `None` on a field means that predicate is skipped. Built through
/// [`FilterParams::from_query`], the literal `"all"` also maps to `None`, so
/// two spellings of the same filter share one cache key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub agent: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub call_type: Option<CallType>,
}

impl FilterParams {
    /// Build filter params from raw string values.
    ///
    /// Absent, empty and `"all"` values disable their predicate. The agent
    /// name is kept verbatim for exact matching; sentiment and call type
    /// are trimmed before parsing and rejected when unknown.
    pub fn from_query(
        agent: Option<&str>,
        sentiment: Option<&str>,
        call_type: Option<&str>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            agent: agent
                .filter(|a| !a.is_empty() && *a != ALL)
                .map(str::to_string),
            sentiment: active(sentiment).map(str::parse::<Sentiment>).transpose()?,
            call_type: active(call_type).map(str::parse::<CallType>).transpose()?,
        })
    }

    /// Key in the `agent-sentiment-callType` form, with `all` for unset fields.
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.agent.as_deref().unwrap_or(ALL),
            self.sentiment.map(|s| s.as_str()).unwrap_or(ALL),
            self.call_type.map(|c| c.as_str()).unwrap_or(ALL),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.agent.is_none() && self.sentiment.is_none() && self.call_type.is_none()
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && *v != ALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "abc-1",
            "agentName": "Dana",
            "customerName": "Pat",
            "date": "2025-03-01T10:00:00Z",
            "duration": 420,
            "outcome": "no_action",
            "sentiment": "negative",
            "callType": "outbound"
        }"#;
        let record: CallRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.outcome, Outcome::NoAction);
        assert_eq!(record.call_type, CallType::Outbound);
        assert!(!record.recurring_plan);
        assert!(!record.upsell_attempted());
        assert!(!record.price_objection());
        assert!(record.objections().is_empty());
        assert!(record.transcript.is_empty());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = CallRecord {
            id: "x".into(),
            agent_name: "Dana".into(),
            outcome: Outcome::FollowUp,
            follow_up_requested: true,
            follow_up_reason: Some("Requested callback".into()),
            ..CallRecord::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["agentName"], "Dana");
        assert_eq!(value["outcome"], "follow_up");
        assert_eq!(value["followUpReason"], "Requested callback");
        assert!(value.get("upsellAttempted").is_none());
    }

    #[test]
    fn filter_params_treat_all_as_unset() {
        let params = FilterParams::from_query(Some("all"), Some("all"), None).unwrap();
        assert!(params.is_empty());
        assert_eq!(params, FilterParams::default());
        assert_eq!(params.cache_key(), "all-all-all");
    }

    #[test]
    fn filter_params_parse_values() {
        let params =
            FilterParams::from_query(Some("Dana"), Some("positive"), Some("inbound")).unwrap();
        assert_eq!(params.agent.as_deref(), Some("Dana"));
        assert_eq!(params.sentiment, Some(Sentiment::Positive));
        assert_eq!(params.call_type, Some(CallType::Inbound));
        assert_eq!(params.cache_key(), "Dana-positive-inbound");
    }

    #[test]
    fn agent_value_is_not_trimmed() {
        let records = vec![
            CallRecord {
                id: "1".into(),
                agent_name: "Dana".into(),
                ..CallRecord::default()
            },
            CallRecord {
                id: "2".into(),
                agent_name: " Dana".into(),
                ..CallRecord::default()
            },
        ];
        let params = FilterParams::from_query(Some(" Dana"), None, None).unwrap();
        assert_eq!(params.agent.as_deref(), Some(" Dana"));
        let ids: Vec<_> = crate::filter::filter_calls(&records, &params)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn sentiment_and_call_type_are_trimmed() {
        let params = FilterParams::from_query(None, Some(" negative "), Some("outbound ")).unwrap();
        assert_eq!(params.sentiment, Some(Sentiment::Negative));
        assert_eq!(params.call_type, Some(CallType::Outbound));
    }

    #[test]
    fn filter_params_reject_unknown_sentiment() {
        let err = FilterParams::from_query(None, Some("ecstatic"), None).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidFilter { field: "sentiment", .. }
        ));
    }

    #[test]
    fn severity_orders_high_first() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
