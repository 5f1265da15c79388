//! Call-level drill-down behind the dashboard's metric cards.

use serde::{Deserialize, Serialize};

use crate::analyzers::patterns::MissedOpportunityPattern;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CallRecord, Outcome, Sentiment};
use crate::util::round1;

/// Which slice of the filtered calls to list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Category {
    /// Upsell attempted or termite inspection attached.
    Upsell,
    FollowUp,
    Sales,
    Inspections,
    /// Calls for one agent. Without an agent every call is listed.
    AgentPerformance(Option<String>),
    /// Calls affected by one missed-opportunity pattern. Without a known
    /// pattern id every call is listed.
    Pattern(Option<String>),
}

impl Category {
    /// Parse a category name, attaching the agent or pattern id it needs.
    pub fn parse(
        name: &str,
        agent: Option<&str>,
        pattern_id: Option<&str>,
    ) -> PipelineResult<Self> {
        let non_empty = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        match name.trim() {
            "upsell" => Ok(Category::Upsell),
            "followup" => Ok(Category::FollowUp),
            "sales" => Ok(Category::Sales),
            "inspections" => Ok(Category::Inspections),
            "agent-performance" => Ok(Category::AgentPerformance(
                agent.filter(|a| !a.is_empty()).map(str::to_string),
            )),
            "pattern" => Ok(Category::Pattern(non_empty(pattern_id))),
            other => Err(PipelineError::UnknownCategory(other.to_string())),
        }
    }
}

/// Display row for one call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDetail {
    pub call_id: String,
    pub agent_name: String,
    pub outcome: Outcome,
    pub upsell_attempted: bool,
    /// Explicit upsell success, or a termite inspection attached.
    pub upsell_success: bool,
    pub follow_up_requested: bool,
    pub sentiment: Sentiment,
    pub duration_minutes: f64,
    pub date: String,
    pub customer_name: String,
}

impl From<&CallRecord> for CallDetail {
    fn from(call: &CallRecord) -> Self {
        Self {
            call_id: call.id.clone(),
            agent_name: call.agent_name.clone(),
            outcome: call.outcome,
            upsell_attempted: call.upsell_attempted(),
            upsell_success: call.upsell_success() || call.termite_inspection_upsold,
            follow_up_requested: call.follow_up_requested,
            sentiment: call.sentiment,
            duration_minutes: round1(call.duration as f64 / 60.0),
            date: call.date.clone(),
            customer_name: call.customer_name.clone(),
        }
    }
}

/// List the calls in `category`, in input order.
///
/// `patterns` must be the pattern output for the same `calls`.
pub fn calls_by_category(
    calls: &[CallRecord],
    category: &Category,
    patterns: &[MissedOpportunityPattern],
) -> Vec<CallDetail> {
    let pattern = match category {
        Category::Pattern(Some(id)) => patterns.iter().find(|p| &p.pattern_id == id),
        _ => None,
    };
    calls
        .iter()
        .filter(|c| match category {
            Category::Upsell => c.upsell_attempted() || c.termite_inspection_upsold,
            Category::FollowUp => c.follow_up_requested,
            Category::Sales => c.is_sale(),
            Category::Inspections => c.is_inspection(),
            Category::AgentPerformance(Some(agent)) => &c.agent_name == agent,
            Category::AgentPerformance(None) => true,
            Category::Pattern(_) => pattern.map_or(true, |p| p.affected_call_ids.contains(&c.id)),
        })
        .map(CallDetail::from)
        .collect()
}
