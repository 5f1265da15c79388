use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::assumptions::FOLLOW_UP_ACTED_ON_RATE;
use crate::types::CallRecord;
use crate::util::percent;

/// Label used when a follow-up carries no reason.
pub const OTHER_REASON: &str = "Other";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpMetrics {
    pub total_follow_ups: usize,
    pub follow_ups_by_reason: IndexMap<String, usize>,
    pub follow_up_rate: f64,
    /// Simulated: `floor(total_follow_ups * 0.6)`. A real deployment must
    /// read this from the follow-up tracking system.
    pub follow_ups_acted_on: usize,
    pub follow_up_completion_rate: f64,
}

/// Number of follow-ups assumed acted on under the fixed 60% rate.
pub fn simulated_acted_on(follow_ups: usize) -> usize {
    (follow_ups as f64 * FOLLOW_UP_ACTED_ON_RATE).floor() as usize
}

pub fn analyze_follow_ups(calls: &[CallRecord]) -> FollowUpMetrics {
    let mut by_reason: IndexMap<String, usize> = IndexMap::new();
    let mut total = 0;

    for call in calls.iter().filter(|c| c.follow_up_requested) {
        total += 1;
        let reason = call
            .follow_up_reason
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(OTHER_REASON);
        *by_reason.entry(reason.to_string()).or_default() += 1;
    }

    let acted_on = simulated_acted_on(total);

    FollowUpMetrics {
        total_follow_ups: total,
        follow_ups_by_reason: by_reason,
        follow_up_rate: percent(total, calls.len()),
        follow_ups_acted_on: acted_on,
        follow_up_completion_rate: percent(acted_on, total),
    }
}
