//! Per-agent coaching suggestions.
//!
//! Each agent is aggregated once, then five threshold rules run over the
//! aggregate. Agents that trigger no rule are left out of the result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::assumptions::LONG_CALL_SECS;
use crate::components::CoachingPrioritySelector;
use crate::oracle::FollowUpCompletionOracle;
use crate::selector::Selector;
use crate::types::{CallRecord, Severity};
use crate::util::ratio;

const HIGH_UPSELL_ATTEMPT_RATE: f64 = 0.5;
const LOW_UPSELL_SUCCESS_RATE: f64 = 0.4;
const MANY_FOLLOW_UPS: usize = 5;
const LOW_FOLLOW_UP_COMPLETION_RATE: f64 = 0.6;
const MANY_LONG_CALLS: usize = 3;
const LOW_LONG_CALL_CLOSING_RATE: f64 = 0.3;
const LOW_INSPECTION_TO_SALE_RATE: f64 = 0.3;
const LOW_UPSELL_ATTEMPT_RATE: f64 = 0.3;
const UPSELL_INITIATIVE_MIN_CALLS: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingSuggestion {
    pub category: String,
    pub message: String,
    pub priority: Severity,
    /// Supporting figures; rates are whole percentages.
    pub metrics: IndexMap<String, u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCoaching {
    pub agent_name: String,
    pub suggestions: Vec<CoachingSuggestion>,
}

#[derive(Default)]
struct AgentStats {
    calls: usize,
    sales: usize,
    inspections: usize,
    upsell_attempts: usize,
    upsell_successes: usize,
    follow_ups: usize,
    follow_ups_acted_on: usize,
    long_calls: usize,
    long_calls_with_sales: usize,
}

impl AgentStats {
    fn record(&mut self, call: &CallRecord, oracle: &dyn FollowUpCompletionOracle) {
        self.calls += 1;
        if call.is_sale() {
            self.sales += 1;
        }
        if call.is_inspection() {
            self.inspections += 1;
        }
        if call.upsell_attempted() {
            self.upsell_attempts += 1;
            if call.upsell_success() {
                self.upsell_successes += 1;
            }
        }
        if call.follow_up_requested {
            self.follow_ups += 1;
            if oracle.acted_on(call) {
                self.follow_ups_acted_on += 1;
            }
        }
        if call.duration > LONG_CALL_SECS {
            self.long_calls += 1;
            if call.is_sale() {
                self.long_calls_with_sales += 1;
            }
        }
    }

    fn upsell_attempt_rate(&self) -> f64 {
        ratio(self.upsell_attempts, self.calls)
    }

    fn upsell_success_rate(&self) -> f64 {
        ratio(self.upsell_successes, self.upsell_attempts)
    }

    fn follow_up_completion_rate(&self) -> f64 {
        ratio(self.follow_ups_acted_on, self.follow_ups)
    }

    fn long_call_closing_rate(&self) -> f64 {
        ratio(self.long_calls_with_sales, self.long_calls)
    }

    fn inspection_to_sale_rate(&self) -> f64 {
        if self.inspections == 0 {
            0.0
        } else {
            ratio(self.sales, self.sales + self.inspections)
        }
    }

    fn suggestions(&self) -> Vec<CoachingSuggestion> {
        let mut out = Vec::new();
        let attempt_rate = self.upsell_attempt_rate();
        let success_rate = self.upsell_success_rate();
        let completion_rate = self.follow_up_completion_rate();
        let closing_rate = self.long_call_closing_rate();
        let conversion_rate = self.inspection_to_sale_rate();

        if attempt_rate > HIGH_UPSELL_ATTEMPT_RATE && success_rate < LOW_UPSELL_SUCCESS_RATE {
            out.push(suggestion(
                "Objection Handling",
                "Work on objection handling. You're attempting upsells frequently but success rate is low. Practice counter-offers and value framing.",
                Severity::High,
                [
                    ("upsellAttemptRate", pct(attempt_rate)),
                    ("upsellSuccessRate", pct(success_rate)),
                ],
            ));
        }

        if self.follow_ups > MANY_FOLLOW_UPS && completion_rate < LOW_FOLLOW_UP_COMPLETION_RATE {
            out.push(suggestion(
                "Task Tracking",
                "Improve task tracking and follow-up execution. Many customers requested callbacks but they're not being acted upon.",
                Severity::High,
                [
                    ("followUps", self.follow_ups as u64),
                    ("completionRate", pct(completion_rate)),
                ],
            ));
        }

        if self.long_calls > MANY_LONG_CALLS && closing_rate < LOW_LONG_CALL_CLOSING_RATE {
            out.push(suggestion(
                "Inspection Framing",
                "Improve inspection framing. You're spending time with customers but not converting. Focus on connecting inspections to recurring plan benefits.",
                Severity::Medium,
                [
                    ("longCalls", self.long_calls as u64),
                    ("closingRate", pct(closing_rate)),
                ],
            ));
        }

        if self.inspections > self.sales && conversion_rate < LOW_INSPECTION_TO_SALE_RATE {
            out.push(suggestion(
                "Conversion Strategy",
                "Coach on converting inspections to plans. You're great at booking inspections but need to improve follow-up to convert them to recurring plans.",
                Severity::High,
                [
                    ("inspections", self.inspections as u64),
                    ("sales", self.sales as u64),
                    ("conversionRate", pct(conversion_rate)),
                ],
            ));
        }

        if attempt_rate < LOW_UPSELL_ATTEMPT_RATE && self.calls > UPSELL_INITIATIVE_MIN_CALLS {
            out.push(suggestion(
                "Upsell Initiative",
                "Increase upsell attempts. You have opportunities to attach termite inspections to recurring plans more frequently.",
                Severity::Medium,
                [
                    ("upsellAttemptRate", pct(attempt_rate)),
                    ("totalCalls", self.calls as u64),
                ],
            ));
        }

        out
    }
}

fn pct(rate: f64) -> u64 {
    (rate * 100.0).round() as u64
}

fn suggestion<const N: usize>(
    category: &str,
    message: &str,
    priority: Severity,
    metrics: [(&str, u64); N],
) -> CoachingSuggestion {
    CoachingSuggestion {
        category: category.to_string(),
        message: message.to_string(),
        priority,
        metrics: metrics
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    }
}

/// Build suggestions per agent, ordered by number of high-priority
/// suggestions descending. `oracle` decides follow-up completion.
pub fn generate_coaching_suggestions(
    calls: &[CallRecord],
    oracle: &dyn FollowUpCompletionOracle,
) -> Vec<AgentCoaching> {
    let mut stats: IndexMap<&str, AgentStats> = IndexMap::new();
    for call in calls {
        stats
            .entry(call.agent_name.as_str())
            .or_default()
            .record(call, oracle);
    }

    let coached: Vec<AgentCoaching> = stats
        .into_iter()
        .filter_map(|(agent, s)| {
            let suggestions = s.suggestions();
            (!suggestions.is_empty()).then(|| AgentCoaching {
                agent_name: agent.to_string(),
                suggestions,
            })
        })
        .collect();

    CoachingPrioritySelector.select(coached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::call;
    use crate::types::Outcome;

    struct Never;

    impl FollowUpCompletionOracle for Never {
        fn acted_on(&self, _call: &CallRecord) -> bool {
            false
        }
    }

    fn categories(coaching: &AgentCoaching) -> Vec<&str> {
        coaching
            .suggestions
            .iter()
            .map(|s| s.category.as_str())
            .collect()
    }

    #[test]
    fn quiet_agents_are_omitted() {
        let calls = vec![CallRecord {
            recurring_plan: true,
            ..call("1", "Ann", Outcome::Sale)
        }];
        assert!(generate_coaching_suggestions(&calls, &Never).is_empty());
    }

    #[test]
    fn objection_handling_fires_on_failed_upsells() {
        let calls: Vec<_> = (0..4)
            .map(|i| CallRecord {
                upsell_attempted: Some(true),
                upsell_success: Some(i == 0),
                ..call(&i.to_string(), "Ann", Outcome::Sale)
            })
            .collect();
        let result = generate_coaching_suggestions(&calls, &Never);
        assert_eq!(categories(&result[0]), vec!["Objection Handling"]);
        let metrics = &result[0].suggestions[0].metrics;
        assert_eq!(metrics["upsellAttemptRate"], 100);
        assert_eq!(metrics["upsellSuccessRate"], 25);
    }

    #[test]
    fn task_tracking_needs_more_than_five_follow_ups() {
        let calls: Vec<_> = (0..6)
            .map(|i| CallRecord {
                follow_up_requested: true,
                ..call(&i.to_string(), "Ann", Outcome::FollowUp)
            })
            .collect();
        let result = generate_coaching_suggestions(&calls, &Never);
        assert!(categories(&result[0]).contains(&"Task Tracking"));
        assert!(generate_coaching_suggestions(&calls[..5], &Never).is_empty());
    }

    #[test]
    fn long_calls_and_low_attempts() {
        let mut calls: Vec<_> = (0..11)
            .map(|i| call(&i.to_string(), "Bo", Outcome::NoAction))
            .collect();
        for c in calls.iter_mut().take(4) {
            c.duration = 900;
        }
        let result = generate_coaching_suggestions(&calls, &Never);
        assert_eq!(
            categories(&result[0]),
            vec!["Inspection Framing", "Upsell Initiative"]
        );
        assert!(result[0]
            .suggestions
            .iter()
            .all(|s| s.priority == Severity::Medium));
    }

    #[test]
    fn agents_ordered_by_high_priority_count() {
        let mut calls = Vec::new();
        // Cy: medium only (Upsell Initiative)
        for i in 0..11 {
            calls.push(call(&format!("c{i}"), "Cy", Outcome::NoAction));
        }
        // Di: Conversion Strategy (high)
        calls.push(call("d1", "Di", Outcome::Inspection));
        // Ed: Objection Handling + Conversion Strategy (two highs)
        calls.push(CallRecord {
            upsell_attempted: Some(true),
            ..call("e1", "Ed", Outcome::Inspection)
        });
        let result = generate_coaching_suggestions(&calls, &Never);
        let order: Vec<_> = result.iter().map(|c| c.agent_name.as_str()).collect();
        assert_eq!(order, vec!["Ed", "Di", "Cy"]);
    }
}
