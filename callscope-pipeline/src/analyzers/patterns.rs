//! Missed-opportunity pattern detection.
//!
//! Six independent rules run over every call. Rules are not exclusive: one
//! call may appear in several patterns. A rule that matches nothing emits
//! no pattern.

use serde::{Deserialize, Serialize};

use crate::assumptions::{LONG_CALL_SECS, PRICE_OBJECTION_MIN_SECS, UPSELL_COUNTER_MIN_SECS};
use crate::types::{CallRecord, Outcome, Sentiment, Severity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedOpportunityPattern {
    pub pattern_id: String,
    pub pattern_name: String,
    pub description: String,
    pub count: usize,
    pub affected_call_ids: Vec<String>,
    pub severity: Severity,
    pub estimated_revenue_impact: u64,
}

/// A named predicate over a single call with its per-match dollar impact.
pub struct PatternRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub dollars_per_match: u64,
    pub matches: fn(&CallRecord) -> bool,
}

pub const FOLLOW_UP_NOT_ACTED: &str = "followup-not-acted";
pub const LONG_POSITIVE_NO_UPSELL: &str = "long-positive-no-upsell";
pub const PRICE_OBJECTION_NOT_HANDLED: &str = "price-objection-not-handled";
pub const INSPECTION_NO_PLAN_FRAMING: &str = "inspection-no-plan-framing";
pub const INTEREST_NO_TERMITE: &str = "interest-no-termite";
pub const UPSELL_NO_COUNTER: &str = "upsell-no-counter";

pub static RULES: [PatternRule; 6] = [
    PatternRule {
        id: FOLLOW_UP_NOT_ACTED,
        name: "Follow-up Requested But Not Acted On",
        description: "Customers requested callbacks but no action was taken",
        severity: Severity::High,
        // $50/month over 12 months
        dollars_per_match: 600,
        matches: |c| c.follow_up_requested && !c.recurring_plan && c.outcome != Outcome::Sale,
    },
    PatternRule {
        id: LONG_POSITIVE_NO_UPSELL,
        name: "Long Positive Calls With No Upsell Attempt",
        description: "Engaged customers in long conversations but no upsell was attempted",
        severity: Severity::High,
        dollars_per_match: 200,
        matches: |c| {
            c.duration > LONG_CALL_SECS
                && c.sentiment == Sentiment::Positive
                && !c.termite_inspection_upsold
                && !c.recurring_plan
                && c.outcome != Outcome::Sale
        },
    },
    PatternRule {
        id: PRICE_OBJECTION_NOT_HANDLED,
        name: "Price Objection Not Handled",
        description: "Negative sentiment calls ending with no action, likely price objections",
        severity: Severity::Medium,
        dollars_per_match: 300,
        matches: |c| {
            c.sentiment == Sentiment::Negative
                && c.outcome == Outcome::NoAction
                && c.duration > PRICE_OBJECTION_MIN_SECS
        },
    },
    PatternRule {
        id: INSPECTION_NO_PLAN_FRAMING,
        name: "Inspection Booked But No Plan Framing",
        description: "Inspections scheduled without discussing recurring plan benefits",
        severity: Severity::Medium,
        dollars_per_match: 150,
        matches: |c| c.is_inspection() && !c.recurring_plan && !c.termite_inspection_upsold,
    },
    PatternRule {
        id: INTEREST_NO_TERMITE,
        name: "Customer Expressed Interest But No Termite Inspection Offered",
        description: "Recurring plans sold but free termite inspection not mentioned",
        severity: Severity::High,
        dollars_per_match: 200,
        matches: |c| {
            c.sentiment == Sentiment::Positive && c.recurring_plan && !c.termite_inspection_upsold
        },
    },
    PatternRule {
        id: UPSELL_NO_COUNTER,
        name: "Upsell Attempted But No Counter-Offer After Objection",
        description: "Upsell was attempted but rep didn't counter objections",
        severity: Severity::Medium,
        dollars_per_match: 250,
        matches: |c| {
            c.upsell_attempted()
                && !c.upsell_success()
                && c.outcome == Outcome::NoAction
                && c.duration > UPSELL_COUNTER_MIN_SECS
        },
    },
];

impl PatternRule {
    fn evaluate(&self, calls: &[CallRecord]) -> Option<MissedOpportunityPattern> {
        let affected: Vec<String> = calls
            .iter()
            .filter(|c| (self.matches)(c))
            .map(|c| c.id.clone())
            .collect();
        if affected.is_empty() {
            return None;
        }
        Some(MissedOpportunityPattern {
            pattern_id: self.id.to_string(),
            pattern_name: self.name.to_string(),
            description: self.description.to_string(),
            count: affected.len(),
            estimated_revenue_impact: affected.len() as u64 * self.dollars_per_match,
            affected_call_ids: affected,
            severity: self.severity,
        })
    }
}

/// Look up a rule by its pattern id.
pub fn rule(id: &str) -> Option<&'static PatternRule> {
    RULES.iter().find(|r| r.id == id)
}

/// Run every rule and order the matches by severity, then count, both
/// descending. Equal keys keep rule-table order.
pub fn detect_missed_opportunity_patterns(calls: &[CallRecord]) -> Vec<MissedOpportunityPattern> {
    let mut patterns: Vec<_> = RULES.iter().filter_map(|r| r.evaluate(calls)).collect();
    patterns.sort_by(|a, b| b.severity.cmp(&a.severity).then(b.count.cmp(&a.count)));
    patterns
}
