//! Cross-cutting figures that do not belong to a single funnel.
//!
//! Most dollar figures here use the dashboard's $50/month plan value and
//! are annualised. They are deliberately independent of the configurable
//! [`RevenueAssumptions`](crate::assumptions::RevenueAssumptions).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyzers::follow_up::simulated_acted_on;
use crate::assumptions::{
    FOLLOW_UP_FUTURE_CONVERSION_RATE, INSPECTION_FUTURE_CONVERSION_RATE, MONTHLY_PLAN_VALUE,
    MONTHS_PER_YEAR, TERMITE_UPSELL_VALUE,
};
use crate::components::{FollowUpVolumeSelector, TopPerformersSelector};
use crate::oracle::FollowUpCompletionOracle;
use crate::selector::Selector;
use crate::types::{CallRecord, CallType, Outcome, Sentiment};
use crate::util::{mean_duration, percent};

const MAX_MISSED_OPPORTUNITIES: usize = 10;

pub const INSPECTION_WITHOUT_PLAN: &str =
    "Could have upsold recurring plan with termite inspection";
pub const PLAN_WITHOUT_TERMITE: &str =
    "Termite inspection not mentioned despite recurring plan sale";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformer {
    pub agent: String,
    pub sales: usize,
    pub upsells: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedOpportunity {
    pub call_id: String,
    pub opportunity: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpLeakage {
    pub total_follow_ups: usize,
    pub not_acted_on: usize,
    pub estimated_lost_revenue: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionConversionPotential {
    pub total_inspections: usize,
    pub estimated_future_sales: u64,
    pub estimated_revenue: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFollowUpPerformance {
    pub agent: String,
    pub follow_ups: usize,
    pub acted_on: usize,
    pub rate: f64,
}

/// Mean durations in seconds, rounded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBasedPatterns {
    pub average_duration_for_sales: u64,
    pub average_duration_for_inspections: u64,
    pub average_duration_for_follow_ups: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueOpportunities {
    pub missed_termite_upsells: usize,
    pub estimated_upsell_revenue: u64,
    pub follow_up_revenue_potential: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInsights {
    /// Seconds, rounded.
    pub average_call_duration: u64,
    pub sentiment_breakdown: IndexMap<Sentiment, usize>,
    pub call_type_breakdown: IndexMap<CallType, usize>,
    pub top_performing_agents: Vec<AgentPerformer>,
    pub missed_opportunities: Vec<MissedOpportunity>,
    pub conversion_rate_by_sentiment: IndexMap<Sentiment, f64>,
    pub follow_up_leakage: FollowUpLeakage,
    pub inspection_conversion_potential: InspectionConversionPotential,
    pub agent_follow_up_performance: Vec<AgentFollowUpPerformance>,
    pub time_based_patterns: TimeBasedPatterns,
    pub revenue_opportunities: RevenueOpportunities,
}

/// Annualised plan revenue lost on follow-ups that were never worked.
fn follow_up_lost_revenue(not_acted_on: usize) -> u64 {
    (not_acted_on as f64 * FOLLOW_UP_FUTURE_CONVERSION_RATE * MONTHLY_PLAN_VALUE * MONTHS_PER_YEAR)
        .round() as u64
}

/// Compute the insights view, using `oracle` for the per-agent follow-up
/// simulation.
pub fn get_additional_insights(
    calls: &[CallRecord],
    oracle: &dyn FollowUpCompletionOracle,
) -> AdditionalInsights {
    let mut sentiment_breakdown: IndexMap<Sentiment, usize> = IndexMap::new();
    let mut sales_by_sentiment: IndexMap<Sentiment, usize> = IndexMap::new();
    let mut call_type_breakdown: IndexMap<CallType, usize> = IndexMap::new();
    let mut performers: IndexMap<&str, AgentPerformer> = IndexMap::new();
    let mut follow_up_stats: IndexMap<&str, AgentFollowUpPerformance> = IndexMap::new();
    let mut missed_opportunities = Vec::new();

    for call in calls {
        *sentiment_breakdown.entry(call.sentiment).or_default() += 1;
        *call_type_breakdown.entry(call.call_type).or_default() += 1;
        if call.is_sale() {
            *sales_by_sentiment.entry(call.sentiment).or_default() += 1;
        }

        let performer = performers
            .entry(call.agent_name.as_str())
            .or_insert_with(|| AgentPerformer {
                agent: call.agent_name.clone(),
                ..AgentPerformer::default()
            });
        if call.is_sale() {
            performer.sales += 1;
        }
        if call.termite_inspection_upsold {
            performer.upsells += 1;
        }

        if call.is_inspection() && !call.recurring_plan && !call.termite_inspection_upsold {
            missed_opportunities.push(MissedOpportunity {
                call_id: call.id.clone(),
                opportunity: INSPECTION_WITHOUT_PLAN.to_string(),
            });
        }
        if call.is_sale() && call.recurring_plan && !call.termite_inspection_upsold {
            missed_opportunities.push(MissedOpportunity {
                call_id: call.id.clone(),
                opportunity: PLAN_WITHOUT_TERMITE.to_string(),
            });
        }

        if call.follow_up_requested {
            let stats = follow_up_stats
                .entry(call.agent_name.as_str())
                .or_insert_with(|| AgentFollowUpPerformance {
                    agent: call.agent_name.clone(),
                    ..AgentFollowUpPerformance::default()
                });
            stats.follow_ups += 1;
            if oracle.acted_on(call) {
                stats.acted_on += 1;
            }
        }
    }
    missed_opportunities.truncate(MAX_MISSED_OPPORTUNITIES);

    let conversion_rate_by_sentiment = sentiment_breakdown
        .iter()
        .map(|(sentiment, &total)| {
            let sales = sales_by_sentiment.get(sentiment).copied().unwrap_or(0);
            (*sentiment, percent(sales, total))
        })
        .collect();

    let top_performing_agents = TopPerformersSelector::default()
        .select(performers.into_values().collect());

    let agent_follow_up_performance = FollowUpVolumeSelector::default().select(
        follow_up_stats
            .into_values()
            .map(|mut s| {
                s.rate = percent(s.acted_on, s.follow_ups);
                s
            })
            .collect(),
    );

    let total_follow_ups = calls.iter().filter(|c| c.follow_up_requested).count();
    let not_acted_on = total_follow_ups - simulated_acted_on(total_follow_ups);
    let lost_revenue = follow_up_lost_revenue(not_acted_on);

    let total_inspections = calls.iter().filter(|c| c.is_inspection()).count();
    let estimated_future_sales =
        (total_inspections as f64 * INSPECTION_FUTURE_CONVERSION_RATE).floor() as u64;

    let missed_termite_upsells = calls
        .iter()
        .filter(|c| c.outcome == Outcome::Sale && c.recurring_plan && !c.termite_inspection_upsold)
        .count();

    AdditionalInsights {
        average_call_duration: mean_duration(calls.iter().map(|c| c.duration)),
        sentiment_breakdown,
        call_type_breakdown,
        top_performing_agents,
        missed_opportunities,
        conversion_rate_by_sentiment,
        follow_up_leakage: FollowUpLeakage {
            total_follow_ups,
            not_acted_on,
            estimated_lost_revenue: lost_revenue,
        },
        inspection_conversion_potential: InspectionConversionPotential {
            total_inspections,
            estimated_future_sales,
            estimated_revenue: (estimated_future_sales as f64
                * MONTHLY_PLAN_VALUE
                * MONTHS_PER_YEAR)
                .round() as u64,
        },
        agent_follow_up_performance,
        time_based_patterns: TimeBasedPatterns {
            average_duration_for_sales: mean_duration(
                calls.iter().filter(|c| c.is_sale()).map(|c| c.duration),
            ),
            average_duration_for_inspections: mean_duration(
                calls.iter().filter(|c| c.is_inspection()).map(|c| c.duration),
            ),
            average_duration_for_follow_ups: mean_duration(
                calls
                    .iter()
                    .filter(|c| c.follow_up_requested)
                    .map(|c| c.duration),
            ),
        },
        revenue_opportunities: RevenueOpportunities {
            missed_termite_upsells,
            estimated_upsell_revenue: (missed_termite_upsells as f64 * TERMITE_UPSELL_VALUE) as u64,
            follow_up_revenue_potential: lost_revenue,
        },
    }
}
