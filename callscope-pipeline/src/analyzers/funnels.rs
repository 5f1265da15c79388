use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::assumptions::{INSPECTION_FUTURE_CONVERSION_RATE, PITCH_MIN_SECS};
use crate::components::ObjectionSelector;
use crate::selector::Selector;
use crate::types::{CallRecord, Outcome, Sentiment};
use crate::util::{mean_duration, percent};

/// Label for a negative no-action call with no recorded reason.
pub const DEFAULT_OBJECTION: &str = "Price/Objection";

// ---------------------------------------------------------------------------
// Sales funnel
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSalesPerformance {
    pub calls: usize,
    /// Sale outcomes that also carried a recurring plan.
    pub sales: usize,
    pub success_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesFunnel {
    pub total_calls: usize,
    pub pitches_made: usize,
    pub objections_encountered: usize,
    pub recurring_plans_sold: usize,
    pub success_rate: f64,
    /// Mean seconds over calls that closed a sale or a plan.
    pub avg_duration: u64,
    pub agent_performance: IndexMap<String, AgentSalesPerformance>,
}

pub fn analyze_sales_funnel(calls: &[CallRecord]) -> SalesFunnel {
    let mut agent_performance: IndexMap<String, AgentSalesPerformance> = IndexMap::new();
    let mut pitches_made = 0;
    let mut objections_encountered = 0;
    let mut recurring_plans_sold = 0;

    for call in calls {
        if call.duration > PITCH_MIN_SECS {
            pitches_made += 1;
        }
        if call.sentiment == Sentiment::Negative
            || (call.upsell_attempted() && !call.upsell_success())
        {
            objections_encountered += 1;
        }
        if call.recurring_plan {
            recurring_plans_sold += 1;
        }

        let stats = agent_performance.entry(call.agent_name.clone()).or_default();
        stats.calls += 1;
        if call.is_sale() && call.recurring_plan {
            stats.sales += 1;
        }
    }
    for stats in agent_performance.values_mut() {
        stats.success_rate = percent(stats.sales, stats.calls);
    }

    SalesFunnel {
        total_calls: calls.len(),
        pitches_made,
        objections_encountered,
        recurring_plans_sold,
        success_rate: percent(recurring_plans_sold, calls.len()),
        avg_duration: mean_duration(
            calls
                .iter()
                .filter(|c| c.is_sale() || c.recurring_plan)
                .map(|c| c.duration),
        ),
        agent_performance,
    }
}

// ---------------------------------------------------------------------------
// Inspection funnel
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInspectionStrength {
    pub inspections: usize,
    /// Inspections over all of the agent's calls.
    pub booking_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectionCount {
    pub objection: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionFunnel {
    pub total_calls: usize,
    pub inspections_booked: usize,
    pub booking_rate: f64,
    pub predicted_conversions: u64,
    pub avg_duration: u64,
    /// Only agents with at least one inspection appear.
    pub agent_strengths: IndexMap<String, AgentInspectionStrength>,
    pub typical_objections: Vec<ObjectionCount>,
}

pub fn analyze_inspection_funnel(calls: &[CallRecord]) -> InspectionFunnel {
    let mut calls_per_agent: IndexMap<&str, usize> = IndexMap::new();
    let mut agent_strengths: IndexMap<String, AgentInspectionStrength> = IndexMap::new();
    let mut objection_counts: IndexMap<&str, usize> = IndexMap::new();

    for call in calls {
        *calls_per_agent.entry(call.agent_name.as_str()).or_default() += 1;
        if call.is_inspection() {
            agent_strengths
                .entry(call.agent_name.clone())
                .or_default()
                .inspections += 1;
        }
        if call.sentiment == Sentiment::Negative && call.outcome == Outcome::NoAction {
            let label = call
                .follow_up_reason
                .as_deref()
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_OBJECTION);
            *objection_counts.entry(label).or_default() += 1;
        }
    }

    for (agent, strength) in agent_strengths.iter_mut() {
        let total = calls_per_agent.get(agent.as_str()).copied().unwrap_or(0);
        strength.booking_rate = percent(strength.inspections, total);
    }

    let inspections_booked: usize = agent_strengths.values().map(|s| s.inspections).sum();

    let typical_objections = ObjectionSelector::default().select(
        objection_counts
            .into_iter()
            .map(|(objection, count)| ObjectionCount {
                objection: objection.to_string(),
                count,
            })
            .collect(),
    );

    InspectionFunnel {
        total_calls: calls.len(),
        inspections_booked,
        booking_rate: percent(inspections_booked, calls.len()),
        predicted_conversions: (inspections_booked as f64 * INSPECTION_FUTURE_CONVERSION_RATE)
            .round() as u64,
        avg_duration: mean_duration(calls.iter().filter(|c| c.is_inspection()).map(|c| c.duration)),
        agent_strengths,
        typical_objections,
    }
}
