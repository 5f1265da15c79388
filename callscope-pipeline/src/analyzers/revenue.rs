use serde::{Deserialize, Serialize};

use crate::assumptions::{
    RevenueAssumptions, MISSED_FOLLOW_UP_CONVERSION_RATE, PRICE_OBJECTION_HANDLE_RATE,
};
use crate::types::{CallRecord, Outcome};

/// One dollar-loss estimate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossEstimate {
    pub count: usize,
    /// Rounded to whole dollars.
    pub estimated_monthly_loss: u64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueImpact {
    pub missed_follow_ups: LossEstimate,
    pub missed_upsells: LossEstimate,
    pub lost_inspections: LossEstimate,
    pub price_objections: LossEstimate,
    /// Sum of the four rounded losses.
    pub total_estimated_monthly_loss: u64,
    pub assumptions: RevenueAssumptions,
}

fn dollars(value: f64) -> u64 {
    value.round() as u64
}

fn rate_label(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

pub fn calculate_revenue_impact(
    calls: &[CallRecord],
    assumptions: &RevenueAssumptions,
) -> RevenueImpact {
    let plan_value = assumptions.avg_recurring_plan_value;

    let follow_ups = calls
        .iter()
        .filter(|c| c.follow_up_requested && !c.outcome.is_opportunity())
        .count();
    let missed_follow_ups = LossEstimate {
        count: follow_ups,
        estimated_monthly_loss: dollars(
            follow_ups as f64 * MISSED_FOLLOW_UP_CONVERSION_RATE * plan_value,
        ),
        description: format!(
            "{} follow-ups not acted on ({} would convert)",
            follow_ups,
            rate_label(MISSED_FOLLOW_UP_CONVERSION_RATE)
        ),
    };

    let upsells = calls
        .iter()
        .filter(|c| c.recurring_plan && !c.termite_inspection_upsold)
        .count();
    let missed_upsells = LossEstimate {
        count: upsells,
        estimated_monthly_loss: dollars(upsells as f64 * assumptions.avg_termite_upsell_value),
        description: format!(
            "{} recurring plans sold without termite inspection upsell",
            upsells
        ),
    };

    // Expected conversions beyond the sales actually closed are counted lost.
    let inspections = calls.iter().filter(|c| c.is_inspection()).count();
    let expected = (inspections as f64 * assumptions.inspection_conversion_rate).floor() as usize;
    let closed = calls.iter().filter(|c| c.outcome == Outcome::Sale).count();
    let lost = expected.saturating_sub(closed);
    let lost_inspections = LossEstimate {
        count: lost,
        estimated_monthly_loss: dollars(lost as f64 * plan_value),
        description: format!(
            "{} inspections that should have converted to plans ({} conversion rate)",
            lost,
            rate_label(assumptions.inspection_conversion_rate)
        ),
    };

    let objections = calls
        .iter()
        .filter(|c| c.price_objection() && c.outcome == Outcome::NoAction)
        .count();
    let price_objections = LossEstimate {
        count: objections,
        estimated_monthly_loss: dollars(
            objections as f64 * PRICE_OBJECTION_HANDLE_RATE * plan_value,
        ),
        description: format!(
            "{} price objections not handled ({} could be converted)",
            objections,
            rate_label(PRICE_OBJECTION_HANDLE_RATE)
        ),
    };

    let total = missed_follow_ups.estimated_monthly_loss
        + missed_upsells.estimated_monthly_loss
        + lost_inspections.estimated_monthly_loss
        + price_objections.estimated_monthly_loss;

    RevenueImpact {
        missed_follow_ups,
        missed_upsells,
        lost_inspections,
        price_objections,
        total_estimated_monthly_loss: total,
        assumptions: assumptions.clone(),
    }
}
