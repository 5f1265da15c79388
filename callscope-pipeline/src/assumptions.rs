//! Centralized thresholds and conversion assumptions.
//!
//! Each analyzer formula reads its own named constant. Several share the
//! same numeric value but model different conversion stages, so they are
//! kept separate on purpose and must not be merged.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

// ---------------------------------------------------------------------------
// Duration thresholds (seconds)
// ---------------------------------------------------------------------------

/// A call longer than this is assumed to contain a sales pitch.
pub const PITCH_MIN_SECS: u64 = 120;
/// Minimum length of a negative no-action call to count as an unhandled price objection.
pub const PRICE_OBJECTION_MIN_SECS: u64 = 180;
/// Minimum length of a failed-upsell call to count as a missing counter-offer.
pub const UPSELL_COUNTER_MIN_SECS: u64 = 300;
/// A "long" call (10 minutes), used by patterns and coaching.
pub const LONG_CALL_SECS: u64 = 600;

// ---------------------------------------------------------------------------
// Follow-up completion simulations
// ---------------------------------------------------------------------------

/// Share of follow-ups assumed acted on in the aggregate follow-up metrics.
///
/// Placeholder for a CRM action log: the count is `floor(follow_ups * rate)`.
pub const FOLLOW_UP_ACTED_ON_RATE: f64 = 0.6;
/// Id-seeded oracle marks a follow-up acted on when its draw exceeds this.
pub const ID_SEED_ACTED_ON_THRESHOLD: f64 = 0.4;
/// Random oracle marks a follow-up acted on with this probability.
pub const RANDOM_ACTED_ON_PROBABILITY: f64 = 0.6;

// ---------------------------------------------------------------------------
// Revenue figures used by insights and patterns
// ---------------------------------------------------------------------------

/// Share of unworked follow-ups that would have converted.
pub const FOLLOW_UP_FUTURE_CONVERSION_RATE: f64 = 0.92;
/// Share of booked inspections expected to convert to recurring service.
pub const INSPECTION_FUTURE_CONVERSION_RATE: f64 = 0.92;
/// Monthly value of a recurring plan in the insights view.
pub const MONTHLY_PLAN_VALUE: f64 = 50.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// One-time value of a termite-inspection upsell in the insights view.
pub const TERMITE_UPSELL_VALUE: f64 = 200.0;

// ---------------------------------------------------------------------------
// Revenue impact calculator
// ---------------------------------------------------------------------------

/// Share of missed follow-ups assumed convertible by the revenue calculator.
pub const MISSED_FOLLOW_UP_CONVERSION_RATE: f64 = 0.6;
/// Share of unhandled price objections assumed recoverable by negotiation.
pub const PRICE_OBJECTION_HANDLE_RATE: f64 = 0.4;

/// Dollar assumptions behind the revenue impact estimates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAssumptions {
    /// $/month for a recurring plan.
    pub avg_recurring_plan_value: f64,
    /// One-time $ for a termite-inspection upsell.
    pub avg_termite_upsell_value: f64,
    /// Total $ over a customer's lifetime.
    pub avg_customer_lifetime_value: f64,
    /// Fraction of inspections expected to convert, in [0, 1].
    pub inspection_conversion_rate: f64,
}

impl Default for RevenueAssumptions {
    fn default() -> Self {
        Self {
            avg_recurring_plan_value: 150.0,
            avg_termite_upsell_value: 200.0,
            avg_customer_lifetime_value: 1800.0,
            inspection_conversion_rate: 0.92,
        }
    }
}

/// Partial override of [`RevenueAssumptions`]; unset fields keep the default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevenueAssumptionOverrides {
    pub avg_recurring_plan_value: Option<f64>,
    pub avg_termite_upsell_value: Option<f64>,
    pub avg_customer_lifetime_value: Option<f64>,
    pub inspection_conversion_rate: Option<f64>,
}

impl RevenueAssumptionOverrides {
    /// Overlay the set fields onto the defaults.
    pub fn apply(&self) -> RevenueAssumptions {
        let base = RevenueAssumptions::default();
        RevenueAssumptions {
            avg_recurring_plan_value: self
                .avg_recurring_plan_value
                .unwrap_or(base.avg_recurring_plan_value),
            avg_termite_upsell_value: self
                .avg_termite_upsell_value
                .unwrap_or(base.avg_termite_upsell_value),
            avg_customer_lifetime_value: self
                .avg_customer_lifetime_value
                .unwrap_or(base.avg_customer_lifetime_value),
            inspection_conversion_rate: self
                .inspection_conversion_rate
                .unwrap_or(base.inspection_conversion_rate),
        }
    }

    /// Reject non-finite or negative dollar values and rates outside [0, 1].
    pub fn validate(&self) -> PipelineResult<()> {
        let dollars = [
            ("avgRecurringPlanValue", self.avg_recurring_plan_value),
            ("avgTermiteUpsellValue", self.avg_termite_upsell_value),
            ("avgCustomerLifetimeValue", self.avg_customer_lifetime_value),
        ];
        for (name, value) in dollars {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(PipelineError::InvalidAssumption { name, value: v });
                }
            }
        }
        if let Some(rate) = self.inspection_conversion_rate {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(PipelineError::InvalidAssumption {
                    name: "inspectionConversionRate",
                    value: rate,
                });
            }
        }
        Ok(())
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: RevenueAssumptionOverrides) -> Self {
        Self {
            avg_recurring_plan_value: other
                .avg_recurring_plan_value
                .or(self.avg_recurring_plan_value),
            avg_termite_upsell_value: other
                .avg_termite_upsell_value
                .or(self.avg_termite_upsell_value),
            avg_customer_lifetime_value: other
                .avg_customer_lifetime_value
                .or(self.avg_customer_lifetime_value),
            inspection_conversion_rate: other
                .inspection_conversion_rate
                .or(self.inspection_conversion_rate),
        }
    }
}
