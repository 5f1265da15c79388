use serde::{Deserialize, Serialize};

use crate::types::CallRecord;
use crate::util::percent;

/// Termite-inspection attachment on recurring-plan and opportunity calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellingMetrics {
    pub total_recurring_plans: usize,
    pub termite_inspection_upsold: usize,
    /// Upsells over sale and inspection calls, as a percentage.
    pub upsell_success_rate: f64,
    pub opportunities_missed: usize,
    /// Upsells over recurring plans, as a percentage. Not clamped to 100.
    pub attachment_rate: f64,
}

pub fn analyze_upselling(calls: &[CallRecord]) -> UpsellingMetrics {
    let mut plans = 0;
    let mut upsold = 0;
    let mut opportunities = 0;
    let mut missed = 0;

    for call in calls {
        if call.recurring_plan {
            plans += 1;
        }
        if call.termite_inspection_upsold {
            upsold += 1;
        }
        if call.outcome.is_opportunity() {
            opportunities += 1;
            if !call.termite_inspection_upsold && !call.recurring_plan {
                missed += 1;
            }
        }
    }

    UpsellingMetrics {
        total_recurring_plans: plans,
        termite_inspection_upsold: upsold,
        upsell_success_rate: percent(upsold, opportunities),
        opportunities_missed: missed,
        attachment_rate: percent(upsold, plans),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    #[test]
    fn counts_missed_opportunities() {
        let calls = vec![
            CallRecord {
                outcome: Outcome::Sale,
                recurring_plan: true,
                termite_inspection_upsold: true,
                ..CallRecord::default()
            },
            CallRecord {
                outcome: Outcome::Inspection,
                ..CallRecord::default()
            },
            CallRecord {
                outcome: Outcome::NoAction,
                ..CallRecord::default()
            },
        ];
        let m = analyze_upselling(&calls);
        assert_eq!(m.total_recurring_plans, 1);
        assert_eq!(m.termite_inspection_upsold, 1);
        assert_eq!(m.opportunities_missed, 1);
        assert_eq!(m.attachment_rate, 100.0);
        assert_eq!(m.upsell_success_rate, 50.0);
    }

    #[test]
    fn attachment_rate_can_exceed_one_hundred() {
        // Upsells recorded without a plan are not clamped away.
        let calls = vec![
            CallRecord {
                recurring_plan: true,
                termite_inspection_upsold: true,
                ..CallRecord::default()
            },
            CallRecord {
                termite_inspection_upsold: true,
                ..CallRecord::default()
            },
        ];
        assert_eq!(analyze_upselling(&calls).attachment_rate, 200.0);
    }

    #[test]
    fn no_plans_means_zero_attachment() {
        let calls = vec![CallRecord {
            termite_inspection_upsold: true,
            ..CallRecord::default()
        }];
        assert_eq!(analyze_upselling(&calls).attachment_rate, 0.0);
    }
}
