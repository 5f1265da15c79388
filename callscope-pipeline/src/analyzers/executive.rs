//! Executive summary cards.
//!
//! Re-derives four narrative cards from the upsell, follow-up and sales
//! analyzers and the pattern detector. Each card pairs its figures with an
//! insight sentence chosen by threshold band.

use serde::{Deserialize, Serialize};

use crate::analyzers::follow_up::analyze_follow_ups;
use crate::analyzers::patterns::{detect_missed_opportunity_patterns, MissedOpportunityPattern};
use crate::analyzers::sales::analyze_sales;
use crate::analyzers::upsell::analyze_upselling;
use crate::types::CallRecord;
use crate::util::{percent, round1};

const EXCELLENT_BAND: f64 = 80.0;
const GOOD_BAND: f64 = 60.0;
const TOP_PATTERN_COUNT: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermiteAttachmentCard {
    pub attachment_rate: f64,
    pub recurring_plans: usize,
    pub inspections_attached: usize,
    pub insight: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpCaptureCard {
    pub total_follow_ups: usize,
    pub acted_on: usize,
    pub completion_rate: f64,
    pub insight: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesVsInspectionsCard {
    pub sales: usize,
    pub inspections: usize,
    pub sales_rate: f64,
    pub inspection_rate: f64,
    pub insight: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPattern {
    pub pattern: String,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownUnknownsCard {
    pub top_patterns: Vec<TopPattern>,
    pub insight: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveView {
    pub termite_attachment: TermiteAttachmentCard,
    pub follow_up_capture: FollowUpCaptureCard,
    pub sales_vs_inspections: SalesVsInspectionsCard,
    pub unknown_unknowns: UnknownUnknownsCard,
}

fn attachment_insight(rate: f64) -> &'static str {
    if rate >= EXCELLENT_BAND {
        "Excellent! Reps are consistently attaching termite inspections to recurring plans."
    } else if rate >= GOOD_BAND {
        "Good attachment rate, but there's room to improve. Consider training on the value proposition."
    } else {
        "Low attachment rate detected. This is a significant opportunity - termite inspections can double account value."
    }
}

fn follow_up_insight(rate: f64) -> &'static str {
    if rate >= EXCELLENT_BAND {
        "Strong follow-up execution. Hot leads are being captured and acted upon effectively."
    } else if rate >= GOOD_BAND {
        "Moderate follow-up completion. Some hot leads may be slipping through - consider improving task tracking."
    } else {
        "Critical issue: Many follow-up requests are not being acted upon. These are hot leads dying on the vine!"
    }
}

fn sales_insight(sales: usize, inspections: usize) -> String {
    if sales > inspections {
        format!(
            "Strong immediate sales focus ({sales} sales vs {inspections} inspections). Both are valuable - sales provide immediate revenue while inspections are strategic pipeline builders with 92% conversion potential."
        )
    } else {
        format!(
            "Strategic pipeline building ({inspections} inspections vs {sales} sales). Inspections convert at 92% to recurring services - this is excellent pipeline development."
        )
    }
}

/// The three patterns with the largest estimated revenue impact.
fn top_patterns(patterns: &[MissedOpportunityPattern]) -> Vec<TopPattern> {
    let mut ranked: Vec<&MissedOpportunityPattern> = patterns.iter().collect();
    ranked.sort_by(|a, b| b.estimated_revenue_impact.cmp(&a.estimated_revenue_impact));
    ranked
        .into_iter()
        .take(TOP_PATTERN_COUNT)
        .map(|p| TopPattern {
            pattern: p.pattern_name.clone(),
            count: p.count,
        })
        .collect()
}

fn unknowns_insight(top: &[TopPattern]) -> String {
    match top.first() {
        Some(lead) => {
            let affected: usize = top.iter().map(|p| p.count).sum();
            format!(
                "Pattern analysis revealed {} key opportunity patterns affecting {} calls. Top issue: {} ({} calls).",
                top.len(),
                affected,
                lead.pattern,
                lead.count
            )
        }
        None => "No significant missed opportunity patterns detected. Great job!".to_string(),
    }
}

pub fn generate_executive_view(calls: &[CallRecord]) -> ExecutiveView {
    let upselling = analyze_upselling(calls);
    let follow_ups = analyze_follow_ups(calls);
    let sales = analyze_sales(calls);
    let patterns = detect_missed_opportunity_patterns(calls);

    let attachment_rate = percent(
        upselling.termite_inspection_upsold,
        upselling.total_recurring_plans,
    );
    let completion_rate = percent(follow_ups.follow_ups_acted_on, follow_ups.total_follow_ups);
    let top = top_patterns(&patterns);

    ExecutiveView {
        termite_attachment: TermiteAttachmentCard {
            attachment_rate: round1(attachment_rate),
            recurring_plans: upselling.total_recurring_plans,
            inspections_attached: upselling.termite_inspection_upsold,
            insight: attachment_insight(attachment_rate).to_string(),
        },
        follow_up_capture: FollowUpCaptureCard {
            total_follow_ups: follow_ups.total_follow_ups,
            acted_on: follow_ups.follow_ups_acted_on,
            completion_rate: round1(completion_rate),
            insight: follow_up_insight(completion_rate).to_string(),
        },
        sales_vs_inspections: SalesVsInspectionsCard {
            sales: sales.total_sales,
            inspections: sales.total_inspections,
            sales_rate: round1(sales.sales_rate),
            inspection_rate: round1(sales.inspection_rate),
            insight: sales_insight(sales.total_sales, sales.total_inspections),
        },
        unknown_unknowns: UnknownUnknownsCard {
            insight: unknowns_insight(&top),
            top_patterns: top,
        },
    }
}
