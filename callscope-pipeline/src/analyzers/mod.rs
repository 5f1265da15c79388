//! Pure `records -> metrics` aggregations.
//!
//! Each analyzer is a total function over a possibly empty slice of calls.
//! Ratios with a zero denominator are reported as 0.

pub mod coaching;
pub mod executive;
pub mod follow_up;
pub mod funnels;
pub mod insights;
pub mod patterns;
pub mod revenue;
pub mod sales;
pub mod upsell;

pub use coaching::{generate_coaching_suggestions, AgentCoaching, CoachingSuggestion};
pub use executive::{generate_executive_view, ExecutiveView};
pub use follow_up::{analyze_follow_ups, FollowUpMetrics};
pub use funnels::{analyze_inspection_funnel, analyze_sales_funnel, InspectionFunnel, SalesFunnel};
pub use insights::{get_additional_insights, AdditionalInsights};
pub use patterns::{detect_missed_opportunity_patterns, MissedOpportunityPattern};
pub use revenue::{calculate_revenue_impact, RevenueImpact};
pub use sales::{analyze_sales, SalesMetrics};
pub use upsell::{analyze_upselling, UpsellingMetrics};
