//! Composite metrics and the cached engine that serves them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analyzers::{
    analyze_follow_ups, analyze_inspection_funnel, analyze_sales, analyze_sales_funnel,
    analyze_upselling, calculate_revenue_impact, detect_missed_opportunity_patterns,
    generate_coaching_suggestions, generate_executive_view, get_additional_insights,
    AdditionalInsights, AgentCoaching, ExecutiveView, FollowUpMetrics, InspectionFunnel,
    MissedOpportunityPattern, RevenueImpact, SalesFunnel, SalesMetrics, UpsellingMetrics,
};
use crate::assumptions::RevenueAssumptionOverrides;
use crate::cache::MetricsCache;
use crate::drilldown::{calls_by_category, CallDetail, Category};
use crate::error::PipelineResult;
use crate::filter::filter_calls;
use crate::oracle::{FollowUpCompletionOracle, IdSeededOracle, RandomOracle};
use crate::types::{CallRecord, FilterParams};

/// Every analyzer's output for one record set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllMetrics {
    pub upselling: UpsellingMetrics,
    pub follow_ups: FollowUpMetrics,
    pub sales: SalesMetrics,
    pub insights: AdditionalInsights,
    pub nates_view: ExecutiveView,
    pub patterns: Vec<MissedOpportunityPattern>,
    pub coaching: Vec<AgentCoaching>,
    pub sales_funnel: SalesFunnel,
    pub inspection_funnel: InspectionFunnel,
}

/// Run every analyzer over `calls` with the given follow-up oracles.
pub fn compute_all_metrics_with(
    calls: &[CallRecord],
    insights_oracle: &dyn FollowUpCompletionOracle,
    coaching_oracle: &dyn FollowUpCompletionOracle,
) -> AllMetrics {
    AllMetrics {
        upselling: analyze_upselling(calls),
        follow_ups: analyze_follow_ups(calls),
        sales: analyze_sales(calls),
        insights: get_additional_insights(calls, insights_oracle),
        nates_view: generate_executive_view(calls),
        patterns: detect_missed_opportunity_patterns(calls),
        coaching: generate_coaching_suggestions(calls, coaching_oracle),
        sales_funnel: analyze_sales_funnel(calls),
        inspection_funnel: analyze_inspection_funnel(calls),
    }
}

/// Run every analyzer with the default oracles: id-seeded for insights,
/// unseeded random for coaching.
pub fn compute_all_metrics(calls: &[CallRecord]) -> AllMetrics {
    compute_all_metrics_with(calls, &IdSeededOracle, &RandomOracle::new())
}

/// Owns the loaded records and serves filtered, memoized metrics.
///
/// Records never change after construction, so cached entries are never
/// invalidated.
pub struct MetricsEngine {
    calls: Arc<[CallRecord]>,
    cache: MetricsCache<FilterParams, AllMetrics>,
    insights_oracle: Box<dyn FollowUpCompletionOracle>,
    coaching_oracle: Box<dyn FollowUpCompletionOracle>,
}

impl MetricsEngine {
    pub fn new(calls: Vec<CallRecord>) -> Self {
        MetricsEngineBuilder::new(calls).build()
    }

    pub fn builder(calls: Vec<CallRecord>) -> MetricsEngineBuilder {
        MetricsEngineBuilder::new(calls)
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.calls
    }

    /// The records matching `filter`, in load order.
    pub fn calls(&self, filter: &FilterParams) -> Vec<CallRecord> {
        filter_calls(&self.calls, filter)
    }

    /// All metrics for `filter`, computed once per distinct filter.
    pub fn metrics(&self, filter: &FilterParams) -> Arc<AllMetrics> {
        self.cache.get_or_compute(filter, || {
            let filtered = filter_calls(&self.calls, filter);
            log::info!(
                "Computing metrics for {} ({} of {} calls)",
                filter.cache_key(),
                filtered.len(),
                self.calls.len()
            );
            compute_all_metrics_with(
                &filtered,
                self.insights_oracle.as_ref(),
                self.coaching_oracle.as_ref(),
            )
        })
    }

    /// Revenue impact for `filter` under the given overrides. Not cached.
    pub fn revenue_impact(
        &self,
        filter: &FilterParams,
        overrides: &RevenueAssumptionOverrides,
    ) -> PipelineResult<RevenueImpact> {
        overrides.validate()?;
        let filtered = filter_calls(&self.calls, filter);
        Ok(calculate_revenue_impact(&filtered, &overrides.apply()))
    }

    /// Drill-down listing for `category` within `filter`.
    pub fn calls_by_category(&self, filter: &FilterParams, category: &Category) -> Vec<CallDetail> {
        let filtered = filter_calls(&self.calls, filter);
        let patterns = match category {
            Category::Pattern(Some(_)) => self.metrics(filter).patterns.clone(),
            _ => Vec::new(),
        };
        calls_by_category(&filtered, category, &patterns)
    }

    pub fn cached_filters(&self) -> usize {
        self.cache.len()
    }
}

pub struct MetricsEngineBuilder {
    calls: Vec<CallRecord>,
    cache_capacity: Option<usize>,
    insights_oracle: Box<dyn FollowUpCompletionOracle>,
    coaching_oracle: Box<dyn FollowUpCompletionOracle>,
    precompute: bool,
}

impl MetricsEngineBuilder {
    pub fn new(calls: Vec<CallRecord>) -> Self {
        Self {
            calls,
            cache_capacity: None,
            insights_oracle: Box::new(IdSeededOracle),
            coaching_oracle: Box::new(RandomOracle::new()),
            precompute: true,
        }
    }

    /// Stop storing new filter keys once `capacity` entries are cached.
    pub fn cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn insights_oracle(mut self, oracle: impl FollowUpCompletionOracle + 'static) -> Self {
        self.insights_oracle = Box::new(oracle);
        self
    }

    pub fn coaching_oracle(mut self, oracle: impl FollowUpCompletionOracle + 'static) -> Self {
        self.coaching_oracle = Box::new(oracle);
        self
    }

    /// Whether to compute the unfiltered metrics during `build`.
    pub fn precompute(mut self, enabled: bool) -> Self {
        self.precompute = enabled;
        self
    }

    pub fn build(self) -> MetricsEngine {
        let engine = MetricsEngine {
            calls: Arc::from(self.calls),
            cache: MetricsCache::with_capacity(self.cache_capacity),
            insights_oracle: self.insights_oracle,
            coaching_oracle: self.coaching_oracle,
        };
        log::debug!(
            "Metrics engine using {} for insights and {} for coaching",
            engine.insights_oracle.name(),
            engine.coaching_oracle.name()
        );
        if self.precompute && !engine.calls.is_empty() {
            engine.metrics(&FilterParams::default());
            log::info!("Precomputed metrics for {} calls", engine.calls.len());
        }
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::call;
    use crate::types::{Outcome, Sentiment};

    fn engine() -> MetricsEngine {
        MetricsEngine::builder(vec![
            CallRecord {
                sentiment: Sentiment::Positive,
                ..call("1", "Ann", Outcome::Sale)
            },
            call("2", "Bo", Outcome::Inspection),
        ])
        .coaching_oracle(RandomOracle::seeded(1))
        .build()
    }

    #[test]
    fn unfiltered_metrics_are_precomputed() {
        let engine = engine();
        assert_eq!(engine.records().len(), 2);
        assert_eq!(engine.cached_filters(), 1);
        let m = engine.metrics(&FilterParams::default());
        assert_eq!(m.sales.total_sales, 1);
        assert_eq!(engine.cached_filters(), 1);
    }

    #[test]
    fn equivalent_filters_share_one_entry() {
        let engine = engine();
        let a = FilterParams::from_query(Some("Bo"), Some("all"), None).unwrap();
        let b = FilterParams::from_query(Some("Bo"), None, Some("")).unwrap();
        let first = engine.metrics(&a);
        let second = engine.metrics(&b);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.sales.total_inspections, 1);
        assert_eq!(engine.cached_filters(), 2);
    }

    #[test]
    fn empty_engine_skips_precompute() {
        let engine = MetricsEngine::new(Vec::new());
        assert_eq!(engine.cached_filters(), 0);
        let m = engine.metrics(&FilterParams::default());
        assert_eq!(m.upselling, UpsellingMetrics::default());
        assert_eq!(m.insights, AdditionalInsights::default());
        assert!(m.patterns.is_empty());
        assert!(m.coaching.is_empty());
    }

    #[test]
    fn pattern_drilldown_uses_filtered_patterns() {
        let engine = engine();
        let category = Category::Pattern(Some("inspection-no-plan-framing".into()));
        let details = engine.calls_by_category(&FilterParams::default(), &category);
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].call_id, "2");
    }

    #[test]
    fn revenue_impact_rejects_bad_overrides() {
        let engine = engine();
        let overrides = RevenueAssumptionOverrides {
            inspection_conversion_rate: Some(f64::NAN),
            ..Default::default()
        };
        assert!(engine
            .revenue_impact(&FilterParams::default(), &overrides)
            .is_err());
    }
}
