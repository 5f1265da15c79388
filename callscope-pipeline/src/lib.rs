//! Metrics derivation over call-center records.
//!
//! Every analyzer is a pure function of a record slice. [`MetricsEngine`]
//! owns the loaded records, applies [`FilterParams`] and memoizes the
//! composite [`AllMetrics`] per filter combination.

pub mod analyzers;
pub mod assumptions;
pub mod cache;
pub mod call_loader;
pub mod components;
pub mod drilldown;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod oracle;
pub mod selector;
pub mod types;
pub mod util;

pub use assumptions::{RevenueAssumptionOverrides, RevenueAssumptions};
pub use drilldown::{calls_by_category, CallDetail, Category};
pub use error::{PipelineError, PipelineResult};
pub use filter::filter_calls;
pub use metrics::{
    compute_all_metrics, compute_all_metrics_with, AllMetrics, MetricsEngine, MetricsEngineBuilder,
};
pub use oracle::{FollowUpCompletionOracle, IdSeededOracle, RandomOracle};
pub use types::{CallRecord, CallType, FilterParams, Outcome, Sentiment, Severity};
