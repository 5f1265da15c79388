use crate::components::{AgentFilter, CallTypeFilter, SentimentFilter};
use crate::types::{CallRecord, FilterParams};
use crate::util;

/// Result of a filter operation, partitioning candidates into kept and removed.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

/// Filters run sequentially and partition candidates into kept and removed sets.
///
/// Partitioning is order-preserving: `kept` is a subsequence of the input.
pub trait Filter<Q, C>: Send + Sync {
    /// Decide if this filter should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Split candidates into those that continue to the next stage and
    /// those excluded from further processing.
    fn filter(&self, query: &Q, candidates: Vec<C>) -> FilterResult<C>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Apply the agent, sentiment and call-type predicates in that order.
///
/// Predicates whose value is unset are skipped, so an empty
/// [`FilterParams`] returns the input unchanged.
pub fn filter_calls(records: &[CallRecord], params: &FilterParams) -> Vec<CallRecord> {
    let stages: [&dyn Filter<FilterParams, CallRecord>; 3] =
        [&AgentFilter, &SentimentFilter, &CallTypeFilter];

    let mut candidates = records.to_vec();
    for stage in stages {
        if !stage.enable(params) {
            continue;
        }
        let before = candidates.len();
        let FilterResult { kept, removed } = stage.filter(params, candidates);
        log::debug!(
            "{} kept {} of {} calls ({} removed)",
            stage.name(),
            kept.len(),
            before,
            removed.len()
        );
        candidates = kept;
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallType, Sentiment};

    fn call(id: &str, agent: &str, sentiment: Sentiment, call_type: CallType) -> CallRecord {
        CallRecord {
            id: id.into(),
            agent_name: agent.into(),
            sentiment,
            call_type,
            ..CallRecord::default()
        }
    }

    fn sample() -> Vec<CallRecord> {
        vec![
            call("1", "Dana", Sentiment::Positive, CallType::Inbound),
            call("2", "Eli", Sentiment::Negative, CallType::Outbound),
            call("3", "Dana", Sentiment::Negative, CallType::Outbound),
            call("4", "Dana", Sentiment::Negative, CallType::Inbound),
        ]
    }

    #[test]
    fn empty_params_are_identity() {
        let records = sample();
        assert_eq!(filter_calls(&records, &FilterParams::default()), records);
    }

    #[test]
    fn predicates_are_conjunctive_and_order_preserving() {
        let params = FilterParams {
            agent: Some("Dana".into()),
            sentiment: Some(Sentiment::Negative),
            call_type: None,
        };
        let ids: Vec<_> = filter_calls(&sample(), &params)
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["3", "4"]);
    }

    #[test]
    fn unknown_agent_yields_empty() {
        let params = FilterParams {
            agent: Some("Nobody".into()),
            ..FilterParams::default()
        };
        assert!(filter_calls(&sample(), &params).is_empty());
    }

    #[test]
    fn input_is_not_mutated() {
        let records = sample();
        let params = FilterParams {
            call_type: Some(CallType::Outbound),
            ..FilterParams::default()
        };
        let filtered = filter_calls(&records, &params);
        assert_eq!(filtered.len(), 2);
        assert_eq!(records.len(), 4);
    }
}
