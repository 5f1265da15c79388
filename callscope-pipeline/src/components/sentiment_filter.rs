use crate::filter::{Filter, FilterResult};
use crate::types::{CallRecord, FilterParams};

/// Keeps calls with the requested sentiment.
pub struct SentimentFilter;

impl Filter<FilterParams, CallRecord> for SentimentFilter {
    fn enable(&self, query: &FilterParams) -> bool {
        query.sentiment.is_some()
    }

    fn filter(
        &self,
        query: &FilterParams,
        candidates: Vec<CallRecord>,
    ) -> FilterResult<CallRecord> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| query.sentiment.map_or(true, |s| c.sentiment == s));

        FilterResult { kept, removed }
    }
}
