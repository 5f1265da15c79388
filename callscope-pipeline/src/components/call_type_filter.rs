use crate::filter::{Filter, FilterResult};
use crate::types::{CallRecord, FilterParams};

/// Keeps inbound or outbound calls only.
pub struct CallTypeFilter;

impl Filter<FilterParams, CallRecord> for CallTypeFilter {
    fn enable(&self, query: &FilterParams) -> bool {
        query.call_type.is_some()
    }

    fn filter(
        &self,
        query: &FilterParams,
        candidates: Vec<CallRecord>,
    ) -> FilterResult<CallRecord> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| query.call_type.map_or(true, |t| c.call_type == t));

        FilterResult { kept, removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallType;

    #[test]
    fn partitions_by_direction() {
        let calls = vec![
            CallRecord {
                id: "in".into(),
                call_type: CallType::Inbound,
                ..CallRecord::default()
            },
            CallRecord {
                id: "out".into(),
                call_type: CallType::Outbound,
                ..CallRecord::default()
            },
        ];
        let query = FilterParams {
            call_type: Some(CallType::Outbound),
            ..FilterParams::default()
        };
        let result = CallTypeFilter.filter(&query, calls);
        assert_eq!(result.kept[0].id, "out");
        assert_eq!(result.removed[0].id, "in");
    }
}
