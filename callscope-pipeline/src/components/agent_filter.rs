use crate::filter::{Filter, FilterResult};
use crate::types::{CallRecord, FilterParams};

/// Keeps calls handled by the requested agent (exact match).
pub struct AgentFilter;

impl Filter<FilterParams, CallRecord> for AgentFilter {
    fn enable(&self, query: &FilterParams) -> bool {
        query.agent.is_some()
    }

    fn filter(
        &self,
        query: &FilterParams,
        candidates: Vec<CallRecord>,
    ) -> FilterResult<CallRecord> {
        let Some(agent) = query.agent.as_deref() else {
            return FilterResult {
                kept: candidates,
                removed: Vec::new(),
            };
        };
        let (kept, removed): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.agent_name == agent);

        FilterResult { kept, removed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_is_case_sensitive() {
        let calls = vec![
            CallRecord {
                agent_name: "Dana".into(),
                ..CallRecord::default()
            },
            CallRecord {
                agent_name: "dana".into(),
                ..CallRecord::default()
            },
        ];
        let query = FilterParams {
            agent: Some("Dana".into()),
            ..FilterParams::default()
        };
        let result = AgentFilter.filter(&query, calls);
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.removed.len(), 1);
    }

    #[test]
    fn disabled_without_agent() {
        assert!(!AgentFilter.enable(&FilterParams::default()));
        assert_eq!(AgentFilter.name(), "AgentFilter");
    }
}
