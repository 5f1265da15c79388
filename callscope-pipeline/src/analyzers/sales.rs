use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{CallRecord, Outcome};
use crate::util::percent;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesMetrics {
    pub total_sales: usize,
    pub total_inspections: usize,
    pub sales_rate: f64,
    pub inspection_rate: f64,
    pub sales_by_agent: IndexMap<String, usize>,
    pub inspections_by_agent: IndexMap<String, usize>,
}

pub fn analyze_sales(calls: &[CallRecord]) -> SalesMetrics {
    let mut sales_by_agent: IndexMap<String, usize> = IndexMap::new();
    let mut inspections_by_agent: IndexMap<String, usize> = IndexMap::new();

    for call in calls {
        let bucket = match call.outcome {
            Outcome::Sale => &mut sales_by_agent,
            Outcome::Inspection => &mut inspections_by_agent,
            _ => continue,
        };
        *bucket.entry(call.agent_name.clone()).or_default() += 1;
    }

    let total_sales = sales_by_agent.values().sum();
    let total_inspections = inspections_by_agent.values().sum();

    SalesMetrics {
        total_sales,
        total_inspections,
        sales_rate: percent(total_sales, calls.len()),
        inspection_rate: percent(total_inspections, calls.len()),
        sales_by_agent,
        inspections_by_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(agent: &str, outcome: Outcome) -> CallRecord {
        CallRecord {
            agent_name: agent.into(),
            outcome,
            ..CallRecord::default()
        }
    }

    #[test]
    fn per_agent_counts_sum_to_totals() {
        let calls = vec![
            call("A", Outcome::Sale),
            call("B", Outcome::Sale),
            call("A", Outcome::Inspection),
            call("A", Outcome::Sale),
            call("C", Outcome::FollowUp),
        ];
        let m = analyze_sales(&calls);
        assert_eq!(m.total_sales, 3);
        assert_eq!(m.sales_by_agent["A"], 2);
        assert_eq!(m.inspections_by_agent["A"], 1);
        assert!(!m.sales_by_agent.contains_key("C"));
        assert_eq!(m.sales_rate, 60.0);
        assert_eq!(m.inspection_rate, 20.0);
        // Encounter order
        assert_eq!(m.sales_by_agent.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn empty_input_has_zero_rates() {
        let m = analyze_sales(&[]);
        assert_eq!(m.sales_rate, 0.0);
        assert_eq!(m.inspection_rate, 0.0);
        assert!(m.sales_by_agent.is_empty());
    }
}
