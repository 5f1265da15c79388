use crate::analyzers::coaching::AgentCoaching;
use crate::selector::Selector;
use crate::types::Severity;

/// Orders agents by how many high-priority suggestions they received.
///
/// Every agent is kept; this selector only sorts.
pub struct CoachingPrioritySelector;

impl Selector<AgentCoaching> for CoachingPrioritySelector {
    fn score(&self, candidate: &AgentCoaching) -> f64 {
        candidate
            .suggestions
            .iter()
            .filter(|s| s.priority == Severity::High)
            .count() as f64
    }
}
