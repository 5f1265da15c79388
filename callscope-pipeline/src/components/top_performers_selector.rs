use crate::analyzers::insights::AgentPerformer;
use crate::selector::Selector;

/// Selects the top K agents by sales plus termite upsells.
pub struct TopPerformersSelector {
    pub k: usize,
}

impl Default for TopPerformersSelector {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl Selector<AgentPerformer> for TopPerformersSelector {
    fn score(&self, candidate: &AgentPerformer) -> f64 {
        (candidate.sales + candidate.upsells) as f64
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}
