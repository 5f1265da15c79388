use crate::analyzers::funnels::ObjectionCount;
use crate::selector::Selector;

/// Selects the most frequent objection labels.
pub struct ObjectionSelector {
    pub k: usize,
}

impl Default for ObjectionSelector {
    fn default() -> Self {
        Self { k: 5 }
    }
}

impl Selector<ObjectionCount> for ObjectionSelector {
    fn score(&self, candidate: &ObjectionCount) -> f64 {
        candidate.count as f64
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}
