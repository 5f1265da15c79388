use crate::analyzers::insights::AgentFollowUpPerformance;
use crate::selector::Selector;

/// Selects the agents with the most requested follow-ups.
pub struct FollowUpVolumeSelector {
    pub k: usize,
}

impl Default for FollowUpVolumeSelector {
    fn default() -> Self {
        Self { k: 10 }
    }
}

impl Selector<AgentFollowUpPerformance> for FollowUpVolumeSelector {
    fn score(&self, candidate: &AgentFollowUpPerformance) -> f64 {
        candidate.follow_ups as f64
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}
