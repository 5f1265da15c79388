use std::cmp::Ordering;

use crate::util;

/// Selectors rank and truncate a candidate list after aggregation.
pub trait Selector<C>: Send + Sync {
    /// Default selection: sort and truncate based on provided configs.
    fn select(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Extract the score from a candidate to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Sort candidates by score, highest first.
    ///
    /// The sort is stable, so equal scores keep their encounter order.
    /// NaN scores sink to the end.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let sa = self.score(a);
            let sb = self.score(b);
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
            }
        });
        sorted
    }

    /// Optionally provide a maximum number of candidates to select.
    /// Defaults to no truncation if not overridden.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ByValue(Option<usize>);

    impl Selector<(char, f64)> for ByValue {
        fn score(&self, candidate: &(char, f64)) -> f64 {
            candidate.1
        }

        fn size(&self) -> Option<usize> {
            self.0
        }
    }

    #[test]
    fn ties_keep_encounter_order() {
        let picked = ByValue(None).select(vec![('a', 1.0), ('b', 2.0), ('c', 1.0), ('d', 2.0)]);
        let names: String = picked.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, "bdac");
    }

    #[test]
    fn size_truncates_and_nan_sinks() {
        let picked = ByValue(Some(2)).select(vec![('a', f64::NAN), ('b', 1.0), ('c', 3.0)]);
        let names: String = picked.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, "cb");
    }
}
