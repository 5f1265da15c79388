//! Follow-up completion oracles.
//!
//! No CRM action log exists in the call data, so whether a requested
//! follow-up was acted on is simulated. Production deployments should
//! replace these with a lookup against the real follow-up tracking system.
//!
//! Two per-call mechanisms are provided and deliberately kept distinct:
//! [`IdSeededOracle`] is deterministic per record id, [`RandomOracle`] draws
//! fresh on every evaluation. The aggregate follow-up metrics use a third,
//! count-based assumption (`FOLLOW_UP_ACTED_ON_RATE`) that needs no oracle.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assumptions::{ID_SEED_ACTED_ON_THRESHOLD, RANDOM_ACTED_ON_PROBABILITY};
use crate::types::CallRecord;
use crate::util;

/// Decides whether a requested follow-up was acted on.
pub trait FollowUpCompletionOracle: Send + Sync {
    fn acted_on(&self, call: &CallRecord) -> bool;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Deterministic oracle seeded by the record id.
///
/// The seed is the first 8 hex digits of the id (non-hex characters
/// removed) read as base 16. An id with no hex digits, or whose seed is 0,
/// falls back to the id length. The call is acted on when
/// `(seed % 100) / 100 > 0.4`.
///
/// For UUID-style ids this matches the dashboard's dash-stripping seed.
/// Other ids intentionally differ: `"call-0012"` seeds 0xca0012 here, where
/// a parse that stops at the first non-hex character would give 0xca.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdSeededOracle;

impl IdSeededOracle {
    pub fn seed(id: &str) -> u64 {
        let hex: String = id.chars().filter(char::is_ascii_hexdigit).take(8).collect();
        match u64::from_str_radix(&hex, 16) {
            Ok(seed) if seed != 0 => seed,
            _ => id.len() as u64,
        }
    }
}

impl FollowUpCompletionOracle for IdSeededOracle {
    fn acted_on(&self, call: &CallRecord) -> bool {
        let draw = (Self::seed(&call.id) % 100) as f64 / 100.0;
        draw > ID_SEED_ACTED_ON_THRESHOLD
    }
}

/// Oracle that draws from an RNG on every call.
///
/// Built with [`RandomOracle::new`] it is non-deterministic across runs;
/// [`RandomOracle::seeded`] gives a reproducible sequence.
pub struct RandomOracle {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl RandomOracle {
    pub fn new() -> Self {
        Self {
            probability: RANDOM_ACTED_ON_PROBABILITY,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            probability: RANDOM_ACTED_ON_PROBABILITY,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowUpCompletionOracle for RandomOracle {
    fn acted_on(&self, _call: &CallRecord) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            log::warn!("Random oracle lock was poisoned, recovering");
            poisoned.into_inner()
        });
        rng.gen::<f64>() > 1.0 - self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> CallRecord {
        CallRecord {
            id: id.into(),
            ..CallRecord::default()
        }
    }

    #[test]
    fn seed_strips_non_hex_and_takes_eight_digits() {
        // "3f2a-9c1b-77" -> "3f2a9c1b"
        assert_eq!(IdSeededOracle::seed("3f2a-9c1b-77"), 0x3f2a_9c1b);
        assert_eq!(IdSeededOracle::seed("call-0012"), 0xca_0012);
    }

    #[test]
    fn seed_falls_back_to_length() {
        assert_eq!(IdSeededOracle::seed("xyz"), 3);
        assert_eq!(IdSeededOracle::seed("0000-zz"), 7);
        assert_eq!(IdSeededOracle::seed(""), 0);
    }

    #[test]
    fn id_seeded_threshold() {
        // 0x41 = 65 -> 0.65 > 0.4
        assert!(IdSeededOracle.acted_on(&call("41")));
        // 0x28 = 40 -> 0.40 is not > 0.4
        assert!(!IdSeededOracle.acted_on(&call("28")));
        assert_eq!(
            IdSeededOracle.acted_on(&call("41")),
            IdSeededOracle.acted_on(&call("41"))
        );
    }

    #[test]
    fn seeded_random_oracle_is_reproducible() {
        let a = RandomOracle::seeded(42);
        let b = RandomOracle::seeded(42);
        let c = call("x");
        let run_a: Vec<bool> = (0..32).map(|_| a.acted_on(&c)).collect();
        let run_b: Vec<bool> = (0..32).map(|_| b.acted_on(&c)).collect();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn random_oracle_rate_is_near_sixty_percent() {
        let oracle = RandomOracle::seeded(7);
        let c = call("x");
        let hits = (0..10_000).filter(|_| oracle.acted_on(&c)).count();
        assert!((5_500..6_500).contains(&hits), "hits = {hits}");
    }
}
