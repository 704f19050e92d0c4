//! Random choice among ranked candidates
//!
//! The engine picks uniformly among its top candidates so it does not replay
//! the single closest match every time. The choice goes through
//! [`TrackPicker`] so tests and simulations can make it deterministic.

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Chooses one index out of `len` options
pub trait TrackPicker: Send + Sync {
    /// Returns an index in `0..len`; only called with `len > 0`
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl TrackPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Uniform choice from a seeded xoshiro stream, reproducible across runs
pub struct SeededPicker {
    rng: Mutex<Xoshiro256Plus>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Xoshiro256Plus::seed_from_u64(seed)),
        }
    }
}

impl TrackPicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len)
    }
}

/// Always picks the same position (clamped to the last option)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl TrackPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_picker_in_range() {
        let picker = RandomPicker;
        for len in 1..20 {
            assert!(picker.pick(len) < len);
        }
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let a = SeededPicker::new(42);
        let b = SeededPicker::new(42);
        let first: Vec<usize> = (0..32).map(|_| a.pick(3)).collect();
        let second: Vec<usize> = (0..32).map(|_| b.pick(3)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|i| *i < 3));
    }

    #[test]
    fn test_fixed_picker_clamps() {
        assert_eq!(FixedPicker(2).pick(3), 2);
        assert_eq!(FixedPicker(5).pick(3), 2);
        assert_eq!(FixedPicker(0).pick(1), 0);
    }
}
