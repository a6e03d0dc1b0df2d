//! Hit-streak counter driving the score multiplier.
//!
//! Every landed player hit extends the streak and restarts its window. When
//! the window runs out the streak is dropped entirely, not decremented.

use serde::{Deserialize, Serialize};

use crate::config::ComboTuning;
use crate::timer::Cooldown;

/// Multiplier for a streak of `count` hits.
///
/// `1.0 + floor(count / hits_per_tier) * tier_increment`, capped at
/// `max_multiplier`.
#[must_use]
pub fn multiplier_for(count: u32, tuning: &ComboTuning) -> f32 {
    let tiers = count / tuning.hits_per_tier.max(1);
    (1.0 + tiers as f32 * tuning.tier_increment).min(tuning.max_multiplier)
}

/// Current combo streak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboCounter {
    count: u32,
    multiplier: f32,
    window: Cooldown,
    best: u32,
    tuning: ComboTuning,
}

impl Default for ComboCounter {
    fn default() -> Self {
        Self::new(ComboTuning::default())
    }
}

impl ComboCounter {
    /// Creates an empty streak.
    #[must_use]
    pub fn new(tuning: ComboTuning) -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            window: Cooldown::ready(),
            best: 0,
            tuning,
        }
    }

    /// Registers a landed hit and returns the multiplier that applies to it.
    pub fn register_hit(&mut self) -> f32 {
        self.count = self.count.saturating_add(1);
        self.window.reset(self.tuning.timeout_ms);
        self.multiplier = multiplier_for(self.count, &self.tuning);
        self.best = self.best.max(self.count);

        debug_assert!(self.multiplier >= 1.0 && self.multiplier <= self.tuning.max_multiplier);
        self.multiplier
    }

    /// Advances the streak window. Returns the streak length if it just broke.
    pub fn update(&mut self, delta_ms: f32) -> Option<u32> {
        if self.count == 0 {
            return None;
        }

        self.window.tick(delta_ms);
        if !self.window.is_ready() {
            return None;
        }

        let broken = self.count;
        self.count = 0;
        self.multiplier = 1.0;
        Some(broken)
    }

    /// Applies the current multiplier to a base score.
    #[must_use]
    pub fn bonus_score(&self, base: u64) -> u64 {
        (base as f64 * f64::from(self.multiplier)).floor() as u64
    }

    /// Returns the streak length if it currently sits exactly on a milestone.
    #[must_use]
    pub fn milestone_reached(&self) -> Option<u32> {
        self.tuning
            .milestones
            .iter()
            .copied()
            .find(|&m| m == self.count && m > 0)
    }

    /// Current streak length.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Current multiplier.
    #[must_use]
    pub const fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Time left before the streak breaks.
    #[must_use]
    pub const fn time_remaining_ms(&self) -> f32 {
        self.window.remaining_ms()
    }

    /// Longest streak seen by this counter.
    #[must_use]
    pub const fn best(&self) -> u32 {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hits(counter: &mut ComboCounter, n: u32) -> f32 {
        let mut last = 1.0;
        for _ in 0..n {
            last = counter.register_hit();
        }
        last
    }

    #[test]
    fn test_multiplier_curve() {
        let tuning = ComboTuning::default();
        let expected = [
            (0, 1.0),
            (9, 1.0),
            (10, 1.5),
            (19, 1.5),
            (20, 2.0),
            (49, 3.0),
            (50, 3.5),
            (100, 5.0),
        ];
        for (count, multiplier) in expected {
            assert_eq!(multiplier_for(count, &tuning), multiplier, "count {count}");
        }
    }

    #[test]
    fn test_register_hit_returns_new_multiplier() {
        let mut combo = ComboCounter::default();
        assert_eq!(hits(&mut combo, 9), 1.0);
        assert_eq!(combo.register_hit(), 1.5);
        assert_eq!(combo.count(), 10);
    }

    #[test]
    fn test_window_expiry_resets_fully() {
        let mut combo = ComboCounter::default();
        hits(&mut combo, 12);
        assert_eq!(combo.update(3000.0), Some(12));
        assert_eq!(combo.count(), 0);
        assert_eq!(combo.multiplier(), 1.0);
        assert_eq!(combo.time_remaining_ms(), 0.0);
        assert_eq!(combo.best(), 12);
    }

    #[test]
    fn test_hit_before_expiry_keeps_streak() {
        let mut combo = ComboCounter::default();
        combo.register_hit();
        assert_eq!(combo.update(2999.0), None);
        combo.register_hit();
        assert_eq!(combo.count(), 2);
        assert_eq!(combo.update(2999.0), None);
        assert_eq!(combo.count(), 2);
    }

    #[test]
    fn test_idle_counter_does_not_tick() {
        let mut combo = ComboCounter::default();
        assert_eq!(combo.update(10_000.0), None);
        assert_eq!(combo.count(), 0);
    }

    #[test]
    fn test_bonus_score_floors() {
        let mut combo = ComboCounter::default();
        hits(&mut combo, 10);
        assert_eq!(combo.bonus_score(10), 15);
        assert_eq!(combo.bonus_score(3), 4);
    }

    #[test]
    fn test_milestones() {
        let mut combo = ComboCounter::default();
        hits(&mut combo, 9);
        assert_eq!(combo.milestone_reached(), None);
        combo.register_hit();
        assert_eq!(combo.milestone_reached(), Some(10));
        hits(&mut combo, 15);
        assert_eq!(combo.milestone_reached(), Some(25));
    }

    proptest! {
        #[test]
        fn prop_multiplier_bounded_and_monotonic(count in 0u32..10_000) {
            let tuning = ComboTuning::default();
            let m = multiplier_for(count, &tuning);
            prop_assert!((1.0..=5.0).contains(&m));
            prop_assert!(multiplier_for(count + 1, &tuning) >= m);
        }

        #[test]
        fn prop_count_positive_iff_window_open(steps in proptest::collection::vec((any::<bool>(), 0.0f32..4000.0), 0..60)) {
            let mut combo = ComboCounter::default();
            for (hit, dt) in steps {
                if hit {
                    combo.register_hit();
                } else {
                    combo.update(dt);
                }
                prop_assert_eq!(combo.count() > 0, combo.time_remaining_ms() > 0.0);
            }
        }
    }
}
