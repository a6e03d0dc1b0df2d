//! Score accumulation and bonus rules.
//!
//! The bonus formulas are free functions so they can be checked in
//! isolation; [`ScoreTracker`] applies them to a running total.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Points per stage number awarded for a boss kill.
pub const BOSS_KILL_PER_STAGE: u64 = 2000;
/// Maximum health-ratio bonus on a boss kill.
pub const BOSS_KILL_HEALTH_BONUS: f32 = 1000.0;

/// Score for defeating the boss of `stage`.
///
/// `stage * 2000 + floor(remaining / max * 1000)`. The ratio is the player's
/// remaining health, rewarding kills made without losing much.
#[must_use]
pub fn boss_kill_score(stage: u8, remaining_health: u32, max_health: u32) -> u64 {
    let ratio = if max_health == 0 {
        0.0
    } else {
        remaining_health.min(max_health) as f32 / max_health as f32
    };
    u64::from(stage) * BOSS_KILL_PER_STAGE + (ratio * BOSS_KILL_HEALTH_BONUS).floor() as u64
}

/// Bonus for clearing a stage.
///
/// Time tiers are exclusive (+2000 under 30s, else +1000 under 60s); the
/// deathless (+1500) and untouched (+3000) bonuses stack on top.
#[must_use]
pub fn stage_clear_bonus(stage_time_ms: u64, deaths_this_run: u32, damage_taken_this_stage: u32) -> u64 {
    let mut bonus = 0;
    if stage_time_ms < 30_000 {
        bonus += 2000;
    } else if stage_time_ms < 60_000 {
        bonus += 1000;
    }
    if deaths_this_run == 0 {
        bonus += 1500;
    }
    if damage_taken_this_stage == 0 {
        bonus += 3000;
    }
    bonus
}

/// Run-level time bonus.
#[must_use]
pub fn time_bonus(total_time_ms: u64) -> u64 {
    if total_time_ms < 180_000 {
        5000
    } else if total_time_ms < 300_000 {
        2000
    } else {
        0
    }
}

/// Breakdown of the final run score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    /// Score accumulated during play
    pub base_score: u64,
    /// `max_combo * 10`
    pub combo_bonus: u64,
    /// Run time bonus
    pub time_bonus: u64,
    /// 1.5 for a deathless run, else 1.0
    pub no_death_multiplier: f32,
    /// Extra points contributed by the deathless multiplier on the base score
    pub no_death_bonus: u64,
    /// Final score
    pub total: u64,
}

/// Computes the final score of a finished run.
#[must_use]
pub fn compute_final_result(running_score: u64, max_combo: u32, total_time_ms: u64, deaths: u32) -> FinalResult {
    let combo_bonus = u64::from(max_combo) * 10;
    let time_bonus = time_bonus(total_time_ms);
    let deathless = deaths == 0;
    let no_death_multiplier = if deathless { 1.5 } else { 1.0 };
    let subtotal = running_score + combo_bonus + time_bonus;

    FinalResult {
        base_score: running_score,
        combo_bonus,
        time_bonus,
        no_death_multiplier,
        no_death_bonus: if deathless { running_score / 2 } else { 0 },
        total: (subtotal as f64 * f64::from(no_death_multiplier)).floor() as u64,
    }
}

/// Outcome of one cleared stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage number
    pub stage: u8,
    /// Time to clear
    pub elapsed_ms: u64,
    /// Total score right after the clear bonuses
    pub score_at_clear: u64,
    /// Longest streak seen so far in the run
    pub max_combo: u32,
    /// Damage dealt during the stage
    pub damage_dealt: u32,
    /// Damage taken during the stage
    pub damage_taken: u32,
    /// No damage taken
    pub perfect_clear: bool,
}

/// Running score for one stage, resumed from the run's total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTracker {
    total: u64,
    max_combo: u32,
    damage_dealt: u32,
    damage_taken: u32,
    stage_results: Vec<StageResult>,
}

impl ScoreTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker continuing from a carried-forward total.
    #[must_use]
    pub fn resume(total: u64, max_combo: u32) -> Self {
        Self {
            total,
            max_combo,
            ..Self::default()
        }
    }

    /// Adds `floor(amount * multiplier)` and returns the delta applied.
    ///
    /// Negative amounts and multipliers are clamped to zero.
    pub fn add_score(&mut self, amount: i64, multiplier: f32) -> u64 {
        if amount < 0 || multiplier < 0.0 {
            warn!("Rejected negative score change: {amount} x {multiplier}");
            return 0;
        }

        let before = self.total;
        let delta = (amount as f64 * f64::from(multiplier)).floor() as u64;
        self.total = self.total.saturating_add(delta);

        debug_assert!(self.total >= before, "score must not decrease");
        delta
    }

    /// Adds the boss kill score and returns it.
    pub fn add_boss_kill_score(&mut self, stage: u8, remaining_health: u32, max_health: u32) -> u64 {
        let points = boss_kill_score(stage, remaining_health, max_health);
        self.total = self.total.saturating_add(points);
        debug!("Boss kill score for stage {stage}: {points}");
        points
    }

    /// Adds the stage clear bonus using this stage's damage taken.
    pub fn add_stage_clear_bonus(&mut self, stage_time_ms: u64, deaths_this_run: u32) -> u64 {
        let bonus = stage_clear_bonus(stage_time_ms, deaths_this_run, self.damage_taken);
        self.total = self.total.saturating_add(bonus);
        debug!("Stage clear bonus: {bonus}");
        bonus
    }

    /// Records a streak length, keeping the maximum.
    pub fn observe_combo(&mut self, combo: u32) {
        self.max_combo = self.max_combo.max(combo);
    }

    /// Records damage dealt to the boss.
    pub fn add_damage_dealt(&mut self, amount: u32) {
        self.damage_dealt = self.damage_dealt.saturating_add(amount);
    }

    /// Records damage taken by the player.
    pub fn add_damage_taken(&mut self, amount: u32) {
        self.damage_taken = self.damage_taken.saturating_add(amount);
    }

    /// Appends the result of a cleared stage and returns it.
    pub fn save_stage_result(&mut self, stage: u8, elapsed_ms: u64) -> StageResult {
        let result = StageResult {
            stage,
            elapsed_ms,
            score_at_clear: self.total,
            max_combo: self.max_combo,
            damage_dealt: self.damage_dealt,
            damage_taken: self.damage_taken,
            perfect_clear: self.damage_taken == 0,
        };
        self.stage_results.push(result.clone());
        result
    }

    /// Final result of the run from this tracker's totals.
    #[must_use]
    pub fn final_result(&self, total_time_ms: u64, total_deaths: u32) -> FinalResult {
        compute_final_result(self.total, self.max_combo, total_time_ms, total_deaths)
    }

    /// Current total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Longest streak observed.
    #[must_use]
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Damage dealt this stage.
    #[must_use]
    pub const fn damage_dealt(&self) -> u32 {
        self.damage_dealt
    }

    /// Damage taken this stage.
    #[must_use]
    pub const fn damage_taken(&self) -> u32 {
        self.damage_taken
    }

    /// Recorded stage results, oldest first.
    #[must_use]
    pub fn stage_results(&self) -> &[StageResult] {
        &self.stage_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boss_kill_score() {
        assert_eq!(boss_kill_score(1, 100, 100), 3000);
        assert_eq!(boss_kill_score(3, 50, 100), 6500);
        assert_eq!(boss_kill_score(5, 0, 100), 10_000);
        assert_eq!(boss_kill_score(2, 33, 100), 4330);
    }

    #[test]
    fn test_stage_clear_bonus_tiers() {
        assert_eq!(stage_clear_bonus(25_000, 0, 0), 6500);
        assert_eq!(stage_clear_bonus(45_000, 0, 0), 5500);
        assert_eq!(stage_clear_bonus(60_000, 0, 0), 4500);
        assert_eq!(stage_clear_bonus(29_999, 1, 12), 2000);
        assert_eq!(stage_clear_bonus(90_000, 2, 5), 0);
    }

    #[test]
    fn test_final_result_deathless() {
        let result = compute_final_result(10_000, 40, 150_000, 0);
        assert_eq!(result.time_bonus, 5000);
        assert_eq!(result.combo_bonus, 400);
        assert_eq!(result.no_death_multiplier, 1.5);
        assert_eq!(result.total, 23_100);
    }

    #[test]
    fn test_final_result_with_deaths() {
        let result = compute_final_result(10_000, 0, 250_000, 3);
        assert_eq!(result.time_bonus, 2000);
        assert_eq!(result.no_death_bonus, 0);
        assert_eq!(result.total, 12_000);
        assert_eq!(compute_final_result(10_000, 0, 300_000, 1).total, 10_000);
    }

    #[test]
    fn test_add_score_applies_multiplier() {
        let mut score = ScoreTracker::new();
        assert_eq!(score.add_score(10, 1.5), 15);
        assert_eq!(score.add_score(7, 1.5), 10);
        assert_eq!(score.total(), 25);
    }

    #[test]
    fn test_negative_score_rejected() {
        let mut score = ScoreTracker::resume(100, 0);
        assert_eq!(score.add_score(-50, 1.0), 0);
        assert_eq!(score.total(), 100);
    }

    #[test]
    fn test_stage_result_perfect_flag() {
        let mut score = ScoreTracker::new();
        score.add_damage_dealt(200);
        let clean = score.save_stage_result(1, 20_000);
        assert!(clean.perfect_clear);

        score.add_damage_taken(10);
        let hurt = score.save_stage_result(2, 20_000);
        assert!(!hurt.perfect_clear);
        assert_eq!(score.stage_results().len(), 2);
    }

    #[test]
    fn test_tracker_bonuses_use_stage_damage() {
        let mut score = ScoreTracker::new();
        assert_eq!(score.add_stage_clear_bonus(25_000, 0), 6500);
        score.add_damage_taken(1);
        assert_eq!(score.add_stage_clear_bonus(25_000, 0), 3500);
    }

    proptest! {
        #[test]
        fn prop_total_never_decreases(ops in proptest::collection::vec((-1000i64..10_000, 0.0f32..5.0), 0..100)) {
            let mut score = ScoreTracker::new();
            let mut last = 0;
            for (amount, multiplier) in ops {
                score.add_score(amount, multiplier);
                prop_assert!(score.total() >= last);
                last = score.total();
            }
        }
    }
}
