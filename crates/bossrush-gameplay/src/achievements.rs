//! Achievements unlocked from the combat event stream.
//!
//! [`AchievementTracker`] is an [`EventHandler`]: feed it events with
//! [`EventBus::dispatch`](crate::events::EventBus::dispatch) and it keeps
//! lifetime statistics and unlocks entries of [`ACHIEVEMENTS`]. Statistics are
//! serializable so a host can persist them between runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::events::{CombatEvent, DamageTarget, EventHandler};
use crate::player::Ability;
use crate::roster::BossKind;
use crate::run_state::Difficulty;

/// Achievement grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementCategory {
    /// Fighting milestones
    Combat,
    /// Ability usage
    Skill,
    /// Bosses defeated
    Progress,
    /// Hard conditions
    Challenge,
}

/// Statistics accumulated across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatistics {
    /// Bosses defeated
    pub total_kills: u32,
    /// Player deaths
    pub total_deaths: u32,
    /// Damage dealt to bosses
    pub total_damage_dealt: u64,
    /// Damage taken by the player
    pub total_damage_taken: u64,
    /// Longest combo streak
    pub max_combo: u32,
    /// Hits that extended a combo
    pub total_combo_hits: u64,
    /// Bosses defeated without taking damage
    pub perfect_bosses: u32,
    /// Fastest boss kill, if any
    pub fastest_boss_kill_ms: Option<u64>,
    /// Distinct bosses ever defeated
    pub bosses_defeated: Vec<BossKind>,
    /// Furthest stage reached
    pub highest_stage: u8,
    /// Ultimates cast
    pub ultimates_used: u32,
    /// Shields raised
    pub shields_used: u32,
    /// Beams fired
    pub beams_used: u32,
    /// A run was won on nightmare
    pub nightmare_completed: bool,
    /// A run was won
    pub all_bosses_defeated: bool,
}

impl RunStatistics {
    fn has_defeated(&self, kind: BossKind) -> bool {
        self.bosses_defeated.contains(&kind)
    }
}

/// An unlockable entry.
#[derive(Clone, Copy)]
pub struct Achievement {
    /// Stable identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// What to do
    pub description: &'static str,
    /// Grouping
    pub category: AchievementCategory,
    /// Bonus points
    pub reward: u64,
    /// Hidden until unlocked
    pub secret: bool,
    /// Unlock condition
    pub condition: fn(&RunStatistics) -> bool,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("reward", &self.reward)
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

impl Achievement {
    /// Name to show, hiding locked secrets.
    #[must_use]
    pub const fn display_name(&self, unlocked: bool) -> &'static str {
        if self.secret && !unlocked {
            "???"
        } else {
            self.name
        }
    }

    /// Description to show, hiding locked secrets.
    #[must_use]
    pub const fn display_description(&self, unlocked: bool) -> &'static str {
        if self.secret && !unlocked {
            "Hidden achievement"
        } else {
            self.description
        }
    }
}

const fn entry(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: AchievementCategory,
    reward: u64,
    condition: fn(&RunStatistics) -> bool,
) -> Achievement {
    Achievement {
        id,
        name,
        description,
        category,
        reward,
        secret: false,
        condition,
    }
}

const fn secret(mut achievement: Achievement) -> Achievement {
    achievement.secret = true;
    achievement
}

use AchievementCategory::{Challenge, Combat, Progress, Skill};

/// Every achievement, in display order.
pub const ACHIEVEMENTS: &[Achievement] = &[
    entry("first_blood", "First Blood", "Defeat your first boss", Combat, 100, |s| s.total_kills >= 1),
    entry("combo_starter", "Combo Starter", "Achieve a 10-hit combo", Combat, 200, |s| s.max_combo >= 10),
    entry("combo_master", "Combo Master", "Achieve a 50-hit combo", Combat, 500, |s| s.max_combo >= 50),
    entry("combo_legend", "Combo Legend", "Achieve a 100-hit combo", Combat, 1000, |s| s.max_combo >= 100),
    entry("damage_dealer", "Damage Dealer", "Deal 10,000 total damage", Combat, 300, |s| {
        s.total_damage_dealt >= 10_000
    }),
    entry("beam_enthusiast", "Beam Enthusiast", "Use the beam 50 times", Skill, 250, |s| s.beams_used >= 50),
    entry("defensive_player", "Defensive Player", "Use the shield 30 times", Skill, 250, |s| {
        s.shields_used >= 30
    }),
    entry("ultimate_unleashed", "Ultimate Unleashed", "Use the ultimate 10 times", Skill, 300, |s| {
        s.ultimates_used >= 10
    }),
    entry("gpt_slayer", "GPT Slayer", "Defeat GPT-4o", Progress, 200, |s| s.has_defeated(BossKind::Gpt4o)),
    entry("gemini_hunter", "Gemini Hunter", "Defeat Gemini 2.0", Progress, 300, |s| {
        s.has_defeated(BossKind::Gemini2)
    }),
    entry("titan_breaker", "Titan Breaker", "Defeat GPT-5", Progress, 500, |s| s.has_defeated(BossKind::Gpt5)),
    entry("galaxy_conqueror", "Galaxy Conqueror", "Defeat Gemini 3 Pro", Progress, 700, |s| {
        s.has_defeated(BossKind::Gemini3)
    }),
    entry("true_champion", "True Champion", "Defeat the final boss", Progress, 2000, |s| s.all_bosses_defeated),
    entry("perfect_stage", "Perfect Stage", "Defeat a boss without taking damage", Challenge, 500, |s| {
        s.perfect_bosses >= 1
    }),
    entry("speedrunner", "Speedrunner", "Defeat a boss in under 30 seconds", Challenge, 800, |s| {
        s.fastest_boss_kill_ms.is_some_and(|ms| ms < 30_000)
    }),
    secret(entry("deathless_run", "Deathless Run", "Complete the game without dying", Challenge, 3000, |s| {
        s.all_bosses_defeated && s.total_deaths == 0
    })),
    secret(entry(
        "nightmare_survivor",
        "Nightmare Survivor",
        "Complete the game on Nightmare difficulty",
        Challenge,
        5000,
        |s| s.nightmare_completed,
    )),
    secret(entry("glass_cannon", "Glass Cannon", "Deal 5000 damage without using the shield", Challenge, 600, |s| {
        s.total_damage_dealt >= 5000 && s.shields_used == 0
    })),
];

/// Looks up an achievement by ID.
#[must_use]
pub fn find_achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Unlock progress summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    /// Entries unlocked
    pub unlocked: usize,
    /// Entries in the table
    pub total: usize,
    /// Rounded percentage
    pub percentage: u32,
}

/// Tracks statistics and unlocks from combat events.
#[derive(Debug, Clone, Default)]
pub struct AchievementTracker {
    stats: RunStatistics,
    unlocked: HashSet<String>,
    recent: Vec<&'static Achievement>,
}

impl AchievementTracker {
    /// Creates a tracker with empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a tracker from persisted statistics and unlocked IDs.
    ///
    /// Unknown IDs are dropped.
    #[must_use]
    pub fn restore(stats: RunStatistics, unlocked: impl IntoIterator<Item = String>) -> Self {
        let unlocked = unlocked.into_iter().filter(|id| find_achievement(id).is_some()).collect();
        Self {
            stats,
            unlocked,
            recent: Vec::new(),
        }
    }

    fn check(&mut self) {
        for achievement in ACHIEVEMENTS {
            if self.unlocked.contains(achievement.id) || !(achievement.condition)(&self.stats) {
                continue;
            }
            self.unlocked.insert(achievement.id.to_string());
            self.recent.push(achievement);
            info!("Achievement unlocked: {}", achievement.name);
        }
    }

    /// Returns achievements unlocked since the last call.
    pub fn take_recent(&mut self) -> Vec<&'static Achievement> {
        std::mem::take(&mut self.recent)
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Check if an achievement is unlocked.
    #[must_use]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlocked achievements, in table order.
    #[must_use]
    pub fn unlocked(&self) -> Vec<&'static Achievement> {
        ACHIEVEMENTS.iter().filter(|a| self.unlocked.contains(a.id)).collect()
    }

    /// Locked achievements that are not secret.
    #[must_use]
    pub fn locked(&self) -> Vec<&'static Achievement> {
        ACHIEVEMENTS
            .iter()
            .filter(|a| !a.secret && !self.unlocked.contains(a.id))
            .collect()
    }

    /// Unlock counts.
    #[must_use]
    pub fn progress(&self) -> AchievementProgress {
        let unlocked = self.unlocked.len();
        let total = ACHIEVEMENTS.len();
        AchievementProgress {
            unlocked,
            total,
            percentage: ((unlocked as f32 / total as f32) * 100.0).round() as u32,
        }
    }

    /// Sum of rewards of unlocked achievements.
    #[must_use]
    pub fn total_bonus_score(&self) -> u64 {
        self.unlocked().iter().map(|a| a.reward).sum()
    }

    /// Clears statistics and unlocks.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl EventHandler for AchievementTracker {
    fn handle(&mut self, event: &CombatEvent) {
        let stats = &mut self.stats;
        match *event {
            CombatEvent::DamageApplied { target, amount, .. } => match target {
                DamageTarget::Boss => stats.total_damage_dealt += u64::from(amount),
                DamageTarget::Player => stats.total_damage_taken += u64::from(amount),
            },
            CombatEvent::ComboExtended { count, .. } => {
                stats.total_combo_hits += 1;
                stats.max_combo = stats.max_combo.max(count);
            },
            CombatEvent::AbilityUsed { ability } => match ability {
                Ability::Beam => stats.beams_used += 1,
                Ability::Shield => stats.shields_used += 1,
                Ability::Ultimate => stats.ultimates_used += 1,
                Ability::Attack => {},
            },
            CombatEvent::BossDefeated {
                boss,
                stage,
                stage_time_ms,
                perfect,
            } => {
                stats.total_kills += 1;
                if perfect {
                    stats.perfect_bosses += 1;
                }
                stats.fastest_boss_kill_ms = Some(
                    stats
                        .fastest_boss_kill_ms
                        .map_or(stage_time_ms, |best| best.min(stage_time_ms)),
                );
                stats.highest_stage = stats.highest_stage.max(stage);
                if !stats.bosses_defeated.contains(&boss) {
                    stats.bosses_defeated.push(boss);
                }
                stats.all_bosses_defeated = BossKind::ALL.iter().all(|k| stats.bosses_defeated.contains(k));
            },
            CombatEvent::PlayerDied { .. } => stats.total_deaths += 1,
            CombatEvent::StageAdvanced { to, .. } => stats.highest_stage = stats.highest_stage.max(to),
            CombatEvent::RunVictory { difficulty, .. } => {
                if difficulty == Difficulty::Nightmare {
                    stats.nightmare_completed = true;
                }
            },
            _ => return,
        }
        self.check();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    fn defeat(boss: BossKind, stage_time_ms: u64, perfect: bool) -> CombatEvent {
        CombatEvent::BossDefeated {
            boss,
            stage: boss.stage(),
            stage_time_ms,
            perfect,
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = ACHIEVEMENTS.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_first_kill_unlocks() {
        let mut tracker = AchievementTracker::new();
        tracker.handle(&defeat(BossKind::Gpt4o, 25_000, true));

        assert!(tracker.is_unlocked("first_blood"));
        assert!(tracker.is_unlocked("gpt_slayer"));
        assert!(tracker.is_unlocked("perfect_stage"));
        assert!(tracker.is_unlocked("speedrunner"));
        assert!(!tracker.is_unlocked("true_champion"));
        assert_eq!(tracker.take_recent().len(), 4);
        assert!(tracker.take_recent().is_empty());
    }

    #[test]
    fn test_combo_milestones_from_events() {
        let mut tracker = AchievementTracker::new();
        for count in 1..=50 {
            tracker.handle(&CombatEvent::ComboExtended { count, multiplier: 1.0 });
        }
        assert!(tracker.is_unlocked("combo_starter"));
        assert!(tracker.is_unlocked("combo_master"));
        assert!(!tracker.is_unlocked("combo_legend"));
        assert_eq!(tracker.stats().total_combo_hits, 50);
    }

    #[test]
    fn test_glass_cannon_requires_no_shield() {
        let hit = CombatEvent::DamageApplied {
            target: DamageTarget::Boss,
            x: 0.0,
            y: 0.0,
            amount: 1000,
            is_critical: false,
        };

        let mut bold = AchievementTracker::new();
        let mut careful = AchievementTracker::new();
        careful.handle(&CombatEvent::AbilityUsed { ability: Ability::Shield });
        for _ in 0..5 {
            bold.handle(&hit);
            careful.handle(&hit);
        }
        assert!(bold.is_unlocked("glass_cannon"));
        assert!(!careful.is_unlocked("glass_cannon"));
    }

    #[test]
    fn test_deathless_champion_via_bus() {
        let bus = EventBus::default();
        for (i, kind) in BossKind::ALL.into_iter().enumerate() {
            bus.publish(defeat(kind, 40_000 + i as u64, false));
        }
        bus.publish(CombatEvent::RunVictory {
            difficulty: Difficulty::Nightmare,
            total_score: 1,
            total_time_ms: 200_000,
            deaths: 0,
        });

        let mut tracker = AchievementTracker::new();
        assert_eq!(bus.dispatch(&mut tracker), 6);
        assert!(tracker.is_unlocked("true_champion"));
        assert!(tracker.is_unlocked("deathless_run"));
        assert!(tracker.is_unlocked("nightmare_survivor"));
        assert!(!tracker.is_unlocked("speedrunner"));
        assert_eq!(tracker.stats().fastest_boss_kill_ms, Some(40_000));
        assert_eq!(tracker.stats().highest_stage, 5);
    }

    #[test]
    fn test_secret_hidden_until_unlocked() {
        let tracker = AchievementTracker::new();
        let glass = find_achievement("glass_cannon").expect("exists");
        assert_eq!(glass.display_name(tracker.is_unlocked(glass.id)), "???");
        assert!(tracker.locked().iter().all(|a| !a.secret));
    }

    #[test]
    fn test_progress_and_rewards() {
        let mut tracker = AchievementTracker::restore(
            RunStatistics::default(),
            vec!["first_blood".to_string(), "gpt_slayer".to_string(), "bogus".to_string()],
        );
        let progress = tracker.progress();
        assert_eq!(progress.unlocked, 2);
        assert_eq!(progress.total, ACHIEVEMENTS.len());
        assert_eq!(tracker.total_bonus_score(), 300);

        tracker.reset();
        assert_eq!(tracker.progress().unlocked, 0);
    }
}
