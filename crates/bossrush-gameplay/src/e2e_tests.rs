//! End-to-end integration tests for the boss rush simulation.
//!
//! These tests drive encounters and whole runs through the same tick and
//! intent interface a host uses, and check the observable results.

#![cfg(test)]

use glam::Vec2;

use crate::achievements::AchievementTracker;
use crate::attack::{Attack, Placement, TimedAttack};
use crate::boss::{Boss, BossProfile, IdleMotion, Pattern};
use crate::combo::{multiplier_for, ComboCounter};
use crate::config::{CombatConfig, ComboTuning};
use crate::encounter::{Encounter, EncounterOutcome};
use crate::events::{CombatEvent, DamageTarget, EventBus};
use crate::orchestrator::{BossRush, RunStatus};
use crate::player::{Ability, Direction, HitOutcome, Player, PlayerIntent};
use crate::projectile::{Faction, ProjectileRequest};
use crate::replay::ReplayRecorder;
use crate::roster::BossKind;
use crate::run_state::{Difficulty, GameRunState};
use crate::score::{compute_final_result, stage_clear_bonus};

fn dummy_boss(config: &CombatConfig, max_health: u32, patterns: Vec<Pattern>) -> Boss {
    Boss::from_profile(
        BossProfile {
            kind: BossKind::Gpt4o,
            name: "Dummy".to_string(),
            max_health,
            idle: IdleMotion::Hover,
            patterns,
            phases: Vec::new(),
        },
        config.arena.boss_spawn(),
        config.arena.bounds,
        config.arena.boss_radius,
    )
}

fn encounter_with(config: &CombatConfig, boss: Boss) -> (Encounter, EventBus) {
    let bus = EventBus::default();
    let run = GameRunState::new(Difficulty::Normal, 0);
    (Encounter::with_boss(config, &run, boss, bus.sender()), bus)
}

fn bullet_on(encounter: &Encounter, damage: u32) -> ProjectileRequest {
    ProjectileRequest::new(Faction::Boss, encounter.player().position(), Vec2::ZERO, 5000.0, damage)
}

fn shot() -> TimedAttack {
    TimedAttack::now(Attack::AimedShot {
        from: Placement::Boss,
        speed: 400.0,
        spread: 0.0,
    })
}

/// Cooldown gates and soft-fail behaviour
mod ability_tests {
    use super::*;

    #[test]
    fn e2e_repeated_actions_at_zero_delta_apply_once() {
        let config = CombatConfig::default();
        let (mut encounter, bus) = encounter_with(&config, dummy_boss(&config, 1000, Vec::new()));

        encounter.tick(0.0, &[PlayerIntent::Attack, PlayerIntent::Attack]);
        encounter.tick(0.0, &[PlayerIntent::Attack]);
        assert_eq!(encounter.projectiles().count(Faction::Player), 1);

        encounter.tick(0.0, &[PlayerIntent::UseSkill, PlayerIntent::UseSkill]);
        assert_eq!(encounter.boss().health(), 975, "Beam should land exactly once");

        encounter.tick(0.0, &[PlayerIntent::UseShield, PlayerIntent::UseShield]);
        let shields = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::AbilityUsed { ability: Ability::Shield }))
            .count();
        assert_eq!(shields, 1);
    }

    #[test]
    fn e2e_ultimate_requires_full_gauge() {
        let config = CombatConfig::default();
        let mut player = Player::new(&config);

        assert!(player.request_ultimate().is_none());
        assert_eq!(player.ultimate_gauge(), 0.0);

        player.request_beam();
        assert_eq!(player.ultimate_gauge(), 10.0);
        assert!(player.request_ultimate().is_none(), "Partial gauge must not fire the ultimate");
        assert_eq!(player.ultimate_gauge(), 10.0);
    }

    #[test]
    fn e2e_shield_negates_large_hit() {
        let config = CombatConfig::default();
        let mut player = Player::new(&config);
        player.request_shield();

        let outcome = player.take_damage(1000);
        assert!(matches!(outcome, HitOutcome::Reflected(_)));
        assert_eq!(player.health(), 100);

        let (mut encounter, bus) = encounter_with(&config, dummy_boss(&config, 1000, Vec::new()));
        encounter.tick(0.0, &[PlayerIntent::UseShield]);
        encounter.spawn_projectile(bullet_on(&encounter, 1000));
        encounter.tick(16.0, &[]);

        assert_eq!(encounter.player().health(), 100);
        let events = bus.drain();
        assert!(events.iter().any(|e| matches!(e, CombatEvent::ShieldReflected { .. })));
        assert!(!events.iter().any(|e| matches!(
            e,
            CombatEvent::DamageApplied {
                target: DamageTarget::Player,
                ..
            }
        )));
    }

    #[test]
    fn e2e_shield_expires() {
        let config = CombatConfig::default();
        let (mut encounter, _bus) = encounter_with(&config, dummy_boss(&config, 1000, Vec::new()));
        encounter.tick(0.0, &[PlayerIntent::UseShield]);
        encounter.tick(2000.0, &[]);
        assert!(!encounter.player().is_shielded());

        encounter.spawn_projectile(bullet_on(&encounter, 10));
        encounter.tick(16.0, &[]);
        assert_eq!(encounter.player().health(), 90);
    }
}

/// Combo curve and window
mod combo_tests {
    use super::*;

    #[test]
    fn e2e_multiplier_curve() {
        let tuning = ComboTuning::default();
        for (count, expected) in [
            (0, 1.0),
            (9, 1.0),
            (10, 1.5),
            (19, 1.5),
            (20, 2.0),
            (49, 3.0),
            (50, 3.5),
            (100, 5.0),
        ] {
            assert_eq!(multiplier_for(count, &tuning), expected, "count {count}");
        }
    }

    #[test]
    fn e2e_combo_window() {
        let mut combo = ComboCounter::default();
        combo.register_hit();
        combo.update(3000.0);
        assert_eq!(combo.count(), 0);
        assert_eq!(combo.multiplier(), 1.0);

        combo.register_hit();
        combo.update(2999.0);
        combo.register_hit();
        assert_eq!(combo.count(), 2, "Hit inside the window keeps the streak");
    }
}

/// Boss behaviour inside an encounter
mod boss_tests {
    use super::*;

    #[test]
    fn e2e_patterns_run_round_robin() {
        let mut config = CombatConfig::default();
        config.player.max_health = 10_000;
        let patterns = vec![
            Pattern::new("A", 100.0, 1000.0).with_steps(vec![shot()]),
            Pattern::new("B", 100.0, 2000.0).with_steps(vec![shot()]),
            Pattern::new("C", 100.0, 3000.0).with_steps(vec![shot()]),
        ];
        let (mut encounter, bus) = encounter_with(&config, dummy_boss(&config, 1000, patterns));

        for _ in 0..1250 {
            encounter.tick(16.0, &[]);
        }
        let names: Vec<String> = bus
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                CombatEvent::BossPatternStarted { pattern, .. } => Some(pattern),
                _ => None,
            })
            .collect();

        assert!(names.len() >= 6, "Expected at least two full cycles, got {names:?}");
        for (i, name) in names.iter().enumerate() {
            assert_eq!(name, ["A", "B", "C"][i % 3]);
        }
    }

    #[test]
    fn e2e_five_beams_defeat_boss_once() {
        let config = CombatConfig::default();
        let (mut encounter, bus) = encounter_with(&config, dummy_boss(&config, 125, Vec::new()));

        let mut outcome = EncounterOutcome::Ongoing;
        for beam in 1..=5 {
            assert!(!encounter.boss().is_dead(), "Boss died before beam {beam}");
            outcome = encounter.tick(0.0, &[PlayerIntent::UseSkill]);
            encounter.tick(3000.0, &[]);
        }
        assert!(matches!(outcome, EncounterOutcome::BossDefeated(_)));
        assert!(encounter.boss().is_dead());
        assert!(encounter.boss().death_handled());

        let mut boss = encounter.boss().clone();
        assert_eq!(boss.take_damage(25).applied, 0);
        assert_eq!(boss.health(), 0);
        assert!(!boss.mark_death_handled());

        let defeats = bus
            .drain()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::BossDefeated { .. }))
            .count();
        assert_eq!(defeats, 1);
    }

    #[test]
    fn e2e_boss_defeat_wins_same_tick_race() {
        let mut config = CombatConfig::default();
        config.player.max_health = 10;
        let (mut encounter, _bus) = encounter_with(&config, dummy_boss(&config, 25, Vec::new()));

        encounter.spawn_projectile(bullet_on(&encounter, 10));
        let outcome = encounter.tick(16.0, &[PlayerIntent::UseSkill]);
        assert!(matches!(outcome, EncounterOutcome::BossDefeated(_)));
    }

    #[test]
    fn e2e_defeat_cancels_pending_effects() {
        let config = CombatConfig::default();
        let spawn = config.arena.player_spawn();
        let patterns = vec![Pattern::new("Drop", 100.0, 60_000.0).with_steps(vec![TimedAttack::now(Attack::Blast {
            at: Placement::near(spawn.x, spawn.y),
            radius: 60.0,
            warning_ms: 1000.0,
            damage: 15,
        })])];
        let (mut encounter, _bus) = encounter_with(&config, dummy_boss(&config, 25, patterns));

        encounter.tick(16.0, &[]);
        assert_eq!(encounter.pending_effects(), 1);

        encounter.tick(16.0, &[PlayerIntent::UseSkill]);
        assert!(encounter.outcome().is_over());
        assert_eq!(encounter.pending_effects(), 0);

        encounter.tick(2000.0, &[]);
        assert_eq!(encounter.player().health(), 100, "Cancelled hazard must never land");
    }
}

/// Damage intake and score formulas
mod score_tests {
    use super::*;

    #[test]
    fn e2e_three_spaced_hits() {
        let config = CombatConfig::default();
        let (mut encounter, _bus) = encounter_with(&config, dummy_boss(&config, 1000, Vec::new()));

        for _ in 0..3 {
            encounter.spawn_projectile(bullet_on(&encounter, 10));
            encounter.tick(16.0, &[]);
            encounter.tick(600.0, &[]);
        }
        assert_eq!(encounter.player().health(), 70);
        assert_eq!(encounter.score().damage_taken(), 30);
    }

    #[test]
    fn e2e_perfect_fast_clear_bonus() {
        assert_eq!(stage_clear_bonus(25_000, 0, 0), 6500);
    }

    #[test]
    fn e2e_final_result_formula() {
        let result = compute_final_result(10_000, 40, 150_000, 0);
        assert_eq!(result.time_bonus, 5000);
        assert_eq!(result.no_death_multiplier, 1.5);
        assert_eq!(result.total, 23_100);
    }
}

/// Whole runs through the orchestrator
mod run_tests {
    use super::*;

    fn strong_config() -> CombatConfig {
        let mut config = CombatConfig::default();
        config.player.beam_damage = 1000;
        config
    }

    fn beam_to_end(rush: &mut BossRush) {
        for _ in 0..1000 {
            if rush.tick(100.0, &[PlayerIntent::UseSkill]).expect("run active").is_over() {
                return;
            }
        }
        panic!("run did not finish: {:?}", rush.status());
    }

    #[test]
    fn e2e_victory_unlocks_achievements() {
        let mut rush = BossRush::new(strong_config(), Difficulty::Normal, 0);
        beam_to_end(&mut rush);
        assert!(matches!(rush.status(), RunStatus::Victory(_)));

        let mut tracker = AchievementTracker::new();
        let handled = rush.events().dispatch(&mut tracker);
        assert!(handled > 0);

        assert_eq!(tracker.stats().total_kills, 5);
        for id in ["first_blood", "true_champion", "deathless_run", "perfect_stage", "speedrunner"] {
            assert!(tracker.is_unlocked(id), "{id} should be unlocked");
        }
        assert!(!tracker.is_unlocked("nightmare_survivor"));
    }

    #[test]
    fn e2e_submission_json() {
        let mut rush = BossRush::new(strong_config(), Difficulty::Normal, 1_700_000_000_000);
        beam_to_end(&mut rush);

        let submission = rush.submission("Tester").expect("won run");
        let json = submission.to_json().expect("serializable");
        assert!(json.contains("\"playerName\":\"Tester\""));
        assert!(json.contains("\"stage5Time\""));
        assert!(json.contains("\"noDeathBonus\":true"));
        assert!(json.contains("\"speedRunBonus\":true"));
    }

    #[test]
    fn e2e_config_file_drives_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("combat.toml");
        strong_config().save_to(&path).expect("save");

        let config = CombatConfig::load_from(&path);
        assert_eq!(config.player.beam_damage, 1000);

        let mut rush = BossRush::new(config, Difficulty::Easy, 0);
        beam_to_end(&mut rush);
        assert_eq!(rush.run_state().stage_times.len(), 5);
    }

    #[test]
    fn e2e_recorded_victory_replays() {
        let config = strong_config();
        let mut rush = BossRush::new(config.clone(), Difficulty::Hard, 0);
        let mut recorder = ReplayRecorder::new(&config, Difficulty::Hard, 0);
        for _ in 0..1000 {
            let status = recorder
                .tick(&mut rush, 100.0, &[PlayerIntent::UseSkill])
                .expect("run active");
            if status.is_over() {
                break;
            }
        }

        let summary = recorder.finish().play(&config);
        assert_eq!(&summary.status, rush.status());
        assert_eq!(summary.run, *rush.run_state());
    }

    #[test]
    fn e2e_retry_keeps_deaths_and_restarts_timer() {
        let mut config = CombatConfig::default();
        config.player.max_health = 1;
        let mut rush = BossRush::new(config, Difficulty::Normal, 0);

        for _ in 0..200 {
            let status = rush
                .tick(50.0, &[PlayerIntent::Move(Direction::Right)])
                .expect("run active");
            if status.is_over() {
                break;
            }
        }
        let RunStatus::Defeat { stage, .. } = rush.status().clone() else {
            panic!("expected defeat, got {:?}", rush.status());
        };
        let elapsed_before = rush.run_state().total_time_ms();
        assert!(elapsed_before > 0);

        rush.retry().expect("retry");
        assert_eq!(rush.run_state().stage, stage);
        assert_eq!(rush.run_state().deaths, 1);
        assert_eq!(rush.encounter().stage_time_ms(), 0);
        assert_eq!(rush.run_state().total_time_ms(), elapsed_before);
    }
}
