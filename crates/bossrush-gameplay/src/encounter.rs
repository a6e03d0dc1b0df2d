//! One stage of the run: the player against a single boss.
//!
//! The encounter owns every mutable actor of the stage. Each tick runs the
//! same fixed sequence:
//!
//! 1. player intents (movement and abilities)
//! 2. player and boss clocks
//! 3. due pattern steps and telegraphed hazards
//! 4. projectile motion
//! 5. collisions, which apply damage, combo and score
//! 6. the combo window
//! 7. boss defeat, then player death
//!
//! Because the boss check comes first, a boss defeat and a player death in the
//! same tick resolve as a clear.

use bossrush_common::{circles_overlap, RunError};
use crossbeam_channel::Sender;
use fastrand::Rng;
use glam::Vec2;
use tracing::{debug, info, trace};

use crate::attack::{Attack, Effect, Hazard, TargetingContext, TimedAttack};
use crate::boss::{Boss, BossCue};
use crate::combo::ComboCounter;
use crate::config::CombatConfig;
use crate::events::{CombatEvent, DamageTarget};
use crate::player::{HitOutcome, Player, PlayerAction, PlayerIntent};
use crate::projectile::{Faction, ProjectileField, ProjectileRequest};
use crate::roster::BossKind;
use crate::run_state::{Difficulty, GameRunState};
use crate::schedule::EventSchedule;
use crate::score::{ScoreTracker, StageResult};

/// How a stage is going.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EncounterOutcome {
    /// Still fighting
    #[default]
    Ongoing,
    /// The boss fell; the stage result is final
    BossDefeated(StageResult),
    /// The player's health reached zero
    PlayerDied,
}

impl EncounterOutcome {
    /// True once the stage has ended either way.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pending {
    Strike { attack: Attack, cast_origin: Vec2 },
    Land(Hazard),
}

/// Simulation of a single stage.
#[derive(Debug)]
pub struct Encounter {
    stage: u8,
    difficulty: Difficulty,
    deaths_before: u32,
    config: CombatConfig,
    player: Player,
    boss: Boss,
    projectiles: ProjectileField,
    schedule: EventSchedule<Pending>,
    combo: ComboCounter,
    score: ScoreTracker,
    rng: Rng,
    elapsed_ms: f64,
    outcome: EncounterOutcome,
    events: Sender<CombatEvent>,
}

impl Encounter {
    /// Sets up the stage described by `run` with its roster boss.
    pub fn new(config: &CombatConfig, run: &GameRunState, events: Sender<CombatEvent>) -> Result<Self, RunError> {
        let kind = BossKind::for_stage(run.stage).ok_or(RunError::InvalidStage(run.stage))?;
        Ok(Self::with_boss(config, run, Boss::new(kind, config), events))
    }

    /// Sets up the stage described by `run` against an explicit boss.
    #[must_use]
    pub fn with_boss(config: &CombatConfig, run: &GameRunState, boss: Boss, events: Sender<CombatEvent>) -> Self {
        info!(
            "Stage {} begins: {} ({} HP, {:?})",
            run.stage,
            boss.name(),
            boss.health(),
            run.difficulty
        );
        Self {
            stage: run.stage,
            difficulty: run.difficulty,
            deaths_before: run.deaths,
            config: config.clone(),
            player: Player::new(config),
            boss,
            projectiles: ProjectileField::new(),
            schedule: EventSchedule::new(),
            combo: ComboCounter::new(config.combo.clone()),
            score: ScoreTracker::resume(run.score, run.max_combo),
            rng: Rng::with_seed(config.rng_seed ^ u64::from(run.stage)),
            elapsed_ms: 0.0,
            outcome: EncounterOutcome::Ongoing,
            events,
        }
    }

    /// Advances the stage by `delta_ms`, applying `intents` first.
    ///
    /// Once the stage is over, further ticks change nothing.
    pub fn tick(&mut self, delta_ms: f32, intents: &[PlayerIntent]) -> EncounterOutcome {
        if self.outcome.is_over() {
            return self.outcome.clone();
        }
        let delta_ms = delta_ms.max(0.0);
        self.elapsed_ms += f64::from(delta_ms);

        for intent in intents {
            self.apply_intent(*intent);
        }

        self.player.update(delta_ms);
        let cues = self.boss.update(delta_ms, self.player.position());
        self.handle_cues(cues);

        for pending in self.schedule.advance(delta_ms) {
            match pending {
                Pending::Strike { attack, cast_origin } => self.resolve_strike(attack, cast_origin),
                Pending::Land(hazard) => self.land_hazard(hazard),
            }
        }

        let arena = self.config.arena.bounds;
        self.projectiles.tick(delta_ms, self.player.position(), &arena);

        self.resolve_player_projectiles();
        self.resolve_boss_projectiles();
        self.resolve_contact();

        // Hits landed this tick extend the streak before its window runs down.
        if let Some(count) = self.combo.update(delta_ms) {
            self.emit(CombatEvent::ComboBroken { count });
        }

        if self.boss.mark_death_handled() {
            self.finish_cleared();
        } else if self.player.is_dead() {
            self.finish_died();
        }

        self.outcome.clone()
    }

    fn emit(&self, event: CombatEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.events.try_send(event);
    }

    fn award(&mut self, points: u64) {
        let delta = self.score.add_score(i64::try_from(points).unwrap_or(i64::MAX), 1.0);
        if delta > 0 {
            self.emit(CombatEvent::ScoreChanged {
                delta,
                total: self.score.total(),
            });
        }
    }

    fn apply_intent(&mut self, intent: PlayerIntent) {
        let action = match intent {
            PlayerIntent::Move(direction) => {
                self.player.steer(direction);
                return;
            },
            PlayerIntent::Attack => self.player.request_attack(),
            PlayerIntent::UseSkill => self.player.request_beam(),
            PlayerIntent::UseShield => self.player.request_shield(),
            PlayerIntent::UseUltimate => self.player.request_ultimate(),
        };
        let Some(action) = action else {
            return;
        };

        self.emit(CombatEvent::AbilityUsed {
            ability: action.ability(),
        });
        match action {
            PlayerAction::Fire(request) => {
                self.projectiles.spawn(request);
            },
            PlayerAction::Beam { damage } => self.strike_boss(damage),
            PlayerAction::Shield { .. } => {},
            PlayerAction::Ultimate { damage, score } => {
                self.strike_boss(damage);
                let count = self.projectiles.clear_faction(Faction::Boss);
                self.emit(CombatEvent::ProjectilesCleared { count });
                self.award(score);
            },
        }
    }

    /// Hit-scan ability damage. Flagged critical; does not feed the combo.
    fn strike_boss(&mut self, damage: u32) {
        let outcome = self.boss.take_damage(damage);
        if outcome.applied == 0 {
            return;
        }
        self.score.add_damage_dealt(outcome.applied);
        let at = self.boss.position();
        self.emit(CombatEvent::DamageApplied {
            target: DamageTarget::Boss,
            x: at.x,
            y: at.y,
            amount: outcome.applied,
            is_critical: true,
        });
    }

    fn handle_cues(&mut self, cues: Vec<BossCue>) {
        let kind = self.boss.kind();
        let cast_origin = self.boss.position();
        for cue in cues {
            match cue {
                BossCue::PatternStarted { name, steps } => {
                    self.schedule_steps(&steps, cast_origin);
                    self.emit(CombatEvent::BossPatternStarted { boss: kind, pattern: name });
                },
                BossCue::PhaseChanged { phase, steps } => {
                    self.schedule_steps(&steps, cast_origin);
                    self.emit(CombatEvent::BossPhaseChanged {
                        boss: kind,
                        new_phase: phase,
                    });
                },
                BossCue::TransitionEnded { phase } => {
                    trace!("{} resumes patterns in phase {phase}", self.boss.name());
                },
            }
        }
    }

    fn schedule_steps(&mut self, steps: &[TimedAttack], cast_origin: Vec2) {
        for step in steps {
            self.schedule.schedule_in(
                step.delay_ms,
                Pending::Strike {
                    attack: step.attack,
                    cast_origin,
                },
            );
        }
    }

    fn resolve_strike(&mut self, attack: Attack, cast_origin: Vec2) {
        let ctx = TargetingContext {
            boss: self.boss.position(),
            cast_origin,
            home: self.boss.home(),
            player: self.player.position(),
            arena: self.config.arena.bounds,
            bullet_damage: self.config.damage.boss_bullet,
            bullet_lifetime_ms: self.config.damage.boss_projectile_lifetime_ms,
        };
        for effect in attack.resolve(&ctx, &mut self.rng) {
            match effect {
                Effect::Spawn(request) => {
                    self.projectiles.spawn(request);
                },
                Effect::MoveBoss { to, travel_ms } => self.boss.begin_move(to, travel_ms),
                Effect::PlaceBoss(to) => self.boss.place(to),
                Effect::Telegraph { delay_ms, hazard } => {
                    self.schedule.schedule_in(delay_ms, Pending::Land(hazard));
                },
            }
        }
    }

    fn land_hazard(&mut self, hazard: Hazard) {
        if hazard.zone.contains(self.player.position()) {
            self.hit_player(hazard.damage);
        }
    }

    /// Applies base damage to the player after difficulty scaling.
    fn hit_player(&mut self, base_damage: u32) {
        let at = self.player.position();
        match self.player.take_damage(self.difficulty.scale_damage(base_damage)) {
            HitOutcome::Ignored => {},
            HitOutcome::Reflected(request) => {
                self.projectiles.spawn(request);
                self.emit(CombatEvent::ShieldReflected { x: at.x, y: at.y });
            },
            HitOutcome::Damaged { amount, killed } => {
                self.score.add_damage_taken(amount);
                self.emit(CombatEvent::DamageApplied {
                    target: DamageTarget::Player,
                    x: at.x,
                    y: at.y,
                    amount,
                    is_critical: false,
                });
                if killed {
                    debug!("Player fell on stage {}", self.stage);
                }
            },
        }
    }

    fn resolve_player_projectiles(&mut self) {
        if self.boss.is_dead() {
            return;
        }
        let hits = self.projectiles.take_hits(
            Faction::Player,
            self.boss.position(),
            self.boss.radius(),
            self.config.arena.projectile_radius,
        );
        for projectile in hits {
            let outcome = self.boss.take_damage(projectile.damage);
            if outcome.applied == 0 {
                continue;
            }
            self.score.add_damage_dealt(outcome.applied);
            self.emit(CombatEvent::DamageApplied {
                target: DamageTarget::Boss,
                x: projectile.position.x,
                y: projectile.position.y,
                amount: outcome.applied,
                is_critical: false,
            });

            let multiplier = self.combo.register_hit();
            let count = self.combo.count();
            self.score.observe_combo(count);
            self.emit(CombatEvent::ComboExtended { count, multiplier });
            if let Some(milestone) = self.combo.milestone_reached() {
                self.emit(CombatEvent::ComboMilestone { count: milestone });
            }
            self.award(self.combo.bonus_score(self.config.damage.hit_score));
        }
    }

    fn resolve_boss_projectiles(&mut self) {
        // Bullets pass through the post-hit window; the shield consumes them.
        if self.player.is_dead() || (self.player.is_invincible() && !self.player.is_shielded()) {
            return;
        }
        let hits = self.projectiles.take_hits(
            Faction::Boss,
            self.player.position(),
            self.player.radius(),
            self.config.arena.projectile_radius,
        );
        for projectile in hits {
            self.hit_player(projectile.damage);
        }
    }

    fn resolve_contact(&mut self) {
        if self.boss.is_dead() || self.player.is_invincible() {
            return;
        }
        let touching = circles_overlap(
            self.player.position(),
            self.player.radius(),
            self.boss.position(),
            self.boss.radius(),
        );
        if touching {
            self.hit_player(self.config.damage.boss_contact);
        }
    }

    fn finish_cleared(&mut self) {
        let stage_time_ms = self.stage_time_ms();
        let kill = self.score.add_boss_kill_score(
            self.stage,
            self.player.health(),
            self.player.vitals().max_health(),
        );
        let bonus = self.score.add_stage_clear_bonus(stage_time_ms, self.deaths_before);
        self.emit(CombatEvent::ScoreChanged {
            delta: kill + bonus,
            total: self.score.total(),
        });

        let result = self.score.save_stage_result(self.stage, stage_time_ms);
        self.emit(CombatEvent::BossDefeated {
            boss: self.boss.kind(),
            stage: self.stage,
            stage_time_ms,
            perfect: result.perfect_clear,
        });

        self.schedule.clear();
        let count = self.projectiles.clear_faction(Faction::Boss);
        if count > 0 {
            self.emit(CombatEvent::ProjectilesCleared { count });
        }

        info!(
            "Stage {} cleared in {}ms, score {}",
            self.stage,
            stage_time_ms,
            self.score.total()
        );
        self.outcome = EncounterOutcome::BossDefeated(result);
    }

    fn finish_died(&mut self) {
        self.schedule.clear();
        self.projectiles.clear();
        self.emit(CombatEvent::PlayerDied { stage: self.stage });
        info!("Player died on stage {} after {}ms", self.stage, self.stage_time_ms());
        self.outcome = EncounterOutcome::PlayerDied;
    }

    /// Adds a projectile to the arena directly, outside any pattern.
    pub fn spawn_projectile(&mut self, request: ProjectileRequest) {
        self.projectiles.spawn(request);
    }

    /// Stage number.
    #[must_use]
    pub const fn stage(&self) -> u8 {
        self.stage
    }

    /// Difficulty in effect.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// The boss.
    #[must_use]
    pub const fn boss(&self) -> &Boss {
        &self.boss
    }

    /// Live projectiles.
    #[must_use]
    pub const fn projectiles(&self) -> &ProjectileField {
        &self.projectiles
    }

    /// Combo streak.
    #[must_use]
    pub const fn combo(&self) -> &ComboCounter {
        &self.combo
    }

    /// Score of the run so far, including this stage.
    #[must_use]
    pub const fn score(&self) -> &ScoreTracker {
        &self.score
    }

    /// Current outcome.
    #[must_use]
    pub const fn outcome(&self) -> &EncounterOutcome {
        &self.outcome
    }

    /// Number of scheduled strikes and hazards not yet resolved.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.schedule.len()
    }

    /// Simulated time since the stage began, whole milliseconds.
    #[must_use]
    pub fn stage_time_ms(&self) -> u64 {
        self.elapsed_ms as u64
    }
}
