//! Player combat model.
//!
//! Abilities are requested by the host and either go off, returning a
//! [`PlayerAction`] for the encounter to resolve, or silently do nothing.
//! Each ability has its own cooldown; the ultimate is gated by the gauge.

use bossrush_common::ArenaBounds;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::Vitals;
use crate::config::{CombatConfig, PlayerTuning};
use crate::projectile::{Faction, ProjectileRequest};
use crate::timer::Cooldown;

/// Gauge value required to cast the ultimate.
pub const GAUGE_MAX: f32 = 100.0;

/// Factor applied to each axis when moving diagonally.
const DIAGONAL_FACTOR: f32 = 0.707;

/// Eight-way movement input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Standing still
    #[default]
    None,
    /// Up
    Up,
    /// Down
    Down,
    /// Left
    Left,
    /// Right
    Right,
    /// Up and left
    UpLeft,
    /// Up and right
    UpRight,
    /// Down and left
    DownLeft,
    /// Down and right
    DownRight,
}

impl Direction {
    /// Unit-ish movement vector, with diagonals scaled down.
    #[must_use]
    pub fn vector(self) -> Vec2 {
        let (x, y) = match self {
            Self::None => (0.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::UpLeft => (-1.0, -1.0),
            Self::UpRight => (1.0, -1.0),
            Self::DownLeft => (-1.0, 1.0),
            Self::DownRight => (1.0, 1.0),
        };
        if x != 0.0 && y != 0.0 {
            Vec2::new(x, y) * DIAGONAL_FACTOR
        } else {
            Vec2::new(x, y)
        }
    }
}

/// Input from the host, one tag per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerIntent {
    /// Change movement direction
    Move(Direction),
    /// Fire a basic projectile
    Attack,
    /// Fire the beam skill
    UseSkill,
    /// Raise the shield
    UseShield,
    /// Cast the ultimate
    UseUltimate,
}

/// Player abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Basic projectile
    Attack,
    /// Hit-scan beam
    Beam,
    /// Reflecting shield
    Shield,
    /// Board-clearing strike
    Ultimate,
}

/// Effect of an ability that went off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Spawn a player projectile
    Fire(ProjectileRequest),
    /// Damage the boss instantly
    Beam {
        /// Damage dealt
        damage: u32,
    },
    /// Shield raised
    Shield {
        /// How long it stays up
        duration_ms: f32,
    },
    /// Damage the boss, clear enemy projectiles and award score
    Ultimate {
        /// Damage dealt
        damage: u32,
        /// Flat score award
        score: u64,
    },
}

impl PlayerAction {
    /// Ability that produced this action.
    #[must_use]
    pub const fn ability(&self) -> Ability {
        match self {
            Self::Fire(_) => Ability::Attack,
            Self::Beam { .. } => Ability::Beam,
            Self::Shield { .. } => Ability::Shield,
            Self::Ultimate { .. } => Ability::Ultimate,
        }
    }
}

/// Result of an incoming hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Dead or invincible: nothing happened
    Ignored,
    /// The shield turned the hit into a counter projectile
    Reflected(ProjectileRequest),
    /// Health was removed
    Damaged {
        /// Health removed
        amount: u32,
        /// This hit was fatal
        killed: bool,
    },
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    vitals: Vitals,
    position: Vec2,
    heading: Direction,
    attack_cooldown: Cooldown,
    skill_cooldown: Cooldown,
    shield_cooldown: Cooldown,
    shield_timer: Cooldown,
    hit_invincibility: Cooldown,
    ultimate_gauge: f32,
    tuning: PlayerTuning,
    arena: ArenaBounds,
    radius: f32,
    bullet_damage: u32,
}

impl Player {
    /// Creates a player at the spawn point with full health and ready abilities.
    #[must_use]
    pub fn new(config: &CombatConfig) -> Self {
        Self {
            vitals: Vitals::new(config.player.max_health),
            position: config.arena.player_spawn(),
            heading: Direction::None,
            attack_cooldown: Cooldown::ready(),
            skill_cooldown: Cooldown::ready(),
            shield_cooldown: Cooldown::ready(),
            shield_timer: Cooldown::ready(),
            hit_invincibility: Cooldown::ready(),
            ultimate_gauge: 0.0,
            tuning: config.player.clone(),
            arena: config.arena.bounds,
            radius: config.arena.player_radius,
            bullet_damage: config.damage.player_bullet,
        }
    }

    /// Advances cooldowns, shield and invincibility windows, and movement.
    pub fn update(&mut self, delta_ms: f32) {
        if self.vitals.is_dead() {
            return;
        }

        self.attack_cooldown.tick(delta_ms);
        self.skill_cooldown.tick(delta_ms);
        self.shield_cooldown.tick(delta_ms);
        self.shield_timer.tick(delta_ms);
        self.hit_invincibility.tick(delta_ms);

        let step = self.heading.vector() * self.tuning.move_speed * (delta_ms.max(0.0) / 1000.0);
        self.position = self.arena.clamp(self.position + step, self.radius);
    }

    /// Sets the movement direction until changed.
    pub fn steer(&mut self, direction: Direction) {
        self.heading = direction;
    }

    /// Fires a basic projectile if the attack is ready.
    pub fn request_attack(&mut self) -> Option<PlayerAction> {
        if self.vitals.is_dead() || !self.attack_cooldown.is_ready() {
            return None;
        }

        self.attack_cooldown.reset(self.tuning.attack_cooldown_ms);
        self.add_gauge(self.tuning.gauge_per_attack);
        Some(PlayerAction::Fire(self.forward_projectile(self.tuning.bullet_speed)))
    }

    /// Fires the beam if the skill is ready.
    pub fn request_beam(&mut self) -> Option<PlayerAction> {
        if self.vitals.is_dead() || !self.skill_cooldown.is_ready() {
            return None;
        }

        self.skill_cooldown.reset(self.tuning.skill_cooldown_ms);
        self.add_gauge(self.tuning.gauge_per_skill);
        debug!("Beam fired");
        Some(PlayerAction::Beam {
            damage: self.tuning.beam_damage,
        })
    }

    /// Raises the shield if it is ready.
    pub fn request_shield(&mut self) -> Option<PlayerAction> {
        if self.vitals.is_dead() || !self.shield_cooldown.is_ready() {
            return None;
        }

        self.shield_cooldown.reset(self.tuning.shield_cooldown_ms);
        self.shield_timer.reset(self.tuning.shield_duration_ms);
        debug!("Shield raised for {}ms", self.tuning.shield_duration_ms);
        Some(PlayerAction::Shield {
            duration_ms: self.tuning.shield_duration_ms,
        })
    }

    /// Casts the ultimate if the gauge is full.
    pub fn request_ultimate(&mut self) -> Option<PlayerAction> {
        if self.vitals.is_dead() || self.ultimate_gauge < GAUGE_MAX {
            return None;
        }

        self.ultimate_gauge = 0.0;
        debug!("Ultimate cast");
        Some(PlayerAction::Ultimate {
            damage: self.tuning.ultimate_damage,
            score: self.tuning.ultimate_score,
        })
    }

    /// Applies an incoming hit.
    ///
    /// The shield is checked before invincibility, so a shielded hit always
    /// reflects and never costs health.
    pub fn take_damage(&mut self, amount: u32) -> HitOutcome {
        if self.vitals.is_dead() {
            return HitOutcome::Ignored;
        }
        if self.is_shielded() {
            return HitOutcome::Reflected(self.forward_projectile(self.tuning.reflect_speed));
        }
        if self.is_invincible() {
            return HitOutcome::Ignored;
        }

        let outcome = self.vitals.take_damage(amount);
        self.hit_invincibility.reset(self.tuning.hit_invincibility_ms);
        self.add_gauge(self.tuning.gauge_per_hit_taken);
        if outcome.killed {
            debug!("Player killed");
        }

        HitOutcome::Damaged {
            amount: outcome.applied,
            killed: outcome.killed,
        }
    }

    fn forward_projectile(&self, speed: f32) -> ProjectileRequest {
        ProjectileRequest::new(
            Faction::Player,
            self.position + Vec2::new(self.tuning.muzzle_offset, 0.0),
            Vec2::new(speed, 0.0),
            self.tuning.bullet_lifetime_ms,
            self.bullet_damage,
        )
    }

    fn add_gauge(&mut self, amount: f32) {
        self.ultimate_gauge = (self.ultimate_gauge + amount).min(GAUGE_MAX);
        debug_assert!((0.0..=GAUGE_MAX).contains(&self.ultimate_gauge));
    }

    /// Health pool.
    #[must_use]
    pub const fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.vitals.health()
    }

    /// Check if dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.vitals.is_dead()
    }

    /// True while the shield is up.
    #[must_use]
    pub fn is_shielded(&self) -> bool {
        !self.shield_timer.is_ready()
    }

    /// True while the shield or the post-hit window blocks damage.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.is_shielded() || !self.hit_invincibility.is_ready()
    }

    /// Ultimate gauge, 0 to 100.
    #[must_use]
    pub const fn ultimate_gauge(&self) -> f32 {
        self.ultimate_gauge
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Hit radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Remaining attack cooldown.
    #[must_use]
    pub const fn attack_cooldown_ms(&self) -> f32 {
        self.attack_cooldown.remaining_ms()
    }

    /// Remaining skill cooldown.
    #[must_use]
    pub const fn skill_cooldown_ms(&self) -> f32 {
        self.skill_cooldown.remaining_ms()
    }

    /// Remaining shield cooldown.
    #[must_use]
    pub const fn shield_cooldown_ms(&self) -> f32 {
        self.shield_cooldown.remaining_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&CombatConfig::default())
    }

    #[test]
    fn test_attack_is_cooldown_gated() {
        let mut p = player();
        assert!(p.request_attack().is_some());
        p.update(0.0);
        assert!(p.request_attack().is_none());
        p.update(199.0);
        assert!(p.request_attack().is_none());
        p.update(1.0);
        assert!(p.request_attack().is_some());
    }

    #[test]
    fn test_attack_projectile_parameters() {
        let mut p = player();
        let Some(PlayerAction::Fire(shot)) = p.request_attack() else {
            panic!("attack should fire");
        };
        assert_eq!(shot.faction, Faction::Player);
        assert_eq!(shot.velocity, Vec2::new(600.0, 0.0));
        assert_eq!(shot.lifetime_ms, 2000.0);
        assert_eq!(shot.position, p.position() + Vec2::new(40.0, 0.0));
        assert_eq!(p.ultimate_gauge(), 2.0);
    }

    #[test]
    fn test_each_ability_has_its_own_cooldown() {
        let mut p = player();
        assert!(p.request_attack().is_some());
        assert_eq!(p.request_beam(), Some(PlayerAction::Beam { damage: 25 }));
        assert!(p.request_shield().is_some());
        assert!(p.request_beam().is_none());
        assert!(p.request_shield().is_none());

        assert_eq!(p.attack_cooldown_ms(), 200.0);
        assert_eq!(p.skill_cooldown_ms(), 3000.0);
        assert_eq!(p.shield_cooldown_ms(), 8000.0);
        assert_eq!(p.ultimate_gauge(), 12.0);
    }

    #[test]
    fn test_ultimate_requires_full_gauge() {
        let mut p = player();
        assert!(p.request_ultimate().is_none());

        for _ in 0..50 {
            p.request_attack();
            p.update(200.0);
        }
        assert_eq!(p.ultimate_gauge(), 100.0);
        assert_eq!(
            p.request_ultimate(),
            Some(PlayerAction::Ultimate { damage: 50, score: 500 })
        );
        assert_eq!(p.ultimate_gauge(), 0.0);
        assert!(p.request_ultimate().is_none());
    }

    #[test]
    fn test_gauge_clamps_at_max() {
        let mut p = player();
        for _ in 0..60 {
            p.request_attack();
            p.update(200.0);
        }
        assert_eq!(p.ultimate_gauge(), 100.0);
    }

    #[test]
    fn test_hit_grants_invincibility_and_gauge() {
        let mut p = player();
        assert_eq!(p.take_damage(10), HitOutcome::Damaged { amount: 10, killed: false });
        assert_eq!(p.health(), 90);
        assert_eq!(p.ultimate_gauge(), 5.0);
        assert!(p.is_invincible());

        assert_eq!(p.take_damage(10), HitOutcome::Ignored);
        p.update(499.0);
        assert_eq!(p.take_damage(10), HitOutcome::Ignored);
        p.update(1.0);
        assert!(matches!(p.take_damage(10), HitOutcome::Damaged { .. }));
        assert_eq!(p.health(), 80);
    }

    #[test]
    fn test_shield_reflects_instead_of_damaging() {
        let mut p = player();
        p.request_shield();

        let outcome = p.take_damage(1000);
        let HitOutcome::Reflected(reflect) = outcome else {
            panic!("shield should reflect, got {outcome:?}");
        };
        assert_eq!(reflect.velocity, Vec2::new(800.0, 0.0));
        assert_eq!(reflect.faction, Faction::Player);
        assert_eq!(p.health(), 100);
        assert_eq!(p.ultimate_gauge(), 0.0);
    }

    #[test]
    fn test_shield_expires() {
        let mut p = player();
        p.request_shield();
        p.update(1999.0);
        assert!(p.is_shielded());
        p.update(1.0);
        assert!(!p.is_shielded());
        assert!(!p.is_invincible());
        assert!(matches!(p.take_damage(5), HitOutcome::Damaged { amount: 5, .. }));
    }

    #[test]
    fn test_death_is_final() {
        let mut p = player();
        assert_eq!(p.take_damage(250), HitOutcome::Damaged { amount: 100, killed: true });
        assert!(p.is_dead());
        assert_eq!(p.take_damage(10), HitOutcome::Ignored);
        assert!(p.request_attack().is_none());
        assert!(p.request_shield().is_none());
    }

    #[test]
    fn test_movement_clamped_to_arena() {
        let mut p = player();
        p.steer(Direction::Left);
        p.update(10_000.0);
        assert_eq!(p.position().x, 20.0);

        p.steer(Direction::DownRight);
        let before = p.position();
        p.update(100.0);
        let moved = p.position() - before;
        assert!((moved.x - 300.0 * 0.707 * 0.1).abs() < 1e-3);
        assert!((moved.y - moved.x).abs() < 1e-3);
    }
}
