//! Projectiles in flight.
//!
//! The field owns every live projectile of a stage. Projectiles move in
//! straight lines unless they home, expire after their lifetime, and are
//! dropped once they leave the arena by a wide margin.

use bossrush_common::{angle_between, circles_overlap, velocity_at, ArenaBounds, IdAllocator, ProjectileId};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Distance outside the arena after which projectiles are discarded.
pub const OFFSCREEN_MARGIN: f32 = 100.0;

/// Side that fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Fired by the player, hurts the boss
    Player,
    /// Fired by the boss, hurts the player
    Boss,
}

/// Description of a projectile to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRequest {
    /// Who fired it
    pub faction: Faction,
    /// Spawn position
    pub position: Vec2,
    /// Initial velocity in units per second
    pub velocity: Vec2,
    /// Lifetime in milliseconds
    pub lifetime_ms: f32,
    /// Damage before difficulty scaling
    pub damage: u32,
    /// Re-aims at the player every tick at this speed
    pub homing_speed: Option<f32>,
}

impl ProjectileRequest {
    /// Straight-flying projectile.
    #[must_use]
    pub fn new(faction: Faction, position: Vec2, velocity: Vec2, lifetime_ms: f32, damage: u32) -> Self {
        Self {
            faction,
            position,
            velocity,
            lifetime_ms,
            damage,
            homing_speed: None,
        }
    }

    /// Makes the projectile home in on the player.
    #[must_use]
    pub fn with_homing(mut self, speed: f32) -> Self {
        self.homing_speed = Some(speed);
        self
    }
}

/// A live projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Stage-scoped ID
    pub id: ProjectileId,
    /// Who fired it
    pub faction: Faction,
    /// Current position
    pub position: Vec2,
    /// Velocity in units per second
    pub velocity: Vec2,
    /// Time left before it expires
    pub remaining_ms: f32,
    /// Damage before difficulty scaling
    pub damage: u32,
    /// Homing speed, if it homes
    pub homing_speed: Option<f32>,
}

/// All projectiles of a stage.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProjectileField {
    live: Vec<Projectile>,
    ids: IdAllocator,
}

impl ProjectileField {
    /// Creates an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a projectile and returns its ID.
    pub fn spawn(&mut self, request: ProjectileRequest) -> ProjectileId {
        let id = ProjectileId::from_raw(self.ids.next());
        self.live.push(Projectile {
            id,
            faction: request.faction,
            position: request.position,
            velocity: request.velocity,
            remaining_ms: request.lifetime_ms,
            damage: request.damage,
            homing_speed: request.homing_speed,
        });
        id
    }

    /// Moves every projectile and drops expired or far off-screen ones.
    pub fn tick(&mut self, delta_ms: f32, player_position: Vec2, arena: &ArenaBounds) {
        let dt = delta_ms.max(0.0) / 1000.0;
        for p in &mut self.live {
            if let Some(speed) = p.homing_speed {
                p.velocity = velocity_at(angle_between(p.position, player_position), speed);
            }
            p.position += p.velocity * dt;
            p.remaining_ms -= delta_ms.max(0.0);
        }
        self.live
            .retain(|p| p.remaining_ms > 0.0 && !arena.is_far_outside(p.position, OFFSCREEN_MARGIN));
    }

    /// Removes every projectile of `faction`, returning how many were removed.
    pub fn clear_faction(&mut self, faction: Faction) -> usize {
        let before = self.live.len();
        self.live.retain(|p| p.faction != faction);
        before - self.live.len()
    }

    /// Removes all projectiles.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Removes and returns projectiles of `faction` overlapping the given circle.
    pub fn take_hits(&mut self, faction: Faction, center: Vec2, radius: f32, projectile_radius: f32) -> Vec<Projectile> {
        let mut hits = Vec::new();
        self.live.retain(|p| {
            let hit = p.faction == faction
                && circles_overlap(p.position, projectile_radius, center, radius);
            if hit {
                hits.push(p.clone());
            }
            !hit
        });
        hits
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True if no projectile is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of live projectiles of one faction.
    #[must_use]
    pub fn count(&self, faction: Faction) -> usize {
        self.live.iter().filter(|p| p.faction == faction).count()
    }

    /// Iterates live projectiles.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.iter()
    }
}
