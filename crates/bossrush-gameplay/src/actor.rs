//! Health model shared by the player and bosses.

use serde::{Deserialize, Serialize};

/// Health pool of a combat actor.
///
/// `health` stays within `0..=max_health` and `dead` only ever flips from
/// false to true. A dead actor is inert until it is recreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    health: u32,
    max_health: u32,
    dead: bool,
}

/// Result of applying damage to [`Vitals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed.
    pub applied: u32,
    /// True if this hit brought health to zero.
    pub killed: bool,
}

impl DamageOutcome {
    /// Outcome of a hit that changed nothing.
    pub const NONE: Self = Self {
        applied: 0,
        killed: false,
    };
}

impl Vitals {
    /// Create a full health pool.
    #[must_use]
    pub fn new(max_health: u32) -> Self {
        debug_assert!(max_health > 0, "max health must be positive");
        let max_health = max_health.max(1);
        Self {
            health: max_health,
            max_health,
            dead: false,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Check if dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Get health as a ratio (0.0-1.0).
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }

    /// Remove health, flooring at zero. No-op once dead.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::NONE;
        }

        let applied = amount.min(self.health);
        self.health -= applied;
        let killed = self.health == 0;
        if killed {
            self.dead = true;
        }

        debug_assert!(self.health <= self.max_health);
        DamageOutcome { applied, killed }
    }
}
