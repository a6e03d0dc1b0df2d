//! Countdown timer shared by abilities, patterns and the combo window.

use serde::{Deserialize, Serialize};

/// Decrementing countdown in milliseconds.
///
/// A cooldown is ready once its remaining time reaches zero. The counter is
/// clamped and never goes negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    remaining_ms: f32,
}

impl Cooldown {
    /// Creates a cooldown that is already ready.
    #[must_use]
    pub const fn ready() -> Self {
        Self { remaining_ms: 0.0 }
    }

    /// Creates a cooldown with `duration_ms` remaining.
    #[must_use]
    pub fn started(duration_ms: f32) -> Self {
        let mut cooldown = Self::ready();
        cooldown.reset(duration_ms);
        cooldown
    }

    /// Advances the countdown.
    pub fn tick(&mut self, delta_ms: f32) {
        self.remaining_ms = (self.remaining_ms - delta_ms.max(0.0)).max(0.0);
    }

    /// Returns true once the countdown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining_ms <= 0.0
    }

    /// Restarts the countdown.
    pub fn reset(&mut self, duration_ms: f32) {
        self.remaining_ms = duration_ms.max(0.0);
    }

    /// Clears the countdown immediately.
    pub fn clear(&mut self) {
        self.remaining_ms = 0.0;
    }

    /// Time left in milliseconds.
    #[must_use]
    pub const fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }
}
