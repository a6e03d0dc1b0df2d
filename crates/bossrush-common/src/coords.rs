//! Arena coordinates and targeting geometry.
//!
//! The arena is a fixed logical rectangle with the origin in the top-left
//! corner and `y` growing downwards. Angles are radians measured from the
//! positive `x` axis.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical arena width in units.
pub const ARENA_WIDTH: f32 = 1280.0;

/// Logical arena height in units.
pub const ARENA_HEIGHT: f32 = 720.0;

/// Rectangular play area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Width in units
    pub width: f32,
    /// Height in units
    pub height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self::new(ARENA_WIDTH, ARENA_HEIGHT)
    }
}

impl ArenaBounds {
    /// Creates arena bounds.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center point of the arena.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamps a point so a body of `radius` stays fully inside the arena.
    #[must_use]
    pub fn clamp(&self, point: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            point.x.clamp(radius, (self.width - radius).max(radius)),
            point.y.clamp(radius, (self.height - radius).max(radius)),
        )
    }

    /// Checks if a point lies inside the arena (edges included).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Checks if a point is further than `margin` outside the arena.
    #[must_use]
    pub fn is_far_outside(&self, point: Vec2, margin: f32) -> bool {
        point.x < -margin
            || point.y < -margin
            || point.x > self.width + margin
            || point.y > self.height + margin
    }
}

/// Angle of the line from `from` to `to`.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Velocity of magnitude `speed` along `angle`.
#[must_use]
pub fn velocity_at(angle: f32, speed: f32) -> Vec2 {
    Vec2::from_angle(angle) * speed
}

/// Checks if two circles overlap.
#[must_use]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    a.distance_squared(b) < reach * reach
}
