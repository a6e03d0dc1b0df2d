//! Targeting primitives boss patterns are built from.
//!
//! An [`Attack`] is plain data. Resolving it against the current positions
//! produces [`Effect`]s: projectiles to spawn, boss movement, or telegraphed
//! hazards that land after a warning delay.

use bossrush_common::{angle_between, velocity_at, ArenaBounds};
use fastrand::Rng;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::projectile::{Faction, ProjectileRequest};

/// One coordinate of an arena-relative point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Span {
    /// Offset from the low edge
    Near(f32),
    /// Offset from the high edge
    Far(f32),
    /// Uniform in `[low, extent - high_inset]`
    Random {
        /// Distance from the low edge
        low: f32,
        /// Distance from the high edge
        high_inset: f32,
    },
}

impl Span {
    fn resolve(self, extent: f32, rng: &mut Rng) -> f32 {
        match self {
            Self::Near(v) => v,
            Self::Far(v) => extent - v,
            Self::Random { low, high_inset } => {
                let high = (extent - high_inset).max(low);
                low + rng.f32() * (high - low)
            },
        }
    }
}

/// Where an attack originates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// The boss's position when the attack fires
    Boss,
    /// Offset from where the boss stood when the pattern started
    CastOffset(Vec2),
    /// A point relative to the arena edges
    Arena {
        /// Horizontal coordinate
        x: Span,
        /// Vertical coordinate
        y: Span,
    },
}

impl Placement {
    /// Arena point `(x, y)` measured from the top-left corner.
    #[must_use]
    pub const fn near(x: f32, y: f32) -> Self {
        Self::Arena {
            x: Span::Near(x),
            y: Span::Near(y),
        }
    }

    /// Random arena point keeping `inset` away from every edge.
    #[must_use]
    pub const fn random_inset(inset: f32) -> Self {
        Self::Arena {
            x: Span::Random {
                low: inset,
                high_inset: inset,
            },
            y: Span::Random {
                low: inset,
                high_inset: inset,
            },
        }
    }

    fn resolve(self, ctx: &TargetingContext, rng: &mut Rng) -> Vec2 {
        match self {
            Self::Boss => ctx.boss,
            Self::CastOffset(offset) => ctx.cast_origin + offset,
            Self::Arena { x, y } => Vec2::new(
                x.resolve(ctx.arena.width, rng),
                y.resolve(ctx.arena.height, rng),
            ),
        }
    }
}

/// Direction a fan is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Aim {
    /// Towards the player
    AtPlayer,
    /// A fixed angle in radians
    Angle(f32),
}

/// Destination of a dash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DashTarget {
    /// The player's position plus an offset
    Player(Vec2),
    /// The boss's spawn point
    Home,
    /// The arena centre
    Center,
}

/// Telegraphed line attacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineShape {
    /// Horizontal ray from the boss towards the left edge
    BossRayLeft,
    /// Horizontal line at the player's height plus an offset
    PlayerRow(f32),
    /// Vertical line at the player's column
    PlayerColumn,
}

/// A reusable boss attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Attack {
    /// One shot at the player with optional random spread
    AimedShot {
        /// Muzzle position
        from: Placement,
        /// Speed in units per second
        speed: f32,
        /// Maximum angular deviation in radians
        spread: f32,
    },
    /// Evenly spaced shots centred on an aim direction
    Fan {
        /// Muzzle position
        from: Placement,
        /// Centre direction
        aim: Aim,
        /// Number of shots
        count: u32,
        /// Angle between neighbouring shots
        step: f32,
        /// Speed in units per second
        speed: f32,
    },
    /// Shots evenly spread over a full circle
    Radial {
        /// Muzzle position
        from: Placement,
        /// Number of shots
        count: u32,
        /// Speed in units per second
        speed: f32,
        /// Rotation of the first shot
        angle_offset: f32,
    },
    /// One shot in a random direction at a random speed near the boss
    Scatter {
        /// Maximum muzzle offset on each axis
        jitter: f32,
        /// Lowest speed
        speed_min: f32,
        /// Highest speed
        speed_max: f32,
        /// Lifetime in milliseconds
        lifetime_ms: f32,
    },
    /// Missile that steers towards the player
    Homing {
        /// Muzzle offset from the boss
        offset: Vec2,
        /// Speed in units per second
        speed: f32,
        /// Lifetime in milliseconds
        lifetime_ms: f32,
        /// Base damage
        damage: u32,
    },
    /// Move the boss over time
    Dash {
        /// Destination
        target: DashTarget,
        /// Travel time
        travel_ms: f32,
    },
    /// Move the boss instantly next to the player
    Teleport {
        /// Horizontal distance from the player, side chosen at random
        side_offset: f32,
        /// Maximum vertical deviation from the player
        y_jitter: f32,
    },
    /// Warn about a line, then damage everything on it
    LineStrike {
        /// Which line
        shape: LineShape,
        /// Half thickness of the line
        half_width: f32,
        /// Delay between warning and impact
        warning_ms: f32,
        /// Base damage
        damage: u32,
    },
    /// Warn about a circle, then damage everything inside it
    Blast {
        /// Centre
        at: Placement,
        /// Radius
        radius: f32,
        /// Delay between warning and impact
        warning_ms: f32,
        /// Base damage
        damage: u32,
    },
}

/// An attack scheduled relative to the start of its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedAttack {
    /// Delay from pattern start
    pub delay_ms: f32,
    /// What happens
    pub attack: Attack,
}

impl TimedAttack {
    /// Attack firing `delay_ms` after the pattern starts.
    #[must_use]
    pub const fn at(delay_ms: f32, attack: Attack) -> Self {
        Self { delay_ms, attack }
    }

    /// Attack firing as soon as the pattern starts.
    #[must_use]
    pub const fn now(attack: Attack) -> Self {
        Self::at(0.0, attack)
    }
}

/// Area a telegraphed hazard covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardZone {
    /// Horizontal band, optionally cut off on the right
    Row {
        /// Centre line
        y: f32,
        /// Half thickness
        half_width: f32,
        /// Points at or right of this are safe
        max_x: Option<f32>,
    },
    /// Vertical band
    Column {
        /// Centre line
        x: f32,
        /// Half thickness
        half_width: f32,
    },
    /// Disc
    Circle {
        /// Centre
        center: Vec2,
        /// Radius
        radius: f32,
    },
}

impl HazardZone {
    /// Checks if a point is inside the zone.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match *self {
            Self::Row { y, half_width, max_x } => {
                (point.y - y).abs() < half_width && max_x.map_or(true, |mx| point.x < mx)
            },
            Self::Column { x, half_width } => (point.x - x).abs() < half_width,
            Self::Circle { center, radius } => point.distance_squared(center) < radius * radius,
        }
    }
}

/// Damage waiting to land on a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    /// Covered area
    pub zone: HazardZone,
    /// Base damage
    pub damage: u32,
}

/// Outcome of resolving an attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Spawn a projectile
    Spawn(ProjectileRequest),
    /// Start moving the boss
    MoveBoss {
        /// Destination
        to: Vec2,
        /// Travel time
        travel_ms: f32,
    },
    /// Place the boss instantly
    PlaceBoss(Vec2),
    /// A hazard that lands after `delay_ms`
    Telegraph {
        /// Warning time
        delay_ms: f32,
        /// What lands
        hazard: Hazard,
    },
}

/// Positions and defaults an attack is resolved against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetingContext {
    /// Boss position now
    pub boss: Vec2,
    /// Boss position when the pattern started
    pub cast_origin: Vec2,
    /// Boss spawn point
    pub home: Vec2,
    /// Player position now
    pub player: Vec2,
    /// Arena bounds
    pub arena: ArenaBounds,
    /// Damage of a regular boss projectile
    pub bullet_damage: u32,
    /// Lifetime of a regular boss projectile
    pub bullet_lifetime_ms: f32,
}

impl TargetingContext {
    fn bullet(&self, from: Vec2, angle: f32, speed: f32) -> Effect {
        Effect::Spawn(ProjectileRequest::new(
            Faction::Boss,
            from,
            velocity_at(angle, speed),
            self.bullet_lifetime_ms,
            self.bullet_damage,
        ))
    }
}

fn uniform(rng: &mut Rng, low: f32, high: f32) -> f32 {
    low + rng.f32() * (high - low)
}

impl Attack {
    /// Resolves the attack into concrete effects.
    pub fn resolve(&self, ctx: &TargetingContext, rng: &mut Rng) -> Vec<Effect> {
        match *self {
            Self::AimedShot { from, speed, spread } => {
                let origin = from.resolve(ctx, rng);
                let deviation = if spread > 0.0 {
                    uniform(rng, -spread, spread)
                } else {
                    0.0
                };
                vec![ctx.bullet(origin, angle_between(origin, ctx.player) + deviation, speed)]
            },
            Self::Fan {
                from,
                aim,
                count,
                step,
                speed,
            } => {
                let origin = from.resolve(ctx, rng);
                let center = match aim {
                    Aim::AtPlayer => angle_between(origin, ctx.player),
                    Aim::Angle(angle) => angle,
                };
                let half = (count.saturating_sub(1)) as f32 / 2.0;
                (0..count)
                    .map(|i| ctx.bullet(origin, center + (i as f32 - half) * step, speed))
                    .collect()
            },
            Self::Radial {
                from,
                count,
                speed,
                angle_offset,
            } => {
                let origin = from.resolve(ctx, rng);
                let step = TAU / count.max(1) as f32;
                (0..count)
                    .map(|i| ctx.bullet(origin, angle_offset + step * i as f32, speed))
                    .collect()
            },
            Self::Scatter {
                jitter,
                speed_min,
                speed_max,
                lifetime_ms,
            } => {
                let angle = uniform(rng, 0.0, TAU);
                let speed = uniform(rng, speed_min, speed_max);
                let origin = ctx.boss
                    + Vec2::new(uniform(rng, -jitter, jitter), uniform(rng, -jitter, jitter));
                vec![Effect::Spawn(ProjectileRequest::new(
                    Faction::Boss,
                    origin,
                    velocity_at(angle, speed),
                    lifetime_ms,
                    ctx.bullet_damage,
                ))]
            },
            Self::Homing {
                offset,
                speed,
                lifetime_ms,
                damage,
            } => {
                let origin = ctx.boss + offset;
                let request = ProjectileRequest::new(
                    Faction::Boss,
                    origin,
                    velocity_at(angle_between(origin, ctx.player), speed),
                    lifetime_ms,
                    damage,
                )
                .with_homing(speed);
                vec![Effect::Spawn(request)]
            },
            Self::Dash { target, travel_ms } => {
                let to = match target {
                    DashTarget::Player(offset) => ctx.player + offset,
                    DashTarget::Home => ctx.home,
                    DashTarget::Center => ctx.arena.center(),
                };
                vec![Effect::MoveBoss { to, travel_ms }]
            },
            Self::Teleport { side_offset, y_jitter } => {
                let side = if rng.bool() { -side_offset } else { side_offset };
                let to = ctx.player + Vec2::new(side, uniform(rng, -y_jitter, y_jitter));
                vec![Effect::PlaceBoss(to)]
            },
            Self::LineStrike {
                shape,
                half_width,
                warning_ms,
                damage,
            } => {
                let zone = match shape {
                    LineShape::BossRayLeft => HazardZone::Row {
                        y: ctx.boss.y,
                        half_width,
                        max_x: Some(ctx.boss.x),
                    },
                    LineShape::PlayerRow(offset) => HazardZone::Row {
                        y: ctx.player.y + offset,
                        half_width,
                        max_x: None,
                    },
                    LineShape::PlayerColumn => HazardZone::Column {
                        x: ctx.player.x,
                        half_width,
                    },
                };
                vec![Effect::Telegraph {
                    delay_ms: warning_ms,
                    hazard: Hazard { zone, damage },
                }]
            },
            Self::Blast {
                at,
                radius,
                warning_ms,
                damage,
            } => {
                let center = at.resolve(ctx, rng);
                vec![Effect::Telegraph {
                    delay_ms: warning_ms,
                    hazard: Hazard {
                        zone: HazardZone::Circle { center, radius },
                        damage,
                    },
                }]
            },
        }
    }
}
