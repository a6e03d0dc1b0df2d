//! The five bosses of a run, in stage order.
//!
//! Each boss is a [`BossProfile`] built from the shared attack primitives.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::attack::{Aim, Attack, DashTarget, LineShape, Placement, Span, TimedAttack};
use crate::boss::{BossProfile, IdleMotion, Pattern, PhaseRule};

/// Boss identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    /// Stage 1
    Gpt4o,
    /// Stage 2
    Gemini2,
    /// Stage 3
    Gpt5,
    /// Stage 4
    Gemini3,
    /// Stage 5
    Final,
}

impl BossKind {
    /// All bosses in stage order.
    pub const ALL: [Self; 5] = [Self::Gpt4o, Self::Gemini2, Self::Gpt5, Self::Gemini3, Self::Final];

    /// Boss fought on `stage` (1-based).
    #[must_use]
    pub fn for_stage(stage: u8) -> Option<Self> {
        Self::ALL.get(usize::from(stage).checked_sub(1)?).copied()
    }

    /// Stage this boss is fought on.
    #[must_use]
    pub const fn stage(self) -> u8 {
        match self {
            Self::Gpt4o => 1,
            Self::Gemini2 => 2,
            Self::Gpt5 => 3,
            Self::Gemini3 => 4,
            Self::Final => 5,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gpt4o => "GPT-4o",
            Self::Gemini2 => "Gemini 2.0",
            Self::Gpt5 => "GPT-5",
            Self::Gemini3 => "Gemini 3 Pro",
            Self::Final => "???",
        }
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(self) -> u32 {
        match self {
            Self::Gpt4o => 200,
            Self::Gemini2 => 350,
            Self::Gpt5 => 500,
            Self::Gemini3 => 700,
            Self::Final => 1000,
        }
    }
}

/// Builds the profile of `kind`.
#[must_use]
pub fn profile(kind: BossKind) -> BossProfile {
    let (idle, patterns, phases) = match kind {
        BossKind::Gpt4o => gpt4o(),
        BossKind::Gemini2 => gemini2(),
        BossKind::Gpt5 => gpt5(),
        BossKind::Gemini3 => gemini3(),
        BossKind::Final => final_boss(),
    };
    BossProfile {
        kind,
        name: kind.name().to_string(),
        max_health: kind.max_health(),
        idle,
        patterns,
        phases,
    }
}

type Table = (IdleMotion, Vec<Pattern>, Vec<PhaseRule>);

// ============================================================================
// Shared shapes
// ============================================================================

fn aimed(from: Placement, speed: f32, spread: f32) -> Attack {
    Attack::AimedShot { from, speed, spread }
}

fn radial(count: u32, speed: f32, angle_offset: f32) -> Attack {
    Attack::Radial {
        from: Placement::Boss,
        count,
        speed,
        angle_offset,
    }
}

fn fan_at_player(from: Placement, count: u32, step: f32, speed: f32) -> Attack {
    Attack::Fan {
        from,
        aim: Aim::AtPlayer,
        count,
        step,
        speed,
    }
}

fn dash(target: DashTarget, travel_ms: f32) -> Attack {
    Attack::Dash { target, travel_ms }
}

/// Points evenly spaced on a circle around the cast position.
fn ring(count: u32, radius: f32, offset: f32) -> impl Iterator<Item = Placement> {
    (0..count).map(move |i| {
        let angle = TAU * i as f32 / count as f32 + offset;
        Placement::CastOffset(Vec2::new(angle.cos(), angle.sin()) * radius)
    })
}

/// `count` repeats spaced `interval_ms` apart, the first one interval in.
fn repeating(count: u32, interval_ms: f32, attack: impl Fn(u32) -> Attack) -> Vec<TimedAttack> {
    (1..=count)
        .map(|k| TimedAttack::at(k as f32 * interval_ms, attack(k)))
        .collect()
}

// ============================================================================
// Stage 1: GPT-4o
// ============================================================================

fn gpt4o() -> Table {
    let rush = Pattern::new("Rush", 1000.0, 2500.0).with_steps(vec![
        TimedAttack::at(500.0, dash(DashTarget::Player(Vec2::new(100.0, 0.0)), 400.0)),
        TimedAttack::at(900.0, dash(DashTarget::Home, 800.0)),
    ]);
    let triple_punch = Pattern::new("Triple Punch", 1500.0, 3000.0).with_steps(
        (0..3)
            .map(|i| TimedAttack::at(i as f32 * 300.0, aimed(Placement::Boss, 500.0, 0.0)))
            .collect(),
    );
    let quick_shot = Pattern::new("Quick Shot", 500.0, 2000.0)
        .with_steps(vec![TimedAttack::now(aimed(Placement::Boss, 600.0, 0.0))]);

    let idle = IdleMotion::Bob {
        amplitude: 100.0,
        period_ms: 1000.0,
    };
    (idle, vec![rush, triple_punch, quick_shot], Vec::new())
}

// ============================================================================
// Stage 2: Gemini 2.0
// ============================================================================

fn gemini2() -> Table {
    let teleport_strike = Pattern::new("Teleport Strike", 1000.0, 3000.0).with_steps(vec![
        TimedAttack::at(
            200.0,
            Attack::Teleport {
                side_offset: 150.0,
                y_jitter: 100.0,
            },
        ),
        TimedAttack::at(400.0, radial(8, 350.0, 0.0)),
    ]);
    let star_summon = Pattern::new("Star Summon", 2000.0, 4000.0).with_steps(
        ring(5, 60.0, -FRAC_PI_2)
            .map(|at| TimedAttack::at(500.0, aimed(at, 400.0, 0.0)))
            .collect(),
    );
    let galaxy_spin = Pattern::new("Galaxy Spin", 3000.0, 5000.0)
        .with_steps(repeating(11, 200.0, |k| radial(3, 300.0, k as f32 * 0.4 * PI)));

    (IdleMotion::Hover, vec![teleport_strike, star_summon, galaxy_spin], Vec::new())
}

// ============================================================================
// Stage 3: GPT-5
// ============================================================================

fn gpt5() -> Table {
    let laser_beam = Pattern::new("Laser Beam", 2000.0, 4000.0).with_steps(vec![TimedAttack::now(
        Attack::LineStrike {
            shape: LineShape::BossRayLeft,
            half_width: 30.0,
            warning_ms: 1000.0,
            damage: 20,
        },
    )]);
    let clone_attack = Pattern::new("Clone Attack", 3000.0, 6000.0).with_steps(
        [Vec2::new(-100.0, -150.0), Vec2::new(-100.0, 150.0), Vec2::new(50.0, 0.0)]
            .into_iter()
            .map(|offset| {
                TimedAttack::at(1000.0, fan_at_player(Placement::CastOffset(offset), 3, 0.2, 400.0))
            })
            .collect(),
    );
    let bomb_site = Placement::Arena {
        x: Span::Random {
            low: 100.0,
            high_inset: 200.0,
        },
        y: Span::Far(50.0),
    };
    let ai_barrage = Pattern::new("AI Barrage", 2500.0, 5000.0).with_steps(
        (0..8)
            .map(|i| {
                TimedAttack::at(
                    i as f32 * 200.0,
                    Attack::Blast {
                        at: bomb_site,
                        radius: 80.0,
                        warning_ms: 1200.0,
                        damage: 15,
                    },
                )
            })
            .collect(),
    );

    (
        IdleMotion::Track { rate: 0.01 },
        vec![laser_beam, clone_attack, ai_barrage],
        Vec::new(),
    )
}

// ============================================================================
// Stage 4: Gemini 3 Pro
// ============================================================================

fn galaxy_burst_waves(waves: u32, per_wave: u32) -> Vec<TimedAttack> {
    (0..waves)
        .map(|w| {
            let w = w as f32;
            TimedAttack::at(w * 400.0, radial(per_wave, 250.0 + 50.0 * w, w * PI / 6.0))
        })
        .collect()
}

fn gemini3() -> Table {
    let multimodal = Pattern::new("Multimodal Attack", 2500.0, 4000.0).with_steps(vec![
        TimedAttack::at(
            300.0,
            Attack::Homing {
                offset: Vec2::new(-20.0, 0.0),
                speed: 160.0,
                lifetime_ms: 2500.0,
                damage: 15,
            },
        ),
        TimedAttack::at(
            600.0,
            Attack::Fan {
                from: Placement::Boss,
                aim: Aim::Angle(PI),
                count: 5,
                step: 0.3,
                speed: 350.0,
            },
        ),
    ]);

    let corners = [
        Placement::near(200.0, 200.0),
        Placement::Arena {
            x: Span::Far(200.0),
            y: Span::Near(200.0),
        },
        Placement::Arena {
            x: Span::Near(200.0),
            y: Span::Far(200.0),
        },
        Placement::Arena {
            x: Span::Far(200.0),
            y: Span::Far(200.0),
        },
    ];
    let dimension_warp = Pattern::new("Dimension Warp", 3000.0, 5000.0).with_steps(
        corners
            .into_iter()
            .enumerate()
            .map(|(i, at)| TimedAttack::at(i as f32 * 500.0 + 800.0, fan_at_player(at, 3, 0.15, 450.0)))
            .collect(),
    );

    let galaxy_burst = Pattern::new("Galaxy Burst", 2000.0, 3500.0)
        .with_steps(galaxy_burst_waves(2, 8))
        .with_empowered(galaxy_burst_waves(3, 12));

    let chaos_storm = Pattern::new("Chaos Storm", 4000.0, 6000.0).with_steps(repeating(31, 100.0, |_| {
        Attack::Scatter {
            jitter: 30.0,
            speed_min: 200.0,
            speed_max: 400.0,
            lifetime_ms: 4000.0,
        }
    }));

    let awakening = PhaseRule::new(0.5, 2, 1500.0)
        .invulnerable()
        .with_entry(vec![
            TimedAttack::now(dash(DashTarget::Center, 1000.0)),
            TimedAttack::at(1000.0, radial(16, 200.0, 0.0)),
            TimedAttack::at(1500.0, dash(DashTarget::Home, 800.0)),
        ])
        .adds(chaos_storm);

    (
        IdleMotion::Hover,
        vec![multimodal, dimension_warp, galaxy_burst],
        vec![awakening],
    )
}

// ============================================================================
// Stage 5: final boss
// ============================================================================

fn gpt_rush(rushes: u32, burst: u32) -> Vec<TimedAttack> {
    let mut steps = Vec::new();
    for i in 0..rushes {
        let start = 400.0 + i as f32 * 600.0;
        steps.push(TimedAttack::at(start, dash(DashTarget::Player(Vec2::new(100.0, 0.0)), 300.0)));
        steps.push(TimedAttack::at(start + 300.0, radial(burst, 300.0, 0.0)));
    }
    steps.push(TimedAttack::at(
        400.0 + rushes as f32 * 600.0 + 500.0,
        dash(DashTarget::Home, 800.0),
    ));
    steps
}

fn gemini_stars(count: u32) -> Vec<TimedAttack> {
    ring(count, 120.0, 0.0)
        .enumerate()
        .map(|(i, at)| TimedAttack::at(500.0 + i as f32 * 100.0, aimed(at, 450.0, 0.0)))
        .collect()
}

fn titan_laser(shapes: &[LineShape]) -> Vec<TimedAttack> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, &shape)| {
            TimedAttack::at(
                i as f32 * 400.0,
                Attack::LineStrike {
                    shape,
                    half_width: 25.0,
                    warning_ms: 1800.0,
                    damage: 20,
                },
            )
        })
        .collect()
}

fn galaxy_warp(warps: u32, burst: u32) -> Vec<TimedAttack> {
    (0..warps)
        .map(|i| {
            TimedAttack::at(
                i as f32 * 300.0 + 600.0,
                Attack::Radial {
                    from: Placement::random_inset(100.0),
                    count: burst,
                    speed: 350.0,
                    angle_offset: 0.0,
                },
            )
        })
        .collect()
}

fn final_boss() -> Table {
    let rush = Pattern::new("GPT Rush", 1500.0, 3000.0)
        .with_steps(gpt_rush(2, 8))
        .with_empowered(gpt_rush(3, 12));
    let stars = Pattern::new("Gemini Stars", 2000.0, 3500.0)
        .with_steps(gemini_stars(5))
        .with_empowered(gemini_stars(8));
    let laser = Pattern::new("Titan Laser", 2500.0, 4000.0)
        .with_steps(titan_laser(&[LineShape::PlayerRow(0.0), LineShape::PlayerColumn]))
        .with_empowered(titan_laser(&[
            LineShape::PlayerRow(0.0),
            LineShape::PlayerColumn,
            LineShape::PlayerRow(100.0),
            LineShape::PlayerRow(-100.0),
        ]));
    let warp = Pattern::new("Galaxy Warp", 3000.0, 4500.0)
        .with_steps(galaxy_warp(4, 6))
        .with_empowered(galaxy_warp(6, 10));

    let barrage = Pattern::new("Benchmark Barrage", 4000.0, 5000.0)
        .with_steps(repeating(38, 80.0, |_| aimed(Placement::Boss, 500.0, 0.3)));

    let mut apocalypse_steps: Vec<TimedAttack> = (0..20)
        .map(|i| {
            TimedAttack::at(
                1500.0 + i as f32 * 150.0,
                Attack::Blast {
                    at: Placement::random_inset(50.0),
                    radius: 60.0,
                    warning_ms: 400.0,
                    damage: 15,
                },
            )
        })
        .collect();
    apocalypse_steps.push(TimedAttack::at(4500.0, radial(24, 400.0, 0.0)));
    let apocalypse = Pattern::new("Apocalypse", 5000.0, 8000.0).with_steps(apocalypse_steps);

    let awakening = PhaseRule::new(0.6, 2, 1500.0).adds(barrage);
    let final_form = PhaseRule::new(0.3, 3, 1500.0).with_enrage(0.7).adds(apocalypse);

    (
        IdleMotion::Hover,
        vec![rush, stars, laser, warp],
        vec![awakening, final_form],
    )
}
