//! Combat balance configuration.
//!
//! Every tunable number of the simulation lives here, grouped by system.
//! Configuration can be loaded from and saved to a TOML file; missing fields
//! take their defaults.

use bossrush_common::{ArenaBounds, ConfigError};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Complete balance configuration for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seed for pattern randomness (spread, teleport side, bomb positions)
    pub rng_seed: u64,
    /// Arena size and body radii
    pub arena: ArenaTuning,
    /// Player abilities
    pub player: PlayerTuning,
    /// Combo window and multiplier curve
    pub combo: ComboTuning,
    /// Collision damage
    pub damage: DamageTuning,
    /// Stage transition timing
    pub stage: StageTuning,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0x5EED_B055,
            arena: ArenaTuning::default(),
            player: PlayerTuning::default(),
            combo: ComboTuning::default(),
            damage: DamageTuning::default(),
            stage: StageTuning::default(),
        }
    }
}

/// Arena geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Play area
    pub bounds: ArenaBounds,
    /// Player hit radius
    pub player_radius: f32,
    /// Boss body radius
    pub boss_radius: f32,
    /// Projectile hit radius
    pub projectile_radius: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            bounds: ArenaBounds::default(),
            player_radius: 20.0,
            boss_radius: 60.0,
            projectile_radius: 8.0,
        }
    }
}

impl ArenaTuning {
    /// Where the player starts each stage.
    #[must_use]
    pub fn player_spawn(&self) -> Vec2 {
        Vec2::new(self.bounds.width / 4.0, self.bounds.height / 2.0)
    }

    /// Where the boss starts each stage.
    #[must_use]
    pub fn boss_spawn(&self) -> Vec2 {
        Vec2::new(self.bounds.width * 0.75, self.bounds.height / 2.0)
    }
}

/// Player ability tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Maximum health
    pub max_health: u32,
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Basic attack cooldown
    pub attack_cooldown_ms: f32,
    /// Beam skill cooldown
    pub skill_cooldown_ms: f32,
    /// Shield cooldown
    pub shield_cooldown_ms: f32,
    /// How long the shield stays up
    pub shield_duration_ms: f32,
    /// Invincibility window after taking a hit
    pub hit_invincibility_ms: f32,
    /// Beam damage (hit-scan)
    pub beam_damage: u32,
    /// Ultimate damage
    pub ultimate_damage: u32,
    /// Flat score awarded by the ultimate
    pub ultimate_score: u64,
    /// Gauge gained per basic attack
    pub gauge_per_attack: f32,
    /// Gauge gained per beam
    pub gauge_per_skill: f32,
    /// Gauge gained per hit taken
    pub gauge_per_hit_taken: f32,
    /// Basic projectile speed in units per second
    pub bullet_speed: f32,
    /// Basic projectile lifetime
    pub bullet_lifetime_ms: f32,
    /// Speed of projectiles reflected by the shield
    pub reflect_speed: f32,
    /// Forward offset of the muzzle from the player center
    pub muzzle_offset: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            move_speed: 300.0,
            attack_cooldown_ms: 200.0,
            skill_cooldown_ms: 3000.0,
            shield_cooldown_ms: 8000.0,
            shield_duration_ms: 2000.0,
            hit_invincibility_ms: 500.0,
            beam_damage: 25,
            ultimate_damage: 50,
            ultimate_score: 500,
            gauge_per_attack: 2.0,
            gauge_per_skill: 10.0,
            gauge_per_hit_taken: 5.0,
            bullet_speed: 600.0,
            bullet_lifetime_ms: 2000.0,
            reflect_speed: 800.0,
            muzzle_offset: 40.0,
        }
    }
}

/// Combo window and multiplier curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Time allowed between hits before the streak resets
    pub timeout_ms: f32,
    /// Hits per multiplier tier
    pub hits_per_tier: u32,
    /// Multiplier added per tier
    pub tier_increment: f32,
    /// Multiplier cap
    pub max_multiplier: f32,
    /// Hit counts that raise a milestone notification
    pub milestones: Vec<u32>,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            timeout_ms: 3000.0,
            hits_per_tier: 10,
            tier_increment: 0.5,
            max_multiplier: 5.0,
            milestones: vec![10, 25, 50, 100],
        }
    }
}

/// Collision damage values before difficulty scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTuning {
    /// Damage a player projectile deals to the boss
    pub player_bullet: u32,
    /// Base damage of a boss projectile
    pub boss_bullet: u32,
    /// Base damage of touching the boss
    pub boss_contact: u32,
    /// Lifetime of boss projectiles
    pub boss_projectile_lifetime_ms: f32,
    /// Base score of one player projectile hit, before the combo multiplier
    pub hit_score: u64,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            player_bullet: 10,
            boss_bullet: 10,
            boss_contact: 15,
            boss_projectile_lifetime_ms: 5000.0,
            hit_score: 10,
        }
    }
}

/// Stage transition timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTuning {
    /// Delay between a boss falling and the next stage starting
    pub advance_delay_ms: f32,
    /// Delay between the final boss falling and the victory result
    pub victory_delay_ms: f32,
}

impl Default for StageTuning {
    fn default() -> Self {
        Self {
            advance_delay_ms: 2500.0,
            victory_delay_ms: 2000.0,
        }
    }
}

impl CombatConfig {
    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Combat config not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => {
                info!("Loaded combat config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to load combat config: {e}");
                Self::default()
            },
        }
    }

    /// Load and validate configuration, reporting why it was rejected.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved combat config to {}", path.display());
        Ok(())
    }

    /// Check that the values can drive a simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena = &self.arena;
        if arena.bounds.width <= 0.0 || arena.bounds.height <= 0.0 {
            return Err(ConfigError::invalid("arena.bounds", "arena must have a positive size"));
        }

        let player = &self.player;
        if player.max_health == 0 {
            return Err(ConfigError::invalid("player.max_health", "must be positive"));
        }
        for (field, value) in [
            ("player.attack_cooldown_ms", player.attack_cooldown_ms),
            ("player.skill_cooldown_ms", player.skill_cooldown_ms),
            ("player.shield_cooldown_ms", player.shield_cooldown_ms),
            ("player.shield_duration_ms", player.shield_duration_ms),
            ("combo.timeout_ms", self.combo.timeout_ms),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }

        if self.combo.hits_per_tier == 0 {
            return Err(ConfigError::invalid("combo.hits_per_tier", "must be positive"));
        }
        if self.combo.max_multiplier < 1.0 {
            return Err(ConfigError::invalid("combo.max_multiplier", "must be at least 1.0"));
        }
        if self.combo.milestones.is_empty() {
            return Err(ConfigError::invalid("combo.milestones", "needs at least one entry"));
        }

        if self.stage.advance_delay_ms < 0.0 || self.stage.victory_delay_ms < 0.0 {
            return Err(ConfigError::invalid("stage", "delays cannot be negative"));
        }

        Ok(())
    }
}
