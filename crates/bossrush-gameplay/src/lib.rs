//! # Boss Rush Gameplay
//!
//! Deterministic combat simulation for a five-stage boss rush.
//!
//! This crate provides everything driven by the host's per-frame tick:
//! - Player combat model (attack, beam, shield, ultimate, damage intake)
//! - Data-driven boss pattern engine with phase escalation
//! - Projectile field and time-keyed effect schedule
//! - Combo and score accounting
//! - Stage orchestration, retry and leaderboard submission
//! - Event bus for presentation layers, achievement tracking
//! - Replay recording and playback

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod achievements;
pub mod actor;
pub mod attack;
pub mod boss;
pub mod combo;
pub mod config;
pub mod encounter;
pub mod events;
pub mod orchestrator;
pub mod player;
pub mod projectile;
pub mod replay;
pub mod roster;
pub mod run_state;
pub mod schedule;
pub mod score;
pub mod timer;

#[cfg(test)]
mod e2e_tests;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::achievements::*;
    pub use crate::actor::*;
    pub use crate::attack::*;
    pub use crate::boss::*;
    pub use crate::combo::*;
    pub use crate::config::*;
    pub use crate::encounter::*;
    pub use crate::events::*;
    pub use crate::orchestrator::*;
    pub use crate::player::*;
    pub use crate::projectile::*;
    pub use crate::replay::*;
    pub use crate::roster::*;
    pub use crate::run_state::*;
    pub use crate::schedule::*;
    pub use crate::score::*;
    pub use crate::timer::*;
}

pub use prelude::*;
