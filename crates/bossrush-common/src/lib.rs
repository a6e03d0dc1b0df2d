//! # Boss Rush Common
//!
//! Common types, utilities, and shared abstractions for the boss rush
//! combat engine.
//!
//! This crate provides foundational types used across the workspace:
//! - Arena coordinates and targeting geometry
//! - ID types (ProjectileId, ScheduleId)
//! - Version information for serialized formats
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
