//! ID types for simulation objects.
//!
//! IDs are handed out by an [`IdAllocator`] owned by the stage that creates
//! the objects, never by a process-wide counter, so two runs fed the same
//! inputs number their objects identically.

use serde::{Deserialize, Serialize};

/// Sequential ID source scoped to one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Returns the next raw ID, starting at 1.
    pub fn next(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    /// Number of IDs handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next
    }
}

/// Unique identifier for a projectile within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(u64);

impl ProjectileId {
    /// Creates a projectile ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identifier of an entry in a stage's event schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleId(u64);

impl ScheduleId {
    /// Creates a schedule ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}
