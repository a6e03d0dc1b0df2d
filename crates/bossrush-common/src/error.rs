//! Error types for the boss rush engine.
//!
//! Gameplay rejections (abilities on cooldown, hits on dead actors) are not
//! errors; they are silent no-ops inside the simulation. These types cover the
//! library boundary only.

use thiserror::Error;

/// Top-level error type for boss rush operations.
#[derive(Debug, Error)]
pub enum BossRushError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Run lifecycle errors
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Replay decoding errors
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A field holds a value the simulation cannot run with
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted field path
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for an invalid field.
    #[must_use]
    pub fn invalid(field: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors raised by run lifecycle calls made from outside the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RunError {
    /// Stage outside 1..=5
    #[error("Invalid stage {0}, expected 1-5")]
    InvalidStage(u8),

    /// The run has already ended
    #[error("Run is no longer active")]
    RunNotActive,

    /// Retry requested while the player is not defeated
    #[error("Retry is only possible after a defeat")]
    NotDefeated,

    /// Submission requested before the final boss fell
    #[error("Run has not been won")]
    NotVictorious,

    /// Submission without a usable player name
    #[error("Player name is empty")]
    EmptyPlayerName,
}

/// Replay file errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// File does not start with the replay magic bytes
    #[error("Not a replay file")]
    BadMagic,

    /// File ended before the header was complete
    #[error("Replay file is truncated")]
    Truncated,

    /// Body failed to decode
    #[error("Failed to decode replay: {0}")]
    Decode(String),
}

/// Result type alias for boss rush operations.
pub type BossRushResult<T> = Result<T, BossRushError>;
