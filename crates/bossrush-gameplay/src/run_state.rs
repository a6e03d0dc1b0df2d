//! Cross-stage run continuity.
//!
//! [`GameRunState`] is handed from one stage to the next as an immutable
//! snapshot: every transition returns a new value and leaves the old one
//! untouched.

use bossrush_common::RunError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::score::StageResult;

/// Number of stages in a run.
pub const FINAL_STAGE: u8 = 5;

/// Longest accepted leaderboard name, in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 20;

/// Runs finishing under this time earn the speed-run flag.
pub const SPEED_RUN_LIMIT_MS: u64 = 300_000;

/// Difficulty selected at run start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Half damage taken
    Easy,
    /// Base damage
    #[default]
    Normal,
    /// 1.5x damage taken
    Hard,
    /// Double damage taken
    Nightmare,
}

impl Difficulty {
    /// All difficulties, easiest first.
    pub const ALL: [Self; 4] = [Self::Easy, Self::Normal, Self::Hard, Self::Nightmare];

    /// Multiplier applied to damage the player takes.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Easy => 0.5,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
            Self::Nightmare => 2.0,
        }
    }

    /// Scales a base damage value, flooring the result.
    #[must_use]
    pub fn scale_damage(self, base: u32) -> u32 {
        (base as f32 * self.multiplier()).floor() as u32
    }
}

/// State carried between stages of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRunState {
    /// Current stage, 1-based
    pub stage: u8,
    /// Score at the start of the current stage
    pub score: u64,
    /// Deaths so far
    pub deaths: u32,
    /// Selected difficulty
    pub difficulty: Difficulty,
    /// Clear time of each cleared stage, in order
    pub stage_times: Vec<u64>,
    /// Host wall clock when the run began
    pub started_at_epoch_ms: u64,
    /// Longest streak so far
    pub max_combo: u32,
    /// Simulated time spent in the run, failed attempts included
    pub elapsed_ms: u64,
    /// Results of cleared stages, in order
    pub results: Vec<StageResult>,
}

impl GameRunState {
    /// Starts a fresh run at stage 1.
    #[must_use]
    pub fn new(difficulty: Difficulty, started_at_epoch_ms: u64) -> Self {
        Self {
            stage: 1,
            score: 0,
            deaths: 0,
            difficulty,
            stage_times: Vec::new(),
            started_at_epoch_ms,
            max_combo: 0,
            elapsed_ms: 0,
            results: Vec::new(),
        }
    }

    /// Starts a fresh run at an arbitrary stage.
    pub fn starting_at(stage: u8, difficulty: Difficulty, started_at_epoch_ms: u64) -> Result<Self, RunError> {
        if !(1..=FINAL_STAGE).contains(&stage) {
            return Err(RunError::InvalidStage(stage));
        }
        Ok(Self {
            stage,
            ..Self::new(difficulty, started_at_epoch_ms)
        })
    }

    /// True on the last stage of the run.
    #[must_use]
    pub const fn is_final_stage(&self) -> bool {
        self.stage >= FINAL_STAGE
    }

    /// Total simulated run time.
    #[must_use]
    pub const fn total_time_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Snapshot after clearing the current stage. The stage number is unchanged.
    #[must_use]
    pub fn with_stage_cleared(&self, result: StageResult, score: u64, max_combo: u32) -> Self {
        let mut next = self.clone();
        next.stage_times.push(result.elapsed_ms);
        next.elapsed_ms += result.elapsed_ms;
        next.score = score;
        next.max_combo = next.max_combo.max(max_combo);
        next.results.push(result);
        next
    }

    /// Snapshot for the following stage.
    pub fn advanced(&self) -> Result<Self, RunError> {
        if self.is_final_stage() {
            return Err(RunError::InvalidStage(self.stage + 1));
        }
        let mut next = self.clone();
        next.stage += 1;
        info!("Advancing run to stage {}", next.stage);
        Ok(next)
    }

    /// Snapshot after the player died `attempt_ms` into the current stage.
    ///
    /// The score is left at its stage-start value.
    #[must_use]
    pub fn with_death(&self, attempt_ms: u64, max_combo: u32) -> Self {
        let mut next = self.clone();
        next.deaths += 1;
        next.elapsed_ms += attempt_ms;
        next.max_combo = next.max_combo.max(max_combo);
        next
    }

    /// Snapshot for retrying the current stage: stage times past it are dropped.
    #[must_use]
    pub fn retried(&self) -> Self {
        let keep = usize::from(self.stage.saturating_sub(1));
        let mut next = self.clone();
        next.stage_times.truncate(keep);
        next.results.truncate(keep);
        next
    }

    /// Builds the leaderboard record of a finished run.
    pub fn submission(&self, player_name: &str, total_score: u64) -> Result<ScoreSubmission, RunError> {
        let trimmed = player_name.trim();
        if trimmed.is_empty() {
            return Err(RunError::EmptyPlayerName);
        }

        let name: String = trimmed.chars().take(MAX_PLAYER_NAME_CHARS).collect();
        if name.len() < trimmed.len() {
            warn!("Player name truncated to {MAX_PLAYER_NAME_CHARS} characters");
        }

        let time = |stage: u8| self.results.iter().find(|r| r.stage == stage).map(|r| r.elapsed_ms);
        Ok(ScoreSubmission {
            player_name: name,
            total_score,
            total_time: self.elapsed_ms,
            deaths: self.deaths,
            stage1_time: time(1),
            stage2_time: time(2),
            stage3_time: time(3),
            stage4_time: time(4),
            stage5_time: time(5),
            no_death_bonus: self.deaths == 0,
            speed_run_bonus: self.elapsed_ms < SPEED_RUN_LIMIT_MS,
        })
    }
}

/// Leaderboard record produced at the end of a victorious run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    /// Display name, at most 20 characters
    pub player_name: String,
    /// Final score
    pub total_score: u64,
    /// Total run time in milliseconds
    pub total_time: u64,
    /// Deaths over the run
    pub deaths: u32,
    /// Stage 1 clear time
    pub stage1_time: Option<u64>,
    /// Stage 2 clear time
    pub stage2_time: Option<u64>,
    /// Stage 3 clear time
    pub stage3_time: Option<u64>,
    /// Stage 4 clear time
    pub stage4_time: Option<u64>,
    /// Stage 5 clear time
    pub stage5_time: Option<u64>,
    /// Run finished without dying
    pub no_death_bonus: bool,
    /// Run finished in under five minutes
    pub speed_run_bonus: bool,
}

impl ScoreSubmission {
    /// Serializes the record as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
