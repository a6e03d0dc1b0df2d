//! Whole-run state management.
//!
//! [`BossRush`] is the single owner of a run: the carried-forward
//! [`GameRunState`] snapshot, the event bus and the active [`Encounter`]. It
//! moves between stages after a fixed delay, ends in victory after the fifth
//! boss or in defeat at a player death, and can retry a lost stage.

use bossrush_common::RunError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::boss::Boss;
use crate::config::CombatConfig;
use crate::encounter::{Encounter, EncounterOutcome};
use crate::events::{CombatEvent, EventBus};
use crate::player::PlayerIntent;
use crate::roster::BossKind;
use crate::run_state::{Difficulty, GameRunState, ScoreSubmission};
use crate::score::{compute_final_result, FinalResult, StageResult};
use crate::timer::Cooldown;

/// Where the run stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    /// A stage is being fought
    Playing,
    /// The boss of `stage` fell; waiting out the transition delay
    StageCleared {
        /// Stage just cleared
        stage: u8,
    },
    /// All five bosses fell
    Victory(FinalResult),
    /// The player died
    Defeat {
        /// Stage the player died on
        stage: u8,
        /// Score at the moment of death
        score: u64,
    },
}

impl RunStatus {
    /// True once the run has ended, in victory or defeat.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self, Self::Victory(_) | Self::Defeat { .. })
    }
}

/// A boss rush run from the first stage to victory or defeat.
#[derive(Debug)]
pub struct BossRush {
    config: CombatConfig,
    run: GameRunState,
    encounter: Encounter,
    status: RunStatus,
    transition: Cooldown,
    events: EventBus,
}

impl BossRush {
    /// Starts a run at stage 1.
    #[must_use]
    pub fn new(config: CombatConfig, difficulty: Difficulty, started_at_epoch_ms: u64) -> Self {
        let run = GameRunState::new(difficulty, started_at_epoch_ms);
        let events = EventBus::default();
        let boss = Boss::new(BossKind::Gpt4o, &config);
        let encounter = Encounter::with_boss(&config, &run, boss, events.sender());
        info!("Boss rush started on {:?}", difficulty);
        Self {
            config,
            run,
            encounter,
            status: RunStatus::Playing,
            transition: Cooldown::ready(),
            events,
        }
    }

    /// Starts a run at an arbitrary stage.
    pub fn starting_at(
        stage: u8,
        config: CombatConfig,
        difficulty: Difficulty,
        started_at_epoch_ms: u64,
    ) -> Result<Self, RunError> {
        let run = GameRunState::starting_at(stage, difficulty, started_at_epoch_ms)?;
        let events = EventBus::default();
        let encounter = Encounter::new(&config, &run, events.sender())?;
        info!("Boss rush started at stage {} on {:?}", stage, difficulty);
        Ok(Self {
            config,
            run,
            encounter,
            status: RunStatus::Playing,
            transition: Cooldown::ready(),
            events,
        })
    }

    /// Advances the run by `delta_ms`.
    ///
    /// Intents only reach the player while a stage is being fought. Returns
    /// [`RunError::RunNotActive`] once the run has ended.
    pub fn tick(&mut self, delta_ms: f32, intents: &[PlayerIntent]) -> Result<&RunStatus, RunError> {
        match self.status {
            RunStatus::Playing => match self.encounter.tick(delta_ms, intents) {
                EncounterOutcome::Ongoing => {},
                EncounterOutcome::BossDefeated(result) => self.stage_cleared(result),
                EncounterOutcome::PlayerDied => self.player_died(),
            },
            RunStatus::StageCleared { .. } => {
                self.transition.tick(delta_ms);
                if self.transition.is_ready() {
                    self.next_stage()?;
                }
            },
            RunStatus::Victory(_) | RunStatus::Defeat { .. } => return Err(RunError::RunNotActive),
        }
        Ok(&self.status)
    }

    fn stage_cleared(&mut self, result: StageResult) {
        let score = self.encounter.score();
        self.run = self.run.with_stage_cleared(result, score.total(), score.max_combo());

        let delay = if self.run.is_final_stage() {
            self.config.stage.victory_delay_ms
        } else {
            self.config.stage.advance_delay_ms
        };
        self.transition.reset(delay);
        self.status = RunStatus::StageCleared { stage: self.run.stage };
        debug!("Stage {} cleared, next step in {}ms", self.run.stage, delay);
    }

    fn player_died(&mut self) {
        let stage = self.run.stage;
        let score = self.encounter.score().total();
        self.run = self
            .run
            .with_death(self.encounter.stage_time_ms(), self.encounter.score().max_combo());

        self.events.publish(CombatEvent::RunDefeat { stage, score });
        info!("Run lost on stage {} with {} points ({} deaths)", stage, score, self.run.deaths);
        self.status = RunStatus::Defeat { stage, score };
    }

    fn next_stage(&mut self) -> Result<(), RunError> {
        if self.run.is_final_stage() {
            let result = compute_final_result(
                self.run.score,
                self.run.max_combo,
                self.run.total_time_ms(),
                self.run.deaths,
            );
            self.events.publish(CombatEvent::RunVictory {
                difficulty: self.run.difficulty,
                total_score: result.total,
                total_time_ms: self.run.total_time_ms(),
                deaths: self.run.deaths,
            });
            info!(
                "Run won: {} points in {}ms with {} deaths",
                result.total,
                self.run.total_time_ms(),
                self.run.deaths
            );
            self.status = RunStatus::Victory(result);
            return Ok(());
        }

        let from = self.run.stage;
        self.run = self.run.advanced()?;
        self.encounter = Encounter::new(&self.config, &self.run, self.events.sender())?;
        self.events.publish(CombatEvent::StageAdvanced { from, to: self.run.stage });
        self.status = RunStatus::Playing;
        Ok(())
    }

    /// Restarts the stage the player died on.
    ///
    /// Deaths are kept, the stage timer restarts from zero and the score goes
    /// back to its value when the stage began.
    pub fn retry(&mut self) -> Result<(), RunError> {
        if !matches!(self.status, RunStatus::Defeat { .. }) {
            return Err(RunError::NotDefeated);
        }
        self.run = self.run.retried();
        self.encounter = Encounter::new(&self.config, &self.run, self.events.sender())?;
        self.status = RunStatus::Playing;
        info!("Retrying stage {} (deaths: {})", self.run.stage, self.run.deaths);
        Ok(())
    }

    /// Leaderboard record of a won run.
    pub fn submission(&self, player_name: &str) -> Result<ScoreSubmission, RunError> {
        match &self.status {
            RunStatus::Victory(result) => self.run.submission(player_name, result.total),
            _ => Err(RunError::NotVictorious),
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Final breakdown, once the run is won.
    #[must_use]
    pub const fn final_result(&self) -> Option<&FinalResult> {
        match &self.status {
            RunStatus::Victory(result) => Some(result),
            _ => None,
        }
    }

    /// Snapshot carried between stages.
    #[must_use]
    pub const fn run_state(&self) -> &GameRunState {
        &self.run
    }

    /// Active stage.
    #[must_use]
    pub const fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// Events produced so far and not yet drained.
    ///
    /// Nothing in the run drains this bus. Drain or dispatch it after every
    /// tick; once it is full, later events such as
    /// [`CombatEvent::RunVictory`] are dropped.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Balance configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Time left before the next stage or the victory result.
    #[must_use]
    pub const fn transition_remaining_ms(&self) -> f32 {
        self.transition.remaining_ms()
    }
}
