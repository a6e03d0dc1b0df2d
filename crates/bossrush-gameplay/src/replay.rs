//! Replay recording and playback.
//!
//! A run is fully determined by its configuration, seed, difficulty and the
//! sequence of `(delta_ms, intents)` ticks fed to it. A [`ReplayLog`] stores
//! exactly that, so playing it back reproduces the recorded run.
//!
//! File layout: 4 magic bytes, the schema version as three little-endian
//! `u16`s, then the bincode-encoded log.

use bossrush_common::{BossRushError, BossRushResult, ReplayError, RunError, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{debug, warn};

use crate::config::CombatConfig;
use crate::orchestrator::{BossRush, RunStatus};
use crate::player::PlayerIntent;
use crate::run_state::{Difficulty, GameRunState};

/// Magic bytes for replay file format.
pub const REPLAY_MAGIC: &[u8; 4] = b"BRPL";

const HEADER_LEN: usize = 10;

/// One recorded host call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayFrame {
    /// A tick with the intents applied in it
    Tick {
        /// Frame delta
        delta_ms: f32,
        /// Intents, in order
        intents: Vec<PlayerIntent>,
    },
    /// A retry after defeat
    Retry,
}

/// A recorded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Format version
    pub version: SchemaVersion,
    /// Pattern randomness seed
    pub seed: u64,
    /// Difficulty of the run
    pub difficulty: Difficulty,
    /// Host wall clock when the run began
    pub started_at_epoch_ms: u64,
    /// Host calls, in order
    pub frames: Vec<ReplayFrame>,
}

/// How a played-back run ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Status after the last frame
    pub status: RunStatus,
    /// Carried-forward run state after the last frame
    pub run: GameRunState,
    /// Live score, including the stage in progress
    pub score: u64,
    /// Frames applied before the run ended
    pub frames_played: usize,
}

impl RunSummary {
    fn of(rush: &BossRush, frames_played: usize) -> Self {
        Self {
            status: rush.status().clone(),
            run: rush.run_state().clone(),
            score: rush.encounter().score().total(),
            frames_played,
        }
    }
}

impl ReplayLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new(seed: u64, difficulty: Difficulty, started_at_epoch_ms: u64) -> Self {
        Self {
            version: SchemaVersion::REPLAY,
            seed,
            difficulty,
            started_at_epoch_ms,
            frames: Vec::new(),
        }
    }

    /// Total simulated time of the recorded ticks.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.frames
            .iter()
            .map(|f| match f {
                ReplayFrame::Tick { delta_ms, .. } => f64::from(*delta_ms),
                ReplayFrame::Retry => 0.0,
            })
            .sum()
    }

    /// Re-runs the recording with `config`, using the recorded seed.
    ///
    /// Frames after the run ends are ignored.
    #[must_use]
    pub fn play(&self, config: &CombatConfig) -> RunSummary {
        let mut config = config.clone();
        config.rng_seed = self.seed;
        let mut rush = BossRush::new(config, self.difficulty, self.started_at_epoch_ms);

        for (index, frame) in self.frames.iter().enumerate() {
            match frame {
                ReplayFrame::Tick { delta_ms, intents } => {
                    if let Err(RunError::RunNotActive) = rush.tick(*delta_ms, intents) {
                        debug!("Replay ended at frame {index}");
                        return RunSummary::of(&rush, index);
                    }
                },
                ReplayFrame::Retry => {
                    if let Err(err) = rush.retry() {
                        warn!("Ignoring recorded retry at frame {index}: {err}");
                    }
                },
            }
        }
        RunSummary::of(&rush, self.frames.len())
    }

    /// Encodes the log with its header.
    pub fn encode(&self) -> BossRushResult<Vec<u8>> {
        let body = bincode::serialize(self).map_err(|e| BossRushError::Serialization(e.to_string()))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(REPLAY_MAGIC);
        for part in [self.version.major, self.version.minor, self.version.patch] {
            bytes.extend_from_slice(&part.to_le_bytes());
        }
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Decodes a log, checking magic bytes and version.
    pub fn decode(bytes: &[u8]) -> BossRushResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ReplayError::Truncated.into());
        }
        if &bytes[..4] != REPLAY_MAGIC {
            return Err(ReplayError::BadMagic.into());
        }

        let part = |i: usize| u16::from_le_bytes([bytes[4 + i * 2], bytes[5 + i * 2]]);
        let version = SchemaVersion::new(part(0), part(1), part(2));
        if !SchemaVersion::REPLAY.can_read(&version) {
            return Err(BossRushError::VersionMismatch {
                expected: SchemaVersion::REPLAY.to_string(),
                actual: version.to_string(),
            });
        }

        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| ReplayError::Decode(e.to_string()).into())
    }

    /// Writes the encoded log.
    pub fn save<W: Write>(&self, mut writer: W) -> BossRushResult<()> {
        writer.write_all(&self.encode()?)?;
        Ok(())
    }

    /// Reads and decodes a log.
    pub fn load<R: Read>(mut reader: R) -> BossRushResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }
}

/// Records host calls while driving a run.
#[derive(Debug)]
pub struct ReplayRecorder {
    log: ReplayLog,
}

impl ReplayRecorder {
    /// Starts recording a run configured with `config`.
    #[must_use]
    pub fn new(config: &CombatConfig, difficulty: Difficulty, started_at_epoch_ms: u64) -> Self {
        Self {
            log: ReplayLog::new(config.rng_seed, difficulty, started_at_epoch_ms),
        }
    }

    /// Ticks `rush` and records the call.
    pub fn tick(&mut self, rush: &mut BossRush, delta_ms: f32, intents: &[PlayerIntent]) -> Result<RunStatus, RunError> {
        let status = rush.tick(delta_ms, intents)?.clone();
        self.log.frames.push(ReplayFrame::Tick {
            delta_ms,
            intents: intents.to_vec(),
        });
        Ok(status)
    }

    /// Retries `rush` and records the call.
    pub fn retry(&mut self, rush: &mut BossRush) -> Result<(), RunError> {
        rush.retry()?;
        self.log.frames.push(ReplayFrame::Retry);
        Ok(())
    }

    /// Number of recorded frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.log.frames.len()
    }

    /// Stops recording and returns the log.
    #[must_use]
    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Direction;
    use std::fs::File;

    /// Scripted input: weave vertically while firing, beam and shield on cadence.
    fn script(frame: u32) -> Vec<PlayerIntent> {
        let mut intents = vec![PlayerIntent::Attack];
        let direction = match (frame / 40) % 4 {
            0 => Direction::Up,
            1 | 3 => Direction::None,
            _ => Direction::Down,
        };
        intents.push(PlayerIntent::Move(direction));
        if frame % 20 == 0 {
            intents.push(PlayerIntent::UseSkill);
        }
        if frame % 90 == 0 {
            intents.push(PlayerIntent::UseShield);
        }
        intents.push(PlayerIntent::UseUltimate);
        intents
    }

    fn record(config: &CombatConfig, frames: u32) -> (ReplayLog, RunSummary) {
        let mut rush = BossRush::new(config.clone(), Difficulty::Normal, 42);
        let mut recorder = ReplayRecorder::new(config, Difficulty::Normal, 42);
        for frame in 0..frames {
            if recorder.tick(&mut rush, 16.0, &script(frame)).is_err() {
                break;
            }
        }
        let played = recorder.frame_count();
        (recorder.finish(), RunSummary::of(&rush, played))
    }

    #[test]
    fn test_playback_reproduces_run() {
        let config = CombatConfig::default();
        let (log, recorded) = record(&config, 3000);

        let replayed = log.play(&config);
        assert_eq!(replayed, recorded);
        assert!(replayed.score > 0);
    }

    #[test]
    fn test_encode_decode() {
        let config = CombatConfig::default();
        let (log, _) = record(&config, 100);

        let bytes = log.encode().expect("encode");
        assert_eq!(&bytes[..4], REPLAY_MAGIC);
        let decoded = ReplayLog::decode(&bytes).expect("decode");
        assert_eq!(decoded, log);
    }

    #[test]
    fn test_save_load_file() {
        let config = CombatConfig::default();
        let (log, recorded) = record(&config, 500);

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.brpl");
        log.save(File::create(&path).expect("create")).expect("save");
        let loaded = ReplayLog::load(File::open(&path).expect("open")).expect("load");

        assert_eq!(loaded.frames.len(), 500);
        assert_eq!(loaded.play(&config), recorded);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            ReplayLog::decode(b"BRP"),
            Err(BossRushError::Replay(ReplayError::Truncated))
        ));
        assert!(matches!(
            ReplayLog::decode(b"XXXX\x01\x00\x00\x00\x00\x00"),
            Err(BossRushError::Replay(ReplayError::BadMagic))
        ));
        assert!(matches!(
            ReplayLog::decode(b"BRPL\x02\x00\x00\x00\x00\x00"),
            Err(BossRushError::VersionMismatch { .. })
        ));
        assert!(matches!(
            ReplayLog::decode(b"BRPL\x01\x00\x00\x00\x00\x00\xff"),
            Err(BossRushError::Replay(ReplayError::Decode(_)))
        ));
    }

    #[test]
    fn test_retry_is_recorded() {
        let mut config = CombatConfig::default();
        config.player.max_health = 1;
        let mut rush = BossRush::new(config.clone(), Difficulty::Hard, 0);
        let mut recorder = ReplayRecorder::new(&config, Difficulty::Hard, 0);

        let mut status = RunStatus::Playing;
        for _ in 0..400 {
            status = recorder
                .tick(&mut rush, 50.0, &[PlayerIntent::Move(Direction::Right)])
                .expect("active");
            if status.is_over() {
                break;
            }
        }
        assert!(matches!(status, RunStatus::Defeat { .. }));
        recorder.retry(&mut rush).expect("retry");
        recorder.tick(&mut rush, 16.0, &[]).expect("active");

        let log = recorder.finish();
        assert!(log.frames.contains(&ReplayFrame::Retry));
        let summary = log.play(&config);
        assert_eq!(summary.run.deaths, 1);
        assert_eq!(summary.status, RunStatus::Playing);
    }
}
