//! Event bus carrying combat notifications to presentation layers.
//!
//! Events are fire-and-forget: the simulation never waits on a consumer and
//! never reads anything back. If the bus is full, new events are dropped, so
//! hosts should drain or dispatch it once per frame.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::player::Ability;
use crate::roster::BossKind;
use crate::run_state::Difficulty;

/// Which side received damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageTarget {
    /// The player character
    Player,
    /// The active boss
    Boss,
}

/// Notifications produced by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Damage landed on an actor
    DamageApplied {
        /// Who was hit
        target: DamageTarget,
        /// Impact X
        x: f32,
        /// Impact Y
        y: f32,
        /// Health removed
        amount: u32,
        /// Ability hits (beam, ultimate) are flagged for emphasis
        is_critical: bool,
    },
    /// The shield turned a hit into a counter projectile
    ShieldReflected {
        /// Player X
        x: f32,
        /// Player Y
        y: f32,
    },
    /// A player ability went off
    AbilityUsed {
        /// Which ability
        ability: Ability,
    },
    /// A hit extended the combo streak
    ComboExtended {
        /// Streak length
        count: u32,
        /// Multiplier after the hit
        multiplier: f32,
    },
    /// The streak reached a milestone hit count
    ComboMilestone {
        /// Streak length
        count: u32,
    },
    /// The combo window ran out
    ComboBroken {
        /// Streak length when it ended
        count: u32,
    },
    /// The score went up
    ScoreChanged {
        /// Points added
        delta: u64,
        /// New total
        total: u64,
    },
    /// Enemy projectiles were wiped from the arena
    ProjectilesCleared {
        /// Number removed
        count: usize,
    },
    /// A boss started one of its patterns
    BossPatternStarted {
        /// Boss identity
        boss: BossKind,
        /// Pattern name
        pattern: String,
    },
    /// A boss escalated to a new phase
    BossPhaseChanged {
        /// Boss identity
        boss: BossKind,
        /// Phase entered
        new_phase: u8,
    },
    /// A boss fell
    BossDefeated {
        /// Boss identity
        boss: BossKind,
        /// Stage number
        stage: u8,
        /// Time taken to clear the stage
        stage_time_ms: u64,
        /// No damage taken during the stage
        perfect: bool,
    },
    /// The player's health reached zero
    PlayerDied {
        /// Stage number
        stage: u8,
    },
    /// The next stage began
    StageAdvanced {
        /// Stage cleared
        from: u8,
        /// Stage started
        to: u8,
    },
    /// The final boss fell
    RunVictory {
        /// Difficulty of the run
        difficulty: Difficulty,
        /// Final score after bonuses
        total_score: u64,
        /// Total simulated time
        total_time_ms: u64,
        /// Deaths over the run
        deaths: u32,
    },
    /// The run stopped at a player death
    RunDefeat {
        /// Stage reached
        stage: u8,
        /// Score at the moment of death
        score: u64,
    },
}

/// Event bus for broadcasting events to subscribers.
///
/// The bus is bounded and never drains itself. Events published while it is
/// full are lost, so consumers must call [`EventBus::drain`] or
/// [`EventBus::dispatch`] every frame.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Drains all pending events into a handler, returning how many were handled.
    pub fn dispatch(&self, handler: &mut dyn EventHandler) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            handler.handle(&event);
            handled += 1;
        }
        handled
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}

/// Consumer of combat events.
pub trait EventHandler {
    /// Handles an event.
    fn handle(&mut self, event: &CombatEvent);
}
