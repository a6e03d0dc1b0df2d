//! Boss pattern engine.
//!
//! A boss is one struct driven by a data table ([`BossProfile`]): an ordered
//! pattern list executed strictly round-robin, each pattern gated by its own
//! cooldown, plus health-ratio phase rules that append patterns and may scale
//! cooldowns. The boss never touches projectiles or the player directly; it
//! emits [`BossCue`]s that the encounter schedules and resolves.

use bossrush_common::ArenaBounds;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::actor::{DamageOutcome, Vitals};
use crate::attack::TimedAttack;
use crate::config::CombatConfig;
use crate::roster::{self, BossKind};
use crate::timer::Cooldown;

/// Frame length the tracking rate is expressed against.
const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Boss life cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossState {
    /// Waiting for the next pattern
    #[default]
    Idle,
    /// A pattern is playing out
    Attacking,
    /// Reserved; no pattern stuns a boss yet
    Stunned,
    /// Terminal
    Dead,
}

/// Movement while no dash is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IdleMotion {
    /// Stay in place
    Hover,
    /// Sine bob around the spawn height
    Bob {
        /// Peak vertical offset
        amplitude: f32,
        /// Milliseconds per radian
        period_ms: f32,
    },
    /// Drift vertically towards the player
    Track {
        /// Fraction of the gap closed per 60 Hz frame
        rate: f32,
    },
}

/// A named, timed, cooldown-gated boss action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Display name
    pub name: String,
    /// How long the boss stays in the attacking state
    pub duration_ms: f32,
    /// Wait before the next pattern may start
    pub cooldown_ms: f32,
    /// Attacks, timed from pattern start
    pub steps: Vec<TimedAttack>,
    /// Replacement steps used from phase 2 on
    pub empowered_steps: Option<Vec<TimedAttack>>,
}

impl Pattern {
    /// Creates a pattern with no steps.
    #[must_use]
    pub fn new(name: impl Into<String>, duration_ms: f32, cooldown_ms: f32) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            cooldown_ms,
            steps: Vec::new(),
            empowered_steps: None,
        }
    }

    /// Sets the attack steps.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<TimedAttack>) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the steps used once the boss reaches phase 2.
    #[must_use]
    pub fn with_empowered(mut self, steps: Vec<TimedAttack>) -> Self {
        self.empowered_steps = Some(steps);
        self
    }

    /// Steps to run in `phase`.
    #[must_use]
    pub fn steps_for(&self, phase: u8) -> &[TimedAttack] {
        match &self.empowered_steps {
            Some(empowered) if phase >= 2 => empowered,
            _ => &self.steps,
        }
    }
}

/// Escalation entered once when health falls to a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRule {
    /// Health ratio at or below which the phase starts
    pub threshold: f32,
    /// Phase entered; must be the current phase plus one
    pub phase: u8,
    /// Time before patterns resume
    pub transition_ms: f32,
    /// Ignore damage during the transition
    pub invulnerable: bool,
    /// Factor applied to every existing pattern cooldown on entry
    pub cooldown_scale: f32,
    /// Marks the boss as enraged
    pub enrage: bool,
    /// Patterns appended when the transition ends
    pub added_patterns: Vec<Pattern>,
    /// Attacks played on entry, timed from the start of the transition
    pub entry_steps: Vec<TimedAttack>,
}

impl PhaseRule {
    /// Creates a rule with no side effects beyond the transition pause.
    #[must_use]
    pub fn new(threshold: f32, phase: u8, transition_ms: f32) -> Self {
        Self {
            threshold,
            phase,
            transition_ms,
            invulnerable: false,
            cooldown_scale: 1.0,
            enrage: false,
            added_patterns: Vec::new(),
            entry_steps: Vec::new(),
        }
    }

    /// Ignore damage while transitioning.
    #[must_use]
    pub fn invulnerable(mut self) -> Self {
        self.invulnerable = true;
        self
    }

    /// Scale every existing cooldown on entry and enrage.
    #[must_use]
    pub fn with_enrage(mut self, cooldown_scale: f32) -> Self {
        self.cooldown_scale = cooldown_scale;
        self.enrage = true;
        self
    }

    /// Append a pattern when the transition ends.
    #[must_use]
    pub fn adds(mut self, pattern: Pattern) -> Self {
        self.added_patterns.push(pattern);
        self
    }

    /// Attacks played during the transition.
    #[must_use]
    pub fn with_entry(mut self, steps: Vec<TimedAttack>) -> Self {
        self.entry_steps = steps;
        self
    }
}

/// Data describing one boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    /// Identity
    pub kind: BossKind,
    /// Display name
    pub name: String,
    /// Starting and maximum health
    pub max_health: u32,
    /// Idle movement
    pub idle: IdleMotion,
    /// Initial pattern list, executed in order
    pub patterns: Vec<Pattern>,
    /// Phase rules, in phase order
    pub phases: Vec<PhaseRule>,
}

/// Notification from [`Boss::update`] for the encounter to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum BossCue {
    /// A pattern started; its steps should be scheduled
    PatternStarted {
        /// Pattern name
        name: String,
        /// Steps timed from now
        steps: Vec<TimedAttack>,
    },
    /// A phase transition started
    PhaseChanged {
        /// Phase entered
        phase: u8,
        /// Entry attacks timed from now
        steps: Vec<TimedAttack>,
    },
    /// A phase transition finished and patterns resume
    TransitionEnded {
        /// Current phase
        phase: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Motion {
    from: Vec2,
    to: Vec2,
    duration_ms: f32,
    elapsed_ms: f32,
}

/// A boss instance for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    kind: BossKind,
    name: String,
    vitals: Vitals,
    phase: u8,
    phase_transitioning: bool,
    invulnerable_during_transition: bool,
    enraged: bool,
    state: BossState,
    patterns: Vec<Pattern>,
    current_pattern_index: usize,
    pattern_cooldown: Cooldown,
    attack_timer: Cooldown,
    transition_timer: Cooldown,
    pending_patterns: Vec<Pattern>,
    phases: Vec<PhaseRule>,
    death_handled: bool,
    position: Vec2,
    home: Vec2,
    idle: IdleMotion,
    motion: Option<Motion>,
    clock_ms: f32,
    arena: ArenaBounds,
    radius: f32,
}

impl Boss {
    /// Creates the boss for `kind` at the configured spawn point.
    #[must_use]
    pub fn new(kind: BossKind, config: &CombatConfig) -> Self {
        Self::from_profile(
            roster::profile(kind),
            config.arena.boss_spawn(),
            config.arena.bounds,
            config.arena.boss_radius,
        )
    }

    /// Creates a boss from an explicit profile.
    #[must_use]
    pub fn from_profile(profile: BossProfile, home: Vec2, arena: ArenaBounds, radius: f32) -> Self {
        Self {
            kind: profile.kind,
            name: profile.name,
            vitals: Vitals::new(profile.max_health),
            phase: 1,
            phase_transitioning: false,
            invulnerable_during_transition: false,
            enraged: false,
            state: BossState::Idle,
            patterns: profile.patterns,
            current_pattern_index: 0,
            pattern_cooldown: Cooldown::ready(),
            attack_timer: Cooldown::ready(),
            transition_timer: Cooldown::ready(),
            pending_patterns: Vec::new(),
            phases: profile.phases,
            death_handled: false,
            position: home,
            home,
            idle: profile.idle,
            motion: None,
            clock_ms: 0.0,
            arena,
            radius,
        }
    }

    /// Advances the boss by `delta_ms`. `target` is the player's position.
    pub fn update(&mut self, delta_ms: f32, target: Vec2) -> Vec<BossCue> {
        let mut cues = Vec::new();
        if self.vitals.is_dead() {
            return cues;
        }
        self.clock_ms += delta_ms.max(0.0);

        if self.phase_transitioning {
            self.transition_timer.tick(delta_ms);
            if self.transition_timer.is_ready() {
                self.finish_transition();
                cues.push(BossCue::TransitionEnded { phase: self.phase });
            }
        }

        self.attack_timer.tick(delta_ms);
        if self.state == BossState::Attacking && self.attack_timer.is_ready() {
            self.state = BossState::Idle;
        }

        self.pattern_cooldown.tick(delta_ms);
        if self.pattern_cooldown.is_ready() && !self.phase_transitioning && !self.patterns.is_empty() {
            cues.push(self.execute_pattern());
        }

        self.advance_motion(delta_ms, target);
        if let Some(cue) = self.check_phase() {
            cues.push(cue);
        }

        cues
    }

    fn execute_pattern(&mut self) -> BossCue {
        let index = self.current_pattern_index % self.patterns.len();
        let pattern = &self.patterns[index];
        let cue = BossCue::PatternStarted {
            name: pattern.name.clone(),
            steps: pattern.steps_for(self.phase).to_vec(),
        };

        self.pattern_cooldown.reset(pattern.cooldown_ms);
        self.attack_timer.reset(pattern.duration_ms);
        self.state = BossState::Attacking;
        self.current_pattern_index = (index + 1) % self.patterns.len();

        trace!("{} executes {} (phase {})", self.name, pattern.name, self.phase);
        cue
    }

    fn check_phase(&mut self) -> Option<BossCue> {
        if self.phase_transitioning {
            return None;
        }

        let ratio = self.vitals.health_ratio();
        let next = self.phase + 1;
        let index = self
            .phases
            .iter()
            .position(|rule| rule.phase == next && ratio <= rule.threshold)?;
        let rule = self.phases.remove(index);

        debug_assert!(rule.phase > self.phase, "phase must only increase");
        self.phase = rule.phase;
        self.phase_transitioning = true;
        self.invulnerable_during_transition = rule.invulnerable;
        self.transition_timer.reset(rule.transition_ms);
        self.enraged |= rule.enrage;

        if (rule.cooldown_scale - 1.0).abs() > f32::EPSILON {
            for pattern in &mut self.patterns {
                pattern.cooldown_ms *= rule.cooldown_scale;
            }
            let remaining = self.pattern_cooldown.remaining_ms();
            self.pattern_cooldown.reset(remaining * rule.cooldown_scale);
        }
        self.pending_patterns.extend(rule.added_patterns);

        debug!("{} entered phase {} at {:.0}% health", self.name, self.phase, ratio * 100.0);
        Some(BossCue::PhaseChanged {
            phase: self.phase,
            steps: rule.entry_steps,
        })
    }

    fn finish_transition(&mut self) {
        self.phase_transitioning = false;
        self.invulnerable_during_transition = false;
        self.patterns.append(&mut self.pending_patterns);
        debug!("{} finished phase {} transition", self.name, self.phase);
    }

    fn advance_motion(&mut self, delta_ms: f32, target: Vec2) {
        if let Some(motion) = &mut self.motion {
            motion.elapsed_ms += delta_ms.max(0.0);
            let t = if motion.duration_ms > 0.0 {
                (motion.elapsed_ms / motion.duration_ms).min(1.0)
            } else {
                1.0
            };
            self.position = motion.from.lerp(motion.to, t);
            if t >= 1.0 {
                self.motion = None;
            }
        } else {
            match self.idle {
                IdleMotion::Hover => {},
                IdleMotion::Bob { amplitude, period_ms } => {
                    self.position.y = self.home.y + (self.clock_ms / period_ms).sin() * amplitude;
                },
                IdleMotion::Track { rate } => {
                    let frames = delta_ms.max(0.0) / REFERENCE_FRAME_MS;
                    let factor = 1.0 - (1.0 - rate).powf(frames);
                    self.position.y += (target.y - self.position.y) * factor;
                },
            }
        }
        self.position = self.arena.clamp(self.position, self.radius);
    }

    /// Starts moving towards `to` over `travel_ms`, replacing any current move.
    pub fn begin_move(&mut self, to: Vec2, travel_ms: f32) {
        if self.vitals.is_dead() {
            return;
        }
        self.motion = Some(Motion {
            from: self.position,
            to: self.arena.clamp(to, self.radius),
            duration_ms: travel_ms,
            elapsed_ms: 0.0,
        });
    }

    /// Moves the boss instantly.
    pub fn place(&mut self, to: Vec2) {
        if self.vitals.is_dead() {
            return;
        }
        self.motion = None;
        self.position = self.arena.clamp(to, self.radius);
    }

    /// Applies damage. No-op when dead or invulnerable.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.vitals.is_dead() || self.invulnerable_during_transition {
            return DamageOutcome::NONE;
        }

        let outcome = self.vitals.take_damage(amount);
        if outcome.killed {
            self.state = BossState::Dead;
            self.motion = None;
            debug!("{} defeated", self.name);
        }
        outcome
    }

    /// Claims the death for processing. Returns true exactly once, after death.
    pub fn mark_death_handled(&mut self) -> bool {
        if !self.vitals.is_dead() || self.death_handled {
            return false;
        }
        self.death_handled = true;
        true
    }

    /// Identity.
    #[must_use]
    pub const fn kind(&self) -> BossKind {
        self.kind
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Health pool.
    #[must_use]
    pub const fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.vitals.health()
    }

    /// Check if dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.vitals.is_dead()
    }

    /// True once the death has been processed.
    #[must_use]
    pub const fn death_handled(&self) -> bool {
        self.death_handled
    }

    /// Current phase, starting at 1.
    #[must_use]
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// True while a phase transition blocks patterns.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.phase_transitioning
    }

    /// True while damage is ignored.
    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerable_during_transition
    }

    /// True once an enraging phase was entered.
    #[must_use]
    pub const fn is_enraged(&self) -> bool {
        self.enraged
    }

    /// Life-cycle state.
    #[must_use]
    pub const fn state(&self) -> BossState {
        self.state
    }

    /// Current pattern list.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Index of the pattern that runs next.
    #[must_use]
    pub const fn current_pattern_index(&self) -> usize {
        self.current_pattern_index
    }

    /// Time until the next pattern may start.
    #[must_use]
    pub const fn pattern_cooldown_ms(&self) -> f32 {
        self.pattern_cooldown.remaining_ms()
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Spawn point.
    #[must_use]
    pub const fn home(&self) -> Vec2 {
        self.home
    }

    /// Body radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{Attack, Placement};

    fn shot() -> TimedAttack {
        TimedAttack::now(Attack::AimedShot {
            from: Placement::Boss,
            speed: 400.0,
            spread: 0.0,
        })
    }

    fn profile(patterns: Vec<Pattern>, phases: Vec<PhaseRule>) -> BossProfile {
        BossProfile {
            kind: BossKind::Gpt4o,
            name: "Test".to_string(),
            max_health: 200,
            idle: IdleMotion::Hover,
            patterns,
            phases,
        }
    }

    fn boss(profile: BossProfile) -> Boss {
        let arena = ArenaBounds::default();
        Boss::from_profile(profile, Vec2::new(960.0, 360.0), arena, 60.0)
    }

    fn started(cues: &[BossCue]) -> Vec<String> {
        cues.iter()
            .filter_map(|c| match c {
                BossCue::PatternStarted { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    fn run(boss: &mut Boss, total_ms: u32, step_ms: f32) -> Vec<String> {
        let mut names = Vec::new();
        let steps = (total_ms as f32 / step_ms) as u32;
        for _ in 0..steps {
            names.extend(started(&boss.update(step_ms, Vec2::new(320.0, 360.0))));
        }
        names
    }

    #[test]
    fn test_round_robin_order() {
        let mut b = boss(profile(
            vec![
                Pattern::new("A", 100.0, 1000.0).with_steps(vec![shot()]),
                Pattern::new("B", 100.0, 2000.0).with_steps(vec![shot()]),
                Pattern::new("C", 100.0, 3000.0).with_steps(vec![shot()]),
            ],
            Vec::new(),
        ));

        // A at 0, B at 1000, C at 3000, A at 6000, B at 7000, C at 9000
        let names = run(&mut b, 9500, 100.0);
        assert_eq!(names, vec!["A", "B", "C", "A", "B", "C"]);
    }

    #[test]
    fn test_attacking_state_lasts_pattern_duration() {
        let mut b = boss(profile(vec![Pattern::new("A", 500.0, 2000.0)], Vec::new()));
        b.update(16.0, Vec2::ZERO);
        assert_eq!(b.state(), BossState::Attacking);
        b.update(484.0, Vec2::ZERO);
        assert_eq!(b.state(), BossState::Attacking);
        b.update(16.0, Vec2::ZERO);
        assert_eq!(b.state(), BossState::Idle);
    }

    #[test]
    fn test_death_is_handled_once() {
        let mut b = boss(profile(vec![Pattern::new("A", 100.0, 1000.0)], Vec::new()));
        for _ in 0..4 {
            b.take_damage(25);
            assert!(!b.is_dead());
            assert!(!b.mark_death_handled());
        }
        for _ in 0..4 {
            b.take_damage(25);
        }
        assert!(b.is_dead());
        assert_eq!(b.state(), BossState::Dead);
        assert!(b.mark_death_handled());
        assert!(!b.mark_death_handled());

        assert_eq!(b.take_damage(25), DamageOutcome::NONE);
        assert_eq!(b.health(), 0);
        assert!(b.update(1000.0, Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_phase_transition_blocks_patterns_and_damage() {
        let rule = PhaseRule::new(0.5, 2, 1500.0)
            .invulnerable()
            .adds(Pattern::new("Extra", 100.0, 500.0));
        let mut b = boss(profile(vec![Pattern::new("A", 100.0, 1000.0)], vec![rule]));

        assert_eq!(started(&b.update(16.0, Vec2::ZERO)), vec!["A"]);
        b.take_damage(100);
        let cues = b.update(16.0, Vec2::ZERO);
        assert!(cues.contains(&BossCue::PhaseChanged { phase: 2, steps: Vec::new() }));
        assert!(b.is_transitioning());
        assert!(b.is_invulnerable());
        assert_eq!(b.take_damage(50), DamageOutcome::NONE);
        assert_eq!(b.health(), 100);

        // cooldown runs out during the transition but nothing fires
        assert!(run(&mut b, 1400, 100.0).is_empty());
        assert!(b.pattern_cooldown_ms() <= 0.0);
        assert_eq!(b.patterns().len(), 1);

        let names = run(&mut b, 200, 100.0);
        assert!(!b.is_transitioning());
        assert_eq!(b.patterns().len(), 2);
        assert_eq!(names, vec!["A"]);
        assert_eq!(b.phase(), 2);
    }

    #[test]
    fn test_phase_enters_once() {
        let rule = PhaseRule::new(0.5, 2, 100.0);
        let mut b = boss(profile(vec![Pattern::new("A", 100.0, 1000.0)], vec![rule]));
        b.take_damage(150);

        let mut changes = 0;
        for _ in 0..50 {
            changes += b
                .update(50.0, Vec2::ZERO)
                .iter()
                .filter(|c| matches!(c, BossCue::PhaseChanged { .. }))
                .count();
        }
        assert_eq!(changes, 1);
        assert_eq!(b.phase(), 2);
    }

    #[test]
    fn test_cooldown_scaling_applies_to_existing_patterns() {
        let rule = PhaseRule::new(0.3, 2, 0.0)
            .with_enrage(0.7)
            .adds(Pattern::new("Late", 100.0, 8000.0));
        let mut b = boss(profile(
            vec![
                Pattern::new("A", 100.0, 3000.0),
                Pattern::new("B", 100.0, 4000.0),
            ],
            vec![rule],
        ));
        b.take_damage(150);
        b.update(0.0, Vec2::ZERO);
        b.update(0.0, Vec2::ZERO);

        let cooldowns: Vec<f32> = b.patterns().iter().map(|p| p.cooldown_ms).collect();
        assert!((cooldowns[0] - 2100.0).abs() < 1e-3);
        assert!((cooldowns[1] - 2800.0).abs() < 1e-3);
        assert_eq!(cooldowns[2], 8000.0);
        assert!(b.is_enraged());
    }

    #[test]
    fn test_empowered_steps_from_phase_two() {
        let pattern = Pattern::new("A", 100.0, 1000.0)
            .with_steps(vec![shot()])
            .with_empowered(vec![shot(), shot()]);
        assert_eq!(pattern.steps_for(1).len(), 1);
        assert_eq!(pattern.steps_for(2).len(), 2);
        assert_eq!(pattern.steps_for(3).len(), 2);
    }

    #[test]
    fn test_dash_moves_then_stops() {
        let mut b = boss(profile(Vec::new(), Vec::new()));
        b.begin_move(Vec2::new(460.0, 360.0), 400.0);
        b.update(200.0, Vec2::ZERO);
        assert!((b.position().x - 710.0).abs() < 1e-3);
        b.update(200.0, Vec2::ZERO);
        assert_eq!(b.position(), Vec2::new(460.0, 360.0));
        b.update(200.0, Vec2::ZERO);
        assert_eq!(b.position(), Vec2::new(460.0, 360.0));
    }

    #[test]
    fn test_tracking_is_frame_rate_independent() {
        let mut p = profile(Vec::new(), Vec::new());
        p.idle = IdleMotion::Track { rate: 0.01 };
        let mut coarse = boss(p.clone());
        let mut fine = boss(p);

        let target = Vec2::new(0.0, 600.0);
        for _ in 0..30 {
            coarse.update(REFERENCE_FRAME_MS * 2.0, target);
        }
        for _ in 0..60 {
            fine.update(REFERENCE_FRAME_MS, target);
        }
        assert!((coarse.position().y - fine.position().y).abs() < 0.1);
        assert!(fine.position().y > 360.0);
    }
}
