//! Episode Controller - start, reset, retry-with-memory and paced stepping.
//!
//! This is the only component with a scheduling concern. Time comes from an
//! `EpisodeContext`, so the same controller runs on a wall clock or on a
//! virtual one.
//!
//! # State machine
//!
//! ```text
//!            start_episode / reset_run
//!   Idle ───────────────────────────────► Active ◄──────────────┐
//!                                           │                   │
//!          ┌──────────────┬─────────────────┼───────────┐       │ retry
//!          ▼              ▼                 ▼           ▼       │
//!         Won           Stuck        Lost { cause } ────────────┘
//!                                           │  (autonomous, alternatives left)
//!                                           ▼
//!                                       Unsolvable
//! ```
//!
//! # Timers
//!
//! Two timers exist: the periodic runner tick, which performs one policy
//! step while the episode is active, and a single deferred action slot
//! (retry after death, return to start after a win). Both are deadlines on
//! `context.now()`; `advance()` fires whatever is due and `next_wakeup()`
//! tells a driver when to call it again. `stop()` cancels both.

use crate::agent::{self, Agent, AgentConfig, StepOutcome, VisitOutcome};
use crate::error::CoreError;
use crate::events::{EpisodeEvent, EventReceiver, EventSender};
use crate::geometry::Grid;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};
use wumpus_env::{Direction, EpisodeContext, Hazard, WorldView};

/// RNG stream used for tie-breaking in the step policy.
pub const POLICY_RNG_STREAM: u64 = 0x7469_6562;

/// Shortest runner period; a zero interval would never let time advance.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Who drives the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Moves are requested from outside; deaths are final
    #[default]
    Manual,

    /// The runner steps the policy; deaths trigger retry-with-memory
    Autonomous,
}

/// Where the episode family stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpisodeState {
    /// No episode started on the current map
    Idle,

    /// Explorer is on the board and may move
    Active,

    /// Gold found
    Won,

    /// Explorer died; a retry may still follow
    Lost { cause: Hazard },

    /// Step policy found no move
    Stuck,

    /// Death with nothing reachable left to explore; retries stop for good
    Unsolvable,
}

impl EpisodeState {
    /// True while the explorer may move.
    pub fn is_active(&self) -> bool {
        matches!(self, EpisodeState::Active)
    }

    /// True once no further attempt will happen without outside help.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            EpisodeState::Won | EpisodeState::Stuck | EpisodeState::Unsolvable
        )
    }

    /// Returns the state name.
    pub fn name(&self) -> &'static str {
        match self {
            EpisodeState::Idle => "idle",
            EpisodeState::Active => "active",
            EpisodeState::Won => "won",
            EpisodeState::Lost { .. } => "lost",
            EpisodeState::Stuck => "stuck",
            EpisodeState::Unsolvable => "unsolvable",
        }
    }
}

impl std::fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodeState::Lost { cause } => write!(f, "lost ({})", cause),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Configuration for the episode controller.
#[derive(Debug, Clone)]
pub struct EpisodeConfig {
    /// Explorer configuration
    pub agent: AgentConfig,

    /// Period of the automatic runner (default: 450ms)
    pub tick_interval: Duration,

    /// Pause between a death and the retry (default: 350ms)
    pub retry_delay: Duration,

    /// Pause before the marker returns to the start after a win (default: 700ms)
    pub return_home_delay: Duration,

    /// Initial control mode
    pub mode: ControlMode,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            tick_interval: Duration::from_millis(450),
            retry_delay: Duration::from_millis(350),
            return_home_delay: Duration::from_millis(700),
            mode: ControlMode::Manual,
        }
    }
}

/// One-shot actions the controller can defer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Retry with memory after a death
    RetryKeepingMemory,

    /// Move the marker home after a win
    ReturnToStart,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    id: u64,
    due: Duration,
    action: DeferredAction,
}

/// Orchestrates episodes of one explorer on one map.
///
/// Generic over the context and world implementations, allowing the same
/// controller to run in production (tokio) or simulation (virtual clock).
pub struct EpisodeController<Ctx, W>
where
    Ctx: EpisodeContext,
    W: WorldView,
{
    /// Environment context
    context: Arc<Ctx>,

    /// The hidden map
    world: W,

    /// Configuration
    config: EpisodeConfig,

    /// Current explorer (None until the first episode)
    agent: Option<Agent>,

    /// Episode state
    state: EpisodeState,

    /// Manual or autonomous
    mode: ControlMode,

    /// Next runner deadline; None when the runner is stopped
    next_tick_at: Option<Duration>,

    /// Deferred action slot
    pending: Option<ScheduledTask>,

    /// Counter for task ids
    next_task_id: u64,

    /// Attempt number within the episode family (1-based)
    attempt: u32,

    /// Tie-breaking source
    rng: ChaCha8Rng,

    /// Report channel
    events: EventSender,
}

impl<Ctx, W> EpisodeController<Ctx, W>
where
    Ctx: EpisodeContext,
    W: WorldView,
{
    /// Creates a controller and the receiving end of its event channel.
    ///
    /// Fails fast if the world has no cells or its start cell is off-grid.
    pub fn new(
        context: Arc<Ctx>,
        world: W,
        config: EpisodeConfig,
    ) -> Result<(Self, EventReceiver), CoreError> {
        Grid::for_world(&world)?;

        let (events, receiver) = mpsc::unbounded_channel();
        let rng = context.derive_rng(POLICY_RNG_STREAM);
        let mode = config.mode;

        let controller = Self {
            context,
            world,
            config,
            agent: None,
            state: EpisodeState::Idle,
            mode,
            next_tick_at: None,
            pending: None,
            next_task_id: 0,
            attempt: 0,
            rng,
            events,
        };
        Ok((controller, receiver))
    }

    /// Returns the world.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Swaps in a new map, discarding the explorer and stopping all timers.
    pub fn replace_world(&mut self, world: W) -> Result<(), CoreError> {
        Grid::for_world(&world)?;
        self.stop();
        self.world = world;
        self.agent = None;
        self.attempt = 0;
        self.state = EpisodeState::Idle;
        debug!("World replaced; controller idle");
        Ok(())
    }

    /// Returns the environment context.
    pub fn context(&self) -> &Arc<Ctx> {
        &self.context
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EpisodeConfig {
        &self.config
    }

    /// Returns the current explorer, if an episode was started.
    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    /// Returns the episode state.
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Returns the control mode.
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Returns the attempt number (0 before the first episode).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// True while the periodic runner is scheduled.
    pub fn is_running(&self) -> bool {
        self.next_tick_at.is_some()
    }

    /// The deferred action waiting to fire and its deadline.
    pub fn pending_action(&self) -> Option<(DeferredAction, Duration)> {
        self.pending.map(|t| (t.action, t.due))
    }

    /// Places a fresh explorer on the start cell and visits it.
    ///
    /// Stops the runner and cancels anything pending first.
    pub fn start_episode(&mut self) -> Result<VisitOutcome, CoreError> {
        self.stop();

        let (agent, first) = agent::start_episode(&self.world, self.config.agent.clone())?;
        info!(
            "{}: episode started at {} on a {}x{} map",
            agent.config().name,
            agent.start(),
            agent.grid().size(),
            agent.grid().size()
        );
        self.agent = Some(agent);
        self.attempt = 1;
        self.state = EpisodeState::Active;
        self.emit(EpisodeEvent::Started { attempt: self.attempt });

        self.handle_visit(first);
        Ok(first)
    }

    /// Starts over on the same map with a fresh explorer.
    ///
    /// Requires an episode to have been started on this map.
    pub fn reset_run(&mut self) -> Result<VisitOutcome, CoreError> {
        if self.agent.is_none() {
            return Err(CoreError::NoEpisode);
        }
        self.start_episode()
    }

    /// Switches control mode. Always stops the runner.
    pub fn set_mode(&mut self, mode: ControlMode) {
        self.mode = mode;
        self.stop();
    }

    /// Switches to autonomous mode and starts the runner if idle.
    pub fn run_auto(&mut self) {
        self.mode = ControlMode::Autonomous;
        self.start_runner();
    }

    /// Stops the runner and cancels any pending deferred action.
    pub fn stop(&mut self) {
        self.stop_runner();
        if let Some(task) = self.pending.take() {
            debug!("Cancelled deferred {:?} (task #{})", task.action, task.id);
        }
    }

    /// Runs one iteration of the step-selection policy.
    ///
    /// No-op unless the episode is active.
    pub fn step(&mut self) -> StepOutcome {
        if !self.state.is_active() {
            return StepOutcome::Inactive;
        }
        let Some(agent) = self.agent.as_mut() else {
            return StepOutcome::Inactive;
        };

        let outcome = agent.step(&self.world, &mut self.rng);
        match outcome {
            StepOutcome::Moved { from, to, kind, visit } => {
                trace!("{:?} {} -> {}", kind, from, to);
                self.handle_visit(visit);
            }
            StepOutcome::NoMoves { at } => {
                self.stop_runner();
                self.state = EpisodeState::Stuck;
                warn!("No available moves from {}; map likely unsolvable", at);
                self.emit(EpisodeEvent::NoMovesAvailable { at });
            }
            StepOutcome::Inactive => {}
        }
        outcome
    }

    /// The runner callback: one step if active, otherwise nothing.
    pub fn tick(&mut self) {
        if self.state.is_active() {
            self.step();
        }
    }

    /// Moves the explorer one cell on request.
    ///
    /// Returns `None` if the episode is not active or the move leaves the grid.
    pub fn move_agent(&mut self, direction: Direction) -> Option<VisitOutcome> {
        if !self.state.is_active() {
            return None;
        }
        let agent = self.agent.as_mut()?;
        let visit = agent.move_toward(&self.world, direction)?;
        self.handle_visit(visit);
        Some(visit)
    }

    /// Starts the next attempt keeping all learned knowledge.
    ///
    /// Not gated by the reachability check; a caller may use it to retry a
    /// map that was declared unsolvable.
    pub fn retry_keeping_memory(&mut self) -> Result<VisitOutcome, CoreError> {
        let agent = self.agent.as_mut().ok_or(CoreError::NoEpisode)?;
        let first = agent.retry_keeping_memory(&self.world);

        // A new attempt supersedes whatever the previous one left behind
        if let Some(task) = self.pending.take() {
            debug!("Cancelled deferred {:?} (task #{}) on retry", task.action, task.id);
        }
        self.attempt += 1;
        self.state = EpisodeState::Active;
        info!("Restarted with memory (attempt {})", self.attempt);
        self.emit(EpisodeEvent::Restarted { attempt: self.attempt });

        self.handle_visit(first);
        Ok(first)
    }

    /// Fires whatever is due at the context's current time.
    ///
    /// The deferred action fires before the runner tick when both are due.
    pub fn advance(&mut self) {
        let now = self.context.now();

        if let Some(task) = self.pending {
            if task.due <= now {
                self.pending = None;
                self.fire(task);
            }
        }

        if let Some(next) = self.next_tick_at {
            if next <= now {
                self.next_tick_at = Some(now + self.tick_interval());
                self.tick();
            }
        }
    }

    /// The next deadline, or `None` when nothing is scheduled.
    pub fn next_wakeup(&self) -> Option<Duration> {
        let pending = self.pending.map(|t| t.due);
        match (pending, self.next_tick_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drives the timers on the context's clock until nothing is scheduled
    /// or `stop` turns true. Returns the final state.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> EpisodeState {
        let context = Arc::clone(&self.context);
        let mut stop_open = true;

        loop {
            if *stop.borrow() {
                self.stop();
                break;
            }
            let Some(wake) = self.next_wakeup() else {
                break;
            };

            let now = context.now();
            if wake > now {
                let nap = context.sleep(wake - now);
                if stop_open {
                    tokio::select! {
                        _ = nap => {}
                        changed = stop.changed() => {
                            if changed.is_err() {
                                // Sender dropped: nobody can stop us any more
                                stop_open = false;
                            }
                            continue;
                        }
                    }
                } else {
                    nap.await;
                }
            }

            self.advance();
        }

        self.state
    }

    fn fire(&mut self, task: ScheduledTask) {
        trace!("Firing deferred {:?} (task #{})", task.action, task.id);
        match task.action {
            DeferredAction::RetryKeepingMemory => {
                if !matches!(self.state, EpisodeState::Lost { .. }) {
                    debug!("Dropping stale retry in state {}", self.state);
                    return;
                }
                if let Err(e) = self.retry_keeping_memory() {
                    warn!("Deferred retry failed: {}", e);
                }
            }
            DeferredAction::ReturnToStart => {
                if self.state != EpisodeState::Won {
                    debug!("Dropping stale return home in state {}", self.state);
                    return;
                }
                if let Some(agent) = self.agent.as_mut() {
                    agent.park_at_start();
                    self.emit(EpisodeEvent::ReturnedToStart);
                }
            }
        }
    }

    fn handle_visit(&mut self, visit: VisitOutcome) {
        match visit {
            VisitOutcome::Settled { at, percept } => {
                debug!("Settled at {}, sensed {}", at, percept);
                self.emit(EpisodeEvent::Settled { at, percept });
            }
            VisitOutcome::Won { at } => {
                self.state = EpisodeState::Won;
                info!("Gold found at {} on attempt {}", at, self.attempt);
                self.emit(EpisodeEvent::Won { at });
                self.schedule(DeferredAction::ReturnToStart, self.config.return_home_delay);
                self.stop_runner();
            }
            VisitOutcome::Died { at, cause } => {
                self.state = EpisodeState::Lost { cause };
                warn!("Died at {} ({}) on attempt {}", at, cause, self.attempt);
                self.emit(EpisodeEvent::Died { at, cause });
                if self.mode == ControlMode::Autonomous {
                    self.after_autonomous_death();
                }
            }
        }
    }

    fn after_autonomous_death(&mut self) {
        let alternative = self
            .agent
            .as_ref()
            .map(Agent::exists_alternative)
            .unwrap_or(false);

        if !alternative {
            self.stop();
            self.state = EpisodeState::Unsolvable;
            warn!("No solution: every alternative is exhausted after {} attempts", self.attempt);
            self.emit(EpisodeEvent::MapUnsolvable);
            return;
        }

        if !self.is_running() {
            self.start_runner();
        }
        let delay = self.config.retry_delay;
        self.schedule(DeferredAction::RetryKeepingMemory, delay);
        self.emit(EpisodeEvent::RetryScheduled {
            attempt: self.attempt + 1,
            delay_ms: delay.as_millis() as u64,
        });
    }

    fn schedule(&mut self, action: DeferredAction, delay: Duration) {
        let task = ScheduledTask {
            id: self.next_task_id,
            due: self.context.now() + delay,
            action,
        };
        self.next_task_id += 1;
        if let Some(previous) = self.pending.replace(task) {
            debug!("Deferred {:?} superseded by {:?}", previous.action, action);
        }
    }

    fn start_runner(&mut self) {
        if self.next_tick_at.is_some() {
            return;
        }
        self.next_tick_at = Some(self.context.now() + self.tick_interval());
        debug!("Runner started ({:?} period)", self.tick_interval());
        self.emit(EpisodeEvent::RunnerStarted);
    }

    fn stop_runner(&mut self) {
        if self.next_tick_at.take().is_some() {
            debug!("Runner stopped");
            self.emit(EpisodeEvent::RunnerStopped);
        }
    }

    fn tick_interval(&self) -> Duration {
        self.config.tick_interval.max(MIN_TICK)
    }

    fn emit(&self, event: EpisodeEvent) {
        // A dropped receiver only means nobody is listening
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TieBreak;
    use crate::testing::{FixtureWorld, ManualClock};
    use wumpus_env::Coord;

    fn ordered_config(mode: ControlMode) -> EpisodeConfig {
        EpisodeConfig {
            agent: AgentConfig {
                tie_break: TieBreak::FirstInOrder,
                ..AgentConfig::default()
            },
            mode,
            ..EpisodeConfig::default()
        }
    }

    /// Breeze at the start; both exits from the corner are pits.
    fn walled_world() -> FixtureWorld {
        FixtureWorld::new(3)
            .with_pit(0, 1)
            .with_pit(1, 2)
            .with_wumpus(2, 2)
            .with_gold(2, 0)
    }

    fn drain(rx: &mut EventReceiver) -> Vec<EpisodeEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[test]
    fn test_episode_config_default() {
        let config = EpisodeConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(450));
        assert_eq!(config.retry_delay, Duration::from_millis(350));
        assert_eq!(config.return_home_delay, Duration::from_millis(700));
        assert_eq!(config.mode, ControlMode::Manual);
    }

    #[test]
    fn test_new_rejects_bad_world() {
        let clock = ManualClock::shared(1);
        let result = EpisodeController::new(
            clock,
            FixtureWorld::new(3).with_start(5, 5),
            EpisodeConfig::default(),
        );
        assert!(matches!(result, Err(CoreError::StartOutOfBounds { .. })));
    }

    #[test]
    fn test_start_episode_reports_start() {
        let clock = ManualClock::shared(1);
        let world = FixtureWorld::new(3).with_gold(2, 0).with_wumpus(2, 2);
        let (mut ctl, mut rx) = EpisodeController::new(clock, world, EpisodeConfig::default()).unwrap();

        assert_eq!(ctl.state(), EpisodeState::Idle);
        assert_eq!(ctl.reset_run(), Err(CoreError::NoEpisode));

        ctl.start_episode().unwrap();

        assert_eq!(ctl.state(), EpisodeState::Active);
        assert_eq!(ctl.attempt(), 1);
        let events = drain(&mut rx);
        assert_eq!(events[0], EpisodeEvent::Started { attempt: 1 });
        assert!(matches!(events[1], EpisodeEvent::Settled { at, .. } if at == Coord::new(0, 2)));
    }

    #[test]
    fn test_manual_death_is_final() {
        let clock = ManualClock::shared(1);
        let (mut ctl, mut rx) =
            EpisodeController::new(clock, walled_world(), ordered_config(ControlMode::Manual)).unwrap();
        ctl.start_episode().unwrap();

        let visit = ctl.move_agent(Direction::Up);

        assert!(matches!(visit, Some(VisitOutcome::Died { cause: Hazard::Pit, .. })));
        assert_eq!(ctl.state(), EpisodeState::Lost { cause: Hazard::Pit });
        assert!(!ctl.is_running());
        assert_eq!(ctl.pending_action(), None);
        assert_eq!(ctl.next_wakeup(), None);
        assert!(drain(&mut rx).iter().any(|e| matches!(e, EpisodeEvent::Died { .. })));

        // Further moves are ignored
        assert_eq!(ctl.move_agent(Direction::Right), None);
    }

    #[test]
    fn test_autonomous_death_schedules_retry() {
        let clock = ManualClock::shared(1);
        let config = ordered_config(ControlMode::Autonomous);
        let (mut ctl, mut rx) = EpisodeController::new(clock.clone(), walled_world(), config).unwrap();
        ctl.start_episode().unwrap();
        drain(&mut rx);

        // Manual step button in autonomous mode: walks up into the pit
        ctl.step();

        assert_eq!(ctl.state(), EpisodeState::Lost { cause: Hazard::Pit });
        assert!(ctl.is_running());
        assert_eq!(
            ctl.pending_action(),
            Some((DeferredAction::RetryKeepingMemory, Duration::from_millis(350)))
        );
        let events = drain(&mut rx);
        assert!(events.contains(&EpisodeEvent::RunnerStarted));
        assert!(events.contains(&EpisodeEvent::RetryScheduled { attempt: 2, delay_ms: 350 }));

        // Nothing happens before the deadline
        clock.advance(Duration::from_millis(349));
        ctl.advance();
        assert_eq!(ctl.attempt(), 1);

        clock.advance(Duration::from_millis(1));
        ctl.advance();

        assert_eq!(ctl.state(), EpisodeState::Active);
        assert_eq!(ctl.attempt(), 2);
        let agent = ctl.agent().unwrap();
        assert_eq!(agent.position(), Coord::new(0, 2));
        let pit = agent.knowledge().get(Coord::new(0, 1));
        assert!(pit.danger_confirmed);
        assert!(!pit.died_here);
        assert!(drain(&mut rx).contains(&EpisodeEvent::Restarted { attempt: 2 }));
    }

    #[test]
    fn test_exhausted_alternatives_declare_unsolvable() {
        let clock = ManualClock::shared(1);
        let config = ordered_config(ControlMode::Autonomous);
        let (mut ctl, mut rx) = EpisodeController::new(clock.clone(), walled_world(), config).unwrap();
        ctl.start_episode().unwrap();

        ctl.step(); // dies in (0,1)
        ctl.retry_keeping_memory().unwrap();
        assert_eq!(ctl.pending_action(), None);

        ctl.step(); // dies in (1,2)

        assert_eq!(ctl.state(), EpisodeState::Unsolvable);
        assert!(!ctl.is_running());
        assert_eq!(ctl.pending_action(), None);
        assert!(drain(&mut rx).contains(&EpisodeEvent::MapUnsolvable));
    }

    #[test]
    fn test_stop_cancels_pending_retry() {
        let clock = ManualClock::shared(1);
        let config = ordered_config(ControlMode::Autonomous);
        let (mut ctl, _rx) = EpisodeController::new(clock.clone(), walled_world(), config).unwrap();
        ctl.start_episode().unwrap();
        ctl.step();
        assert!(ctl.pending_action().is_some());

        ctl.stop();
        clock.advance(Duration::from_secs(5));
        ctl.advance();

        assert_eq!(ctl.state(), EpisodeState::Lost { cause: Hazard::Pit });
        assert_eq!(ctl.attempt(), 1);
        assert_eq!(ctl.next_wakeup(), None);
    }

    #[test]
    fn test_win_stops_runner_and_returns_home() {
        let clock = ManualClock::shared(1);
        let world = FixtureWorld::new(2).with_gold(0, 0).with_wumpus(1, 0);
        let config = ordered_config(ControlMode::Manual);
        let (mut ctl, mut rx) = EpisodeController::new(clock.clone(), world, config).unwrap();
        ctl.start_episode().unwrap();
        ctl.run_auto();
        assert!(ctl.is_running());

        clock.advance(Duration::from_millis(450));
        ctl.advance();

        assert_eq!(ctl.state(), EpisodeState::Won);
        assert!(!ctl.is_running());
        assert_eq!(ctl.agent().unwrap().position(), Coord::new(0, 0));

        clock.advance(Duration::from_millis(700));
        ctl.advance();

        assert_eq!(ctl.agent().unwrap().position(), Coord::new(0, 1));
        assert_eq!(ctl.state(), EpisodeState::Won);
        let events = drain(&mut rx);
        assert!(events.contains(&EpisodeEvent::ReturnedToStart));
        assert!(events.contains(&EpisodeEvent::RunnerStopped));
    }

    #[test]
    fn test_retry_after_win_cancels_return_home() {
        let clock = ManualClock::shared(1);
        let world = FixtureWorld::new(3).with_gold(0, 1).with_wumpus(2, 0);
        let (mut ctl, mut rx) =
            EpisodeController::new(clock.clone(), world, ordered_config(ControlMode::Manual)).unwrap();
        ctl.start_episode().unwrap();

        assert!(matches!(ctl.move_agent(Direction::Up), Some(VisitOutcome::Won { .. })));
        assert!(ctl.pending_action().is_some());

        ctl.retry_keeping_memory().unwrap();
        assert_eq!(ctl.pending_action(), None);
        assert!(matches!(ctl.move_agent(Direction::Right), Some(VisitOutcome::Settled { .. })));
        drain(&mut rx);

        clock.advance(Duration::from_millis(700));
        ctl.advance();

        assert_eq!(ctl.state(), EpisodeState::Active);
        assert_eq!(ctl.agent().unwrap().position(), Coord::new(1, 2));
        assert_eq!(ctl.next_wakeup(), None);
        assert!(!drain(&mut rx).contains(&EpisodeEvent::ReturnedToStart));
    }

    #[test]
    fn test_tick_is_noop_when_not_active() {
        let clock = ManualClock::shared(1);
        let (mut ctl, _rx) =
            EpisodeController::new(clock, walled_world(), ordered_config(ControlMode::Manual)).unwrap();

        ctl.tick();
        assert_eq!(ctl.state(), EpisodeState::Idle);
        assert_eq!(ctl.step(), StepOutcome::Inactive);
    }

    #[test]
    fn test_set_mode_stops_runner() {
        let clock = ManualClock::shared(1);
        let (mut ctl, _rx) =
            EpisodeController::new(clock, walled_world(), EpisodeConfig::default()).unwrap();
        ctl.start_episode().unwrap();
        ctl.run_auto();
        assert_eq!(ctl.mode(), ControlMode::Autonomous);

        ctl.set_mode(ControlMode::Manual);

        assert!(!ctl.is_running());
        assert_eq!(ctl.mode(), ControlMode::Manual);
    }

    #[test]
    fn test_replace_world_goes_idle() {
        let clock = ManualClock::shared(1);
        let (mut ctl, _rx) =
            EpisodeController::new(clock, walled_world(), EpisodeConfig::default()).unwrap();
        ctl.start_episode().unwrap();

        ctl.replace_world(FixtureWorld::new(4).with_gold(3, 0)).unwrap();

        assert_eq!(ctl.state(), EpisodeState::Idle);
        assert!(ctl.agent().is_none());
        assert_eq!(ctl.reset_run(), Err(CoreError::NoEpisode));
        assert!(ctl.replace_world(FixtureWorld::new(0)).is_err());
    }

    #[tokio::test]
    async fn test_run_until_unsolvable() {
        let clock = ManualClock::shared(3);
        let config = ordered_config(ControlMode::Autonomous);
        let (mut ctl, _rx) = EpisodeController::new(clock.clone(), walled_world(), config).unwrap();
        ctl.start_episode().unwrap();
        ctl.run_auto();

        let (_stop_tx, stop_rx) = watch::channel(false);
        let state = ctl.run(stop_rx).await;

        assert_eq!(state, EpisodeState::Unsolvable);
        assert_eq!(ctl.attempt(), 2);
        // Runner ticks at 450ms and 900ms; the retry fires at 800ms in between
        assert_eq!(clock.now(), Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_run_until_won() {
        let clock = ManualClock::shared(9);
        let world = FixtureWorld::new(4).with_gold(3, 0).with_wumpus(3, 3).with_pit(1, 1);
        let (mut ctl, _rx) = EpisodeController::new(clock, world, EpisodeConfig::default()).unwrap();
        ctl.start_episode().unwrap();
        ctl.run_auto();

        let (_stop_tx, stop_rx) = watch::channel(false);
        let state = ctl.run(stop_rx).await;

        assert_eq!(state, EpisodeState::Won);
        assert_eq!(ctl.agent().unwrap().position(), Coord::new(0, 3));
    }

    #[tokio::test]
    async fn test_run_honours_stop() {
        let clock = ManualClock::shared(1);
        let (mut ctl, _rx) =
            EpisodeController::new(clock, walled_world(), EpisodeConfig::default()).unwrap();
        ctl.start_episode().unwrap();
        ctl.run_auto();

        let (_stop_tx, stop_rx) = watch::channel(true);
        let state = ctl.run(stop_rx).await;

        assert_eq!(state, EpisodeState::Active);
        assert!(!ctl.is_running());
    }
}
