//! Scenario runner - drives the episode controller over virtual time.

use crate::error::SimError;
use crate::exporter::{SimExport, SimFrame};
use crate::scenarios::{Expectation, ScenarioId};
use crate::world::{SimConfig, SimController, SimWorld};

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use wumpus_core::{EpisodeEvent, EpisodeState, EventReceiver, TieBreak};

/// Results from running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Episode state when the run ended
    pub outcome: EpisodeState,

    /// Whether the outcome matched the scenario's expectation
    pub passed: bool,

    /// True if the duration cap was hit before the episode family ended
    pub timed_out: bool,

    /// Final virtual time in milliseconds
    pub virtual_time_ms: u64,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// Recorded frames, when export is enabled
    #[serde(skip)]
    pub export: Option<SimExport>,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Attempts started (first run plus retries)
    pub attempts: u32,

    /// Policy moves across all attempts
    pub steps: u64,

    /// Cells entered, start-cell visits included
    pub visits: u64,

    /// Deaths across all attempts
    pub deaths: u32,

    /// Fraction of cells ever visited
    pub coverage: f64,

    /// Hazards confirmed by dying in them
    pub dangers_found: usize,

    /// Events observed
    pub events: u64,
}

impl ScenarioMetrics {
    fn record(&mut self, event: &EpisodeEvent) {
        self.events += 1;
        match event {
            EpisodeEvent::Settled { .. } | EpisodeEvent::Won { .. } => self.visits += 1,
            EpisodeEvent::Died { .. } => {
                self.visits += 1;
                self.deaths += 1;
            }
            EpisodeEvent::Started { .. } | EpisodeEvent::Restarted { .. } => self.attempts += 1,
            _ => {}
        }
        // Every attempt opens with a start-cell visit that is not a move
        self.steps = self.visits.saturating_sub(u64::from(self.attempts));
    }
}

/// Runs scenarios.
pub struct ScenarioRunner {
    config: SimConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            config: SimConfig {
                seed,
                ..SimConfig::default()
            },
        }
    }

    /// Creates a runner from a full configuration.
    pub fn with_config(config: SimConfig) -> Self {
        Self { config }
    }

    /// Sets the side length for random maps.
    pub fn with_size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }

    /// Sets the maximum virtual duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.config.max_duration = duration;
        self
    }

    /// Sets the tie-breaking rule.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.config.tie_break = tie_break;
        self
    }

    /// Sets the runner period and retry delay.
    pub fn with_timing(mut self, tick_interval: Duration, retry_delay: Duration) -> Self {
        self.config.tick_interval = tick_interval;
        self.config.retry_delay = retry_delay;
        self
    }

    /// Enables frame recording.
    pub fn with_export(mut self, export: bool) -> Self {
        self.config.export = export;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs a scenario to the end of its episode family or the duration cap.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.config.seed);

        let world = SimWorld::new(self.config.clone(), scenario)?;
        for row in world.map.rows() {
            debug!("  {}", row);
        }
        let (mut ctl, mut events) = world.controller()?;

        let mut export = self
            .config
            .export
            .then(|| SimExport::new(scenario.name(), self.config.seed, world.map.rows()));
        let mut metrics = ScenarioMetrics::default();

        ctl.start_episode()?;
        ctl.run_auto();
        record_batch(&ctl, &mut events, &mut metrics, export.as_mut());

        let cap = self.config.max_duration;
        let mut timed_out = false;
        while let Some(wake) = ctl.next_wakeup() {
            if wake > cap {
                timed_out = true;
                warn!("{}: duration cap of {:?} reached in state {}", scenario, cap, ctl.state());
                ctl.stop();
                break;
            }
            world.context.set_time(wake);
            ctl.advance();
            record_batch(&ctl, &mut events, &mut metrics, export.as_mut());
        }

        if let Some(agent) = ctl.agent() {
            metrics.coverage = agent.knowledge().coverage();
            metrics.dangers_found = agent.knowledge().confirmed_dangers().len();
        }

        let outcome = ctl.state();
        let failure_reason = judge(scenario.expectation(), outcome, timed_out);
        let passed = failure_reason.is_none();
        let virtual_time_ms = world.context.now_ms();

        info!(
            "{} ended {} after {} attempts, {} steps, {} deaths ({:.0}% explored)",
            scenario,
            outcome,
            metrics.attempts,
            metrics.steps,
            metrics.deaths,
            metrics.coverage * 100.0
        );

        if let Some(export) = export.as_mut() {
            export.finalize(outcome.name(), passed);
        }

        Ok(ScenarioResult {
            scenario,
            seed: self.config.seed,
            outcome,
            passed,
            timed_out,
            virtual_time_ms,
            failure_reason,
            metrics,
            export,
        })
    }
}

/// Drains pending events into the metrics and, if recording, one frame.
fn record_batch(
    ctl: &SimController,
    events: &mut EventReceiver,
    metrics: &mut ScenarioMetrics,
    export: Option<&mut SimExport>,
) {
    let mut texts = Vec::new();
    while let Ok(event) = events.try_recv() {
        if event.is_terminal() {
            debug!("[{}ms] attempt {}: {}", ctl.context().now_ms(), ctl.attempt(), event);
        }
        metrics.record(&event);
        texts.push(event.to_string());
    }
    if texts.is_empty() {
        return;
    }

    if let Some(export) = export {
        let agent = ctl.agent();
        export.add_frame(SimFrame {
            time_ms: ctl.context().now_ms(),
            attempt: ctl.attempt(),
            position: agent.map(|a| a.position()),
            belief: agent.map(|a| a.knowledge().rows()).unwrap_or_default(),
            events: texts,
        });
    }
}

/// Returns why the outcome fails the expectation, or `None` if it passes.
fn judge(expectation: Expectation, outcome: EpisodeState, timed_out: bool) -> Option<String> {
    if timed_out {
        return Some(format!("timed out in state {}", outcome));
    }
    let ok = match expectation {
        Expectation::Solvable => outcome == EpisodeState::Won,
        Expectation::Unsolvable => {
            matches!(outcome, EpisodeState::Stuck | EpisodeState::Unsolvable)
        }
        Expectation::Any => outcome.is_final(),
    };
    (!ok).then(|| format!("expected {:?}, ended {}", expectation, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_scenario() {
        let result = ScenarioRunner::new(42).run(ScenarioId::Classic).unwrap();

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.outcome, EpisodeState::Won);
        assert!(result.metrics.attempts >= 1);
        assert!(result.metrics.steps > 0);
    }

    #[test]
    fn test_walled_start_scenario() {
        let result = ScenarioRunner::new(42).run(ScenarioId::WalledStart).unwrap();

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.deaths, 2);
        assert_eq!(result.metrics.attempts, 2);
    }

    #[test]
    fn test_duration_cap_times_out() {
        let result = ScenarioRunner::new(42)
            .with_duration(Duration::from_millis(100))
            .run(ScenarioId::Corridor)
            .unwrap();

        assert!(result.timed_out);
        assert!(!result.passed);
        assert_eq!(result.outcome, EpisodeState::Active);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let a = ScenarioRunner::new(5).run(ScenarioId::Random).unwrap();
        let b = ScenarioRunner::new(5).run(ScenarioId::Random).unwrap();

        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.metrics.steps, b.metrics.steps);
        assert_eq!(a.virtual_time_ms, b.virtual_time_ms);
    }

    #[test]
    fn test_export_records_frames() {
        let result = ScenarioRunner::new(42)
            .with_export(true)
            .run(ScenarioId::WalledStart)
            .unwrap();

        let export = result.export.unwrap();
        assert_eq!(export.outcome, result.outcome.name());
        assert!(!export.frames.is_empty());
        assert_eq!(export.frames[0].time_ms, 0);
        assert_eq!(export.map[3], "AP..");
    }

    #[test]
    fn test_judge() {
        assert_eq!(judge(Expectation::Solvable, EpisodeState::Won, false), None);
        assert_eq!(judge(Expectation::Unsolvable, EpisodeState::Stuck, false), None);
        assert!(judge(Expectation::Solvable, EpisodeState::Unsolvable, false).is_some());
        assert!(judge(Expectation::Any, EpisodeState::Won, true).is_some());
    }
}
