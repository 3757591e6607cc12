//! SimWorld - the simulation harness container.

use crate::context::SimContext;
use crate::error::SimError;
use crate::oracle::WumpusWorld;
use crate::scenarios::ScenarioId;

use std::sync::Arc;
use std::time::Duration;
use wumpus_core::{
    AgentConfig, ControlMode, EpisodeConfig, EpisodeController, EventReceiver, TieBreak,
};
use wumpus_env::EpisodeContext;

/// RNG stream used to generate random maps.
///
/// Separate from the policy stream so changing the map never changes the
/// explorer's tie-breaking sequence, and vice versa.
pub const MAP_RNG_STREAM: u64 = 0x6d61_7073;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Side length for random maps
    pub size: usize,

    /// Virtual time after which a run counts as timed out
    pub max_duration: Duration,

    /// Period of the automatic runner
    pub tick_interval: Duration,

    /// Pause between a death and the retry
    pub retry_delay: Duration,

    /// Pause before returning home after a win
    pub return_home_delay: Duration,

    /// Candidate selection in the step policy
    pub tie_break: TieBreak,

    /// Record frames for export
    pub export: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        let episode = EpisodeConfig::default();
        Self {
            seed: 42,
            size: 6,
            max_duration: Duration::from_secs(600),
            tick_interval: episode.tick_interval,
            retry_delay: episode.retry_delay,
            return_home_delay: episode.return_home_delay,
            tie_break: TieBreak::Random,
            export: false,
        }
    }
}

/// Alias for the controller the harness drives.
pub type SimController = EpisodeController<SimContext, WumpusWorld>;

/// The SimWorld - virtual clock plus the hidden map for one scenario run.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Scenario the map was built from
    pub scenario: ScenarioId,

    /// Shared simulation context (virtual clock)
    pub context: Arc<SimContext>,

    /// Ground truth map
    pub map: WumpusWorld,
}

impl SimWorld {
    /// Builds the scenario's map from the map stream of `config.seed`.
    ///
    /// Fails if the map does not carry exactly one wumpus and one gold.
    pub fn new(config: SimConfig, scenario: ScenarioId) -> Result<Self, SimError> {
        let context = SimContext::shared(config.seed);
        let mut map_rng = context.derive_rng(MAP_RNG_STREAM);
        let map = scenario.build_world(config.size, &mut map_rng)?;
        map.validate()?;

        Ok(Self {
            config,
            scenario,
            context,
            map,
        })
    }

    /// Episode configuration derived from the simulation configuration.
    pub fn episode_config(&self) -> EpisodeConfig {
        EpisodeConfig {
            agent: AgentConfig {
                name: format!("explorer-{}", self.config.seed),
                tie_break: self.config.tie_break,
            },
            tick_interval: self.config.tick_interval,
            retry_delay: self.config.retry_delay,
            return_home_delay: self.config.return_home_delay,
            mode: ControlMode::Autonomous,
        }
    }

    /// Creates a controller over a copy of the map, sharing the clock.
    pub fn controller(&self) -> Result<(SimController, EventReceiver), SimError> {
        let pair = EpisodeController::new(
            Arc::clone(&self.context),
            self.map.clone(),
            self.episode_config(),
        )?;
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wumpus_env::WorldView;

    #[test]
    fn test_same_seed_same_map() {
        let config = SimConfig {
            seed: 77,
            ..SimConfig::default()
        };
        let a = SimWorld::new(config.clone(), ScenarioId::Random).unwrap();
        let b = SimWorld::new(config, ScenarioId::Random).unwrap();
        assert_eq!(a.map, b.map);
        assert_eq!(a.map.size(), 6);
    }

    #[test]
    fn test_controller_starts_idle_and_autonomous() {
        let world = SimWorld::new(SimConfig::default(), ScenarioId::Classic).unwrap();
        let (ctl, _rx) = world.controller().unwrap();
        assert_eq!(ctl.mode(), ControlMode::Autonomous);
        assert_eq!(ctl.attempt(), 0);
    }
}
