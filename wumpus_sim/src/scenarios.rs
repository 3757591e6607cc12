//! Canned maps for exercising the explorer.

use crate::oracle::WumpusWorld;
use rand::Rng;
use serde::{Deserialize, Serialize};
use wumpus_env::EnvError;

/// What a scenario is expected to end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expectation {
    /// The explorer must find the gold
    Solvable,

    /// The explorer must give up (stuck or unsolvable)
    Unsolvable,

    /// Any terminal outcome is acceptable
    Any,
}

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// 4x4 textbook layout
    Classic,

    /// 5x5 snake of safe cells between pit rows
    Corridor,

    /// Both exits from the start are pits
    WalledStart,

    /// Gold enclosed by a pit and the wumpus
    GoldBehindWumpus,

    /// Seeded random map
    Random,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Classic,
            ScenarioId::Corridor,
            ScenarioId::WalledStart,
            ScenarioId::GoldBehindWumpus,
            ScenarioId::Random,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Classic => "classic",
            ScenarioId::Corridor => "corridor",
            ScenarioId::WalledStart => "walled_start",
            ScenarioId::GoldBehindWumpus => "gold_behind_wumpus",
            ScenarioId::Random => "random",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Classic => "4x4 textbook map: three pits, wumpus next to the gold",
            ScenarioId::Corridor => "5x5 snake corridor; every step is breezy",
            ScenarioId::WalledStart => "start boxed in by two pits; must be declared unsolvable",
            ScenarioId::GoldBehindWumpus => "gold reachable only through a pit or the wumpus",
            ScenarioId::Random => "1 wumpus, 1 gold, 3-6 pits drawn from the seed",
        }
    }

    /// Returns the expected ending.
    pub fn expectation(&self) -> Expectation {
        match self {
            ScenarioId::Classic | ScenarioId::Corridor => Expectation::Solvable,
            ScenarioId::WalledStart | ScenarioId::GoldBehindWumpus => Expectation::Unsolvable,
            ScenarioId::Random => Expectation::Any,
        }
    }

    /// Builds the hidden map. `size` only applies to the random scenario.
    pub fn build_world<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Result<WumpusWorld, EnvError> {
        match self {
            ScenarioId::Classic => WumpusWorld::from_rows(&[
                "..PP",
                "WG..",
                "..P.",
                "....",
            ]),
            ScenarioId::Corridor => WumpusWorld::from_rows(&[
                "G....",
                "PPPP.",
                ".....",
                ".PPPP",
                "....W",
            ]),
            ScenarioId::WalledStart => WumpusWorld::from_rows(&[
                "...W",
                "..G.",
                "P...",
                ".P..",
            ]),
            ScenarioId::GoldBehindWumpus => WumpusWorld::from_rows(&[
                "..PG",
                "...W",
                "....",
                "....",
            ]),
            ScenarioId::Random => WumpusWorld::random(size, rng),
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "classic" => Ok(ScenarioId::Classic),
            "corridor" => Ok(ScenarioId::Corridor),
            "walled_start" | "walled" => Ok(ScenarioId::WalledStart),
            "gold_behind_wumpus" => Ok(ScenarioId::GoldBehindWumpus),
            "random" => Ok(ScenarioId::Random),
            "all" => Err("Use --scenario all through the CLI to run every scenario".to_string()),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_names_round_trip() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>(), Ok(id));
        }
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_canned_maps_are_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for id in ScenarioId::all() {
            let world = id.build_world(6, &mut rng).unwrap();
            assert_eq!(world.validate(), Ok(()), "{} is not a valid map", id);
        }
    }
}
