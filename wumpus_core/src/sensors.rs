//! Sensor model and the safety-inference rule.

use crate::geometry::Grid;
use crate::knowledge::KnowledgeGrid;
use serde::{Deserialize, Serialize};
use wumpus_env::{Coord, WorldView};

/// Local warnings sensed in a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percept {
    /// A pit is orthogonally adjacent
    pub breeze: bool,

    /// The wumpus is orthogonally adjacent
    pub stench: bool,
}

impl Percept {
    /// True if either warning is present.
    pub fn any(&self) -> bool {
        self.breeze || self.stench
    }
}

impl std::fmt::Display for Percept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.breeze, self.stench) {
            (true, true) => write!(f, "breeze and stench"),
            (true, false) => write!(f, "breeze"),
            (false, true) => write!(f, "stench"),
            (false, false) => write!(f, "nothing"),
        }
    }
}

/// Senses the true world at `at`.
///
/// A warning is present if any in-bounds neighbor carries the matching
/// hazard. Pure function of world and position.
pub fn sense_at<W: WorldView + ?Sized>(grid: &Grid, world: &W, at: Coord) -> Percept {
    let mut percept = Percept::default();
    for n in grid.neighbors(at) {
        if world.has_pit(n) {
            percept.breeze = true;
        }
        if world.has_wumpus(n) {
            percept.stench = true;
        }
    }
    percept
}

/// Applies the safety-inference rule at a safe cell.
///
/// With no warning at `at`, every neighbor is marked `safe_inferred`.
/// The mark is never retracted. Returns how many cells became newly safe.
pub fn infer_safe_neighbors(knowledge: &mut KnowledgeGrid, at: Coord, percept: Percept) -> usize {
    if percept.any() {
        return 0;
    }

    let grid = *knowledge.grid();
    let mut newly_safe = 0;
    for n in grid.neighbors(at) {
        let cell = knowledge.get_mut(n);
        if !cell.safe_inferred {
            cell.safe_inferred = true;
            newly_safe += 1;
        }
    }
    newly_safe
}
