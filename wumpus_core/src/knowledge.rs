//! The belief store: what the explorer knows about every cell.
//!
//! Stored as a flat row-major array so the whole grid can be carried from
//! one attempt to the next and only the per-attempt marks reset.

use crate::geometry::Grid;
use serde::{Deserialize, Serialize};
use wumpus_env::Coord;

/// The explorer's epistemic record for one grid coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefCell {
    /// Physically occupied at some point in this episode family
    pub visited: bool,

    /// Breeze or stench present on the last visit
    pub warning_sensed: bool,

    /// Ever sensed a breeze here (persists across retries)
    pub breeze_mark: bool,

    /// Ever sensed a stench here (persists across retries)
    pub stench_mark: bool,

    /// Deduced safe; never retracted
    pub safe_inferred: bool,

    /// A hazard was encountered here; never cleared
    pub danger_confirmed: bool,

    /// Died here during the current attempt only
    pub died_here: bool,

    /// Raw breeze reading from the last visit
    pub breeze_flag: bool,

    /// Raw stench reading from the last visit
    pub stench_flag: bool,
}

impl BeliefCell {
    /// Cells with a confirmed hazard are never entered by the policy.
    pub fn is_allowed(&self) -> bool {
        !self.danger_confirmed
    }

    /// One-character summary used in logs and exports.
    ///
    /// `X` died here, `!` known hazard, `W` breeze+stench, `B` breeze,
    /// `S` stench, `.` visited quiet, `s` inferred safe, `?` unknown.
    pub fn glyph(&self) -> char {
        if self.died_here {
            'X'
        } else if self.danger_confirmed {
            '!'
        } else if self.visited {
            match (self.breeze_mark, self.stench_mark) {
                (true, true) => 'W',
                (true, false) => 'B',
                (false, true) => 'S',
                (false, false) => '.',
            }
        } else if self.safe_inferred {
            's'
        } else {
            '?'
        }
    }
}

/// N×N grid of belief cells owned by one explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGrid {
    grid: Grid,
    cells: Vec<BeliefCell>,
}

impl KnowledgeGrid {
    /// Creates an empty belief store: nothing visited, nothing inferred.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            cells: vec![BeliefCell::default(); grid.cell_count()],
        }
    }

    /// The geometry this store covers.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Belief for a cell.
    pub fn get(&self, at: Coord) -> &BeliefCell {
        &self.cells[self.grid.index(at)]
    }

    /// Mutable belief for a cell.
    pub fn get_mut(&mut self, at: Coord) -> &mut BeliefCell {
        let idx = self.grid.index(at);
        &mut self.cells[idx]
    }

    /// Iterates all cells with their coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &BeliefCell)> {
        let grid = self.grid;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (grid.coord(i), cell))
    }

    /// Forgets where the explorer died this attempt.
    ///
    /// Every other field is left untouched; this is what makes a retry
    /// informative.
    pub fn clear_attempt_marks(&mut self) {
        for cell in &mut self.cells {
            cell.died_here = false;
        }
    }

    /// Number of cells physically visited.
    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|c| c.visited).count()
    }

    /// Cells known to hold a hazard.
    pub fn confirmed_dangers(&self) -> Vec<Coord> {
        self.iter()
            .filter(|(_, c)| c.danger_confirmed)
            .map(|(at, _)| at)
            .collect()
    }

    /// Fraction of the grid visited, in [0, 1].
    pub fn coverage(&self) -> f64 {
        self.visited_count() as f64 / self.grid.cell_count() as f64
    }

    /// Renders the grid as one glyph string per row, top row first.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.grid.size())
            .map(|row| row.iter().map(BeliefCell::glyph).collect())
            .collect()
    }
}
