//! Error types for the Wumpus environment abstraction.

use crate::types::Coord;
use thiserror::Error;

/// Errors raised while building, editing or validating a world map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A grid must have at least one cell per side
    #[error("Grid size must be at least 1, got {0}")]
    EmptyGrid(usize),

    /// Coordinate lies outside the N×N grid
    #[error("Cell {coord} is outside a {size}x{size} grid")]
    OutOfBounds { coord: Coord, size: usize },

    /// The explorer's start cell can never hold a hazard or the gold
    #[error("Cannot place anything on the start cell {0}")]
    StartCellReserved(Coord),

    /// Random generation needs cells other than the start
    #[error("A {0}x{0} grid has no room besides the start cell")]
    NoRoom(usize),

    /// Map does not carry exactly one wumpus
    #[error("Map needs exactly 1 wumpus, found {0}")]
    WumpusCount(usize),

    /// Map does not carry exactly one gold
    #[error("Map needs exactly 1 gold, found {0}")]
    GoldCount(usize),
}

impl EnvError {
    /// Creates an out-of-bounds error.
    pub fn out_of_bounds(coord: Coord, size: usize) -> Self {
        Self::OutOfBounds { coord, size }
    }
}
