//! Error types for the exploration engine.

use thiserror::Error;
use wumpus_env::Coord;

/// Programming errors caught at construction time.
///
/// Deaths, dead ends and unsolvable maps are outcomes, not errors; they
/// travel as `VisitOutcome`, `StepOutcome` and `EpisodeEvent` values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Grid with no cells
    #[error("Grid size must be at least 1")]
    EmptyGrid,

    /// The world's start cell is not on its own grid
    #[error("Start cell {start} is outside a {size}x{size} grid")]
    StartOutOfBounds { start: Coord, size: usize },

    /// Operation needs an episode but none has been started
    #[error("No episode has been started")]
    NoEpisode,
}
