//! Error types for the simulation harness.

use thiserror::Error;
use wumpus_core::CoreError;
use wumpus_env::EnvError;

/// Errors that stop a scenario before or while it runs.
#[derive(Debug, Error)]
pub enum SimError {
    /// The scenario's map could not be built or is not playable
    #[error("Invalid map: {0}")]
    Map(#[from] EnvError),

    /// The controller rejected the map or an operation
    #[error("Episode error: {0}")]
    Episode(#[from] CoreError),

    /// Export file or runtime setup failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
