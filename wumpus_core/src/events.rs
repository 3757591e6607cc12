//! Report channel from the episode controller to whoever presents it.

use crate::sensors::Percept;
use serde::Serialize;
use tokio::sync::mpsc;
use wumpus_env::{Coord, Hazard};

/// Sending half of the event channel.
pub type EventSender = mpsc::UnboundedSender<EpisodeEvent>;

/// Receiving half of the event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<EpisodeEvent>;

/// Something observable happened in an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EpisodeEvent {
    /// A fresh explorer was placed on the start cell
    Started { attempt: u32 },

    /// Explorer settled on a safe cell
    Settled { at: Coord, percept: Percept },

    /// Explorer entered a hazard
    Died { at: Coord, cause: Hazard },

    /// Explorer found the gold
    Won { at: Coord },

    /// Step policy found nothing to do
    NoMovesAvailable { at: Coord },

    /// No unexplored cell is reachable from the start; retries stop for good
    MapUnsolvable,

    /// A retry-with-memory will run after `delay_ms`
    RetryScheduled { attempt: u32, delay_ms: u64 },

    /// A retry-with-memory began
    Restarted { attempt: u32 },

    /// Marker moved back to the start after a win
    ReturnedToStart,

    /// Periodic automatic stepping began
    RunnerStarted,

    /// Periodic automatic stepping stopped
    RunnerStopped,
}

impl EpisodeEvent {
    /// True for events that end an attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EpisodeEvent::Died { .. }
                | EpisodeEvent::Won { .. }
                | EpisodeEvent::NoMovesAvailable { .. }
                | EpisodeEvent::MapUnsolvable
        )
    }
}

impl std::fmt::Display for EpisodeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EpisodeEvent::Started { attempt } => write!(f, "Episode started (attempt {})", attempt),
            EpisodeEvent::Settled { at, percept } if percept.any() => {
                write!(f, "At {}. You sense {}.", at, percept)
            }
            EpisodeEvent::Settled { at, .. } => {
                write!(f, "At {}. You sense nothing: neighbors marked safe.", at)
            }
            EpisodeEvent::Died { at, cause } => match cause {
                Hazard::Pit => write!(f, "Died at {}: fell into a pit", at),
                Hazard::Wumpus => write!(f, "Died at {}: met the wumpus", at),
            },
            EpisodeEvent::Won { at } => write!(f, "Found the gold at {}", at),
            EpisodeEvent::NoMovesAvailable { at } => {
                write!(f, "No available moves from {}; map likely unsolvable", at)
            }
            EpisodeEvent::MapUnsolvable => {
                write!(f, "No solution: every alternative is exhausted")
            }
            EpisodeEvent::RetryScheduled { attempt, delay_ms } => {
                write!(f, "Retrying with memory in {}ms (attempt {})", delay_ms, attempt)
            }
            EpisodeEvent::Restarted { attempt } => write!(f, "Restarted with memory (attempt {})", attempt),
            EpisodeEvent::ReturnedToStart => write!(f, "Back at the start"),
            EpisodeEvent::RunnerStarted => write!(f, "Auto runner started"),
            EpisodeEvent::RunnerStopped => write!(f, "Auto runner stopped"),
        }
    }
}
