//! Wumpus Core - Epistemic state and autonomous exploration
//!
//! This library drives an explorer through a hidden hazard grid under partial
//! observability:
//! 1. **Belief**: a per-cell knowledge grid that survives retries
//! 2. **Inference**: a cell without warnings proves its neighbors safe
//! 3. **Decision**: safe-first stepping, backtracking and a frontier BFS
//! 4. **Termination**: a reachability proof that declares a map unsolvable

pub mod agent;
pub mod episode;
pub mod error;
pub mod events;
pub mod geometry;
pub mod knowledge;
pub mod search;
pub mod sensors;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types for convenience
pub use agent::{start_episode, Agent, AgentConfig, MoveKind, StepOutcome, TieBreak, VisitOutcome};
pub use episode::{ControlMode, DeferredAction, EpisodeConfig, EpisodeController, EpisodeState};
pub use error::CoreError;
pub use events::{EpisodeEvent, EventReceiver, EventSender};
pub use geometry::Grid;
pub use knowledge::{BeliefCell, KnowledgeGrid};
pub use sensors::Percept;
