//! Wumpus Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the explorer
//! engine to run in both **Production** (tokio) and **Simulation**
//! (virtual clock) environments.
//!
//! # Core Concept: The Reactor Pattern
//!
//! Everything the engine needs from the outside world is intercepted:
//! - Time (`now()`, `sleep()`)
//! - Randomness (`derive_rng()`)
//! - The hidden map (`WorldView`)
//!
//! By deriving all entropy from a single 64-bit seed, any exploration run
//! becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use wumpus_env::{EpisodeContext, WorldView};
//!
//! async fn pace<Ctx: EpisodeContext>(ctx: &Ctx, tick: Duration) {
//!     loop {
//!         ctx.sleep(tick).await;
//!         step();
//!     }
//! }
//! ```

mod context;
mod world;
mod types;
mod error;
mod tokio_impl;

pub use context::EpisodeContext;
pub use world::WorldView;
pub use types::{CellFacts, Coord, Direction, Hazard};
pub use error::EnvError;
pub use tokio_impl::TokioContext;
