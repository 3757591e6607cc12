//! Wumpus World Simulation Harness
//!
//! This crate runs the explorer from `wumpus_core` against hidden maps in
//! virtual time, so every run is reproducible from a single 64-bit seed.
//!
//! # Core Principle: one seed, separate streams
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: a virtual clock that jumps straight to the next deadline
//! - **Maps**: random maps are drawn from their own seed stream
//! - **Policy**: tie-breaking draws from another stream, so the two never
//!   perturb each other
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                    │
//! │  ┌─────────────────────────────────────────────────┐  │
//! │  │ SimContext (virtual clock + seeded streams)     │  │
//! │  └─────────────────────────────────────────────────┘  │
//! │                 │ next_wakeup / advance               │
//! │        ┌────────▼──────────┐        events            │
//! │        │ EpisodeController ├──────────────► metrics,  │
//! │        └────────┬──────────┘                 frames   │
//! │                 │ WorldView                           │
//! │        ┌────────▼──────────┐                          │
//! │        │   WumpusWorld     │                          │
//! │        │ (hidden map)      │                          │
//! │        └───────────────────┘                          │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wumpus_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::Classic)?;
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod oracle;
mod runner;
mod world;
pub mod scenarios;

pub use context::{stream_seed, SimContext};
pub use error::SimError;
pub use exporter::{SimExport, SimFrame};
pub use oracle::{Feature, WumpusWorld};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimController, SimWorld, MAP_RNG_STREAM};
