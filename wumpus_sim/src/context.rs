//! Simulation context implementing EpisodeContext for deterministic runs.

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wumpus_env::EpisodeContext;

/// Simulation context backed by a virtual clock and seeded RNG streams.
///
/// This implements `EpisodeContext` using:
/// - A virtual clock that only moves when told to
/// - Per-stream ChaCha8 generators derived from one master seed
/// - Simulated sleep that advances virtual time
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.lock_time();
        *time += duration.as_nanos() as u64;
    }

    /// Moves virtual time forward to `at`. Never moves it backwards.
    pub fn set_time(&self, at: Duration) {
        let mut time = self.lock_time();
        *time = (*time).max(at.as_nanos() as u64);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.lock_time()
    }

    /// Returns the current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.time_ns() / 1_000_000
    }

    fn lock_time(&self) -> std::sync::MutexGuard<'_, u64> {
        // The guarded value is a plain integer; a poisoned lock still holds it
        self.virtual_time_ns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

/// Seed for one named stream: `master * golden ^ (stream * prime)`.
pub fn stream_seed(master: u64, stream: u64) -> u64 {
    master.wrapping_mul(0x9e3779b97f4a7c15) ^ stream.wrapping_mul(0x517cc1b727220a95)
}

#[async_trait]
impl EpisodeContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        // Sleeping is just moving the clock
        self.advance_time(duration);
    }

    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(stream_seed(self.seed, stream))
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
