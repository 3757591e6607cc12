//! Small hand-built maps and a virtual clock for unit tests.

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wumpus_env::{Coord, EpisodeContext, WorldView};

/// Fixed map with the start in the bottom-left corner.
#[derive(Debug, Clone)]
pub struct FixtureWorld {
    size: usize,
    start: Coord,
    pits: Vec<Coord>,
    wumpus: Vec<Coord>,
    gold: Vec<Coord>,
}

impl FixtureWorld {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            start: Coord::new(0, size.saturating_sub(1)),
            pits: Vec::new(),
            wumpus: Vec::new(),
            gold: Vec::new(),
        }
    }

    pub fn with_start(mut self, x: usize, y: usize) -> Self {
        self.start = Coord::new(x, y);
        self
    }

    pub fn with_pit(mut self, x: usize, y: usize) -> Self {
        self.pits.push(Coord::new(x, y));
        self
    }

    pub fn with_wumpus(mut self, x: usize, y: usize) -> Self {
        self.wumpus.push(Coord::new(x, y));
        self
    }

    pub fn with_gold(mut self, x: usize, y: usize) -> Self {
        self.gold.push(Coord::new(x, y));
        self
    }
}

impl WorldView for FixtureWorld {
    fn size(&self) -> usize {
        self.size
    }

    fn start(&self) -> Coord {
        self.start
    }

    fn has_pit(&self, at: Coord) -> bool {
        self.pits.contains(&at)
    }

    fn has_wumpus(&self, at: Coord) -> bool {
        self.wumpus.contains(&at)
    }

    fn has_gold(&self, at: Coord) -> bool {
        self.gold.contains(&at)
    }
}

/// Virtual clock context; `sleep` advances time instantly.
pub struct ManualClock {
    now: Mutex<Duration>,
    seed: u64,
}

impl ManualClock {
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Duration::ZERO),
            seed,
        })
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[async_trait]
impl EpisodeContext for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed ^ stream)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
