//! Ground truth map for simulation.
//!
//! The oracle holds the hidden facts of every cell. The explorer only ever
//! sees it through `WorldView`; the harness edits it through the editor
//! operations below before an episode starts.

use rand::Rng;
use serde::{Deserialize, Serialize};
use wumpus_env::{CellFacts, Coord, EnvError, WorldView};

/// Pit placement gives up after this many rejected draws.
const PIT_PLACEMENT_TRIES: usize = 500;

/// Something that can be placed on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Pit,
    Wumpus,
    Gold,
}

/// An N×N hidden map with the start in the bottom-left corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WumpusWorld {
    size: usize,
    cells: Vec<CellFacts>,
}

impl WumpusWorld {
    /// Creates an empty map.
    pub fn new(size: usize) -> Result<Self, EnvError> {
        if size == 0 {
            return Err(EnvError::EmptyGrid(size));
        }
        Ok(Self {
            size,
            cells: vec![CellFacts::default(); size * size],
        })
    }

    /// Generates a map with one wumpus, one gold and 3 to 6 pits, none of
    /// them on the start cell.
    ///
    /// Pits that cannot find a free cell are skipped, so small grids may
    /// carry fewer.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, EnvError> {
        let mut world = Self::new(size)?;
        if size < 2 {
            return Err(EnvError::NoRoom(size));
        }

        let at = world.random_free_cell(rng);
        world.place_wumpus(at)?;

        // Gold may land on the wumpus; placement clears it, so redraw
        let mut at = world.random_free_cell(rng);
        while world.has_wumpus(at) {
            at = world.random_free_cell(rng);
        }
        world.place_gold(at)?;

        let pits = rng.gen_range(3..=6);
        for _ in 0..pits {
            for _ in 0..PIT_PLACEMENT_TRIES {
                let at = world.random_free_cell(rng);
                if world.facts(at).is_empty() {
                    world.toggle_pit(at)?;
                    break;
                }
            }
        }
        Ok(world)
    }

    /// Builds a map from glyph rows, top row first.
    ///
    /// `P` pit, `W` wumpus, `G` gold, anything else empty. Rows shorter than
    /// the grid are padded with empty cells.
    pub fn from_rows(rows: &[&str]) -> Result<Self, EnvError> {
        let mut world = Self::new(rows.len())?;
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().take(world.size).enumerate() {
                let at = Coord::new(x, y);
                match glyph {
                    'P' => world.toggle_pit(at)?,
                    'W' => world.place_wumpus(at)?,
                    'G' => world.place_gold(at)?,
                    _ => {}
                }
            }
        }
        Ok(world)
    }

    /// Places the wumpus, removing any previous one and anything on `at`.
    pub fn place_wumpus(&mut self, at: Coord) -> Result<(), EnvError> {
        let i = self.editable(at)?;
        for cell in &mut self.cells {
            cell.wumpus = false;
        }
        self.cells[i] = CellFacts {
            wumpus: true,
            ..CellFacts::default()
        };
        Ok(())
    }

    /// Places the gold, removing any previous one and anything on `at`.
    pub fn place_gold(&mut self, at: Coord) -> Result<(), EnvError> {
        let i = self.editable(at)?;
        for cell in &mut self.cells {
            cell.gold = false;
        }
        self.cells[i] = CellFacts {
            gold: true,
            ..CellFacts::default()
        };
        Ok(())
    }

    /// Adds or removes a pit. Adding one clears the wumpus and gold on `at`.
    pub fn toggle_pit(&mut self, at: Coord) -> Result<(), EnvError> {
        let i = self.editable(at)?;
        let cell = &mut self.cells[i];
        if cell.pit {
            cell.pit = false;
        } else {
            *cell = CellFacts {
                pit: true,
                ..CellFacts::default()
            };
        }
        Ok(())
    }

    /// Removes everything from `at`.
    pub fn erase(&mut self, at: Coord) -> Result<(), EnvError> {
        let i = self.editable(at)?;
        self.cells[i] = CellFacts::default();
        Ok(())
    }

    /// Removes everything from every cell.
    pub fn clear(&mut self) {
        self.cells.fill(CellFacts::default());
    }

    /// Number of cells carrying `feature`.
    pub fn count(&self, feature: Feature) -> usize {
        self.cells
            .iter()
            .filter(|c| match feature {
                Feature::Pit => c.pit,
                Feature::Wumpus => c.wumpus,
                Feature::Gold => c.gold,
            })
            .count()
    }

    /// Checks that the map carries exactly one wumpus and one gold.
    pub fn validate(&self) -> Result<(), EnvError> {
        let wumpus = self.count(Feature::Wumpus);
        if wumpus != 1 {
            return Err(EnvError::WumpusCount(wumpus));
        }
        let gold = self.count(Feature::Gold);
        if gold != 1 {
            return Err(EnvError::GoldCount(gold));
        }
        Ok(())
    }

    /// One string per row, top first: `P`, `W`, `G` or `.`; `A` marks the start.
    pub fn rows(&self) -> Vec<String> {
        (0..self.size)
            .map(|y| {
                (0..self.size)
                    .map(|x| {
                        let at = Coord::new(x, y);
                        let c = self.cells[self.index(at)];
                        if at == self.start() {
                            'A'
                        } else if c.pit {
                            'P'
                        } else if c.wumpus {
                            'W'
                        } else if c.gold {
                            'G'
                        } else {
                            '.'
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn index(&self, at: Coord) -> usize {
        at.y * self.size + at.x
    }

    fn editable(&self, at: Coord) -> Result<usize, EnvError> {
        if at.x >= self.size || at.y >= self.size {
            return Err(EnvError::out_of_bounds(at, self.size));
        }
        if at == self.start() {
            return Err(EnvError::StartCellReserved(at));
        }
        Ok(self.index(at))
    }

    fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord {
        loop {
            let at = Coord::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size));
            if at != self.start() {
                return at;
            }
        }
    }

    fn lookup(&self, at: Coord) -> Option<&CellFacts> {
        if at.x < self.size && at.y < self.size {
            self.cells.get(self.index(at))
        } else {
            None
        }
    }
}

impl WorldView for WumpusWorld {
    fn size(&self) -> usize {
        self.size
    }

    fn start(&self) -> Coord {
        Coord::new(0, self.size - 1)
    }

    fn has_pit(&self, at: Coord) -> bool {
        self.lookup(at).is_some_and(|c| c.pit)
    }

    fn has_wumpus(&self, at: Coord) -> bool {
        self.lookup(at).is_some_and(|c| c.wumpus)
    }

    fn has_gold(&self, at: Coord) -> bool {
        self.lookup(at).is_some_and(|c| c.gold)
    }
}
