//! The hidden world as seen through the explorer's boundary.

use crate::types::{CellFacts, Coord, Hazard};

/// Read-only view of the ground-truth map.
///
/// The engine never mutates the world during an episode; it only asks,
/// per cell, which hazards and whether the gold are present. Placing
/// hazards, editing and random generation live behind the implementor.
///
/// # Implementations
///
/// - **Simulation**: `WumpusWorld` in `wumpus_sim`
/// - **Tests**: small fixture maps
pub trait WorldView {
    /// Side length N of the N×N grid.
    fn size(&self) -> usize;

    /// The fixed cell every attempt starts from.
    fn start(&self) -> Coord;

    /// Whether a pit occupies the cell.
    fn has_pit(&self, at: Coord) -> bool;

    /// Whether the wumpus occupies the cell.
    fn has_wumpus(&self, at: Coord) -> bool;

    /// Whether the gold lies in the cell.
    fn has_gold(&self, at: Coord) -> bool;

    /// All three facts for a cell at once.
    fn facts(&self, at: Coord) -> CellFacts {
        CellFacts {
            pit: self.has_pit(at),
            wumpus: self.has_wumpus(at),
            gold: self.has_gold(at),
        }
    }

    /// The hazard that kills the explorer on entry, if any.
    ///
    /// A cell carrying both reports the pit.
    fn hazard_at(&self, at: Coord) -> Option<Hazard> {
        if self.has_pit(at) {
            Some(Hazard::Pit)
        } else if self.has_wumpus(at) {
            Some(Hazard::Wumpus)
        } else {
            None
        }
    }
}

impl<W: WorldView + ?Sized> WorldView for &W {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn start(&self) -> Coord {
        (**self).start()
    }

    fn has_pit(&self, at: Coord) -> bool {
        (**self).has_pit(at)
    }

    fn has_wumpus(&self, at: Coord) -> bool {
        (**self).has_wumpus(at)
    }

    fn has_gold(&self, at: Coord) -> bool {
        (**self).has_gold(at)
    }
}
