//! Grid geometry: bounds checking and 4-neighbor enumeration.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use wumpus_env::{Coord, Direction, WorldView};

/// An N×N grid with row-major flat indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
}

impl Grid {
    /// Creates a grid; a zero-sized grid is rejected.
    pub fn new(size: usize) -> Result<Self, CoreError> {
        if size == 0 {
            return Err(CoreError::EmptyGrid);
        }
        Ok(Self { size })
    }

    /// The grid of a world whose start cell is known to lie on it.
    pub fn for_world<W: WorldView + ?Sized>(world: &W) -> Result<Self, CoreError> {
        let grid = Self::new(world.size())?;
        let start = world.start();
        if !grid.contains(start) {
            return Err(CoreError::StartOutOfBounds {
                start,
                size: grid.size(),
            });
        }
        Ok(grid)
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells (N²).
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// True iff both coordinates are in [0, N).
    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    /// True iff the coordinate lies on the grid.
    pub fn contains(&self, at: Coord) -> bool {
        at.x < self.size && at.y < self.size
    }

    /// Flat index of a coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `at` is off the grid; callers check with [`Grid::contains`].
    pub fn index(&self, at: Coord) -> usize {
        assert!(self.contains(at), "{} outside {}x{}", at, self.size, self.size);
        at.y * self.size + at.x
    }

    /// Coordinate of a flat index.
    pub fn coord(&self, index: usize) -> Coord {
        Coord::new(index % self.size, index / self.size)
    }

    /// The in-bounds cell one step away, if any.
    pub fn step(&self, from: Coord, direction: Direction) -> Option<Coord> {
        let (dx, dy) = direction.delta();
        let x = from.x as isize + dx;
        let y = from.y as isize + dy;
        self.in_bounds(x, y).then(|| Coord::new(x as usize, y as usize))
    }

    /// In-bounds orthogonal neighbors, always in up, down, left, right order.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> {
        let grid = *self;
        Direction::ALL
            .into_iter()
            .filter_map(move |d| grid.step(at, d))
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let grid = *self;
        (0..self.cell_count()).map(move |i| grid.coord(i))
    }
}
