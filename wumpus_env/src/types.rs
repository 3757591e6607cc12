//! Common types shared between the world and the explorer.

use serde::{Deserialize, Serialize};

/// A grid cell coordinate.
///
/// `x` grows to the right, `y` grows downward; the start cell sits in the
/// bottom-left corner at `(0, N-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// The four orthogonal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in neighbor-enumeration order.
    ///
    /// The order is significant: deterministic tie-breaking picks the first
    /// candidate in this order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the (dx, dy) offset.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// A cell property that ends the episode when entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hazard {
    /// Bottomless pit, announced by a breeze next to it
    Pit,

    /// The wumpus, announced by a stench next to it
    Wumpus,
}

impl Hazard {
    /// Returns the hazard name.
    pub fn name(&self) -> &'static str {
        match self {
            Hazard::Pit => "pit",
            Hazard::Wumpus => "wumpus",
        }
    }

    /// Returns the warning sensed next to this hazard.
    pub fn warning(&self) -> &'static str {
        match self {
            Hazard::Pit => "breeze",
            Hazard::Wumpus => "stench",
        }
    }
}

impl std::fmt::Display for Hazard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ground-truth facts of one world cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFacts {
    pub pit: bool,
    pub wumpus: bool,
    pub gold: bool,
}

impl CellFacts {
    /// Returns true if nothing occupies the cell.
    pub fn is_empty(&self) -> bool {
        !self.pit && !self.wumpus && !self.gold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("r".parse::<Direction>(), Ok(Direction::Right));
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn test_coord_display() {
        assert_eq!(Coord::new(2, 5).to_string(), "(2,5)");
    }
}
