use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use SlideDirection::{Down, Left, Right, Up};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SlideDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SlideDirection {
    pub const ALL: [SlideDirection; 4] = [Up, Down, Left, Right];

    pub fn index(self) -> usize {
        match self {
            Up => 0,
            Down => 1,
            Left => 2,
            Right => 3,
        }
    }

    /// Row and column offset of one step towards the edge tiles are pulled to.
    pub fn step(self) -> (i32, i32) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }
}

impl fmt::Display for SlideDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Up => "up",
            Down => "down",
            Left => "left",
            Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown slide direction '{0}'")]
pub struct ParseDirectionError(String);

impl FromStr for SlideDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "up" => Ok(Up),
            "s" | "down" => Ok(Down),
            "a" | "left" => Ok(Left),
            "d" | "right" => Ok(Right),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// A grid coordinate. Coordinates outside the grid mean "no such cell".
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const INVALID: Cell = Cell { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn neighbour(self, direction: SlideDirection) -> Self {
        let (dr, dc) = direction.step();
        Self::new(self.row + dr, self.col + dc)
    }

    pub fn is_within(self, rows: usize, cols: usize) -> bool {
        self.row >= 0 && (self.row as usize) < rows && self.col >= 0 && (self.col as usize) < cols
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row as i32, col as i32)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
