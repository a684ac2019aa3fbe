//! Grid geometry: cells, cardinal directions and piece orientation
//!
//! Rows grow downward and columns grow rightward, so `Direction::Up` is a
//! row delta of -1. Directions are indexed clockwise starting at `Up`.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::column_label;

/// A board coordinate. Signed so that neighbours of edge cells are
/// representable; the grid decides which cells are on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Cell reached by applying a delta (x = col, y = row)
    #[inline]
    pub fn offset(self, delta: IVec2) -> Self {
        Self {
            row: self.row + delta.y,
            col: self.col + delta.x,
        }
    }

    /// Adjacent cell in the given direction
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir.delta())
    }

    /// The four orthogonal neighbours, clockwise from `Up`
    pub fn neighbours(self) -> [Cell; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// Manhattan distance, used to check single-step moves
    pub fn manhattan(self, other: Cell) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl fmt::Display for Cell {
    /// Column letter followed by the row number counted from 1
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.col), self.row + 1)
    }
}

/// Cardinal travel direction of a ray, or the way a piece faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise order; position in this array is the direction index
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    #[inline]
    pub const fn index(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Index is taken modulo 4
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    #[inline]
    pub const fn rotated_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[inline]
    pub const fn rotated_ccw(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Unit step (x = col delta, y = row delta)
    #[inline]
    pub const fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
        }
    }

    /// True for Up/Down
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

/// Discrete rotation of a piece: 0/90/180/270 degrees clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    pub const NORTH: Orientation = Orientation(0);
    pub const EAST: Orientation = Orientation(1);
    pub const SOUTH: Orientation = Orientation(2);
    pub const WEST: Orientation = Orientation(3);

    /// Wraps any value into `0..=3`
    #[inline]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn degrees(self) -> u16 {
        self.0 as u16 * 90
    }

    /// The direction the piece's front looks toward
    #[inline]
    pub const fn facing(self) -> Direction {
        Direction::from_index(self.0)
    }

    /// Even orientations lie on the `/` diagonal, odd ones on `\`
    #[inline]
    pub const fn is_slash(self) -> bool {
        self.0 % 2 == 0
    }

    /// One quarter turn
    #[inline]
    pub const fn rotated(self, clockwise: bool) -> Self {
        if clockwise {
            Self::new(self.0 + 1)
        } else {
            Self::new(self.0 + 3)
        }
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 4 {
            Ok(Self(value))
        } else {
            Err(format!("orientation must be 0..=3, got {value}"))
        }
    }
}

impl From<Orientation> for u8 {
    fn from(value: Orientation) -> Self {
        value.0
    }
}
