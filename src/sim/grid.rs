//! Board occupancy
//!
//! The grid is the only authority on where pieces are. It stamps each
//! piece's cached `position` whenever it places one.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::GridError;
use super::geometry::Cell;
use super::piece::{Piece, Player};
use crate::column_label;
use crate::consts::MAX_BOARD_SIDE;

/// What a successful `move_piece` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveEffect {
    /// Destination was empty
    Moved,
    /// Destination occupant was sent back to the source cell
    Swapped,
}

/// Fixed-size board holding at most one piece per cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    width: i32,
    height: i32,
    /// Row-major, `width * height` entries
    cells: Vec<Option<Piece>>,
}

/// Unchecked wire form of `Grid`
#[derive(Deserialize)]
struct GridData {
    width: i32,
    height: i32,
    cells: Vec<Option<Piece>>,
}

impl TryFrom<GridData> for Grid {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        let shape = GridError::Shape {
            width: data.width,
            height: data.height,
            cells: data.cells.len(),
        };
        let side = 0..=MAX_BOARD_SIDE;
        if !side.contains(&data.width) || !side.contains(&data.height) {
            return Err(shape);
        }
        if data.cells.len() != (data.width * data.height) as usize {
            return Err(shape);
        }

        let mut grid = Grid::new(data.width, data.height);
        for (i, piece) in data.cells.into_iter().enumerate() {
            if let Some(piece) = piece {
                let i = i as i32;
                grid.place_piece(Cell::new(i / data.width, i % data.width), piece);
            }
        }
        Ok(grid)
    }
}

impl Grid {
    /// Create an empty board. Each side is clamped to `0..=MAX_BOARD_SIDE`.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.clamp(0, MAX_BOARD_SIDE);
        let height = height.clamp(0, MAX_BOARD_SIDE);
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pure bounds check
    #[inline]
    pub fn is_valid_position(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.height && cell.col >= 0 && cell.col < self.width
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.is_valid_position(cell)
            .then(|| (cell.row * self.width + cell.col) as usize)
    }

    /// Piece on a cell; `None` for empty or off-board cells
    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.index(cell).and_then(|i| self.cells[i].as_ref())
    }

    pub fn piece_at_mut(&mut self, cell: Cell) -> Option<&mut Piece> {
        self.index(cell).and_then(move |i| self.cells[i].as_mut())
    }

    #[inline]
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.piece_at(cell).is_none()
    }

    /// Put a piece on a cell, replacing any occupant. Off-board cells are
    /// ignored.
    pub fn place_piece(&mut self, cell: Cell, mut piece: Piece) {
        if let Some(i) = self.index(cell) {
            piece.position = cell;
            self.cells[i] = Some(piece);
        }
    }

    /// Take a piece off the board
    pub fn remove_piece(&mut self, cell: Cell) -> Option<Piece> {
        self.index(cell).and_then(|i| self.cells[i].take())
    }

    /// Relocate the piece on `from` to `to`.
    ///
    /// An occupied destination is refused unless `allow_swap` is set, in
    /// which case the two pieces trade cells. Pivotal pieces are never
    /// displaced by a swap.
    pub fn move_piece(&mut self, from: Cell, to: Cell, allow_swap: bool) -> Result<MoveEffect, GridError> {
        let src = self.index(from).ok_or(GridError::OutOfBounds(from))?;
        let dst = self.index(to).ok_or(GridError::OutOfBounds(to))?;
        let mut piece = self.cells[src].take().ok_or(GridError::Empty(from))?;

        if src == dst {
            self.cells[src] = Some(piece);
            return Err(GridError::Occupied(to));
        }

        let effect = match self.cells[dst].take() {
            None => MoveEffect::Moved,
            Some(mut other) => {
                if !allow_swap || other.kind.is_pivotal() {
                    let refusal = if allow_swap {
                        GridError::Pinned(to)
                    } else {
                        GridError::Occupied(to)
                    };
                    self.cells[dst] = Some(other);
                    self.cells[src] = Some(piece);
                    return Err(refusal);
                }
                other.position = from;
                self.cells[src] = Some(other);
                MoveEffect::Swapped
            }
        };

        piece.position = to;
        self.cells[dst] = Some(piece);
        Ok(effect)
    }

    /// All pieces in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Cell of the given player's pivotal piece, if still on the board
    pub fn find_pivotal(&self, owner: Player) -> Option<Cell> {
        self.pieces()
            .find(|p| p.owner == owner && p.kind.is_pivotal())
            .map(|p| p.position)
    }
}

impl fmt::Display for Grid {
    /// Text dump: column letters, then one line per row with a
    /// three-character token per cell (`rM2` = red single mirror, facing 2)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.width {
            write!(f, "  {} ", column_label(col))?;
        }
        writeln!(f)?;

        for row in 0..self.height {
            write!(f, "{:>2} ", row + 1)?;
            for col in 0..self.width {
                match self.piece_at(Cell::new(row, col)) {
                    Some(piece) => write!(f, " {}", piece.token())?,
                    None => write!(f, "  . ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
