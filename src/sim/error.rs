//! Rejection reasons for grid mutations and player actions
//!
//! Players never see these: a UI treats every `Err` as "ignored". They exist
//! so callers and tests can tell why an input was refused.

use thiserror::Error;

use super::geometry::Cell;
use super::state::Phase;

/// Why the grid refused a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell {0} is outside the board")]
    OutOfBounds(Cell),
    #[error("no piece at {0}")]
    Empty(Cell),
    #[error("cell {0} is occupied")]
    Occupied(Cell),
    #[error("the piece at {0} cannot be displaced")]
    Pinned(Cell),
    #[error("{cells} cells do not fill a {width}x{height} board")]
    Shape { width: i32, height: i32, cells: usize },
}

/// Why the turn engine ignored an input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the game is over")]
    GameOver,
    #[error("action not allowed while {0:?}")]
    WrongPhase(Phase),
    #[error("no piece at {0}")]
    NoPiece(Cell),
    #[error("the piece at {0} belongs to the opponent")]
    NotYourPiece(Cell),
    #[error("the piece at {0} cannot move")]
    Immovable(Cell),
    #[error("the piece at {0} cannot rotate")]
    NotRotatable(Cell),
    #[error("no piece is selected")]
    NoSelection,
    #[error("{0} is not a legal destination")]
    IllegalTarget(Cell),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("no launcher configured for the current player")]
    NoLauncher,
    #[error(transparent)]
    Grid(#[from] GridError),
}
