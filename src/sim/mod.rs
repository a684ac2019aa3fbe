//! Deterministic rules module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - No rendering, timing or platform dependencies
//! - Every shot resolves synchronously
//! - Speculative evaluation works on clones only

pub mod error;
pub mod geometry;
pub mod grid;
pub mod piece;
pub mod ray;
pub mod rules;
pub mod state;

pub use error::{ActionError, GridError};
pub use geometry::{Cell, Direction, Orientation};
pub use grid::{Grid, MoveEffect};
pub use piece::{Piece, PieceKind, Player};
pub use ray::{PathSegment, RayPath, SegmentEnd, trace};
pub use rules::{AbsorberPolicy, EnergyTag, Outcome, interact};
pub use state::{GameEvent, MoveRecord, Phase, Play, Selection, ShotOutcome, ShotReport, TurnEngine};
