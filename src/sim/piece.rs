//! Pieces and their owners

use serde::{Deserialize, Serialize};

use super::geometry::{Cell, Orientation};
use super::rules::EnergyTag;

/// One of the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Red,
    Blue,
}

impl Player {
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    /// Colour a freshly fired ray carries
    #[inline]
    pub const fn ray_tag(self) -> EnergyTag {
        match self {
            Player::Red => EnergyTag::Red,
            Player::Blue => EnergyTag::Blue,
        }
    }

    /// Single-letter marker used in board dumps
    pub const fn symbol(self) -> char {
        match self {
            Player::Red => 'r',
            Player::Blue => 'b',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::Red => "Red",
            Player::Blue => "Blue",
        }
    }
}

/// Piece kinds across both variants. `Pharaoh` is the pivotal piece in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    // Laser variant
    SingleMirror,
    DoubleMirror,
    Absorber,
    Prism,
    Launcher,
    // Pharaoh variant
    Pyramid,
    Scarab,
    Anubis,
    // Shared
    Pharaoh,
}

impl PieceKind {
    /// Struck by a ray = game over
    #[inline]
    pub const fn is_pivotal(self) -> bool {
        matches!(self, PieceKind::Pharaoh)
    }

    /// Pharaohs and launchers never leave their cell
    #[inline]
    pub const fn is_movable(self) -> bool {
        !matches!(self, PieceKind::Pharaoh | PieceKind::Launcher)
    }

    #[inline]
    pub const fn is_rotatable(self) -> bool {
        !matches!(self, PieceKind::Pharaoh | PieceKind::Launcher)
    }

    /// Board dump letter (unique per kind)
    pub const fn symbol(self) -> char {
        match self {
            PieceKind::SingleMirror => 'M',
            PieceKind::DoubleMirror => 'D',
            PieceKind::Absorber => 'A',
            PieceKind::Prism => 'P',
            PieceKind::Launcher => 'L',
            PieceKind::Pyramid => 'Y',
            PieceKind::Scarab => 'S',
            PieceKind::Anubis => 'N',
            PieceKind::Pharaoh => 'H',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::SingleMirror => "Single mirror",
            PieceKind::DoubleMirror => "Double mirror",
            PieceKind::Absorber => "Absorber",
            PieceKind::Prism => "Prism",
            PieceKind::Launcher => "Launcher",
            PieceKind::Pyramid => "Pyramid",
            PieceKind::Scarab => "Scarab",
            PieceKind::Anubis => "Anubis",
            PieceKind::Pharaoh => "Pharaoh",
        }
    }
}

/// A piece on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: Player,
    pub orientation: Orientation,
    /// Last cell the grid placed this piece on. The grid is authoritative;
    /// this copy is overwritten on every placement.
    #[serde(default = "unplaced")]
    pub position: Cell,
}

fn unplaced() -> Cell {
    Cell::new(-1, -1)
}

impl Piece {
    pub fn new(kind: PieceKind, owner: Player, orientation: Orientation) -> Self {
        Self {
            kind,
            owner,
            orientation,
            position: unplaced(),
        }
    }

    /// Quarter-turn the piece. Returns false (and changes nothing) for kinds
    /// that ignore rotation.
    pub fn rotate(&mut self, clockwise: bool) -> bool {
        if !self.kind.is_rotatable() {
            return false;
        }
        self.orientation = self.orientation.rotated(clockwise);
        true
    }

    /// Three-character board dump token, e.g. `rM2`
    pub fn token(&self) -> String {
        format!(
            "{}{}{}",
            self.owner.symbol(),
            self.kind.symbol(),
            self.orientation.value()
        )
    }
}
