//! Board variants and their configuration
//!
//! Geometry, starting layout, launchers and rule flags are plain data loaded
//! at session start. Two presets reproduce the built-in games; anything else
//! can be supplied as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BOARD_COLS, BOARD_ROWS, MAX_BOARD_SIDE, MAX_RAY_STEPS};
use crate::sim::{AbsorberPolicy, Cell, Direction, Grid, Orientation, Piece, PieceKind, Player};

/// Built-in variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Mirrors, prisms, colour-keyed absorbers, launcher pieces
    #[default]
    Laser,
    /// Pyramids, scarabs and anubis guards; moves may swap pieces
    Pharaoh,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Laser => "laser",
            Variant::Pharaoh => "pharaoh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "laser" | "laser-chess" => Some(Variant::Laser),
            "pharaoh" | "khet" => Some(Variant::Pharaoh),
            _ => None,
        }
    }

    /// Full configuration for this preset
    pub fn config(&self) -> VariantConfig {
        match self {
            Variant::Laser => laser_preset(),
            Variant::Pharaoh => pharaoh_preset(),
        }
    }
}

/// Where a player's ray comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherSpec {
    pub owner: Player,
    pub cell: Cell,
    pub direction: Direction,
}

/// One entry of the starting layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub cell: Cell,
    pub kind: PieceKind,
    pub owner: Player,
    #[serde(default)]
    pub orientation: Orientation,
}

/// Problems found while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board size {width}x{height} is not playable")]
    InvalidSize { width: i32, height: i32 },
    #[error("{0} lies outside the board")]
    OutOfBounds(Cell),
    #[error("{0} is occupied twice")]
    DoubleOccupied(Cell),
    #[error("no launcher for {0:?}")]
    MissingLauncher(Player),
    #[error("more than one launcher for {0:?}")]
    DuplicateLauncher(Player),
    #[error("more than one pivotal piece for {0:?}")]
    DuplicatePivotal(Player),
    #[error("max_ray_steps must be positive")]
    NoRaySteps,
}

fn default_max_ray_steps() -> usize {
    MAX_RAY_STEPS
}

fn default_first_player() -> Player {
    Player::Red
}

/// Complete description of a game session's board and rule flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Display name
    pub name: String,
    pub width: i32,
    pub height: i32,

    // === Rule flags ===
    /// Moving onto an occupied non-pivotal cell swaps the two pieces
    #[serde(default)]
    pub allow_swap: bool,
    /// How absorber pieces treat incoming rays
    #[serde(default)]
    pub absorber_policy: AbsorberPolicy,
    /// Step ceiling for every trace
    #[serde(default = "default_max_ray_steps")]
    pub max_ray_steps: usize,
    #[serde(default = "default_first_player")]
    pub first_player: Player,

    // === Layout ===
    pub launchers: Vec<LauncherSpec>,
    pub layout: Vec<Placement>,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Variant::default().config()
    }
}

impl VariantConfig {
    /// A board with no pieces and no launchers
    pub fn empty(name: &str, width: i32, height: i32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            allow_swap: false,
            absorber_policy: AbsorberPolicy::default(),
            max_ray_steps: MAX_RAY_STEPS,
            first_player: Player::Red,
            launchers: Vec::new(),
            layout: Vec::new(),
        }
    }

    /// Add a piece to the layout
    pub fn with_piece(mut self, cell: Cell, kind: PieceKind, owner: Player, orientation: Orientation) -> Self {
        self.layout.push(Placement {
            cell,
            kind,
            owner,
            orientation,
        });
        self
    }

    /// Add a launcher. It only becomes a piece on the board if the layout
    /// also places a `Launcher` there.
    pub fn with_launcher(mut self, owner: Player, cell: Cell, direction: Direction) -> Self {
        self.launchers.push(LauncherSpec {
            owner,
            cell,
            direction,
        });
        self
    }

    pub fn with_swap(mut self, allow_swap: bool) -> Self {
        self.allow_swap = allow_swap;
        self
    }

    pub fn with_absorber_policy(mut self, policy: AbsorberPolicy) -> Self {
        self.absorber_policy = policy;
        self
    }

    /// Launcher belonging to `owner`
    pub fn launcher(&self, owner: Player) -> Option<&LauncherSpec> {
        self.launchers.iter().find(|l| l.owner == owner)
    }

    /// Check the configuration is playable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side = 1..=MAX_BOARD_SIDE;
        if !side.contains(&self.width) || !side.contains(&self.height) {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_ray_steps == 0 {
            return Err(ConfigError::NoRaySteps);
        }

        let grid = Grid::new(self.width, self.height);
        let mut occupied = Vec::with_capacity(self.layout.len());
        for placement in &self.layout {
            if !grid.is_valid_position(placement.cell) {
                return Err(ConfigError::OutOfBounds(placement.cell));
            }
            if occupied.contains(&placement.cell) {
                return Err(ConfigError::DoubleOccupied(placement.cell));
            }
            occupied.push(placement.cell);
        }

        for player in [Player::Red, Player::Blue] {
            let launchers: Vec<_> = self.launchers.iter().filter(|l| l.owner == player).collect();
            match launchers.as_slice() {
                [] => return Err(ConfigError::MissingLauncher(player)),
                [launcher] => {
                    if !grid.is_valid_position(launcher.cell) {
                        return Err(ConfigError::OutOfBounds(launcher.cell));
                    }
                }
                _ => return Err(ConfigError::DuplicateLauncher(player)),
            }

            let pivotal = self
                .layout
                .iter()
                .filter(|p| p.owner == player && p.kind.is_pivotal())
                .count();
            if pivotal > 1 {
                return Err(ConfigError::DuplicatePivotal(player));
            }
        }

        Ok(())
    }

    /// Fresh grid holding the starting layout
    pub fn build_grid(&self) -> Grid {
        let mut grid = Grid::new(self.width, self.height);
        for placement in &self.layout {
            grid.place_piece(
                placement.cell,
                Piece::new(placement.kind, placement.owner, placement.orientation),
            );
        }
        grid
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON configuration from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded variant '{}' from {}", config.name, path.display());
        Ok(config)
    }
}

fn laser_preset() -> VariantConfig {
    use PieceKind::*;
    use Player::*;

    // Mirrors start on `/` for red and the opposite face for blue
    let red_mirror = Orientation::NORTH;
    let blue_mirror = Orientation::SOUTH;
    let none = Orientation::NORTH;

    let pieces: [(i32, i32, PieceKind, Player, Orientation); 18] = [
        (0, 0, Launcher, Red, Orientation::SOUTH),
        (7, 9, Launcher, Blue, Orientation::NORTH),
        (3, 1, Pharaoh, Red, none),
        (4, 8, Pharaoh, Blue, none),
        // Red
        (2, 1, SingleMirror, Red, red_mirror),
        (3, 2, DoubleMirror, Red, red_mirror),
        (4, 1, Absorber, Red, none),
        (2, 2, Prism, Red, none),
        (1, 3, SingleMirror, Red, red_mirror),
        (2, 4, DoubleMirror, Red, red_mirror),
        (3, 3, Absorber, Red, none),
        // Blue
        (3, 8, SingleMirror, Blue, blue_mirror),
        (4, 7, DoubleMirror, Blue, blue_mirror),
        (5, 8, Absorber, Blue, none),
        (5, 7, Prism, Blue, none),
        (6, 6, SingleMirror, Blue, blue_mirror),
        (5, 5, DoubleMirror, Blue, blue_mirror),
        (4, 6, Absorber, Blue, none),
    ];

    let config = VariantConfig::empty("Laser Chess", BOARD_COLS, BOARD_ROWS)
        .with_launcher(Red, Cell::new(0, 0), Direction::Down)
        .with_launcher(Blue, Cell::new(7, 9), Direction::Up)
        .with_absorber_policy(AbsorberPolicy::ColourParity)
        .with_swap(false);

    pieces
        .into_iter()
        .fold(config, |config, (row, col, kind, owner, orientation)| {
            config.with_piece(Cell::new(row, col), kind, owner, orientation)
        })
}

fn pharaoh_preset() -> VariantConfig {
    use PieceKind::*;
    use Player::*;

    let pieces: [(i32, i32, PieceKind, Player, Orientation); 10] = [
        // Red
        (1, 6, Pharaoh, Red, Orientation::NORTH),
        (3, 7, Pyramid, Red, Orientation::NORTH),
        (1, 2, Scarab, Red, Orientation::NORTH),
        (3, 2, Anubis, Red, Orientation::EAST),
        (1, 4, Anubis, Red, Orientation::EAST),
        // Blue
        (6, 3, Pharaoh, Blue, Orientation::SOUTH),
        (4, 2, Pyramid, Blue, Orientation::SOUTH),
        (6, 7, Scarab, Blue, Orientation::SOUTH),
        (6, 5, Anubis, Blue, Orientation::WEST),
        (4, 7, Anubis, Blue, Orientation::WEST),
    ];

    let config = VariantConfig::empty("Pharaoh", BOARD_COLS, BOARD_ROWS)
        .with_launcher(Red, Cell::new(7, 0), Direction::Right)
        .with_launcher(Blue, Cell::new(0, 9), Direction::Left)
        .with_absorber_policy(AbsorberPolicy::Facing)
        .with_swap(true);

    pieces
        .into_iter()
        .fold(config, |config, (row, col, kind, owner, orientation)| {
            config.with_piece(Cell::new(row, col), kind, owner, orientation)
        })
}
