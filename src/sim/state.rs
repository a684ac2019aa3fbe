//! Turn engine: the game state machine
//!
//! Every input is validated against the current phase and either applied in
//! full or refused with an `ActionError` (leaving state as it was). A move or
//! rotation always ends with the mover's shot; the shot decides whether the
//! turn passes or the game ends.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ActionError;
use super::geometry::{Cell, Orientation};
use super::grid::{Grid, MoveEffect};
use super::piece::{Piece, Player};
use super::ray::{RayPath, trace};
use crate::variant::{ConfigError, Variant, VariantConfig};

/// Current phase of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the current player to pick a piece
    Idle,
    /// A piece is selected, waiting for a destination or rotation
    PieceSelected,
    /// Rotate mode: the next selected piece is turned clockwise
    AwaitingRotationTarget,
    /// The shot is being applied to the board
    ResolvingShot,
    /// A pivotal piece was struck
    GameOver,
}

/// A complete turn, as issued by bots and scripted callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Play {
    Move { from: Cell, to: Cell },
    Rotate { at: Cell, clockwise: bool },
}

/// What a shot decided. Exactly one per shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Continue,
    Winner(Player),
}

/// Everything a resolved shot did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotReport {
    pub shooter: Player,
    pub path: RayPath,
    /// Pieces taken off the board, in path order (a struck pharaoh last)
    pub destroyed: Vec<Piece>,
    pub outcome: ShotOutcome,
}

/// Result of `select_piece`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Piece selected; these are its legal destinations
    Selected(Vec<Cell>),
    /// Rotate mode turned the piece and fired
    Rotated(ShotReport),
}

/// Notifications for the presentation layer, drained with `drain_events`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    NewGame { variant: String },
    PieceSelected { cell: Cell, valid_moves: Vec<Cell> },
    SelectionCleared,
    RotateModeChanged { enabled: bool },
    PieceMoved { from: Cell, to: Cell },
    PieceSwapped { from: Cell, to: Cell },
    PieceRotated { cell: Cell, orientation: Orientation },
    ShotFired { shooter: Player, path: RayPath },
    PieceDestroyed { piece: Piece },
    TurnPassed { next: Player },
    GameOver { winner: Player },
    Undone { player: Player },
}

/// One numbered line of the move history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub number: u32,
    pub player: Player,
    pub description: String,
}

/// State captured just before a move or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Snapshot {
    grid: Grid,
    player: Player,
    log_len: usize,
}

/// Owns one game session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEngine {
    config: VariantConfig,
    grid: Grid,
    current_player: Player,
    phase: Phase,
    selected: Option<Cell>,
    valid_moves: Vec<Cell>,
    winner: Option<Player>,
    last_path: Option<RayPath>,
    snapshot: Option<Snapshot>,
    move_log: Vec<MoveRecord>,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl TurnEngine {
    /// Start a session from a configuration, validating it first
    pub fn new(config: VariantConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Start a session on a built-in variant
    pub fn preset(variant: Variant) -> Self {
        Self::from_valid_config(variant.config())
    }

    fn from_valid_config(config: VariantConfig) -> Self {
        let mut engine = Self {
            grid: config.build_grid(),
            current_player: config.first_player,
            config,
            phase: Phase::Idle,
            selected: None,
            valid_moves: Vec::new(),
            winner: None,
            last_path: None,
            snapshot: None,
            move_log: Vec::new(),
            events: Vec::new(),
        };
        engine.announce_new_game();
        engine
    }

    /// Reset the board to the configured starting layout
    pub fn new_game(&mut self) {
        self.grid = self.config.build_grid();
        self.current_player = self.config.first_player;
        self.phase = Phase::Idle;
        self.selected = None;
        self.valid_moves.clear();
        self.winner = None;
        self.last_path = None;
        self.snapshot = None;
        self.move_log.clear();
        self.events.clear();
        self.announce_new_game();
    }

    fn announce_new_game(&mut self) {
        log::info!(
            "New {} game: {} pieces, {} to move",
            self.config.name,
            self.grid.piece_count(),
            self.current_player.as_str()
        );
        self.events.push(GameEvent::NewGame {
            variant: self.config.name.clone(),
        });
    }

    // === Queries ===

    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn piece_at(&self, cell: Cell) -> Option<&Piece> {
        self.grid.piece_at(cell)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn selected(&self) -> Option<Cell> {
        self.selected
    }

    /// Destinations for the selected piece (empty without a selection)
    pub fn valid_moves(&self) -> &[Cell] {
        &self.valid_moves
    }

    pub fn last_path(&self) -> Option<&RayPath> {
        self.last_path.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn can_undo(&self) -> bool {
        self.snapshot.is_some() && !self.is_game_over()
    }

    pub fn move_log(&self) -> &[MoveRecord] {
        &self.move_log
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Every play the current player could make
    pub fn legal_plays(&self) -> Vec<Play> {
        if !matches!(self.phase, Phase::Idle | Phase::PieceSelected) {
            return Vec::new();
        }

        let mut plays = Vec::new();
        for piece in self.grid.pieces().filter(|p| p.owner == self.current_player) {
            let at = piece.position;
            if piece.kind.is_movable() {
                plays.extend(
                    self.destinations(at)
                        .into_iter()
                        .map(|to| Play::Move { from: at, to }),
                );
            }
            if piece.kind.is_rotatable() {
                plays.push(Play::Rotate { at, clockwise: true });
                plays.push(Play::Rotate { at, clockwise: false });
            }
        }
        plays
    }

    /// Orthogonal neighbours a piece on `from` may step to
    fn destinations(&self, from: Cell) -> Vec<Cell> {
        from.neighbours()
            .into_iter()
            .filter(|&to| self.grid.is_valid_position(to))
            .filter(|&to| match self.grid.piece_at(to) {
                None => true,
                Some(other) => self.config.allow_swap && other.kind.is_movable(),
            })
            .collect()
    }

    // === Inputs ===

    fn ensure_not_over(&self) -> Result<(), ActionError> {
        if self.is_game_over() {
            Err(ActionError::GameOver)
        } else {
            Ok(())
        }
    }

    fn ensure_launcher(&self) -> Result<(), ActionError> {
        self.config
            .launcher(self.current_player)
            .map(|_| ())
            .ok_or(ActionError::NoLauncher)
    }

    /// Own piece on `cell`, or the reason it can't be used
    fn own_piece(&self, cell: Cell) -> Result<&Piece, ActionError> {
        let piece = self.grid.piece_at(cell).ok_or(ActionError::NoPiece(cell))?;
        if piece.owner != self.current_player {
            return Err(ActionError::NotYourPiece(cell));
        }
        Ok(piece)
    }

    /// Select a piece to move. In rotate mode the piece is instead turned
    /// clockwise and the shot fired.
    pub fn select_piece(&mut self, cell: Cell) -> Result<Selection, ActionError> {
        self.ensure_not_over()?;
        match self.phase {
            Phase::AwaitingRotationTarget => {
                return self.rotate_at(cell, true).map(Selection::Rotated);
            }
            Phase::Idle | Phase::PieceSelected => {}
            phase => return Err(ActionError::WrongPhase(phase)),
        }

        let piece = self.own_piece(cell)?;
        if !piece.kind.is_movable() {
            return Err(ActionError::Immovable(cell));
        }

        let valid_moves = self.destinations(cell);
        log::debug!("{} selected {} ({} moves)", self.current_player.as_str(), cell, valid_moves.len());
        self.selected = Some(cell);
        self.valid_moves = valid_moves.clone();
        self.phase = Phase::PieceSelected;
        self.events.push(GameEvent::PieceSelected {
            cell,
            valid_moves: valid_moves.clone(),
        });
        Ok(Selection::Selected(valid_moves))
    }

    fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.events.push(GameEvent::SelectionCleared);
        }
        self.valid_moves.clear();
        if self.phase == Phase::PieceSelected {
            self.phase = Phase::Idle;
        }
    }

    /// Move the selected piece to `to` and fire. An illegal destination
    /// drops the selection.
    pub fn attempt_move(&mut self, to: Cell) -> Result<ShotReport, ActionError> {
        self.ensure_not_over()?;
        if self.phase != Phase::PieceSelected {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let from = self.selected.ok_or(ActionError::NoSelection)?;
        if !self.valid_moves.contains(&to) {
            self.clear_selection();
            return Err(ActionError::IllegalTarget(to));
        }

        self.ensure_launcher()?;
        let kind = self.own_piece(from)?.kind;
        let snapshot = self.take_snapshot();
        let effect = self.grid.move_piece(from, to, self.config.allow_swap)?;
        self.snapshot = Some(snapshot);

        let description = match effect {
            MoveEffect::Moved => {
                self.events.push(GameEvent::PieceMoved { from, to });
                format!("{} {}→{}", kind.as_str(), from, to)
            }
            MoveEffect::Swapped => {
                self.events.push(GameEvent::PieceSwapped { from, to });
                format!("{} {}⇄{}", kind.as_str(), from, to)
            }
        };
        self.record(description);
        self.selected = None;
        self.valid_moves.clear();
        self.resolve_shot()
    }

    /// Rotate the selected piece a quarter turn and fire
    pub fn rotate(&mut self, clockwise: bool) -> Result<ShotReport, ActionError> {
        self.ensure_not_over()?;
        if self.phase != Phase::PieceSelected {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let at = self.selected.ok_or(ActionError::NoSelection)?;
        self.rotate_at(at, clockwise)
    }

    fn rotate_at(&mut self, at: Cell, clockwise: bool) -> Result<ShotReport, ActionError> {
        if !self.own_piece(at)?.kind.is_rotatable() {
            return Err(ActionError::NotRotatable(at));
        }
        self.ensure_launcher()?;

        let snapshot = self.take_snapshot();
        let piece = self.grid.piece_at_mut(at).ok_or(ActionError::NoPiece(at))?;
        piece.rotate(clockwise);
        let (kind, orientation) = (piece.kind, piece.orientation);
        self.snapshot = Some(snapshot);

        self.events.push(GameEvent::PieceRotated { cell: at, orientation });
        let turn = if clockwise { "clockwise" } else { "counter-clockwise" };
        self.record(format!("{} rotated {} ({}°)", kind.as_str(), turn, orientation.degrees()));
        self.selected = None;
        self.valid_moves.clear();
        self.resolve_shot()
    }

    /// Enter or leave rotate mode. Returns whether rotate mode is now on.
    pub fn toggle_rotate_mode(&mut self) -> Result<bool, ActionError> {
        self.ensure_not_over()?;
        let enabled = match self.phase {
            Phase::Idle | Phase::PieceSelected => {
                self.clear_selection();
                self.phase = Phase::AwaitingRotationTarget;
                true
            }
            Phase::AwaitingRotationTarget => {
                self.phase = Phase::Idle;
                false
            }
            phase => return Err(ActionError::WrongPhase(phase)),
        };
        self.events.push(GameEvent::RotateModeChanged { enabled });
        Ok(enabled)
    }

    /// Fire the current player's launcher without moving. Discards the undo
    /// snapshot since the board changes outside a move.
    pub fn fire_shot(&mut self) -> Result<ShotReport, ActionError> {
        self.ensure_not_over()?;
        if self.phase == Phase::ResolvingShot {
            return Err(ActionError::WrongPhase(self.phase));
        }
        self.ensure_launcher()?;

        self.clear_selection();
        self.snapshot = None;
        self.resolve_shot()
    }

    /// Issue a whole turn
    pub fn play(&mut self, play: Play) -> Result<ShotReport, ActionError> {
        self.ensure_not_over()?;
        if !matches!(self.phase, Phase::Idle | Phase::PieceSelected) {
            return Err(ActionError::WrongPhase(self.phase));
        }
        self.ensure_launcher()?;
        match play {
            Play::Move { from, to } => {
                self.select_piece(from)?;
                self.attempt_move(to)
            }
            Play::Rotate { at, clockwise } => self.rotate_at(at, clockwise),
        }
    }

    /// Roll back the last move and its shot. Only one level is kept.
    pub fn undo(&mut self) -> Result<(), ActionError> {
        self.ensure_not_over()?;
        if self.phase == Phase::ResolvingShot {
            return Err(ActionError::WrongPhase(self.phase));
        }
        let snapshot = self.snapshot.take().ok_or(ActionError::NothingToUndo)?;

        self.grid = snapshot.grid;
        self.current_player = snapshot.player;
        self.move_log.truncate(snapshot.log_len);
        self.selected = None;
        self.valid_moves.clear();
        self.last_path = None;
        self.phase = Phase::Idle;

        log::debug!("Undo: {} to move", self.current_player.as_str());
        self.events.push(GameEvent::Undone {
            player: self.current_player,
        });
        Ok(())
    }

    // === Internals ===

    fn take_snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            player: self.current_player,
            log_len: self.move_log.len(),
        }
    }

    fn record(&mut self, description: String) {
        log::debug!("{} {}", self.current_player.as_str(), description);
        self.move_log.push(MoveRecord {
            number: self.move_log.len() as u32 + 1,
            player: self.current_player,
            description,
        });
    }

    /// Trace the current player's ray and apply what it hit
    fn resolve_shot(&mut self) -> Result<ShotReport, ActionError> {
        let shooter = self.current_player;
        let launcher = *self
            .config
            .launcher(shooter)
            .ok_or(ActionError::NoLauncher)?;

        self.phase = Phase::ResolvingShot;
        let path = trace(
            launcher.cell,
            launcher.direction,
            shooter.ray_tag(),
            &self.grid,
            self.config.absorber_policy,
            self.config.max_ray_steps,
        );
        log::debug!(
            "{} fires from {}: {:?} after {} steps",
            shooter.as_str(),
            launcher.cell,
            path.termination(),
            path.steps
        );
        self.events.push(GameEvent::ShotFired {
            shooter,
            path: path.clone(),
        });

        let mut destroyed = Vec::new();
        let struck: Vec<Cell> = path.destroyed().chain(path.hit_pivotal().map(|(cell, _)| cell)).collect();
        for cell in struck {
            if let Some(piece) = self.grid.remove_piece(cell) {
                log::debug!("{} {} destroyed at {}", piece.owner.as_str(), piece.kind.as_str(), cell);
                self.events.push(GameEvent::PieceDestroyed { piece: piece.clone() });
                destroyed.push(piece);
            }
        }

        let outcome = match path.hit_pivotal() {
            Some((_, victim)) => {
                let winner = victim.opponent();
                self.winner = Some(winner);
                self.phase = Phase::GameOver;
                log::info!("{} pharaoh struck, {} wins", victim.as_str(), winner.as_str());
                self.events.push(GameEvent::GameOver { winner });
                ShotOutcome::Winner(winner)
            }
            None => {
                self.current_player = shooter.opponent();
                self.phase = Phase::Idle;
                self.events.push(GameEvent::TurnPassed {
                    next: self.current_player,
                });
                ShotOutcome::Continue
            }
        };

        self.last_path = Some(path.clone());
        Ok(ShotReport {
            shooter,
            path,
            destroyed,
            outcome,
        })
    }

    /// Serialize the whole session (pending events excluded)
    pub fn save_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a session saved with `save_json`. The embedded configuration
    /// is validated and every stored board must match its size.
    pub fn load_json(json: &str) -> Result<Self, ConfigError> {
        let engine: Self = serde_json::from_str(json)?;
        engine.config.validate()?;

        let boards = std::iter::once(&engine.grid).chain(engine.snapshot.as_ref().map(|s| &s.grid));
        for grid in boards {
            if grid.width() != engine.config.width || grid.height() != engine.config.height {
                return Err(ConfigError::InvalidSize {
                    width: grid.width(),
                    height: grid.height(),
                });
            }
        }
        Ok(engine)
    }
}

impl fmt::Display for TurnEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(winner) => writeln!(f, "{}: {} wins", self.config.name, winner.as_str())?,
            None => writeln!(
                f,
                "{}: {} to move ({:?})",
                self.config.name,
                self.current_player.as_str(),
                self.phase
            )?,
        }
        write!(f, "{}", self.grid)
    }
}
