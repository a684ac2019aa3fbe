//! Ray tracing across the grid
//!
//! A ray starts one cell beyond its launcher and marches cell by cell. Each
//! occupied cell is resolved through `rules::interact`; reflection happens at
//! the struck cell, so the next step leaves that same cell in the new
//! direction. Closed mirror loops are possible, so every trace is bounded by
//! a step ceiling.

use serde::{Deserialize, Serialize};

use super::geometry::{Cell, Direction};
use super::grid::Grid;
use super::piece::Player;
use super::rules::{AbsorberPolicy, EnergyTag, Outcome, interact};

/// How a path segment ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentEnd {
    /// Redirected or recoloured at `end`; the next segment starts there
    Reflected,
    /// Stopped by the piece at `end`
    Absorbed,
    /// The piece at `end` was destroyed
    Destroyed,
    /// The pivotal piece at `end` was struck
    HitPivotal { owner: Player },
    /// Left the board after `end`, or ran out of steps
    Exited,
}

impl SegmentEnd {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SegmentEnd::Reflected)
    }
}

/// A straight run with constant direction and tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub start: Cell,
    pub end: Cell,
    pub direction: Direction,
    pub tag: EnergyTag,
    pub end_kind: SegmentEnd,
}

impl PathSegment {
    /// Number of cells covered, both ends included
    pub fn len(&self) -> usize {
        (self.start.manhattan(self.end) + 1) as usize
    }

    /// Cells from `start` to `end`
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let dir = self.direction;
        (0..self.len()).scan(self.start, move |cell, _| {
            let current = *cell;
            *cell = cell.step(dir);
            Some(current)
        })
    }
}

/// Full result of one shot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayPath {
    /// Launcher the ray was fired from (never part of the path itself)
    pub origin: Cell,
    pub segments: Vec<PathSegment>,
    /// Cells visited, counting a reflecting cell once
    pub steps: usize,
    /// Step ceiling was hit before any natural termination
    pub truncated: bool,
}

impl RayPath {
    /// How the ray ended. A ray that left the board immediately has no
    /// segments and counts as `Exited`.
    pub fn termination(&self) -> SegmentEnd {
        self.segments
            .last()
            .map(|s| s.end_kind)
            .unwrap_or(SegmentEnd::Exited)
    }

    /// Cell and owner of the struck pivotal piece
    pub fn hit_pivotal(&self) -> Option<(Cell, Player)> {
        self.segments.iter().find_map(|s| match s.end_kind {
            SegmentEnd::HitPivotal { owner } => Some((s.end, owner)),
            _ => None,
        })
    }

    /// Cells of pieces the ray destroyed
    pub fn destroyed(&self) -> impl Iterator<Item = Cell> + '_ {
        self.segments
            .iter()
            .filter(|s| s.end_kind == SegmentEnd::Destroyed)
            .map(|s| s.end)
    }

    /// Every visited cell in order, for replaying the shot. A reflecting
    /// cell appears once.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = Vec::with_capacity(self.steps);
        for segment in &self.segments {
            for cell in segment.cells() {
                if cells.last() != Some(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Last cell the ray reached
    pub fn end_cell(&self) -> Option<Cell> {
        self.segments.last().map(|s| s.end)
    }
}

/// Trace a ray fired from `origin` travelling `direction`.
///
/// Always returns within `max_steps` cell visits.
pub fn trace(
    origin: Cell,
    direction: Direction,
    tag: EnergyTag,
    grid: &Grid,
    policy: AbsorberPolicy,
    max_steps: usize,
) -> RayPath {
    let mut path = RayPath {
        origin,
        segments: Vec::new(),
        steps: 0,
        truncated: false,
    };

    let mut dir = direction;
    let mut tag = tag;
    let mut cell = origin.step(dir);
    // Start of the run currently being extended
    let mut run_start: Option<Cell> = None;
    // Last cell added to the current run
    let mut last = origin;

    while path.steps < max_steps {
        if !grid.is_valid_position(cell) {
            if let Some(start) = run_start {
                path.segments.push(PathSegment {
                    start,
                    end: last,
                    direction: dir,
                    tag,
                    end_kind: SegmentEnd::Exited,
                });
            }
            return path;
        }

        path.steps += 1;
        let start = *run_start.get_or_insert(cell);
        last = cell;

        if let Some(piece) = grid.piece_at(cell) {
            let close = move |end_kind: SegmentEnd| PathSegment {
                start,
                end: cell,
                direction: dir,
                tag,
                end_kind,
            };
            match interact(piece, dir, tag, policy) {
                Outcome::Reflected { out, tag: out_tag } => {
                    if out != dir || out_tag != tag {
                        path.segments.push(close(SegmentEnd::Reflected));
                        run_start = Some(cell);
                        dir = out;
                        tag = out_tag;
                    }
                }
                Outcome::Absorbed => {
                    path.segments.push(close(SegmentEnd::Absorbed));
                    return path;
                }
                Outcome::Destroyed => {
                    path.segments.push(close(SegmentEnd::Destroyed));
                    return path;
                }
                Outcome::HitPivotal => {
                    let owner = piece.owner;
                    path.segments.push(close(SegmentEnd::HitPivotal { owner }));
                    return path;
                }
            }
        }

        cell = cell.step(dir);
    }

    log::warn!(
        "Ray from {} hit the {}-step ceiling; treating it as exited",
        origin,
        max_steps
    );
    path.truncated = true;
    if let Some(start) = run_start {
        path.segments.push(PathSegment {
            start,
            end: last,
            direction: dir,
            tag,
            end_kind: SegmentEnd::Exited,
        });
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_RAY_STEPS;
    use crate::sim::geometry::Orientation;
    use crate::sim::piece::{Piece, PieceKind};
    use proptest::prelude::*;

    fn place(grid: &mut Grid, row: i32, col: i32, kind: PieceKind, owner: Player, o: u8) {
        grid.place_piece(Cell::new(row, col), Piece::new(kind, owner, Orientation::new(o)));
    }

    fn fire(grid: &Grid, origin: Cell, dir: Direction) -> RayPath {
        trace(origin, dir, EnergyTag::Red, grid, AbsorberPolicy::ColourParity, MAX_RAY_STEPS)
    }

    #[test]
    fn test_straight_ray_exits() {
        let grid = Grid::new(10, 8);
        let path = fire(&grid, Cell::new(0, 0), Direction::Right);
        assert_eq!(path.segments.len(), 1);
        let seg = path.segments[0];
        assert_eq!(seg.start, Cell::new(0, 1));
        assert_eq!(seg.end, Cell::new(0, 9));
        assert_eq!(seg.len(), 9);
        assert_eq!(path.termination(), SegmentEnd::Exited);
        assert_eq!(path.steps, 9);
        assert!(!path.truncated);
    }

    #[test]
    fn test_launcher_cell_is_never_entered() {
        let mut grid = Grid::new(10, 8);
        place(&mut grid, 0, 0, PieceKind::Launcher, Player::Red, 0);
        let path = fire(&grid, Cell::new(0, 0), Direction::Down);
        assert!(!path.cells().contains(&Cell::new(0, 0)));
        assert_eq!(path.segments[0].start, Cell::new(1, 0));
    }

    #[test]
    fn test_ray_fired_off_board_has_no_segments() {
        let grid = Grid::new(10, 8);
        let path = fire(&grid, Cell::new(0, 0), Direction::Up);
        assert!(path.segments.is_empty());
        assert_eq!(path.termination(), SegmentEnd::Exited);
        assert_eq!(path.end_cell(), None);
    }

    #[test]
    fn test_reflection_continues_from_struck_cell() {
        let mut grid = Grid::new(10, 8);
        place(&mut grid, 0, 3, PieceKind::DoubleMirror, Player::Blue, 1);
        let path = fire(&grid, Cell::new(0, 0), Direction::Right);

        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.segments[0].end, Cell::new(0, 3));
        assert_eq!(path.segments[0].end_kind, SegmentEnd::Reflected);
        assert_eq!(path.segments[1].start, Cell::new(0, 3));
        assert_eq!(path.segments[1].direction, Direction::Down);
        assert_eq!(path.segments[1].end, Cell::new(7, 3));
        // (0,1) (0,2) (0,3) then (1,3)..(7,3)
        assert_eq!(path.cells().len(), 10);
        assert_eq!(path.steps, 10);
    }

    #[test]
    fn test_prism_splits_segment_by_colour() {
        let mut grid = Grid::new(10, 8);
        place(&mut grid, 4, 4, PieceKind::Prism, Player::Blue, 0);
        let path = fire(&grid, Cell::new(4, 0), Direction::Right);
        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.segments[0].tag, EnergyTag::Red);
        assert_eq!(path.segments[1].tag, EnergyTag::Green);
        assert_eq!(path.segments[1].direction, Direction::Right);
    }

    #[test]
    fn test_pass_through_absorber_keeps_one_segment() {
        let mut grid = Grid::new(10, 8);
        // Red absorber lets red light through
        place(&mut grid, 2, 5, PieceKind::Absorber, Player::Red, 0);
        let path = fire(&grid, Cell::new(2, 0), Direction::Right);
        assert_eq!(path.segments.len(), 1);
        assert_eq!(path.termination(), SegmentEnd::Exited);
    }

    #[test]
    fn test_hit_pivotal_reports_owner() {
        let mut grid = Grid::new(10, 8);
        place(&mut grid, 5, 0, PieceKind::Pharaoh, Player::Blue, 0);
        let path = fire(&grid, Cell::new(0, 0), Direction::Down);
        assert_eq!(path.hit_pivotal(), Some((Cell::new(5, 0), Player::Blue)));
        assert_eq!(path.destroyed().count(), 0);
    }

    #[test]
    fn test_destroyed_piece_reported() {
        let mut grid = Grid::new(10, 8);
        place(&mut grid, 0, 4, PieceKind::Anubis, Player::Blue, 1);
        let path = fire(&grid, Cell::new(0, 0), Direction::Right);
        assert_eq!(path.destroyed().collect::<Vec<_>>(), vec![Cell::new(0, 4)]);
        assert_eq!(path.termination(), SegmentEnd::Destroyed);
    }

    /// Four double mirrors forming a closed square loop. The corner at (2,2)
    /// doubles as the launcher cell, which the ray skips on the way out but
    /// strikes on the way back.
    fn loop_grid() -> Grid {
        let mut grid = Grid::new(10, 8);
        place(&mut grid, 2, 5, PieceKind::DoubleMirror, Player::Red, 1); // right -> down
        place(&mut grid, 5, 5, PieceKind::DoubleMirror, Player::Red, 0); // down -> left
        place(&mut grid, 5, 2, PieceKind::DoubleMirror, Player::Red, 1); // left -> up
        place(&mut grid, 2, 2, PieceKind::DoubleMirror, Player::Red, 0); // up -> right
        grid
    }

    #[test]
    fn test_closed_loop_is_truncated() {
        let grid = loop_grid();
        let path = fire(&grid, Cell::new(2, 2), Direction::Right);
        assert!(path.truncated);
        assert_eq!(path.steps, MAX_RAY_STEPS);
        assert_eq!(path.termination(), SegmentEnd::Exited);
        assert!(path.hit_pivotal().is_none());
    }

    #[test]
    fn test_small_ceiling_truncates_straight_ray() {
        let grid = Grid::new(10, 8);
        let path = trace(
            Cell::new(0, 0),
            Direction::Right,
            EnergyTag::Blue,
            &grid,
            AbsorberPolicy::ColourParity,
            3,
        );
        assert!(path.truncated);
        assert_eq!(path.segments[0].end, Cell::new(0, 3));
    }

    fn arbitrary_grid() -> impl Strategy<Value = Grid> {
        let kinds = [
            PieceKind::SingleMirror,
            PieceKind::DoubleMirror,
            PieceKind::Scarab,
            PieceKind::Pyramid,
            PieceKind::Prism,
            PieceKind::Absorber,
            PieceKind::Anubis,
        ];
        proptest::collection::vec((0i32..8, 0i32..10, 0..kinds.len(), 0u8..4), 0..40).prop_map(
            move |placements| {
                let mut grid = Grid::new(10, 8);
                for (row, col, k, o) in placements {
                    place(&mut grid, row, col, kinds[k], Player::Blue, o);
                }
                grid
            },
        )
    }

    proptest! {
        #[test]
        fn prop_trace_terminates_within_ceiling(
            grid in arbitrary_grid(),
            row in 0i32..8,
            dir in 0u8..4,
        ) {
            let path = fire(&grid, Cell::new(row, -1), Direction::from_index(dir));
            prop_assert!(path.steps <= MAX_RAY_STEPS);
            prop_assert!(path.segments.iter().filter(|s| s.end_kind.is_terminal()).count() <= 1);
            prop_assert!(path.hit_pivotal().is_none());
            for cell in path.cells() {
                prop_assert!(grid.is_valid_position(cell));
            }
        }
    }
}
