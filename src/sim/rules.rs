//! Ray/piece interaction rules
//!
//! `interact` is a pure function of the struck piece, the ray's travel
//! direction and its energy tag. Orientation variants are derived from a
//! single diagonal table plus face rules instead of per-orientation tables:
//! - even orientations lie on `/`, odd ones on `\`
//! - a one-sided mirror's front looks toward `facing` and `facing` turned
//!   counter-clockwise, which is exactly the side the `/` or `\` axis
//!   exposes for that orientation

use serde::{Deserialize, Serialize};

use super::geometry::{Direction, Orientation};
use super::piece::{Piece, PieceKind, Player};

/// Logical colour carried by a ray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTag {
    Red,
    Blue,
    Green,
    Yellow,
}

impl EnergyTag {
    /// Colour after passing through a prism
    #[inline]
    pub const fn through_prism(self) -> Self {
        match self {
            EnergyTag::Red => EnergyTag::Green,
            EnergyTag::Blue => EnergyTag::Yellow,
            EnergyTag::Green => EnergyTag::Blue,
            EnergyTag::Yellow => EnergyTag::Red,
        }
    }

    /// Player whose launcher emits this colour, if any
    #[inline]
    pub const fn player(self) -> Option<Player> {
        match self {
            EnergyTag::Red => Some(Player::Red),
            EnergyTag::Blue => Some(Player::Blue),
            EnergyTag::Green | EnergyTag::Yellow => None,
        }
    }
}

/// How absorbers decide what to stop. The two built-in games disagree, so
/// each variant picks one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorberPolicy {
    /// Absorb rays tagged with the opponent's colour; every other tag
    /// passes straight through
    #[default]
    ColourParity,
    /// Absorb rays hitting the front (same rule as Anubis); any other
    /// hit destroys the absorber
    Facing,
}

/// Result of a ray striking a piece. Exactly one case applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Ray leaves the struck cell travelling `out` with tag `tag`. `out`
    /// equals the incoming direction for straight transmission.
    Reflected { out: Direction, tag: EnergyTag },
    /// Ray stops; the piece is unharmed
    Absorbed,
    /// Ray stops; the piece is removed
    Destroyed,
    /// Ray struck a pivotal piece
    HitPivotal,
}

/// Reflect across the diagonal selected by `orientation`
#[inline]
pub fn diagonal_reflect(orientation: Orientation, incoming: Direction) -> Direction {
    if orientation.is_slash() {
        // `/`: Up <-> Right, Down <-> Left
        match incoming {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Up,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Down,
        }
    } else {
        // `\`: Up <-> Left, Down <-> Right
        match incoming {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Down,
        }
    }
}

/// True when a ray travelling `incoming` strikes the reflective side of a
/// one-sided diagonal mirror
#[inline]
pub fn hits_mirror_face(orientation: Orientation, incoming: Direction) -> bool {
    let from = incoming.opposite();
    let facing = orientation.facing();
    from == facing || from == facing.rotated_ccw()
}

/// True when a ray travelling `incoming` meets the piece head-on, i.e. the
/// ray runs anti-parallel to the piece's facing
#[inline]
pub fn hits_front(orientation: Orientation, incoming: Direction) -> bool {
    incoming == orientation.facing().opposite()
}

/// Resolve a ray striking `piece`
pub fn interact(piece: &Piece, incoming: Direction, tag: EnergyTag, policy: AbsorberPolicy) -> Outcome {
    let orientation = piece.orientation;
    match piece.kind {
        PieceKind::DoubleMirror | PieceKind::Scarab => Outcome::Reflected {
            out: diagonal_reflect(orientation, incoming),
            tag,
        },
        PieceKind::SingleMirror => {
            if hits_mirror_face(orientation, incoming) {
                Outcome::Reflected {
                    out: diagonal_reflect(orientation, incoming),
                    tag,
                }
            } else {
                Outcome::Destroyed
            }
        }
        PieceKind::Pyramid => {
            if hits_front(orientation, incoming) {
                Outcome::Reflected {
                    out: diagonal_reflect(orientation, incoming),
                    tag,
                }
            } else {
                Outcome::Destroyed
            }
        }
        PieceKind::Anubis => shield(orientation, incoming),
        PieceKind::Absorber => match policy {
            AbsorberPolicy::ColourParity => {
                if tag.player() == Some(piece.owner.opponent()) {
                    Outcome::Absorbed
                } else {
                    Outcome::Reflected { out: incoming, tag }
                }
            }
            AbsorberPolicy::Facing => shield(orientation, incoming),
        },
        PieceKind::Prism => Outcome::Reflected {
            out: incoming,
            tag: tag.through_prism(),
        },
        PieceKind::Pharaoh => Outcome::HitPivotal,
        PieceKind::Launcher => Outcome::Absorbed,
    }
}

fn shield(orientation: Orientation, incoming: Direction) -> Outcome {
    if hits_front(orientation, incoming) {
        Outcome::Absorbed
    } else {
        Outcome::Destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_KINDS: [PieceKind; 9] = [
        PieceKind::SingleMirror,
        PieceKind::DoubleMirror,
        PieceKind::Absorber,
        PieceKind::Prism,
        PieceKind::Launcher,
        PieceKind::Pyramid,
        PieceKind::Scarab,
        PieceKind::Anubis,
        PieceKind::Pharaoh,
    ];
    const ALL_TAGS: [EnergyTag; 4] = [
        EnergyTag::Red,
        EnergyTag::Blue,
        EnergyTag::Green,
        EnergyTag::Yellow,
    ];

    fn piece(kind: PieceKind, owner: Player, orientation: u8) -> Piece {
        Piece::new(kind, owner, Orientation::new(orientation))
    }

    #[test]
    fn test_diagonal_table_matches_mirror_geometry() {
        // `/` (orientations 0 and 2)
        let slash = Orientation::NORTH;
        assert_eq!(diagonal_reflect(slash, Direction::Up), Direction::Right);
        assert_eq!(diagonal_reflect(slash, Direction::Right), Direction::Up);
        assert_eq!(diagonal_reflect(slash, Direction::Down), Direction::Left);
        assert_eq!(diagonal_reflect(slash, Direction::Left), Direction::Down);
        // `\` (orientations 1 and 3)
        let backslash = Orientation::EAST;
        assert_eq!(diagonal_reflect(backslash, Direction::Up), Direction::Left);
        assert_eq!(diagonal_reflect(backslash, Direction::Right), Direction::Down);
        assert_eq!(diagonal_reflect(backslash, Direction::Down), Direction::Right);
        assert_eq!(diagonal_reflect(backslash, Direction::Left), Direction::Up);
    }

    #[test]
    fn test_diagonal_reflection_is_an_involution() {
        for o in 0..4 {
            for dir in Direction::ALL {
                let o = Orientation::new(o);
                let out = diagonal_reflect(o, dir);
                assert_ne!(out, dir);
                assert_ne!(out, dir.opposite());
                // Reversing the outgoing ray retraces the incoming one
                assert_eq!(diagonal_reflect(o, out.opposite()), dir.opposite());
            }
        }
    }

    #[test]
    fn test_opposite_orientations_share_a_table() {
        for o in 0..2 {
            for dir in Direction::ALL {
                assert_eq!(
                    diagonal_reflect(Orientation::new(o), dir),
                    diagonal_reflect(Orientation::new(o + 2), dir)
                );
            }
        }
    }

    #[test]
    fn test_single_mirror_front_and_back() {
        // Orientation 3 is `\` with its face toward Left and Down
        let mirror = piece(PieceKind::SingleMirror, Player::Red, 3);
        assert_eq!(
            interact(&mirror, Direction::Right, EnergyTag::Red, AbsorberPolicy::ColourParity),
            Outcome::Reflected { out: Direction::Down, tag: EnergyTag::Red }
        );
        assert_eq!(
            interact(&mirror, Direction::Up, EnergyTag::Red, AbsorberPolicy::ColourParity),
            Outcome::Reflected { out: Direction::Left, tag: EnergyTag::Red }
        );
        // Back side
        assert_eq!(
            interact(&mirror, Direction::Left, EnergyTag::Red, AbsorberPolicy::ColourParity),
            Outcome::Destroyed
        );
        assert_eq!(
            interact(&mirror, Direction::Down, EnergyTag::Red, AbsorberPolicy::ColourParity),
            Outcome::Destroyed
        );
    }

    #[test]
    fn test_single_mirror_reflects_exactly_two_directions() {
        for o in 0..4 {
            let mirror = piece(PieceKind::SingleMirror, Player::Blue, o);
            let reflected = Direction::ALL
                .iter()
                .filter(|d| {
                    matches!(
                        interact(&mirror, **d, EnergyTag::Blue, AbsorberPolicy::ColourParity),
                        Outcome::Reflected { .. }
                    )
                })
                .count();
            assert_eq!(reflected, 2, "orientation {o}");
        }
    }

    #[test]
    fn test_double_mirror_and_scarab_never_break() {
        for kind in [PieceKind::DoubleMirror, PieceKind::Scarab] {
            for o in 0..4 {
                for dir in Direction::ALL {
                    let p = piece(kind, Player::Red, o);
                    let outcome = interact(&p, dir, EnergyTag::Blue, AbsorberPolicy::Facing);
                    assert!(matches!(outcome, Outcome::Reflected { .. }));
                }
            }
        }
    }

    #[test]
    fn test_pyramid_reflects_only_head_on() {
        let pyramid = piece(PieceKind::Pyramid, Player::Blue, 0);
        // Facing north: only a downward ray meets the face
        assert_eq!(
            interact(&pyramid, Direction::Down, EnergyTag::Red, AbsorberPolicy::Facing),
            Outcome::Reflected { out: Direction::Left, tag: EnergyTag::Red }
        );
        for dir in [Direction::Up, Direction::Left, Direction::Right] {
            assert_eq!(
                interact(&pyramid, dir, EnergyTag::Red, AbsorberPolicy::Facing),
                Outcome::Destroyed
            );
        }
    }

    #[test]
    fn test_anubis_shield() {
        let anubis = piece(PieceKind::Anubis, Player::Red, 1);
        // Facing east: a leftward ray hits the shield
        assert_eq!(
            interact(&anubis, Direction::Left, EnergyTag::Blue, AbsorberPolicy::ColourParity),
            Outcome::Absorbed
        );
        assert_eq!(
            interact(&anubis, Direction::Right, EnergyTag::Blue, AbsorberPolicy::ColourParity),
            Outcome::Destroyed
        );
        assert_eq!(
            interact(&anubis, Direction::Down, EnergyTag::Blue, AbsorberPolicy::ColourParity),
            Outcome::Destroyed
        );
    }

    #[test]
    fn test_absorber_colour_parity() {
        let absorber = piece(PieceKind::Absorber, Player::Red, 0);
        let policy = AbsorberPolicy::ColourParity;
        assert_eq!(
            interact(&absorber, Direction::Right, EnergyTag::Blue, policy),
            Outcome::Absorbed
        );
        // Own colour and prism colours pass straight through
        for tag in [EnergyTag::Red, EnergyTag::Green, EnergyTag::Yellow] {
            assert_eq!(
                interact(&absorber, Direction::Right, tag, policy),
                Outcome::Reflected { out: Direction::Right, tag }
            );
        }
    }

    #[test]
    fn test_absorber_facing_policy() {
        let absorber = piece(PieceKind::Absorber, Player::Red, 2);
        let policy = AbsorberPolicy::Facing;
        assert_eq!(interact(&absorber, Direction::Up, EnergyTag::Red, policy), Outcome::Absorbed);
        assert_eq!(interact(&absorber, Direction::Down, EnergyTag::Blue, policy), Outcome::Destroyed);
    }

    #[test]
    fn test_prism_recolours_cycle() {
        let prism = piece(PieceKind::Prism, Player::Blue, 0);
        let mut tag = EnergyTag::Red;
        let mut seen = Vec::new();
        for _ in 0..4 {
            match interact(&prism, Direction::Left, tag, AbsorberPolicy::ColourParity) {
                Outcome::Reflected { out, tag: next } => {
                    assert_eq!(out, Direction::Left);
                    seen.push(next);
                    tag = next;
                }
                other => panic!("prism should transmit, got {other:?}"),
            }
        }
        assert_eq!(
            seen,
            vec![EnergyTag::Green, EnergyTag::Blue, EnergyTag::Yellow, EnergyTag::Red]
        );
    }

    #[test]
    fn test_pharaoh_and_launcher() {
        for dir in Direction::ALL {
            let pharaoh = piece(PieceKind::Pharaoh, Player::Red, 0);
            let launcher = piece(PieceKind::Launcher, Player::Blue, 0);
            assert_eq!(
                interact(&pharaoh, dir, EnergyTag::Red, AbsorberPolicy::ColourParity),
                Outcome::HitPivotal
            );
            assert_eq!(
                interact(&launcher, dir, EnergyTag::Red, AbsorberPolicy::ColourParity),
                Outcome::Absorbed
            );
        }
    }

    fn any_piece() -> impl Strategy<Value = Piece> {
        (0..ALL_KINDS.len(), any::<bool>(), 0u8..4).prop_map(|(k, red, o)| {
            let owner = if red { Player::Red } else { Player::Blue };
            piece(ALL_KINDS[k], owner, o)
        })
    }

    proptest! {
        #[test]
        fn prop_interact_is_deterministic(
            p in any_piece(),
            dir in 0u8..4,
            tag in 0..ALL_TAGS.len(),
            facing_policy in any::<bool>(),
        ) {
            let policy = if facing_policy { AbsorberPolicy::Facing } else { AbsorberPolicy::ColourParity };
            let dir = Direction::from_index(dir);
            let first = interact(&p, dir, ALL_TAGS[tag], policy);
            let second = interact(&p.clone(), dir, ALL_TAGS[tag], policy);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_reflections_never_reverse_or_stall(
            p in any_piece(),
            dir in 0u8..4,
            tag in 0..ALL_TAGS.len(),
        ) {
            let dir = Direction::from_index(dir);
            if let Outcome::Reflected { out, .. } = interact(&p, dir, ALL_TAGS[tag], AbsorberPolicy::ColourParity) {
                prop_assert_ne!(out, dir.opposite());
            }
        }
    }
}
