//! One-ply greedy opponent
//!
//! Each legal play is tried on a clone of the engine and scored by what the
//! resulting shot did. The live engine is never touched. Ties are broken
//! with a seeded PCG so a game replays identically from the same seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{Play, Player, ShotOutcome, ShotReport, TurnEngine};

/// Score for winning (or, negated, losing) on the spot
pub const WIN_SCORE: i32 = 1000;
/// Score per non-pivotal piece removed by the shot
pub const PIECE_SCORE: i32 = 10;

#[derive(Debug, Clone)]
pub struct GreedyBot {
    seed: u64,
    rng: Pcg32,
}

impl GreedyBot {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Value of a shot report from `me`'s point of view
    pub fn evaluate(report: &ShotReport, me: Player) -> i32 {
        let outcome = match report.outcome {
            ShotOutcome::Winner(winner) if winner == me => WIN_SCORE,
            ShotOutcome::Winner(_) => -WIN_SCORE,
            ShotOutcome::Continue => 0,
        };
        let material: i32 = report
            .destroyed
            .iter()
            .filter(|piece| !piece.kind.is_pivotal())
            .map(|piece| if piece.owner == me { -PIECE_SCORE } else { PIECE_SCORE })
            .sum();
        outcome + material
    }

    /// Score a play by running it on a throwaway copy. `None` if the engine
    /// refuses it.
    pub fn score(engine: &TurnEngine, play: Play) -> Option<i32> {
        let me = engine.current_player();
        let mut trial = engine.clone();
        trial
            .play(play)
            .ok()
            .map(|report| Self::evaluate(&report, me))
    }

    /// Best play for the side to move, or `None` when there is nothing to play
    pub fn choose(&mut self, engine: &TurnEngine) -> Option<Play> {
        let scored: Vec<(Play, i32)> = engine
            .legal_plays()
            .into_iter()
            .filter_map(|play| Self::score(engine, play).map(|score| (play, score)))
            .collect();

        let best = scored.iter().map(|(_, score)| *score).max()?;
        let candidates: Vec<Play> = scored
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(play, _)| play)
            .collect();

        let pick = candidates[self.rng.random_range(0..candidates.len())];
        log::debug!(
            "{} bot picks {:?} (score {}, {} tied)",
            engine.current_player().as_str(),
            pick,
            best,
            candidates.len()
        );
        Some(pick)
    }
}
