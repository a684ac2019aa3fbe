//! Laser Board - laser-reflection board game engine
//!
//! Core modules:
//! - `sim`: Deterministic rules (grid, pieces, reflection, ray tracing, turns)
//! - `variant`: Data-driven board layouts and per-variant rule flags
//! - `bot`: One-ply greedy opponent built on cloned engines

pub mod bot;
pub mod sim;
pub mod variant;

pub use bot::GreedyBot;
pub use variant::{Variant, VariantConfig};

/// Game configuration constants
pub mod consts {
    /// Rows on both built-in boards
    pub const BOARD_ROWS: i32 = 8;
    /// Columns on both built-in boards
    pub const BOARD_COLS: i32 = 10;
    /// Largest width or height a board may have (one column letter each)
    pub const MAX_BOARD_SIDE: i32 = 26;

    /// Hard ceiling on cells a single ray may visit. Mirror arrangements can
    /// trap a ray in a closed loop, so every trace stops here.
    pub const MAX_RAY_STEPS: usize = 100;
}

/// Column letter used by board dumps and move descriptions (`0 -> 'A'`)
#[inline]
pub fn column_label(col: i32) -> char {
    u8::try_from(col)
        .ok()
        .filter(|c| *c < 26)
        .map(|c| (b'A' + c) as char)
        .unwrap_or('?')
}
