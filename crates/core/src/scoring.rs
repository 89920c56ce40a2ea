//! Scoring module - match points with a combo multiplier
//!
//! Rules:
//! - A match is worth `MATCH_BASE_POINTS + combo * COMBO_STEP_POINTS`, where `combo` is the
//!   value before this match, and then the combo grows by one.
//! - A mismatch resets the combo to zero. It never takes points away.

use crate::types::{COMBO_STEP_POINTS, MATCH_BASE_POINTS};

/// Points for a match made with `combo` consecutive matches behind it
pub fn match_points(combo: u32) -> u32 {
    MATCH_BASE_POINTS.saturating_add(combo.saturating_mul(COMBO_STEP_POINTS))
}

/// Total after `matches` consecutive matches from a zero combo
pub fn streak_total(matches: u32) -> u32 {
    (0..matches).fold(0u32, |acc, k| acc.saturating_add(match_points(k)))
}

/// Running score and combo counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScoreState {
    total: u32,
    combo: u32,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Record a match and return the points it earned
    pub fn on_match(&mut self) -> u32 {
        let points = match_points(self.combo);
        self.total = self.total.saturating_add(points);
        self.combo = self.combo.saturating_add(1);
        points
    }

    pub fn on_mismatch(&mut self) {
        self.combo = 0;
    }
}
