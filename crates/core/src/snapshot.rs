use crate::types::{Difficulty, SessionPhase, SymbolId, COUNTDOWN_START};

/// What the presentation layer may show for one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardFace {
    Hidden,
    /// Face up, not yet resolved
    Revealed(SymbolId),
    Matched(SymbolId),
}

impl CardFace {
    pub fn is_visible(&self) -> bool {
        !matches!(self, CardFace::Hidden)
    }

    /// Symbol if face up, `None` while hidden
    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            CardFace::Hidden => None,
            CardFace::Revealed(s) | CardFace::Matched(s) => Some(*s),
        }
    }
}

/// Read-only view of a session, produced after every mutation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub difficulty: Difficulty,
    pub generation: u32,
    pub cards: Vec<CardFace>,
    pub matched: u32,
    pub score: u32,
    pub combo: u32,
    pub time_left: u32,
    pub countdown: u8,
    pub final_score: Option<u32>,
}

impl SessionSnapshot {
    pub fn playable(&self) -> bool {
        self.phase.accepts_flips()
    }

    /// Symbols (or `None`) in deck order
    pub fn visibility(&self) -> Vec<Option<SymbolId>> {
        self.cards.iter().map(CardFace::symbol).collect()
    }
}

/// Same view a fresh default session reports before its first tick
impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Countdown {
                remaining: COUNTDOWN_START,
            },
            difficulty: Difficulty::default(),
            generation: 0,
            cards: Vec::new(),
            matched: 0,
            score: 0,
            combo: 0,
            time_left: Difficulty::default().time_limit_secs(),
            countdown: COUNTDOWN_START,
            final_score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_a_reachable_phase() {
        let snap = SessionSnapshot::default();
        assert_eq!(
            snap.phase,
            SessionPhase::Countdown {
                remaining: COUNTDOWN_START
            }
        );
        assert_eq!(snap.countdown, snap.phase.countdown());
        assert!(!snap.playable());
        assert!(snap.visibility().is_empty());
    }
}
