//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, presentation, controller protocol).
//!
//! # Game Timing Constants
//!
//! All timing is logical and expressed in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 1000 | Period of the clock tick driving both countdowns |
//! | `CLEANUP_DELAY_MS` | 1000 | Delay before unmatched face-up cards are hidden |
//! | `COUNTDOWN_START` | 3 | Pre-game countdown length, in ticks |
//!
//! # Difficulty
//!
//! | Difficulty | Time limit |
//! |------------|------------|
//! | Easy | 180s |
//! | Normal | 120s |
//! | Hard | 60s |
//!
//! # Scoring
//!
//! A match is worth `MATCH_BASE_POINTS + combo * COMBO_STEP_POINTS` where `combo` is the
//! number of consecutive matches made before this one. Any mismatch resets the combo.
//!
//! # Examples
//!
//! ```
//! use card_match_types::{Difficulty, GameAction, SessionPhase, SymbolId};
//!
//! // Parse difficulty (case-insensitive)
//! let difficulty = Difficulty::from_str("HARD").unwrap();
//! assert_eq!(difficulty, Difficulty::Hard);
//! assert_eq!(difficulty.time_limit_secs(), 60);
//!
//! // Reference symbol set: card1..card15
//! let symbols = SymbolId::reference_set();
//! assert_eq!(symbols.len(), 15);
//! assert_eq!(symbols[0].to_string(), "card1");
//!
//! // Actions dispatched by a presentation layer
//! let action = GameAction::Flip(4);
//! assert_eq!(action.as_str(), "flip");
//!
//! assert!(SessionPhase::Won.is_terminal());
//! ```

use std::fmt;

/// Period of the clock tick (1 logical second)
pub const TICK_MS: u32 = 1000;

/// Delay before a mismatched pair (or a peeked third card) is turned face down
pub const CLEANUP_DELAY_MS: u32 = 1000;

/// Pre-game countdown length in ticks
pub const COUNTDOWN_START: u8 = 3;

/// Maximum number of face-up, unmatched cards at any time
pub const MAX_TRANSIENT: usize = 3;

/// Copies of each symbol in a standard deck
pub const PAIRING_FACTOR: usize = 2;

/// Smallest accepted pairing factor
pub const MIN_PAIRING_FACTOR: usize = 2;

/// Number of symbols in the reference configuration
pub const REFERENCE_SYMBOL_COUNT: u16 = 15;

/// Points for a match with no combo
pub const MATCH_BASE_POINTS: u32 = 1000;

/// Additional points per combo step
pub const COMBO_STEP_POINTS: u32 = 300;

/// Play-clock durations in seconds, by difficulty
pub const EASY_TIME_LIMIT_SECS: u32 = 180;
pub const NORMAL_TIME_LIMIT_SECS: u32 = 120;
pub const HARD_TIME_LIMIT_SECS: u32 = 60;


/// Difficulty level, selected before a session starts
///
/// Each level maps to a fixed play-clock duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Parse difficulty from string (case-insensitive, surrounding whitespace ignored)
    ///
    /// # Examples
    ///
    /// ```
    /// use card_match_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("easy"), Some(Difficulty::Easy));
    /// assert_eq!(Difficulty::from_str("Normal"), Some(Difficulty::Normal));
    /// assert_eq!(Difficulty::from_str("impossible"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Play-clock duration in seconds
    pub fn time_limit_secs(&self) -> u32 {
        match self {
            Difficulty::Easy => EASY_TIME_LIMIT_SECS,
            Difficulty::Normal => NORMAL_TIME_LIMIT_SECS,
            Difficulty::Hard => HARD_TIME_LIMIT_SECS,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a card face (the image shown when the card is revealed)
///
/// Displayed as `card<N>`, matching the asset names of the reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u16);

impl SymbolId {
    /// The reference configuration: `card1` through `card15`
    pub fn reference_set() -> Vec<SymbolId> {
        (1..=REFERENCE_SYMBOL_COUNT).map(SymbolId).collect()
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card{}", self.0)
    }
}

/// Session lifecycle phase
///
/// ```text
/// Countdown(3) -> Countdown(2) -> Countdown(1) -> Playing <-> Paused
///                                                  |
///                                                  +-> Won | Lost
/// ```
///
/// `Won` and `Lost` are terminal and are left only through an explicit reset or start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Pre-game countdown; flips are refused
    Countdown { remaining: u8 },
    Playing,
    Paused,
    Won,
    Lost,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Countdown { .. } => "countdown",
            SessionPhase::Playing => "playing",
            SessionPhase::Paused => "paused",
            SessionPhase::Won => "won",
            SessionPhase::Lost => "lost",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Won | SessionPhase::Lost)
    }

    pub fn accepts_flips(&self) -> bool {
        matches!(self, SessionPhase::Playing)
    }

    /// Remaining pre-game ticks (0 once play has begun)
    pub fn countdown(&self) -> u8 {
        match self {
            SessionPhase::Countdown { remaining } => *remaining,
            _ => 0,
        }
    }
}

/// Intents a presentation layer can dispatch to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Reveal the card at this deck index
    Flip(usize),
    /// Toggle between playing and paused
    TogglePause,
    /// Restart with a fresh deck and the same difficulty
    Reset,
    /// Restart with a new difficulty
    Start(Difficulty),
}

impl GameAction {
    /// Convert to camelCase action name for the controller protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Flip(_) => "flip",
            GameAction::TogglePause => "togglePause",
            GameAction::Reset => "reset",
            GameAction::Start(_) => "start",
        }
    }
}

/// Why a flip request was ignored
///
/// Ignored flips are ordinary no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipRejection {
    /// Session is counting down, paused, or finished
    NotPlaying,
    OutOfRange,
    AlreadyMatched,
    AlreadyRevealed,
    /// Three unmatched cards are already face up
    TooManyRevealed,
}

impl FlipRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlipRejection::NotPlaying => "not_playing",
            FlipRejection::OutOfRange => "out_of_range",
            FlipRejection::AlreadyMatched => "already_matched",
            FlipRejection::AlreadyRevealed => "already_revealed",
            FlipRejection::TooManyRevealed => "too_many_revealed",
        }
    }
}

/// Session-side event recorded on every state change.
///
/// Drained by the driver and forwarded to observers (presentation, leaderboard hand-off).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    CountdownTick { remaining: u8 },
    /// Countdown finished; the play clock starts at `time_limit` seconds
    Started { time_limit: u32 },
    Revealed { index: usize },
    Matched {
        first: usize,
        second: usize,
        symbol: SymbolId,
        points: u32,
        combo: u32,
    },
    Mismatched { first: usize, second: usize },
    /// A face-up, unmatched card was turned face down
    Hidden { index: usize },
    Paused,
    Resumed,
    TimeTick { time_left: u32 },
    Won { score: u32 },
    Lost { score: u32 },
    Reset { generation: u32 },
}

impl SessionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEvent::CountdownTick { .. } => "countdownTick",
            SessionEvent::Started { .. } => "started",
            SessionEvent::Revealed { .. } => "revealed",
            SessionEvent::Matched { .. } => "matched",
            SessionEvent::Mismatched { .. } => "mismatched",
            SessionEvent::Hidden { .. } => "hidden",
            SessionEvent::Paused => "paused",
            SessionEvent::Resumed => "resumed",
            SessionEvent::TimeTick { .. } => "timeTick",
            SessionEvent::Won { .. } => "won",
            SessionEvent::Lost { .. } => "lost",
            SessionEvent::Reset { .. } => "reset",
        }
    }

    /// Final score carried by a session-ending event
    pub fn final_score(&self) -> Option<u32> {
        match self {
            SessionEvent::Won { score } | SessionEvent::Lost { score } => Some(*score),
            _ => None,
        }
    }
}
