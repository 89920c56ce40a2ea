//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of a card-match memory session: building a shuffled
//! deck, resolving reveals into matches and mismatches, scoring, and the two countdowns.
//! It has **no dependencies** on rendering, networking, or real time:
//!
//! - **Deterministic**: the same seed produces the same deck sequence
//! - **Testable**: logical time is advanced explicitly by the caller
//! - **Portable**: runs headless, behind a terminal, or behind the TCP adapter
//!
//! # Module Structure
//!
//! - [`deck`]: symbol validation and shuffled deck construction
//! - [`reveal`]: face-up bookkeeping and pair resolution
//! - [`scoring`]: match points with a combo multiplier
//! - [`clock`]: tick-driven countdowns
//! - [`schedule`]: logical timeline for ticks and delayed cleanups
//! - [`session`]: the session state machine tying everything together
//! - [`snapshot`]: read-only views for presentation layers
//! - [`rng`]: small seeded generator used for shuffling
//!
//! # Game Rules
//!
//! - Every symbol appears exactly `pairing_factor` times in the deck
//! - Two face-up cards with the same symbol become permanently matched
//! - A mismatched pair is hidden again one second later
//! - While a mismatch waits, one more card may be peeked at
//! - A match scores `1000 + 300 * combo`; a mismatch resets the combo
//! - The session is won when every card is matched, lost when the clock runs out
//!
//! # Example
//!
//! ```
//! use card_match_core::{Session, SessionConfig};
//! use card_match_types::{Difficulty, SessionPhase, SymbolId};
//!
//! let config = SessionConfig::reference()
//!     .with_symbols(vec![SymbolId(1)])
//!     .with_difficulty(Difficulty::Hard)
//!     .with_seed(7);
//! let mut session = Session::new(config).unwrap();
//!
//! // Three ticks of pre-game countdown
//! for _ in 0..3 {
//!     session.tick();
//! }
//! assert_eq!(session.phase(), SessionPhase::Playing);
//!
//! session.flip(0);
//! session.flip(1);
//! assert_eq!(session.phase(), SessionPhase::Won);
//! assert_eq!(session.final_score(), Some(1000));
//! ```

pub use card_match_types as types;

pub mod clock;
pub mod deck;
pub mod error;
pub mod reveal;
pub mod rng;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use clock::{Countdown, CountdownTick};
pub use deck::{build_deck, Card, CardId, Deck, DeckBuilder};
pub use error::{ConfigError, Result};
pub use reveal::{Cleanup, FaceUp, Reveal, RevealState};
pub use rng::SimpleRng;
pub use schedule::{Due, ScheduledCleanup, Timeline};
pub use scoring::{match_points, streak_total, ScoreState};
pub use session::{FlipOutcome, Session, SessionConfig};
pub use snapshot::{CardFace, SessionSnapshot};
