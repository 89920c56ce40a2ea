//! Session module - the game session state machine
//!
//! This module ties together all core components: deck, reveal resolver, scoring,
//! countdowns and the logical timeline. It owns the session phase and is the only
//! writer of session state; presentation code dispatches intents and reads snapshots.
//!
//! ```text
//! Countdown(n) --tick--> Countdown(n-1) ... Countdown(1) --tick--> Playing
//! Playing --flip--> Playing | Won
//! Playing --tick, time runs out--> Lost
//! Playing <--toggle_pause--> Paused
//! any --reset/start--> Countdown(3)
//! ```
//!
//! Every reset bumps the session generation and cancels outstanding timeline work.
//! Cleanups carry the generation they were scheduled in and are dropped if it no
//! longer matches.

use tracing::{debug, info, trace};

use crate::clock::{Countdown, CountdownTick};
use crate::deck::{Deck, DeckBuilder};
use crate::error::{ConfigError, Result};
use crate::reveal::{Cleanup, Reveal, RevealState};
use crate::rng::SimpleRng;
use crate::schedule::{Due, ScheduledCleanup, Timeline};
use crate::scoring::ScoreState;
use crate::snapshot::{CardFace, SessionSnapshot};
use crate::types::*;

/// Everything needed to construct a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub symbols: Vec<SymbolId>,
    pub pairing_factor: usize,
    pub difficulty: Difficulty,
    pub seed: u64,
}

impl SessionConfig {
    /// 15 symbols in pairs, easy difficulty
    pub fn reference() -> Self {
        Self {
            symbols: SymbolId::reference_set(),
            pairing_factor: PAIRING_FACTOR,
            difficulty: Difficulty::Easy,
            seed: 1,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_symbols(mut self, symbols: Vec<SymbolId>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_pairing_factor(mut self, pairing_factor: usize) -> Self {
        self.pairing_factor = pairing_factor;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Result of a flip request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Nothing changed
    Ignored(FlipRejection),
    /// First card of a pair turned face up
    Revealed,
    /// Third card turned face up while a mismatch waits to be hidden
    Peeked,
    Matched { points: u32 },
    Mismatched,
    /// The match completed the deck
    Won { score: u32 },
}

impl FlipOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, FlipOutcome::Ignored(_))
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct Session {
    builder: DeckBuilder,
    rng: SimpleRng,
    difficulty: Difficulty,
    deck: Deck,
    reveal: RevealState,
    score: ScoreState,
    phase: SessionPhase,
    pregame: Countdown,
    play_clock: Countdown,
    timeline: Timeline,
    /// Monotonic session id (increments on reset/start).
    generation: u32,
    /// Events since the last `take_events` call.
    events: Vec<SessionEvent>,
}

impl Session {
    /// Create a session in `Countdown(3)` with a freshly shuffled deck.
    ///
    /// The resolver only ever compares two cards, so any pairing factor other than
    /// [`PAIRING_FACTOR`] is rejected.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let builder = DeckBuilder::new(&config.symbols, config.pairing_factor)?;
        if config.pairing_factor != PAIRING_FACTOR {
            return Err(ConfigError::UnsupportedPairingFactor(config.pairing_factor));
        }
        let mut rng = SimpleRng::new(config.seed);
        let deck = builder.build(&mut rng);
        let reveal = RevealState::new(deck.len());

        let mut session = Self {
            builder,
            rng,
            difficulty: config.difficulty,
            deck,
            reveal,
            score: ScoreState::new(),
            phase: SessionPhase::Countdown {
                remaining: COUNTDOWN_START,
            },
            pregame: Countdown::new(COUNTDOWN_START as u32),
            play_clock: Countdown::stopped(config.difficulty.time_limit_secs()),
            timeline: Timeline::new(),
            generation: 0,
            events: Vec::new(),
        };
        session.timeline.start_ticks();

        info!(
            cards = session.deck.len(),
            difficulty = %session.difficulty,
            "session created"
        );
        Ok(session)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn reveal(&self) -> &RevealState {
        &self.reveal
    }

    pub fn score(&self) -> u32 {
        self.score.total()
    }

    pub fn combo(&self) -> u32 {
        self.score.combo()
    }

    pub fn score_state(&self) -> ScoreState {
        self.score
    }

    /// Seconds left on the play clock (the full limit until play begins)
    pub fn time_left(&self) -> u32 {
        self.play_clock.remaining()
    }

    pub fn countdown(&self) -> u8 {
        self.phase.countdown()
    }

    /// Current logical time in milliseconds since the session was created
    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    pub fn pending_cleanups(&self) -> usize {
        self.timeline.pending().len()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Final score once the session is won or lost
    pub fn final_score(&self) -> Option<u32> {
        self.phase.is_terminal().then(|| self.score.total())
    }

    pub fn face(&self, index: usize) -> Option<CardFace> {
        let symbol = self.deck.symbol_at(index)?;
        Some(if self.reveal.is_matched(index) {
            CardFace::Matched(symbol)
        } else if self.reveal.is_transient(index) {
            CardFace::Revealed(symbol)
        } else {
            CardFace::Hidden
        })
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.phase = self.phase;
        out.difficulty = self.difficulty;
        out.generation = self.generation;
        out.cards.clear();
        out.cards
            .extend((0..self.deck.len()).filter_map(|i| self.face(i)));
        out.matched = self.reveal.matched_count() as u32;
        out.score = self.score.total();
        out.combo = self.score.combo();
        out.time_left = self.time_left();
        out.countdown = self.countdown();
        out.final_score = self.final_score();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Take and clear the events recorded since the last call
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Restart with a new difficulty
    pub fn start(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.reset();
    }

    /// Restart with a difficulty given by name.
    ///
    /// Unknown names are rejected before anything is touched.
    pub fn start_named(&mut self, name: &str) -> Result<Difficulty> {
        let difficulty = Difficulty::from_str(name)
            .ok_or_else(|| ConfigError::UnknownDifficulty(name.to_string()))?;
        self.start(difficulty);
        Ok(difficulty)
    }

    /// Back to `Countdown(3)` with a new deck, empty reveals, zero score and fresh clocks
    pub fn reset(&mut self) {
        self.timeline.cancel_all();
        self.generation = self.generation.wrapping_add(1);

        self.deck = self.builder.build(&mut self.rng);
        self.reveal = RevealState::new(self.deck.len());
        self.score = ScoreState::new();
        self.phase = SessionPhase::Countdown {
            remaining: COUNTDOWN_START,
        };
        self.pregame = Countdown::new(COUNTDOWN_START as u32);
        self.play_clock = Countdown::stopped(self.difficulty.time_limit_secs());
        self.timeline.start_ticks();

        self.events.push(SessionEvent::Reset {
            generation: self.generation,
        });
        info!(
            generation = self.generation,
            difficulty = %self.difficulty,
            "session reset"
        );
    }

    /// Reveal the card at `index`.
    ///
    /// Invalid requests are no-ops and come back as [`FlipOutcome::Ignored`].
    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if !self.phase.accepts_flips() {
            return FlipOutcome::Ignored(FlipRejection::NotPlaying);
        }

        let reveal = match self.reveal.flip(&self.deck, index) {
            Ok(r) => r,
            Err(rejection) => return FlipOutcome::Ignored(rejection),
        };
        self.events.push(SessionEvent::Revealed { index });

        match reveal {
            Reveal::Single => FlipOutcome::Revealed,
            Reveal::Peeked => {
                self.timeline
                    .schedule(CLEANUP_DELAY_MS, self.generation, Cleanup::HideUnmatched);
                FlipOutcome::Peeked
            }
            Reveal::Matched {
                first,
                second,
                symbol,
                complete,
            } => {
                let points = self.score.on_match();
                self.events.push(SessionEvent::Matched {
                    first,
                    second,
                    symbol,
                    points,
                    combo: self.score.combo(),
                });
                debug!(first, second, %symbol, points, combo = self.score.combo(), "pair matched");

                if complete {
                    self.finish(SessionPhase::Won);
                    FlipOutcome::Won {
                        score: self.score.total(),
                    }
                } else {
                    FlipOutcome::Matched { points }
                }
            }
            Reveal::Mismatched { first, second } => {
                self.score.on_mismatch();
                self.timeline.schedule(
                    CLEANUP_DELAY_MS,
                    self.generation,
                    Cleanup::HidePair { first, second },
                );
                self.events.push(SessionEvent::Mismatched {
                    first: first.index,
                    second: second.index,
                });
                debug!(first = first.index, second = second.index, "pair mismatched");
                FlipOutcome::Mismatched
            }
        }
    }

    /// Toggle between `Playing` and `Paused`. Returns false in any other phase.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Playing => {
                self.phase = SessionPhase::Paused;
                self.events.push(SessionEvent::Paused);
                debug!(time_left = self.time_left(), "paused");
                true
            }
            SessionPhase::Paused => {
                self.phase = SessionPhase::Playing;
                self.events.push(SessionEvent::Resumed);
                debug!(time_left = self.time_left(), "resumed");
                true
            }
            _ => false,
        }
    }

    /// Advance logical time, firing ticks and cleanups in due order
    pub fn advance(&mut self, elapsed_ms: u32) {
        let until = self.timeline.now_ms() + elapsed_ms as u64;
        while let Some(due) = self.timeline.pop_due(until) {
            match due {
                Due::Tick => self.on_tick(),
                Due::Cleanup(item) => self.on_cleanup(item),
            }
        }
        self.timeline.settle(until);
    }

    /// Advance by exactly one clock tick
    pub fn tick(&mut self) {
        self.advance(TICK_MS);
    }

    /// Apply a presentation-layer intent. Returns whether anything changed.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Flip(index) => !self.flip(index).is_ignored(),
            GameAction::TogglePause => self.toggle_pause(),
            GameAction::Reset => {
                self.reset();
                true
            }
            GameAction::Start(difficulty) => {
                self.start(difficulty);
                true
            }
        }
    }

    fn on_tick(&mut self) {
        match self.phase {
            SessionPhase::Countdown { .. } => match self.pregame.tick() {
                CountdownTick::Running(n) => {
                    let remaining = n as u8;
                    self.phase = SessionPhase::Countdown { remaining };
                    self.events.push(SessionEvent::CountdownTick { remaining });
                }
                CountdownTick::Expired => {
                    let time_limit = self.difficulty.time_limit_secs();
                    self.phase = SessionPhase::Playing;
                    self.play_clock = Countdown::new(time_limit);
                    self.events
                        .push(SessionEvent::CountdownTick { remaining: 0 });
                    self.events.push(SessionEvent::Started { time_limit });
                    debug!(time_limit, "countdown finished, playing");
                }
                CountdownTick::Inert => {}
            },
            SessionPhase::Playing => match self.play_clock.tick() {
                CountdownTick::Running(time_left) => {
                    self.events.push(SessionEvent::TimeTick { time_left });
                }
                CountdownTick::Expired => {
                    self.events.push(SessionEvent::TimeTick { time_left: 0 });
                    self.finish(SessionPhase::Lost);
                }
                CountdownTick::Inert => {}
            },
            // Ticks keep arriving while paused but change nothing.
            SessionPhase::Paused | SessionPhase::Won | SessionPhase::Lost => {}
        }
    }

    fn on_cleanup(&mut self, item: ScheduledCleanup) {
        if item.generation != self.generation {
            trace!(
                scheduled = item.generation,
                current = self.generation,
                "dropping stale cleanup"
            );
            return;
        }

        let hidden = self.reveal.apply_cleanup(item.cleanup);
        trace!(cleanup = ?item.cleanup, hidden = hidden.len(), "cleanup fired");
        for index in hidden {
            self.events.push(SessionEvent::Hidden { index });
        }
    }

    fn finish(&mut self, outcome: SessionPhase) {
        self.phase = outcome;
        self.pregame.stop();
        self.play_clock.stop();
        self.timeline.stop_ticks();

        let score = self.score.total();
        match outcome {
            SessionPhase::Won => {
                self.events.push(SessionEvent::Won { score });
                info!(score, generation = self.generation, "session won");
            }
            _ => {
                self.events.push(SessionEvent::Lost { score });
                info!(score, generation = self.generation, "session lost");
            }
        }
    }
}
