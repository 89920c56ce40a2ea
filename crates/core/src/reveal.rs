//! Reveal module - face-up bookkeeping and pair resolution
//!
//! Two disjoint index sets are tracked against a deck:
//!
//! - `transient`: face up but unresolved, in flip order, at most [`MAX_TRANSIENT`] entries
//! - `matched`: permanently face up; only grows within a session
//!
//! When `transient` reaches two entries the pair is compared immediately. A mismatched
//! pair stays face up until a delayed cleanup hides it. While it waits, one more card may
//! be flipped ("peeking"); that third flip schedules its own cleanup which hides every
//! unmatched face-up card. The peek is a deliberate quirk of the game rules.
//!
//! Scheduling is the caller's job: [`RevealState::flip`] only reports which cleanup, if
//! any, is now owed.
//!
//! Every accepted flip gets a serial. A pair cleanup names the two flips it was created
//! for, so a card that was hidden by another cleanup and flipped again is left alone.

use arrayvec::ArrayVec;

use crate::deck::Deck;
use crate::types::{FlipRejection, SymbolId, MAX_TRANSIENT};

/// What an accepted flip led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// First card of a pair is now face up
    Single,
    /// The pair matched; both cards are now permanently face up
    Matched {
        first: usize,
        second: usize,
        symbol: SymbolId,
        /// Every card in the deck is now matched
        complete: bool,
    },
    /// The pair differs; a hide for exactly these two flips is owed
    Mismatched { first: FaceUp, second: FaceUp },
    /// A third card was flipped while a mismatch waits; a hide-all-unmatched is owed
    Peeked,
}

/// One accepted flip of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceUp {
    pub index: usize,
    pub serial: u32,
}

/// Delayed cleanups the session schedules on behalf of the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cleanup {
    /// Hide these two flips if the cards are still face up from those same flips
    HidePair { first: FaceUp, second: FaceUp },
    /// Hide every face-up card that is not matched
    HideUnmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    transient: ArrayVec<usize, MAX_TRANSIENT>,
    matched: Vec<bool>,
    matched_count: usize,
    /// Serial of the latest accepted flip, per index
    serials: Vec<u32>,
    next_serial: u32,
}

impl RevealState {
    pub fn new(deck_len: usize) -> Self {
        Self {
            transient: ArrayVec::new(),
            matched: vec![false; deck_len],
            matched_count: 0,
            serials: vec![0; deck_len],
            next_serial: 0,
        }
    }

    pub fn deck_len(&self) -> usize {
        self.matched.len()
    }

    /// Face-up, unresolved indices in flip order
    pub fn transient(&self) -> &[usize] {
        &self.transient
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.matched.get(index).copied().unwrap_or(false)
    }

    pub fn is_transient(&self, index: usize) -> bool {
        self.transient.contains(&index)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.is_matched(index) || self.is_transient(index)
    }

    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    /// Matched indices in ascending order
    pub fn matched_indices(&self) -> Vec<usize> {
        self.matched
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        !self.matched.is_empty() && self.matched_count == self.matched.len()
    }

    /// Check whether a flip at `index` would be accepted, without changing anything
    pub fn check_flip(&self, index: usize) -> Result<(), FlipRejection> {
        if index >= self.matched.len() {
            return Err(FlipRejection::OutOfRange);
        }
        if self.matched[index] {
            return Err(FlipRejection::AlreadyMatched);
        }
        if self.transient.contains(&index) {
            return Err(FlipRejection::AlreadyRevealed);
        }
        if self.transient.is_full() {
            return Err(FlipRejection::TooManyRevealed);
        }
        Ok(())
    }

    /// Turn a card face up and resolve the pair if one is now complete.
    ///
    /// Rejected flips leave both sets untouched.
    pub fn flip(&mut self, deck: &Deck, index: usize) -> Result<Reveal, FlipRejection> {
        self.check_flip(index)?;
        self.next_serial = self.next_serial.wrapping_add(1);
        self.serials[index] = self.next_serial;
        self.transient.push(index);

        match self.transient.len() {
            2 => Ok(self.check_pair(deck)),
            3 => Ok(Reveal::Peeked),
            _ => Ok(Reveal::Single),
        }
    }

    fn check_pair(&mut self, deck: &Deck) -> Reveal {
        let first = self.transient[0];
        let second = self.transient[1];

        match (deck.symbol_at(first), deck.symbol_at(second)) {
            (Some(a), Some(b)) if a == b => {
                self.mark_matched(first);
                self.mark_matched(second);
                self.transient.retain(|i| *i != first && *i != second);
                Reveal::Matched {
                    first,
                    second,
                    symbol: a,
                    complete: self.is_complete(),
                }
            }
            _ => Reveal::Mismatched {
                first: self.face_up(first),
                second: self.face_up(second),
            },
        }
    }

    fn face_up(&self, index: usize) -> FaceUp {
        FaceUp {
            index,
            serial: self.serials[index],
        }
    }

    fn mark_matched(&mut self, index: usize) {
        if !self.matched[index] {
            self.matched[index] = true;
            self.matched_count += 1;
        }
    }

    /// Apply a delayed cleanup. Returns the indices that were turned face down.
    ///
    /// Matched cards are never hidden; indices already face down are skipped, and so are
    /// cards whose current flip is newer than the one a pair cleanup was created for.
    pub fn apply_cleanup(&mut self, cleanup: Cleanup) -> ArrayVec<usize, MAX_TRANSIENT> {
        let mut hidden = ArrayVec::new();
        let matched = &self.matched;
        let serials = &self.serials;
        self.transient.retain(|i| {
            let hide = match cleanup {
                Cleanup::HidePair { first, second } => [first, second]
                    .iter()
                    .any(|f| f.index == *i && f.serial == serials[*i]),
                Cleanup::HideUnmatched => true,
            } && !matched[*i];
            if hide {
                hidden.push(*i);
            }
            !hide
        });
        hidden
    }
}
