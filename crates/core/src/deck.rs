//! Deck module - card instances and deck construction
//!
//! A deck is the multiset `{symbol x pairing_factor}` in a random order. It is built
//! once per session (and again on every reset) and never mutated afterwards.

use crate::error::{ConfigError, Result};
use crate::rng::SimpleRng;
use crate::types::{SymbolId, MIN_PAIRING_FACTOR};

/// Opaque card identity, unique within one deck.
///
/// Assigned before shuffling, so an id says nothing about where the card sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u32);

impl CardId {
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// A single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    id: CardId,
    symbol: SymbolId,
}

impl Card {
    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }
}

/// Ordered, immutable sequence of cards for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn symbol_at(&self, index: usize) -> Option<SymbolId> {
        self.cards.get(index).map(|c| c.symbol)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    /// Indices of every card showing `symbol`, in deck order
    pub fn positions_of(&self, symbol: SymbolId) -> Vec<usize> {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.symbol == symbol)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Validated deck recipe.
///
/// Validation happens once in [`DeckBuilder::new`]; every later [`DeckBuilder::build`]
/// is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckBuilder {
    symbols: Vec<SymbolId>,
    pairing_factor: usize,
}

impl DeckBuilder {
    pub fn new(symbols: &[SymbolId], pairing_factor: usize) -> Result<Self> {
        if symbols.is_empty() {
            return Err(ConfigError::EmptySymbols);
        }
        if pairing_factor < MIN_PAIRING_FACTOR {
            return Err(ConfigError::PairingFactorTooSmall {
                min: MIN_PAIRING_FACTOR,
                actual: pairing_factor,
            });
        }

        let mut sorted = symbols.to_vec();
        sorted.sort_unstable();
        if let Some(dup) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateSymbol(dup[0]));
        }

        Ok(Self {
            symbols: symbols.to_vec(),
            pairing_factor,
        })
    }

    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn pairing_factor(&self) -> usize {
        self.pairing_factor
    }

    /// Number of cards each built deck holds
    pub fn deck_len(&self) -> usize {
        self.symbols.len() * self.pairing_factor
    }

    /// Build a freshly shuffled deck
    pub fn build(&self, rng: &mut SimpleRng) -> Deck {
        let mut cards = Vec::with_capacity(self.deck_len());
        for &symbol in &self.symbols {
            for _ in 0..self.pairing_factor {
                let id = CardId(cards.len() as u32);
                cards.push(Card { id, symbol });
            }
        }
        rng.shuffle(&mut cards);
        Deck { cards }
    }
}

/// Validate the recipe and build one deck
pub fn build_deck(symbols: &[SymbolId], pairing_factor: usize, rng: &mut SimpleRng) -> Result<Deck> {
    Ok(DeckBuilder::new(symbols, pairing_factor)?.build(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn counts(deck: &Deck) -> HashMap<SymbolId, usize> {
        let mut m = HashMap::new();
        for card in deck.iter() {
            *m.entry(card.symbol()).or_insert(0) += 1;
        }
        m
    }

    #[test]
    fn test_reference_deck_has_every_symbol_twice() {
        let symbols = SymbolId::reference_set();
        let mut rng = SimpleRng::new(12345);
        let deck = build_deck(&symbols, 2, &mut rng).unwrap();

        assert_eq!(deck.len(), 30);
        let counts = counts(&deck);
        assert_eq!(counts.len(), 15);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn test_pairing_factor_three() {
        let symbols = [SymbolId(1), SymbolId(2)];
        let mut rng = SimpleRng::new(1);
        let deck = build_deck(&symbols, 3, &mut rng).unwrap();

        assert_eq!(deck.len(), 6);
        assert!(counts(&deck).values().all(|&n| n == 3));
    }

    #[test]
    fn test_card_ids_are_unique() {
        let symbols = SymbolId::reference_set();
        let mut rng = SimpleRng::new(5);
        let deck = build_deck(&symbols, 2, &mut rng).unwrap();

        let ids: HashSet<CardId> = deck.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), deck.len());
    }

    #[test]
    fn test_rejects_empty_symbols() {
        let mut rng = SimpleRng::new(1);
        assert_eq!(build_deck(&[], 2, &mut rng), Err(ConfigError::EmptySymbols));
    }

    #[test]
    fn test_rejects_small_pairing_factor() {
        let mut rng = SimpleRng::new(1);
        assert_eq!(
            build_deck(&[SymbolId(1)], 1, &mut rng),
            Err(ConfigError::PairingFactorTooSmall { min: 2, actual: 1 })
        );
    }

    #[test]
    fn test_rejects_duplicate_symbols() {
        assert_eq!(
            DeckBuilder::new(&[SymbolId(3), SymbolId(1), SymbolId(3)], 2),
            Err(ConfigError::DuplicateSymbol(SymbolId(3)))
        );
    }

    #[test]
    fn test_rebuild_changes_order() {
        let builder = DeckBuilder::new(&SymbolId::reference_set(), 2).unwrap();
        let mut rng = SimpleRng::new(77);
        let first = builder.build(&mut rng);
        let second = builder.build(&mut rng);

        assert_eq!(counts(&first), counts(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_positions_of() {
        let builder = DeckBuilder::new(&[SymbolId(1), SymbolId(2)], 2).unwrap();
        let deck = builder.build(&mut SimpleRng::new(9));
        let ones = deck.positions_of(SymbolId(1));
        assert_eq!(ones.len(), 2);
        assert!(ones.iter().all(|&i| deck.symbol_at(i) == Some(SymbolId(1))));
    }
}
