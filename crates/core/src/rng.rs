//! RNG module - seeded shuffling for deck construction
//!
//! Decks are shuffled with Fisher-Yates driven by a small 64-bit LCG. Outputs are
//! taken from the high bits of the state; bounded draws use a multiply-shift reduction.
//!
//! The same seed always produces the same sequence of decks.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses the MMIX constants from Knuth
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

const MULTIPLIER: u64 = 6364136223846793005;
const INCREMENT: u64 = 1442695040888963407;

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: seed };
        // Mix once so that small consecutive seeds diverge immediately.
        rng.next_u32();
        rng
    }

    /// Generate next random u32 (high half of the state)
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        (self.state >> 32) as u32
    }

    /// Generate random value in range [0, max)
    ///
    /// Returns 0 when `max` is 0.
    pub fn next_below(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_below((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state (feeding it back to `SimpleRng::restore` continues the sequence)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Resume a sequence from a previously captured state
    pub fn restore(state: u64) -> Self {
        Self { state }
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
