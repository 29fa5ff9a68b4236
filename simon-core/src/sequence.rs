//! Deterministic LFSR sequence generator

use crate::types::Slot;

/// Feedback taps applied whenever a one bit is shifted out
pub const FEEDBACK_MASK: u32 = 0xE202_4CAB;

/// Seed used at power-on
pub const DEFAULT_SEED: u32 = 0x1163_8494;

/// Advance an LFSR state by one step.
///
/// Returns the next state and its low two bits as the output (0..=3).
/// A zero state maps to itself forever, so zero must never be used as a seed.
pub const fn advance(state: u32) -> (u32, u8) {
    let lsb = state & 1;
    let mut next = state >> 1;
    if lsb == 1 {
        next ^= FEEDBACK_MASK;
    }
    (next, (next & 0b11) as u8)
}

/// Generator with a rewindable seed.
///
/// The played sequence is never stored: rewinding to the seed and advancing again
/// reproduces it step for step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SequenceGenerator {
    seed: u32,
    state: u32,
}

impl SequenceGenerator {
    /// Create a generator at `seed`. The seed must be non-zero.
    pub const fn new(seed: u32) -> Self {
        Self { seed, state: seed }
    }

    /// Produce the next slot
    pub fn next_slot(&mut self) -> Slot {
        let (state, output) = advance(self.state);
        self.state = state;
        Slot::from_index(output)
    }

    /// Reset the state to the seed
    pub fn rewind(&mut self) {
        self.state = self.seed;
    }

    /// Advance once and keep the resulting state as the new seed
    pub fn reseed_forward(&mut self) -> u32 {
        self.next_slot();
        self.seed = self.state;
        self.seed
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
