//! Vertical-counter button debouncer

use portable_atomic::{AtomicU8, Ordering};
use crate::types::{BUTTON_MASK, BUTTONS_RELEASED};

/// Debounces a 4-bit button vector with a two-bit vertical counter per line.
///
/// `sample` runs only in the sampling interrupt; `state` is read from the main loop.
/// A line flips after three consecutive samples that disagree with the debounced
/// state. Any agreeing sample in between resets that line's counter.
pub struct Debouncer {
    state: AtomicU8,
    count0: AtomicU8,
    count1: AtomicU8,
}

impl Debouncer {
    /// All lines released
    pub const fn new() -> Self {
        Self::with_state(BUTTONS_RELEASED)
    }

    /// Start from a known debounced state
    pub const fn with_state(state: u8) -> Self {
        Self {
            state: AtomicU8::new(state & BUTTON_MASK),
            count0: AtomicU8::new(0),
            count1: AtomicU8::new(0),
        }
    }

    /// Feed one raw sample (called from the sampling interrupt)
    pub fn sample(&self, raw: u8) {
        let state = self.state.load(Ordering::Relaxed);
        let changed = (raw & BUTTON_MASK) ^ state;

        let count0 = self.count0.load(Ordering::Relaxed);
        let count1 = (self.count1.load(Ordering::Relaxed) ^ count0) & changed;
        let count0 = !count0 & changed;

        self.count0.store(count0, Ordering::Relaxed);
        self.count1.store(count1, Ordering::Relaxed);
        self.state.store(state ^ (count0 & count1), Ordering::Release);
    }

    /// Current debounced state
    pub fn state(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
