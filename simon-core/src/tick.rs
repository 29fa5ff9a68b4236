//! Free-running tick counter and elapsed-time measurement

use portable_atomic::{AtomicU32, Ordering};

/// Tick counter advanced by the periodic timer interrupt.
///
/// The counter wraps silently. Elapsed time is always computed with wrapping
/// subtraction, so comparisons stay correct across a wrap as long as a single
/// measured interval is shorter than 2^32 ticks (about 49 days at 1 ms).
pub struct TickSource {
    ticks: AtomicU32,
}

impl TickSource {
    /// Create a counter at zero
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Create a counter at an arbitrary value
    pub const fn starting_at(ticks: u32) -> Self {
        Self {
            ticks: AtomicU32::new(ticks),
        }
    }

    /// Advance by one tick (called from the timer interrupt)
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Current tick count
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Start measuring from the current tick
    pub fn stopwatch(&self) -> Stopwatch {
        Stopwatch { start: self.now() }
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Elapsed-time counter anchored to a [`TickSource`] reading.
///
/// Restarting captures the current tick instead of zeroing the interrupt-owned
/// counter, so the main loop never writes to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Stopwatch {
    start: u32,
}

impl Stopwatch {
    /// Stopwatch anchored at tick zero
    pub const fn new() -> Self {
        Self { start: 0 }
    }

    /// Reset elapsed time to zero
    pub fn restart(&mut self, ticks: &TickSource) {
        self.start = ticks.now();
    }

    /// Ticks since the last restart
    pub fn elapsed(&self, ticks: &TickSource) -> u32 {
        ticks.now().wrapping_sub(self.start)
    }

    /// Returns true once at least `threshold` ticks have passed
    pub fn has_elapsed(&self, ticks: &TickSource, threshold: u32) -> bool {
        self.elapsed(ticks) >= threshold
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
