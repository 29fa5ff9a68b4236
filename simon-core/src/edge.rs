//! Press/release edge detection over debounced button samples

use crate::types::{Slot, BUTTONS_RELEASED};

/// Edges between two consecutive debounced samples
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeMasks {
    /// Lines that went high to low (pressed)
    pub falling: u8,
    /// Lines that went low to high (released)
    pub rising: u8,
    /// Lines that changed at all
    pub changed: u8,
}

impl EdgeMasks {
    /// Compare a previous and a current sample
    pub const fn between(previous: u8, current: u8) -> Self {
        let changed = previous ^ current;
        Self {
            falling: changed & previous,
            rising: changed & current,
            changed,
        }
    }

    /// Returns true if the slot was pressed in this comparison
    pub const fn pressed(&self, slot: Slot) -> bool {
        self.falling & slot.mask() != 0
    }

    /// Returns true if the slot was released in this comparison
    pub const fn released(&self, slot: Slot) -> bool {
        self.rising & slot.mask() != 0
    }
}

/// Keeps the previous debounced sample between main-loop iterations
#[derive(Debug)]
pub struct EdgeDetector {
    previous: u8,
    current: u8,
    edges: EdgeMasks,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            previous: BUTTONS_RELEASED,
            current: BUTTONS_RELEASED,
            edges: EdgeMasks {
                falling: 0,
                rising: 0,
                changed: 0,
            },
        }
    }

    /// Take a new debounced sample; call once per main-loop iteration
    pub fn update(&mut self, debounced: u8) -> EdgeMasks {
        self.previous = self.current;
        self.current = debounced;
        self.edges = EdgeMasks::between(self.previous, self.current);
        self.edges
    }

    /// Edges from the last update
    pub fn edges(&self) -> EdgeMasks {
        self.edges
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}
