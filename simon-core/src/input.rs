//! Serial keyboard injection of virtual button presses and pitch changes

use portable_atomic::{AtomicI8, AtomicU8, Ordering};
use crate::types::Slot;

/// Highest octave offset reachable from the keyboard
pub const MAX_OCTAVE: i8 = 3;
/// Lowest octave offset reachable from the keyboard
pub const MIN_OCTAVE: i8 = -3;

/// What a received byte did
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Virtual press queued for a slot
    Press(Slot),
    /// Tone pitch raised one step
    PitchUp,
    /// Tone pitch lowered one step
    PitchDown,
    /// Unmapped byte; any pending virtual press was dropped
    Cleared,
    /// Received outside the Input stage
    Ignored,
}

impl KeyAction {
    /// Map a received byte. Two characters select each slot.
    pub const fn decode(byte: u8) -> KeyAction {
        match byte {
            b'1' | b'q' => KeyAction::Press(Slot::One),
            b'2' | b'w' => KeyAction::Press(Slot::Two),
            b'3' | b'e' => KeyAction::Press(Slot::Three),
            b'4' | b'r' => KeyAction::Press(Slot::Four),
            b',' | b'k' => KeyAction::PitchUp,
            b'.' | b'l' => KeyAction::PitchDown,
            _ => KeyAction::Cleared,
        }
    }
}

/// Shared state written by the serial receive interrupt.
///
/// The pending mask holds at most one virtual press; the main loop clears it
/// once the press has been taken.
pub struct KeyInjector {
    pending: AtomicU8,
    octave: AtomicI8,
}

impl KeyInjector {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
            octave: AtomicI8::new(0),
        }
    }

    /// Handle a received byte (called from the receive interrupt). Never blocks.
    pub fn on_receive(&self, byte: u8, accepting: bool) -> KeyAction {
        if !accepting {
            return KeyAction::Ignored;
        }

        let action = KeyAction::decode(byte);
        match action {
            KeyAction::Press(slot) => self.pending.store(slot.mask(), Ordering::Release),
            KeyAction::PitchUp => self.shift_octave(1),
            KeyAction::PitchDown => self.shift_octave(-1),
            KeyAction::Cleared | KeyAction::Ignored => self.pending.store(0, Ordering::Release),
        }
        action
    }

    /// Pending virtual presses as a button mask
    pub fn pending(&self) -> u8 {
        self.pending.load(Ordering::Acquire)
    }

    /// Drop any pending virtual press
    pub fn clear(&self) {
        self.pending.store(0, Ordering::Release);
    }

    /// Current octave offset in `MIN_OCTAVE..=MAX_OCTAVE`
    pub fn octave(&self) -> i8 {
        self.octave.load(Ordering::Relaxed)
    }

    fn shift_octave(&self, step: i8) {
        let octave = self.octave.load(Ordering::Relaxed);
        let shifted = (octave + step).clamp(MIN_OCTAVE, MAX_OCTAVE);
        self.octave.store(shifted, Ordering::Relaxed);
    }
}

impl Default for KeyInjector {
    fn default() -> Self {
        Self::new()
    }
}
