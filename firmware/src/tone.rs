//! Buzzer tones for the four slots

use simon_core::input::{MAX_OCTAVE, MIN_OCTAVE};
use simon_core::{HalError, Slot};

/// Timer periods of the four slot tones before octave scaling
pub const BASE_PERIODS: [u32; 4] = [36024, 42840, 26984, 72056];

/// Shift applied at octave offset zero
pub const OCTAVE_SHIFT: i8 = 3;

/// PWM period and compare value driving the buzzer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    pub period: u32,
    pub compare: u32,
}

impl Tone {
    /// Square wave for `slot`, shifted up by `octave` (clamped to the keyboard range)
    pub fn for_slot(slot: Slot, octave: i8) -> Self {
        let shift = (octave.clamp(MIN_OCTAVE, MAX_OCTAVE) + OCTAVE_SHIFT) as u32;
        let period = BASE_PERIODS[slot.index() as usize] >> shift;
        Self {
            period,
            compare: period >> 1,
        }
    }
}

/// PWM channel wired to the buzzer
pub trait TonePort {
    /// Start (or retune) the tone
    fn play(&mut self, tone: Tone) -> Result<(), HalError>;

    /// Zero duty, keeping the period
    fn silence(&mut self) -> Result<(), HalError>;
}
