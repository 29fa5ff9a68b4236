//! Buzzer and display combined into the engine's feedback collaborator

use simon_core::{HalError, KeyInjector, Pattern, Slot, ToneDisplay};
use crate::display::{pattern_segments, slot_segments, DisplayBuffer};
use crate::tone::{Tone, TonePort};

pub struct BoardFeedback<'a, T> {
    tone: T,
    display: &'a DisplayBuffer,
    keys: &'a KeyInjector,
}

impl<'a, T: TonePort> BoardFeedback<'a, T> {
    /// `keys` supplies the octave offset set from the serial keyboard
    pub fn new(tone: T, display: &'a DisplayBuffer, keys: &'a KeyInjector) -> Self {
        Self { tone, display, keys }
    }

    pub fn tone_port(&self) -> &T {
        &self.tone
    }
}

impl<'a, T: TonePort> ToneDisplay for BoardFeedback<'a, T> {
    fn activate(&mut self, slot: Slot) -> Result<(), HalError> {
        self.tone.play(Tone::for_slot(slot, self.keys.octave()))?;
        self.display.set(slot_segments(slot));
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), HalError> {
        self.tone.silence()?;
        self.display.blank();
        Ok(())
    }

    fn show_pattern(&mut self, pattern: Pattern) -> Result<(), HalError> {
        self.display.set(pattern_segments(pattern));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HalError> {
        self.display.blank();
        Ok(())
    }
}
