//! Button sub-machine run during the Input stage

use crate::edge::EdgeMasks;
use crate::hal::{HalError, ToneDisplay};
use crate::input::KeyInjector;
use crate::sequence::SequenceGenerator;
use crate::tick::{Stopwatch, TickSource};
use crate::types::{ButtonSlot, Slot};

/// Accepts presses, judges them against the generator and holds feedback.
///
/// A press is judged the moment it is taken: the generator is advanced once and
/// a mismatch clears the round's match flag. When several presses arrive in the
/// same iteration each advances the generator, but only the last is compared. The round itself is only decided by
/// the stage machine once the input is released and the hold time has passed.
#[derive(Debug)]
pub struct InputDispatcher {
    button: ButtonSlot,
    expected: Option<Slot>,
    released: bool,
    hardware_press: bool,
    round_input: bool,
    matched: bool,
    input_count: u16,
    window: Stopwatch,
}

impl InputDispatcher {
    pub const fn new() -> Self {
        Self {
            button: ButtonSlot::Idle,
            expected: None,
            released: false,
            hardware_press: false,
            round_input: false,
            matched: true,
            input_count: 0,
            window: Stopwatch::new(),
        }
    }

    /// Run one iteration of the sub-machine.
    ///
    /// `hold` is the minimum time, in ticks from the press, that feedback stays on.
    pub fn poll<F: ToneDisplay>(
        &mut self,
        edges: &EdgeMasks,
        keys: &KeyInjector,
        generator: &mut SequenceGenerator,
        ticks: &TickSource,
        hold: u32,
        feedback: &mut F,
    ) -> Result<(), HalError> {
        match self.button {
            ButtonSlot::Idle => self.handle_idle(edges, keys, generator, ticks, feedback),
            ButtonSlot::Active(slot) => self.handle_active(slot, edges, ticks, hold, feedback),
        }
    }

    fn handle_idle<F: ToneDisplay>(
        &mut self,
        edges: &EdgeMasks,
        keys: &KeyInjector,
        generator: &mut SequenceGenerator,
        ticks: &TickSource,
        feedback: &mut F,
    ) -> Result<(), HalError> {
        let mut last = None;

        for slot in Slot::ALL {
            if (edges.falling | keys.pending()) & slot.mask() != 0 {
                let expected = generator.next_slot();
                keys.clear();
                self.window.restart(ticks);
                self.input_count = self.input_count.saturating_add(1);
                self.button = ButtonSlot::Active(slot);
                self.expected = Some(expected);
                last = Some((slot, expected));
            }

            if edges.pressed(slot) {
                self.hardware_press = true;
            }
        }

        // Presses landing together each consume a step; only the last one is judged
        if let Some((slot, expected)) = last {
            if expected != slot {
                self.matched = false;
            }

            #[cfg(feature = "defmt")]
            defmt::debug!("Press {:?}, expected {:?}", slot, expected);

            feedback.activate(slot)?;
        }
        Ok(())
    }

    fn handle_active<F: ToneDisplay>(
        &mut self,
        slot: Slot,
        edges: &EdgeMasks,
        ticks: &TickSource,
        hold: u32,
        feedback: &mut F,
    ) -> Result<(), HalError> {
        if !self.released {
            if edges.released(slot) {
                self.released = true;
                self.hardware_press = false;
            } else if !self.hardware_press {
                // Virtual presses have no release edge
                self.released = true;
            }
        } else if self.window.has_elapsed(ticks, hold) {
            feedback.deactivate()?;
            self.round_input = true;
            self.released = false;
            self.button = ButtonSlot::Idle;
        }
        Ok(())
    }

    /// Returns and clears the "an input was completed" flag
    pub fn take_round_input(&mut self) -> bool {
        core::mem::replace(&mut self.round_input, false)
    }

    /// False once any input this round mismatched
    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Inputs accepted this round
    pub fn input_count(&self) -> u16 {
        self.input_count
    }

    /// Sub-machine state
    pub fn state(&self) -> ButtonSlot {
        self.button
    }

    /// Generator output the last press was judged against
    pub fn expected(&self) -> Option<Slot> {
        self.expected
    }

    /// Restore the match flag and input count for a new round
    pub fn reset_round(&mut self) {
        self.matched = true;
        self.input_count = 0;
    }

    /// Clear the input count only
    pub fn reset_count(&mut self) {
        self.input_count = 0;
    }

    /// Return to Idle with every flag cleared
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
