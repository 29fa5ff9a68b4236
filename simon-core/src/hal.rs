//! Hardware Abstraction Layer for the game's external collaborators

use embedded_hal::digital::InputPin;
use crate::types::{Pattern, Slot, BUTTONS_RELEASED};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Tone or display update failed
    DisplayError,
    /// Serial transmit failed
    SerialError,
    /// Analog conversion failed
    AnalogError,
    /// Hardware not initialized
    NotInitialized,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::DisplayError => write!(f, "Tone or display update failed"),
            HalError::SerialError => write!(f, "Serial transmit failed"),
            HalError::AnalogError => write!(f, "Analog conversion failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            HalError::GpioError => defmt::write!(f, "GPIO operation failed"),
            HalError::DisplayError => defmt::write!(f, "Tone or display update failed"),
            HalError::SerialError => defmt::write!(f, "Serial transmit failed"),
            HalError::AnalogError => defmt::write!(f, "Analog conversion failed"),
            HalError::NotInitialized => defmt::write!(f, "Hardware not initialized"),
        }
    }
}

/// Combined tone generator and display output
pub trait ToneDisplay {
    /// Sound the slot's tone and light its display bar
    fn activate(&mut self, slot: Slot) -> Result<(), HalError>;

    /// Silence the tone and blank the display
    fn deactivate(&mut self) -> Result<(), HalError>;

    /// Show a fixed pattern on the display
    fn show_pattern(&mut self, pattern: Pattern) -> Result<(), HalError>;

    /// Blank the display
    fn clear(&mut self) -> Result<(), HalError>;
}

/// Non-blocking analog control input
pub trait AnalogSource {
    /// Returns a reading once a conversion has completed, `None` otherwise
    fn try_read(&mut self) -> Option<u8>;
}

/// Outgoing human-readable transcript
pub trait SerialTranscript {
    /// Write one byte
    fn write_char(&mut self, c: u8) -> Result<(), HalError>;

    /// Write a line of text followed by `\n`
    fn write_line(&mut self, text: &str) -> Result<(), HalError> {
        for byte in text.bytes() {
            self.write_char(byte)?;
        }
        self.write_char(b'\n')
    }
}

/// Complete collaborator set used by the gameplay engine
pub trait GameHal {
    type Feedback: ToneDisplay;
    type Analog: AnalogSource;
    type Serial: SerialTranscript;

    /// Access to tone and display output
    fn feedback(&mut self) -> &mut Self::Feedback;

    /// Access to the cadence control
    fn analog(&mut self) -> &mut Self::Analog;

    /// Access to the score transcript
    fn serial(&mut self) -> &mut Self::Serial;

    /// Called on every spin of a busy wait
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

/// Four pull-up button pins read into a raw button vector
pub struct ButtonPins<P> {
    pins: [P; 4],
}

impl<P> ButtonPins<P>
where
    P: InputPin,
{
    /// Pins in slot order
    pub fn new(pins: [P; 4]) -> Self {
        Self { pins }
    }

    /// Read all lines. A set bit means the line is high (released).
    pub fn read_raw(&mut self) -> Result<u8, HalError> {
        let mut raw = BUTTONS_RELEASED;
        for (slot, pin) in Slot::ALL.iter().zip(self.pins.iter_mut()) {
            if pin.is_low().map_err(|_| HalError::GpioError)? {
                raw &= !slot.mask();
            }
        }
        Ok(raw)
    }

    /// Release the pins
    pub fn release(self) -> [P; 4] {
        self.pins
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use crate::shared::SharedState;
    use crate::types::{GameConfig, BUTTONS_RELEASED};
    use heapless::{String, Vec};

    /// Recorded tone/display call
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum FeedbackEvent {
        Activate(Slot),
        Deactivate,
        Show(Pattern),
        Clear,
    }

    #[derive(Default)]
    pub struct MockToneDisplay {
        events: Vec<FeedbackEvent, 256>,
        active: Option<Slot>,
        pattern: Option<Pattern>,
        fail_with: Option<HalError>,
    }

    impl MockToneDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        /// Slot currently sounding
        pub fn active(&self) -> Option<Slot> {
            self.active
        }

        /// Pattern currently shown
        pub fn pattern(&self) -> Option<Pattern> {
            self.pattern
        }

        pub fn events(&self) -> &[FeedbackEvent] {
            &self.events
        }

        pub fn clear_events(&mut self) {
            self.events.clear();
        }

        /// Slots activated so far, in order
        pub fn activated_slots(&self) -> Vec<Slot, 256> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    FeedbackEvent::Activate(slot) => Some(*slot),
                    _ => None,
                })
                .collect()
        }

        /// Make every following call fail
        pub fn fail_with(&mut self, error: Option<HalError>) {
            self.fail_with = error;
        }

        fn record(&mut self, event: FeedbackEvent) -> Result<(), HalError> {
            if let Some(error) = self.fail_with {
                return Err(error);
            }
            self.events.push(event).ok();
            Ok(())
        }
    }

    impl ToneDisplay for MockToneDisplay {
        fn activate(&mut self, slot: Slot) -> Result<(), HalError> {
            self.record(FeedbackEvent::Activate(slot))?;
            self.active = Some(slot);
            Ok(())
        }

        fn deactivate(&mut self) -> Result<(), HalError> {
            self.record(FeedbackEvent::Deactivate)?;
            self.active = None;
            self.pattern = None;
            Ok(())
        }

        fn show_pattern(&mut self, pattern: Pattern) -> Result<(), HalError> {
            self.record(FeedbackEvent::Show(pattern))?;
            self.pattern = Some(pattern);
            Ok(())
        }

        fn clear(&mut self) -> Result<(), HalError> {
            self.record(FeedbackEvent::Clear)?;
            self.pattern = None;
            Ok(())
        }
    }

    /// Analog control with a fixed reading and an optional conversion delay
    #[derive(Default)]
    pub struct MockAnalog {
        reading: u8,
        pending_polls: u32,
        polls: u32,
    }

    impl MockAnalog {
        pub fn new(reading: u8) -> Self {
            Self {
                reading,
                pending_polls: 0,
                polls: 0,
            }
        }

        pub fn set_reading(&mut self, reading: u8) {
            self.reading = reading;
        }

        /// Report "not ready" for the next `polls` reads
        pub fn delay_conversions(&mut self, polls: u32) {
            self.pending_polls = polls;
        }

        pub fn polls(&self) -> u32 {
            self.polls
        }
    }

    impl AnalogSource for MockAnalog {
        fn try_read(&mut self) -> Option<u8> {
            self.polls += 1;
            if self.pending_polls > 0 {
                self.pending_polls -= 1;
                None
            } else {
                Some(self.reading)
            }
        }
    }

    #[derive(Default)]
    pub struct MockSerial {
        transcript: String<1024>,
        fail: bool,
    }

    impl MockSerial {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn transcript(&self) -> &str {
            &self.transcript
        }

        pub fn clear(&mut self) {
            self.transcript.clear();
        }

        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }
    }

    impl SerialTranscript for MockSerial {
        fn write_char(&mut self, c: u8) -> Result<(), HalError> {
            if self.fail {
                return Err(HalError::SerialError);
            }
            self.transcript.push(c as char).ok();
            Ok(())
        }
    }

    /// Mock board. Advancing time plays the part of the tick and sampling interrupts.
    pub struct MockHal<'a> {
        shared: &'a SharedState,
        pub feedback: MockToneDisplay,
        pub analog: MockAnalog,
        pub serial: MockSerial,
        raw_buttons: u8,
        sample_interval: u32,
        sample_phase: u32,
        elapsed_ms: u64,
    }

    impl<'a> MockHal<'a> {
        pub fn new(shared: &'a SharedState) -> Self {
            Self::with_config(shared, &GameConfig::default())
        }

        pub fn with_config(shared: &'a SharedState, config: &GameConfig) -> Self {
            Self {
                shared,
                feedback: MockToneDisplay::new(),
                analog: MockAnalog::new(0),
                serial: MockSerial::new(),
                raw_buttons: BUTTONS_RELEASED,
                sample_interval: config.sample_interval_ticks(),
                sample_phase: 0,
                elapsed_ms: 0,
            }
        }

        /// Hold a button down (drives its line low)
        pub fn press(&mut self, slot: Slot) {
            self.raw_buttons &= !slot.mask();
        }

        /// Let a button go (line returns high)
        pub fn release(&mut self, slot: Slot) {
            self.raw_buttons |= slot.mask();
        }

        /// Raw line levels seen by the sampling interrupt
        pub fn set_raw_buttons(&mut self, raw: u8) {
            self.raw_buttons = raw;
        }

        /// Run the periodic interrupts for `ticks` tick periods
        pub fn advance(&mut self, ticks: u32) {
            for _ in 0..ticks {
                self.shared.ticks.tick();
                self.elapsed_ms += 1;
                self.sample_phase += 1;
                if self.sample_phase >= self.sample_interval {
                    self.sample_phase = 0;
                    self.shared.buttons.sample(self.raw_buttons);
                }
            }
        }

        /// State the simulated interrupts write to
        pub fn shared(&self) -> &'a SharedState {
            self.shared
        }

        /// Total ticks delivered since creation
        pub fn elapsed(&self) -> u64 {
            self.elapsed_ms
        }
    }

    impl<'a> GameHal for MockHal<'a> {
        type Feedback = MockToneDisplay;
        type Analog = MockAnalog;
        type Serial = MockSerial;

        fn feedback(&mut self) -> &mut Self::Feedback {
            &mut self.feedback
        }

        fn analog(&mut self) -> &mut Self::Analog {
            &mut self.analog
        }

        fn serial(&mut self) -> &mut Self::Serial {
            &mut self.serial
        }

        fn relax(&mut self) {
            self.advance(1);
        }
    }
}
