//! Playback cadence: step duration from the analog control and busy waits

use crate::hal::{AnalogSource, GameHal};
use crate::tick::{Stopwatch, TickSource};
use crate::types::CadenceConfig;

/// Step duration and the timed waits built on it.
///
/// Waits spin on the tick source and only return once the timer interrupt has
/// advanced it far enough. If the tick interrupt stops, they never return.
#[derive(Debug)]
pub struct PlaybackCadence {
    config: CadenceConfig,
    delay: u32,
    timer: Stopwatch,
}

impl PlaybackCadence {
    /// Start with the delay for a zero reading
    pub fn new(config: CadenceConfig) -> Self {
        Self {
            config,
            delay: Self::delay_for(&config, 0),
            timer: Stopwatch::new(),
        }
    }

    /// Delay in ticks for an analog reading
    pub const fn delay_for(config: &CadenceConfig, reading: u8) -> u32 {
        (config.base + config.gain * reading as u32) >> config.shift
    }

    /// Poll the analog control once. Returns false (keeping the previous delay)
    /// if no conversion result is ready yet.
    pub fn recompute_delay<A: AnalogSource>(&mut self, analog: &mut A) -> bool {
        match analog.try_read() {
            Some(reading) => {
                self.delay = Self::delay_for(&self.config, reading);
                true
            }
            None => false,
        }
    }

    /// Current step duration in ticks
    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Half step duration in ticks
    pub fn half_delay(&self) -> u32 {
        self.delay >> 1
    }

    /// Busy-wait one full step
    pub fn wait_full<H: GameHal>(&mut self, ticks: &TickSource, hal: &mut H) {
        self.wait(ticks, hal, self.delay);
    }

    /// Busy-wait half a step
    pub fn wait_half<H: GameHal>(&mut self, ticks: &TickSource, hal: &mut H) {
        self.wait(ticks, hal, self.half_delay());
    }

    fn wait<H: GameHal>(&mut self, ticks: &TickSource, hal: &mut H, duration: u32) {
        self.timer.restart(ticks);
        while !self.timer.has_elapsed(ticks, duration) {
            hal.relax();
        }
    }
}
