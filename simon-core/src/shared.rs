//! State shared between interrupt handlers and the main loop

use portable_atomic::{AtomicU8, Ordering};
use crate::debounce::Debouncer;
use crate::input::{KeyAction, KeyInjector};
use crate::tick::TickSource;
use crate::types::GameplayStage;

/// Everything the interrupts write and the main loop reads.
///
/// Each field has a single interrupt-side writer. Meant to live in a `static`
/// for the lifetime of the device.
pub struct SharedState {
    /// 1 ms tick counter
    pub ticks: TickSource,
    /// Debounced button vector
    pub buttons: Debouncer,
    /// Serial keyboard injection
    pub keys: KeyInjector,
    stage: AtomicU8,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            ticks: TickSource::new(),
            buttons: Debouncer::new(),
            keys: KeyInjector::new(),
            stage: AtomicU8::new(GameplayStage::Start as u8),
        }
    }

    /// Timer interrupt body
    pub fn on_tick(&self) {
        self.ticks.tick();
    }

    /// Sampling interrupt body
    pub fn on_sample(&self, raw: u8) {
        self.buttons.sample(raw);
    }

    /// Serial receive interrupt body. Injection is only accepted during Input.
    pub fn on_serial_rx(&self, byte: u8) -> KeyAction {
        self.keys.on_receive(byte, self.stage().accepts_input())
    }

    /// Stage last published by the main loop
    pub fn stage(&self) -> GameplayStage {
        GameplayStage::from_raw(self.stage.load(Ordering::Acquire))
    }

    /// Publish the current stage (main loop only)
    pub fn publish_stage(&self, stage: GameplayStage) {
        self.stage.store(stage.as_raw(), Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn publish_raw_stage(&self, raw: u8) {
        self.stage.store(raw, Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
