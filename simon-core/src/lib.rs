#![cfg_attr(not(feature = "std"), no_std)]

//! # Simon Core
//!
//! Gameplay engine for a four-button "repeat the growing sequence" memory game.
//! The engine is driven by a cooperative main loop and two periodic interrupts:
//! a 1 ms tick and a 5 ms button sampling tick.

pub mod types;
pub mod hal;
pub mod tick;
pub mod debounce;
pub mod edge;
pub mod sequence;
pub mod cadence;
pub mod input;
pub mod dispatcher;
pub mod report;
pub mod shared;
pub mod fsm;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use hal::{AnalogSource, ButtonPins, GameHal, HalError, SerialTranscript, ToneDisplay};
pub use tick::{Stopwatch, TickSource};
pub use debounce::Debouncer;
pub use edge::{EdgeDetector, EdgeMasks};
pub use sequence::{advance, SequenceGenerator};
pub use cadence::PlaybackCadence;
pub use input::{KeyAction, KeyInjector};
pub use dispatcher::InputDispatcher;
pub use report::{format_score, RoundOutcome};
pub use shared::SharedState;
pub use fsm::GameFsm;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration matching the reference board (1 ms tick, 5 ms sampling)
pub fn default_config() -> GameConfig {
    GameConfig {
        seed: sequence::DEFAULT_SEED,
        cadence: CadenceConfig {
            base: 2000,
            gain: 55,
            shift: 3,
        },
        tick_ms: 1,
        sample_interval_ms: 5,
    }
}
