#![cfg_attr(not(test), no_std)]

//! Board support for the CH32V003 game board
//!
//! Everything here is register-free and builds on the host: the binary supplies
//! the peripheral ports, this crate turns them into the engine's collaborators.

pub mod clock;
pub mod display;
pub mod tone;
pub mod feedback;
pub mod adc;
pub mod usart;

pub use adc::{AdcPort, OnDemandAdc};
pub use display::DisplayBuffer;
pub use feedback::BoardFeedback;
pub use tone::{Tone, TonePort};
pub use usart::{BlockingSerial, UsartPort};
