//! Round outcome reporting over the serial transcript

use core::fmt::Write;
use heapless::String;
use crate::hal::{HalError, SerialTranscript};

/// Result of a judged round
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoundOutcome {
    /// Whole sequence reproduced; score is the sequence length
    Success { score: u16 },
    /// Mismatch; score is the last completed length
    GameOver { score: u16 },
}

impl RoundOutcome {
    pub const fn score(&self) -> u16 {
        match self {
            RoundOutcome::Success { score } | RoundOutcome::GameOver { score } => *score,
        }
    }

    /// Transcript headline
    pub const fn headline(&self) -> &'static str {
        match self {
            RoundOutcome::Success { .. } => "SUCCESS",
            RoundOutcome::GameOver { .. } => "GAME OVER",
        }
    }

    /// Write the headline and the score, one line each
    pub fn write_to<S: SerialTranscript>(&self, serial: &mut S) -> Result<(), HalError> {
        serial.write_line(self.headline())?;
        serial.write_line(&format_score(self.score()))
    }
}

/// Plain decimal, no leading zeros
pub fn format_score(score: u16) -> String<5> {
    let mut text = String::new();
    // u16 never needs more than five digits
    write!(text, "{}", score).ok();
    text
}
