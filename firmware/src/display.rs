//! Two-digit seven-segment display
//!
//! Segments are active low. The board shifts out one byte per refresh, left and
//! right alternating; the left byte carries the digit-select bit.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};
use simon_core::{Pattern, Slot};

/// All segments off
pub const SEG_OFF: u8 = 0b0111_1111;
/// Digit-select bit, set on the left byte
pub const SEG_LEFT_SELECT: u8 = 1 << 7;

const SEG_B: u8 = 0b0110_1111;
const SEG_C: u8 = 0b0111_1011;
const SEG_E: u8 = 0b0111_1110;
const SEG_F: u8 = 0b0011_1111;

/// Vertical bar on the left half of a digit
pub const BAR_LEFT: u8 = SEG_E & SEG_F;
/// Vertical bar on the right half of a digit
pub const BAR_RIGHT: u8 = SEG_B & SEG_C;

/// Decimal digits 0-9
pub const DIGITS: [u8; 10] = [0x08, 0x6B, 0x44, 0x41, 0x23, 0x11, 0x10, 0x4B, 0x00, 0x01];

/// Every segment lit
pub const SUCCESS_SEGMENTS: (u8, u8) = (0x00, 0x00);
/// Both middle bars off, everything else lit
pub const FAIL_SEGMENTS: (u8, u8) = (0x77, 0x77);

/// Segment byte for a digit; `None` or out of range is blank
pub const fn digit(value: Option<u8>) -> u8 {
    match value {
        Some(d) if d < 10 => DIGITS[d as usize],
        _ => SEG_OFF,
    }
}

/// Bar position for a slot: `|   `, ` |  `, `  | `, `   |`
pub const fn slot_segments(slot: Slot) -> (u8, u8) {
    match slot {
        Slot::One => (BAR_LEFT, SEG_OFF),
        Slot::Two => (BAR_RIGHT, SEG_OFF),
        Slot::Three => (SEG_OFF, BAR_LEFT),
        Slot::Four => (SEG_OFF, BAR_RIGHT),
    }
}

pub const fn pattern_segments(pattern: Pattern) -> (u8, u8) {
    match pattern {
        Pattern::Success => SUCCESS_SEGMENTS,
        Pattern::Fail => FAIL_SEGMENTS,
        Pattern::Score { tens, ones } => (digit(tens), digit(Some(ones))),
    }
}

/// Bytes the refresh interrupt shifts out.
///
/// Written by the main loop, read by the refresh interrupt.
pub struct DisplayBuffer {
    left: AtomicU8,
    right: AtomicU8,
    right_next: AtomicBool,
}

impl DisplayBuffer {
    pub const fn new() -> Self {
        Self {
            left: AtomicU8::new(SEG_OFF | SEG_LEFT_SELECT),
            right: AtomicU8::new(SEG_OFF),
            right_next: AtomicBool::new(false),
        }
    }

    /// Replace both digits
    pub fn set(&self, (left, right): (u8, u8)) {
        self.left.store(left | SEG_LEFT_SELECT, Ordering::Relaxed);
        self.right.store(right, Ordering::Relaxed);
    }

    pub fn blank(&self) {
        self.set((SEG_OFF, SEG_OFF));
    }

    /// Current (left, right) bytes as shifted out
    pub fn bytes(&self) -> (u8, u8) {
        (
            self.left.load(Ordering::Relaxed),
            self.right.load(Ordering::Relaxed),
        )
    }

    /// Next byte to shift out. Alternates left and right on every call.
    pub fn next_byte(&self) -> u8 {
        let right = self.right_next.load(Ordering::Relaxed);
        self.right_next.store(!right, Ordering::Relaxed);
        if right {
            self.right.load(Ordering::Relaxed)
        } else {
            self.left.load(Ordering::Relaxed)
        }
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}
