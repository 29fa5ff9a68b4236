//! Blocking transmit side of the transcript UART

use simon_core::{HalError, SerialTranscript};

/// Spins allowed per byte before the transmitter is considered stuck
pub const DEFAULT_SPIN_LIMIT: u32 = 100_000;

/// Transmit half of a USART
pub trait UsartPort {
    /// Data register can take another byte
    fn tx_empty(&mut self) -> bool;

    fn write_data(&mut self, byte: u8);
}

pub struct BlockingSerial<P> {
    port: P,
    spin_limit: u32,
}

impl<P: UsartPort> BlockingSerial<P> {
    pub fn new(port: P) -> Self {
        Self::with_spin_limit(port, DEFAULT_SPIN_LIMIT)
    }

    pub fn with_spin_limit(port: P, spin_limit: u32) -> Self {
        Self { port, spin_limit }
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

impl<P: UsartPort> SerialTranscript for BlockingSerial<P> {
    fn write_char(&mut self, c: u8) -> Result<(), HalError> {
        let mut spins = 0;
        while !self.port.tx_empty() {
            spins += 1;
            if spins >= self.spin_limit {
                return Err(HalError::SerialError);
            }
            core::hint::spin_loop();
        }
        self.port.write_data(c);
        Ok(())
    }
}
