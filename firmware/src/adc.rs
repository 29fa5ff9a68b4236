//! On-demand conversions of the cadence potentiometer

use simon_core::AnalogSource;

/// Single-channel ADC with software-triggered conversions
pub trait AdcPort {
    fn start_conversion(&mut self);

    fn conversion_done(&mut self) -> bool;

    /// Result scaled to 8 bits. Clears the done flag.
    fn read_result(&mut self) -> u8;
}

/// Starts a conversion on the first poll and hands out the result once ready
pub struct OnDemandAdc<P> {
    port: P,
    converting: bool,
}

impl<P: AdcPort> OnDemandAdc<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            converting: false,
        }
    }
}

impl<P: AdcPort> AnalogSource for OnDemandAdc<P> {
    fn try_read(&mut self) -> Option<u8> {
        if !self.converting {
            self.port.start_conversion();
            self.converting = true;
        }

        if !self.port.conversion_done() {
            return None;
        }

        self.converting = false;
        Some(self.port.read_result())
    }
}
