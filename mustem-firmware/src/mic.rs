//! Microphone input on the RP2040 ADC

use embassy_rp::adc::{Adc, Blocking, Channel};

use mustem_core::traits::{SampleError, SampleSource};

/// 12-bit converter
const ADC_FULL_SCALE: u16 = 4095;

/// Electret microphone module biased at mid scale on one ADC channel
pub struct MicInput {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl MicInput {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl SampleSource for MicInput {
    fn read_raw(&mut self) -> Result<u16, SampleError> {
        self.adc
            .blocking_read(&mut self.channel)
            .map_err(|_| SampleError::Conversion)
    }

    fn full_scale(&self) -> u16 {
        ADC_FULL_SCALE
    }
}
