//! Analog sample source trait

/// Errors that can occur while reading a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleError {
    /// ADC conversion failed
    Conversion,
    /// Reading outside the converter range
    OutOfRange,
}

/// Trait for microphone sample sources
///
/// Implementations wrap an ADC channel with the microphone biased at mid
/// scale.
pub trait SampleSource {
    /// Read one raw conversion
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read_raw(&mut self) -> Result<u16, SampleError>;

    /// Largest raw value the converter produces
    fn full_scale(&self) -> u16;

    /// Read one sample scaled to -1.0..=1.0 around mid scale
    fn read_normalized(&mut self) -> Result<f32, SampleError> {
        let full_scale = self.full_scale();
        let raw = self.read_raw()?;
        if raw > full_scale {
            return Err(SampleError::OutOfRange);
        }
        Ok(normalize(raw, full_scale))
    }
}

/// Scale a raw conversion to -1.0..=1.0 around mid scale
pub fn normalize(raw: u16, full_scale: u16) -> f32 {
    let half = (full_scale as f32 + 1.0) / 2.0;
    ((raw as f32 - half) / half).clamp(-1.0, 1.0)
}
