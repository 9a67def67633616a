//! Sensor board telemetry line
//!
//! The sensor board reports one line per analysis block:
//! ```text
//! AMP:123,FREQ:440,BASS:89,MID:76,TREBLE:45,BEAT:1
//! ```
//! Levels are raw 10-bit scale values (0-1023). Keys may appear in any order;
//! missing keys take their defaults and unknown keys are skipped so older
//! hosts keep working when fields are added.

use core::fmt::{self, Write};

use crate::line::Line;

/// Full scale of the level fields
pub const LEVEL_FULL_SCALE: u16 = 1024;

/// Errors from [`Telemetry::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// No recognized key in the line
    NoFields,
    /// A recognized key carried a non-numeric value
    InvalidValue,
    /// Output buffer cannot hold the encoded line
    BufferTooSmall,
}

/// One block of sensor features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Telemetry {
    /// Mean absolute amplitude (0-1023)
    pub amplitude: u16,
    /// Dominant frequency estimate in Hz
    pub frequency_hz: u16,
    /// Bass band level (0-1023)
    pub bass: u16,
    /// Mid band level (0-1023)
    pub mid: u16,
    /// Treble band level (0-1023)
    pub treble: u16,
    /// Beat detected in this block
    pub beat: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            amplitude: 0,
            frequency_hz: 440,
            bass: 0,
            mid: 0,
            treble: 0,
            beat: false,
        }
    }
}

impl Telemetry {
    /// Parse a telemetry line (terminator already removed)
    pub fn parse(line: &str) -> Result<Self, TelemetryError> {
        let mut telemetry = Telemetry::default();
        let mut recognized = false;

        for part in line.trim().split(',') {
            let Some((key, value)) = part.split_once(':') else {
                continue;
            };
            let slot = match key.trim() {
                "AMP" => &mut telemetry.amplitude,
                "FREQ" => &mut telemetry.frequency_hz,
                "BASS" => &mut telemetry.bass,
                "MID" => &mut telemetry.mid,
                "TREBLE" => &mut telemetry.treble,
                "BEAT" => {
                    let flag: u8 = parse_value(value)?;
                    telemetry.beat = flag != 0;
                    recognized = true;
                    continue;
                }
                _ => continue,
            };
            *slot = parse_value(value)?;
            recognized = true;
        }

        if recognized {
            Ok(telemetry)
        } else {
            Err(TelemetryError::NoFields)
        }
    }

    /// Amplitude scaled to 0.0..1.0
    pub fn amplitude_normalized(&self) -> f32 {
        normalize(self.amplitude)
    }

    /// Band levels scaled to 0.0..1.0, as (bass, mid, treble)
    pub fn bands_normalized(&self) -> (f32, f32, f32) {
        (normalize(self.bass), normalize(self.mid), normalize(self.treble))
    }

    /// Render as a newline-terminated line
    pub fn to_line(&self) -> Result<Line, TelemetryError> {
        let mut line = Line::new();
        writeln!(line, "{}", self).map_err(|_| TelemetryError::BufferTooSmall)?;
        Ok(line)
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AMP:{},FREQ:{},BASS:{},MID:{},TREBLE:{},BEAT:{}",
            self.amplitude,
            self.frequency_hz,
            self.bass,
            self.mid,
            self.treble,
            u8::from(self.beat)
        )
    }
}

fn parse_value<T: core::str::FromStr>(value: &str) -> Result<T, TelemetryError> {
    value
        .trim()
        .parse()
        .map_err(|_| TelemetryError::InvalidValue)
}

fn normalize(level: u16) -> f32 {
    level as f32 / LEVEL_FULL_SCALE as f32
}
