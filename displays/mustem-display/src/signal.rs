//! Signal scalars driving the animations

use mustem_protocol::WaveUpdate;

/// Latest signal values received from the host
///
/// Updated by `WAVE`, `RHYTHM` and `SILENCE` commands and read by the
/// animation updaters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalState {
    /// Normalized signal amplitude
    pub amplitude: f32,
    /// Dominant frequency in Hz
    pub frequency: f32,
    /// Phase speed multiplier derived from tempo
    pub tempo_multiplier: f32,
    /// Strength of the most recent beat (0.0..=1.0)
    pub beat_strength: f32,
    /// Tempo in beats per minute
    pub bpm: f32,
    /// Time of the last marked beat
    pub last_beat_ms: Option<u32>,
    /// Host reported silence
    pub silent: bool,
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalState {
    pub const fn new() -> Self {
        Self {
            amplitude: 0.0,
            frequency: 440.0,
            tempo_multiplier: 1.0,
            beat_strength: 0.0,
            bpm: 120.0,
            last_beat_ms: None,
            silent: false,
        }
    }

    /// Apply a `WAVE` payload
    pub fn apply_wave(&mut self, update: WaveUpdate) {
        match update {
            WaveUpdate::Full {
                amplitude,
                frequency,
                tempo_multiplier,
                beat_strength,
            } => {
                self.amplitude = amplitude;
                self.frequency = frequency;
                self.tempo_multiplier = tempo_multiplier;
                self.beat_strength = beat_strength;
            }
            WaveUpdate::AmplitudeOnly(amplitude) => self.amplitude = amplitude,
        }
    }

    /// Apply a `RHYTHM` payload
    ///
    /// Tempo is always taken; the beat time only moves when `beat_strength`
    /// exceeds `threshold`.
    pub fn apply_rhythm(
        &mut self,
        bpm: f32,
        beat_strength: f32,
        tempo_multiplier: f32,
        now_ms: u32,
        threshold: f32,
    ) {
        self.bpm = bpm;
        self.tempo_multiplier = tempo_multiplier;
        if beat_strength > threshold {
            self.last_beat_ms = Some(now_ms);
        }
    }

    /// Phase speed factor from the current beat strength
    pub fn beat_boost(&self, gain: f32) -> f32 {
        1.0 + self.beat_strength.clamp(0.0, 1.0) * gain
    }

    /// True while `now_ms` is within `flash_ms` of the last beat
    pub fn beat_active(&self, now_ms: u32, flash_ms: u32) -> bool {
        match self.last_beat_ms {
            Some(beat) => now_ms.wrapping_sub(beat) < flash_ms,
            None => false,
        }
    }
}
