//! Per-block feature extraction

use mustem_protocol::{Telemetry, WaveUpdate, SPECTRUM_BARS};
use num_traits::Float;

use super::beat::{BeatDetector, BeatEvent};
use super::energy::{mean_abs, remove_dc, rms};
use super::goertzel::{spectrum_levels, tri_band_levels, TriBand};
use super::pitch::zero_crossing_frequency;
use super::silence::SilenceDetector;
use crate::config::{AnalysisConfig, SamplingConfig};

/// Frequency reported when no pitch can be estimated
pub const DEFAULT_FREQUENCY_HZ: f32 = 440.0;

/// Features of one analysis block
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Features {
    /// Block time
    pub time_ms: u32,
    /// Mean absolute amplitude
    pub amplitude: f32,
    /// Root mean square
    pub rms: f32,
    /// Dominant frequency estimate
    pub frequency: f32,
    /// Bass, mid and treble levels
    pub bands: TriBand,
    /// Spectrum bar values
    pub spectrum: [u8; SPECTRUM_BARS],
    /// Beat detected in this block
    pub beat: Option<BeatEvent>,
    /// Energy rise over the running average (0.0..=1.0)
    pub beat_strength: f32,
    /// Tempo estimate
    pub bpm: f32,
    /// Phase speed factor derived from the tempo
    pub tempo_multiplier: f32,
    /// Input has been quiet long enough to count as silence
    pub silent: bool,
    /// Silence state changed with this block
    pub silence_changed: Option<bool>,
}

impl Features {
    /// Payload of the `WAVE` command for this block
    pub fn wave_update(&self) -> WaveUpdate {
        WaveUpdate::Full {
            amplitude: self.amplitude,
            frequency: self.frequency,
            tempo_multiplier: self.tempo_multiplier,
            beat_strength: self.beat_strength,
        }
    }

    /// Telemetry line for this block
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            amplitude: level(self.amplitude),
            frequency_hz: self.frequency.round() as u16,
            bass: level(self.bands.bass),
            mid: level(self.bands.mid),
            treble: level(self.bands.treble),
            beat: self.beat.is_some(),
        }
    }
}

/// Scale a 0.0..=1.0 level to the telemetry range
fn level(value: f32) -> u16 {
    let full = mustem_protocol::telemetry::LEVEL_FULL_SCALE;
    (value * full as f32).clamp(0.0, (full - 1) as f32) as u16
}

/// Stateful extractor fed one block at a time
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    sample_rate_hz: u32,
    config: AnalysisConfig,
    beat: BeatDetector,
    silence: SilenceDetector,
}

impl FeatureExtractor {
    pub fn new(sampling: &SamplingConfig, config: &AnalysisConfig) -> Self {
        Self {
            sample_rate_hz: sampling.sample_rate_hz,
            config: *config,
            beat: BeatDetector::new(
                config.beat_history,
                config.beat_sensitivity,
                config.beat_refractory_ms,
                config.beat_min_energy,
            ),
            silence: SilenceDetector::new(config.silence_threshold, config.silence_blocks),
        }
    }

    pub fn beat_detector(&self) -> &BeatDetector {
        &self.beat
    }

    /// Analyse one block taken at `now_ms`
    ///
    /// The block is modified in place (its DC offset is removed).
    pub fn process(&mut self, block: &mut [f32], now_ms: u32) -> Features {
        remove_dc(block);

        let amplitude = mean_abs(block);
        let rms = rms(block);
        let silence_changed = self.silence.update(rms);

        let frequency = zero_crossing_frequency(block, self.sample_rate_hz, self.config.pitch_hysteresis)
            .unwrap_or(DEFAULT_FREQUENCY_HZ);
        let bands = tri_band_levels(block, self.sample_rate_hz, self.config.probes_per_band);

        let beat = self.beat.process(rms * rms, now_ms);
        let beat_strength = self.beat.strength();
        let tempo_multiplier = self.beat.tempo_multiplier();

        let boost = 1.0 + beat_strength * self.config.spectrum_beat_boost * tempo_multiplier;
        let spectrum = spectrum_levels(
            block,
            self.sample_rate_hz,
            self.config.probes_per_band,
            self.config.spectrum_gain,
            boost,
        );

        Features {
            time_ms: now_ms,
            amplitude,
            rms,
            frequency,
            bands,
            spectrum,
            beat,
            beat_strength,
            bpm: self.beat.bpm(),
            tempo_multiplier,
            silent: self.silence.is_silent(),
            silence_changed,
        }
    }
}
