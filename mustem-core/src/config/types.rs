//! Sender configuration types
//!
//! `Default` carries the values the firmware falls back to when the
//! embedded configuration omits a key.

use crate::analysis::MAX_BEAT_HISTORY;
use crate::sampler::BLOCK_CAPACITY;

/// Microphone acquisition
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplingConfig {
    /// Samples per second
    pub sample_rate_hz: u32,
    /// Samples per analysis block
    pub block_size: usize,
    /// Lateness tolerated before a slot counts as jitter
    pub jitter_tolerance_us: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 8000,
            block_size: 800,
            jitter_tolerance_us: 60,
        }
    }
}

impl SamplingConfig {
    /// Sampling period in microseconds
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.sample_rate_hz.max(1)
    }

    /// Duration of one block in milliseconds
    pub fn block_duration_ms(&self) -> u32 {
        (self.block_size as u64 * 1000 / self.sample_rate_hz.max(1) as u64) as u32
    }
}

/// Feature extraction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalysisConfig {
    /// Dead band around zero for the zero-crossing pitch estimate
    pub pitch_hysteresis: f32,
    /// Goertzel probes averaged per band
    pub probes_per_band: usize,
    /// Scale from band magnitude to spectrum bar value
    pub spectrum_gain: f32,
    /// Extra spectrum scale per unit of beat strength and tempo
    pub spectrum_beat_boost: f32,
    /// Energy ratio over the running average that counts as a beat
    pub beat_sensitivity: f32,
    /// Blocks in the running energy average
    pub beat_history: usize,
    /// Minimum time between beats
    pub beat_refractory_ms: u32,
    /// Block energy below which no beat is reported
    pub beat_min_energy: f32,
    /// RMS below which a block is quiet
    pub silence_threshold: f32,
    /// Consecutive quiet blocks before reporting silence
    pub silence_blocks: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pitch_hysteresis: 0.02,
            probes_per_band: 3,
            spectrum_gain: 1000.0,
            spectrum_beat_boost: 2.0,
            beat_sensitivity: 1.4,
            beat_history: 10,
            beat_refractory_ms: 300,
            beat_min_energy: 1.0e-4,
            silence_threshold: 0.05,
            silence_blocks: 15,
        }
    }
}

/// Display command pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CadenceConfig {
    /// Minimum time between `WAVE` commands
    pub wave_interval_ms: u32,
    /// Minimum time between `SPECTRUM` commands
    pub spectrum_interval_ms: u32,
    /// Minimum time between `RHYTHM` commands
    pub rhythm_interval_ms: u32,
    /// Time between `CLEAR_WINDINGS` commands
    pub winding_clear_interval_ms: u32,
    /// Emit winding points
    pub windings: bool,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            wave_interval_ms: 50,
            spectrum_interval_ms: 150,
            rhythm_interval_ms: 2000,
            winding_clear_interval_ms: 5000,
            windings: true,
        }
    }
}

/// Vibration motors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HapticConfig {
    /// Intensity percent per unit of band level
    pub gain: f32,
    /// Weight of the newest band level in the smoothing filter (0-1)
    pub smoothing: f32,
    /// Intensity added to the bass motor on a beat
    pub beat_pulse_percent: u8,
    /// Length of the beat pulse
    pub beat_pulse_ms: u32,
    /// Duty cycle below which the motors do not spin
    pub min_duty: u8,
    /// Time to ramp from 0 to 100%
    pub ramp_up_ms: u16,
    /// Time to ramp from 100 to 0%
    pub ramp_down_ms: u16,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            gain: 200.0,
            smoothing: 0.5,
            beat_pulse_percent: 40,
            beat_pulse_ms: 120,
            min_duty: 25,
            ramp_up_ms: 40,
            ramp_down_ms: 120,
        }
    }
}

/// Complete sender board configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SenderConfig {
    pub sampling: SamplingConfig,
    pub analysis: AnalysisConfig,
    pub cadence: CadenceConfig,
    pub haptic: HapticConfig,
    /// Report a telemetry line per block
    pub telemetry: bool,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            analysis: AnalysisConfig::default(),
            cadence: CadenceConfig::default(),
            haptic: HapticConfig::default(),
            telemetry: true,
        }
    }
}

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIssue {
    /// Sample rate is zero or above what the ADC can pace
    SampleRate,
    /// Block size is zero or larger than the block buffer
    BlockSize,
    /// Beat history is zero or larger than its buffer
    BeatHistory,
    /// Smoothing weight is outside 0..=1
    Smoothing,
    /// A percentage is above 100
    Percent,
}

impl SenderConfig {
    /// Check values the parser cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigIssue> {
        if self.sampling.sample_rate_hz == 0 || self.sampling.sample_rate_hz > 100_000 {
            return Err(ConfigIssue::SampleRate);
        }
        if self.sampling.block_size == 0 || self.sampling.block_size > BLOCK_CAPACITY {
            return Err(ConfigIssue::BlockSize);
        }
        if self.analysis.beat_history == 0 || self.analysis.beat_history > MAX_BEAT_HISTORY {
            return Err(ConfigIssue::BeatHistory);
        }
        if !(0.0..=1.0).contains(&self.haptic.smoothing) {
            return Err(ConfigIssue::Smoothing);
        }
        if self.haptic.min_duty > 100 || self.haptic.beat_pulse_percent > 100 {
            return Err(ConfigIssue::Percent);
        }
        Ok(())
    }
}
