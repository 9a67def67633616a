//! Haptic intensity mapping
//!
//! Three vibration motors follow the bass, mid and treble band levels.
//! Levels are smoothed with an exponential filter and scaled by a gain; a
//! beat adds a short pulse on the bass motor. Output is an intensity
//! percentage per motor, fed to the soft-ramping motor driver.

use crate::analysis::Features;
use crate::config::HapticConfig;

/// Number of vibration motors
pub const MOTOR_COUNT: usize = 3;

/// Motor indices
pub const BASS_MOTOR: usize = 0;
pub const MID_MOTOR: usize = 1;
pub const TREBLE_MOTOR: usize = 2;

/// Maps block features to motor intensities
#[derive(Debug, Clone)]
pub struct HapticMapper {
    config: HapticConfig,
    smoothed: [f32; MOTOR_COUNT],
    pulse_start_ms: Option<u32>,
}

impl HapticMapper {
    pub fn new(config: &HapticConfig) -> Self {
        Self {
            config: *config,
            smoothed: [0.0; MOTOR_COUNT],
            pulse_start_ms: None,
        }
    }

    /// Smoothed band levels
    pub fn smoothed(&self) -> [f32; MOTOR_COUNT] {
        self.smoothed
    }

    /// True while a beat pulse is being added to the bass motor
    pub fn pulse_active(&self, now_ms: u32) -> bool {
        self.pulse_start_ms
            .is_some_and(|start| now_ms.wrapping_sub(start) < self.config.beat_pulse_ms)
    }

    pub fn reset(&mut self) {
        self.smoothed = [0.0; MOTOR_COUNT];
        self.pulse_start_ms = None;
    }

    /// Intensity percentages (0-100) for the features of one block
    ///
    /// Silence stops every motor and clears the filter.
    pub fn update(&mut self, features: &Features) -> [u8; MOTOR_COUNT] {
        if features.silent {
            self.reset();
            return [0; MOTOR_COUNT];
        }

        let alpha = self.config.smoothing.clamp(0.0, 1.0);
        for (smoothed, level) in self.smoothed.iter_mut().zip(features.bands.as_array()) {
            let level = if level.is_finite() { level.max(0.0) } else { 0.0 };
            *smoothed += alpha * (level - *smoothed);
        }

        if let Some(beat) = features.beat {
            self.pulse_start_ms = Some(beat.time_ms);
        }

        let mut percent = self.smoothed.map(|level| to_percent(level * self.config.gain));
        if self.pulse_active(features.time_ms) {
            percent[BASS_MOTOR] = percent[BASS_MOTOR]
                .saturating_add(self.config.beat_pulse_percent)
                .min(100);
        }
        percent
    }
}

fn to_percent(value: f32) -> u8 {
    if value.is_finite() {
        value.clamp(0.0, 100.0) as u8
    } else {
        0
    }
}
