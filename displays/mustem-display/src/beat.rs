//! Beat marker
//!
//! A small square lit for a short window after each beat marked by a
//! `RHYTHM` update.

use crate::backend::{DisplayBackend, DisplayError};
use crate::config::SceneConfig;
use crate::gate::UpdateGate;
use crate::signal::SignalState;

/// On-screen beat indicator
#[derive(Debug, Clone, Default)]
pub struct BeatMarker {
    lit: bool,
    gate: UpdateGate,
}

impl BeatMarker {
    pub const fn new() -> Self {
        Self {
            lit: false,
            gate: UpdateGate::new(),
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Forget the marker after the screen was blanked
    pub fn forget_drawn(&mut self) {
        self.lit = false;
    }

    /// Light or clear the marker if the interval elapsed
    ///
    /// The marker is only repainted when its state changes. Returns true if
    /// the updater ran.
    pub fn update<D: DisplayBackend>(
        &mut self,
        now_ms: u32,
        signal: &SignalState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        if !self.gate.ready(now_ms, config.beat_interval_ms) {
            return Ok(false);
        }

        let active = !signal.silent && signal.beat_active(now_ms, config.beat_flash_ms);
        if active != self.lit {
            let color = if active {
                config.beat_color
            } else {
                config.background
            };
            display.fill_rect(config.beat_marker, color)?;
            self.lit = active;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::RecordingDisplay;

    #[test]
    fn test_marker_lights_then_clears() {
        let config = SceneConfig::default();
        let mut display = RecordingDisplay::new(320, 240);
        let mut marker = BeatMarker::new();
        let mut signal = SignalState::default();

        marker.update(0, &signal, &config, &mut display).unwrap();
        assert!(!marker.is_lit());
        assert!(display.rects().is_empty());

        signal.last_beat_ms = Some(100);
        marker.update(100, &signal, &config, &mut display).unwrap();
        assert!(marker.is_lit());
        assert_eq!(display.rects(), std::vec![(config.beat_marker, config.beat_color)]);

        // Stays lit without repainting
        marker.update(200, &signal, &config, &mut display).unwrap();
        assert_eq!(display.rects().len(), 1);

        marker.update(260, &signal, &config, &mut display).unwrap();
        assert!(!marker.is_lit());
        assert_eq!(display.rects()[1], (config.beat_marker, config.background));
    }

    #[test]
    fn test_silence_suppresses_marker() {
        let config = SceneConfig::default();
        let mut display = RecordingDisplay::new(320, 240);
        let mut marker = BeatMarker::new();
        let signal = SignalState {
            last_beat_ms: Some(0),
            silent: true,
            ..SignalState::default()
        };
        marker.update(10, &signal, &config, &mut display).unwrap();
        assert!(!marker.is_lit());
    }
}
