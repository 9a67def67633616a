//! Phase-driven sine wave updater
//!
//! Each redraw first erases the previous curve by tracing it again in the
//! background color, then advances the phase and traces the new curve. The
//! line primitive is deterministic, so the erase touches exactly the pixels
//! the previous draw did.

use core::f32::consts::TAU;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;
use num_traits::Float;

use crate::backend::{DisplayBackend, DisplayError};
use crate::color::frequency_to_color;
use crate::config::SceneConfig;
use crate::gate::UpdateGate;
use crate::layer::LayerState;
use crate::signal::SignalState;

/// Frequency giving one full cycle across the screen
pub const HZ_PER_CYCLE: f32 = 110.0;

/// Fewest cycles drawn across the screen
pub const MIN_CYCLES: f32 = 1.0;

/// Most cycles drawn across the screen
pub const MAX_CYCLES: f32 = 8.0;

/// Parameters a curve was drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
struct Curve {
    phase: f32,
    amplitude_px: f32,
    cycles: f32,
    color: Rgb565,
}

impl Curve {
    fn new(phase: f32, signal: &SignalState, config: &SceneConfig) -> Self {
        let max_px = config.wave_half_height.max(0) as f32;
        Self {
            phase,
            amplitude_px: (signal.amplitude * config.wave_gain).clamp(0.0, max_px),
            cycles: (signal.frequency / HZ_PER_CYCLE).clamp(MIN_CYCLES, MAX_CYCLES),
            color: frequency_to_color(signal.frequency),
        }
    }

    fn vertex(&self, x: i32, config: &SceneConfig) -> Point {
        let width = config.size.width.max(1) as f32;
        let angle = self.phase + TAU * self.cycles * x as f32 / width;
        let offset = (self.amplitude_px * angle.sin()).round() as i32;
        Point::new(x, config.wave_center_y - offset)
    }

    /// Draw the polyline, returning its last vertex
    fn trace<D: DisplayBackend>(
        &self,
        color: Rgb565,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<Point, DisplayError> {
        let last_x = config.size.width.saturating_sub(1) as i32;
        let step = config.wave_step_px.max(1) as i32;

        let mut prev = self.vertex(0, config);
        let mut x = 0;
        while x < last_x {
            x = (x + step).min(last_x);
            let next = self.vertex(x, config);
            display.draw_line(prev, next, color)?;
            prev = next;
        }
        if last_x == 0 {
            display.draw_pixel(prev, color)?;
        }
        Ok(prev)
    }
}

/// Animated sine wave
#[derive(Debug, Clone, Default)]
pub struct WaveAnimator {
    phase: f32,
    gate: UpdateGate,
    drawn: Option<Curve>,
}

impl WaveAnimator {
    pub const fn new() -> Self {
        Self {
            phase: 0.0,
            gate: UpdateGate::new(),
            drawn: None,
        }
    }

    /// Current phase in radians, always within `[0, 2π)`
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// True if a curve is on screen
    pub fn is_drawn(&self) -> bool {
        self.drawn.is_some()
    }

    /// Amplitude in pixels of the curve on screen
    pub fn drawn_amplitude_px(&self) -> Option<f32> {
        self.drawn.map(|c| c.amplitude_px)
    }

    /// Back to phase zero with nothing drawn
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Forget the on-screen curve after the screen was blanked
    pub fn forget_drawn(&mut self) {
        self.drawn = None;
    }

    /// Advance and repaint if the wave interval elapsed
    ///
    /// Does nothing while the layer is disabled. While silent the old curve
    /// is erased and no new one is drawn. Returns true if the updater ran.
    pub fn update<D: DisplayBackend>(
        &mut self,
        now_ms: u32,
        signal: &SignalState,
        layer: &mut LayerState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        if !layer.is_enabled() || !self.gate.ready(now_ms, config.wave_interval_ms) {
            return Ok(false);
        }

        self.erase(config, display)?;
        self.advance(signal, config);
        if !signal.silent {
            self.draw(signal, layer, config, display)?;
        }
        Ok(true)
    }

    /// Draw at the current phase without advancing
    ///
    /// Used after the screen was blanked underneath the wave.
    pub fn redraw<D: DisplayBackend>(
        &mut self,
        signal: &SignalState,
        layer: &mut LayerState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        self.drawn = None;
        if layer.is_enabled() && !signal.silent {
            self.draw(signal, layer, config, display)?;
        }
        Ok(())
    }

    /// Remove the curve on screen, if any
    pub fn erase<D: DisplayBackend>(
        &mut self,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        if let Some(curve) = self.drawn.take() {
            curve.trace(config.background, config, display)?;
        }
        Ok(())
    }

    fn advance(&mut self, signal: &SignalState, config: &SceneConfig) {
        let step = signal.tempo_multiplier
            * config.wave_base_speed
            * signal.beat_boost(config.beat_boost_gain);
        if !step.is_finite() {
            return;
        }
        let mut phase = (self.phase + step) % TAU;
        if phase < 0.0 {
            phase += TAU;
        }
        // Rounding can land exactly on TAU
        self.phase = if phase >= TAU { 0.0 } else { phase };
    }

    fn draw<D: DisplayBackend>(
        &mut self,
        signal: &SignalState,
        layer: &mut LayerState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        let curve = Curve::new(self.phase, signal, config);
        let end = curve.trace(curve.color, config, display)?;
        self.drawn = Some(curve);
        layer.record_position(end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FrameBuffer;

    fn setup() -> (WaveAnimator, SignalState, LayerState, SceneConfig, FrameBuffer) {
        let config = SceneConfig::default();
        let display = FrameBuffer::new(config.size.width, config.size.height, config.background);
        let signal = SignalState {
            amplitude: 0.05,
            ..SignalState::default()
        };
        (WaveAnimator::new(), signal, LayerState::new(), config, display)
    }

    #[test]
    fn test_draws_on_first_update() {
        let (mut wave, signal, mut layer, config, mut display) = setup();
        assert!(wave.update(0, &signal, &mut layer, &config, &mut display).unwrap());
        assert!(wave.is_drawn());
        assert!(display.count_not(config.background) > 0);
        assert_eq!(
            layer.last_position().map(|p| p.x),
            Some(config.size.width as i32 - 1)
        );
    }

    #[test]
    fn test_interval_gates_updates() {
        let (mut wave, signal, mut layer, config, mut display) = setup();
        assert!(wave.update(0, &signal, &mut layer, &config, &mut display).unwrap());
        let phase = wave.phase();
        assert!(!wave.update(19, &signal, &mut layer, &config, &mut display).unwrap());
        assert_eq!(wave.phase(), phase);
        assert!(wave.update(20, &signal, &mut layer, &config, &mut display).unwrap());
        assert!(wave.phase() > phase);
    }

    #[test]
    fn test_phase_step_follows_tempo_and_beat() {
        let (mut wave, mut signal, mut layer, config, mut display) = setup();
        signal.tempo_multiplier = 2.0;
        signal.beat_strength = 1.0;
        wave.update(0, &signal, &mut layer, &config, &mut display).unwrap();

        let expected = 2.0 * config.wave_base_speed * (1.0 + config.beat_boost_gain);
        assert!((wave.phase() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_phase_wraps() {
        let (mut wave, mut signal, mut layer, config, mut display) = setup();
        signal.tempo_multiplier = 10.0;
        for i in 0..200 {
            wave.update(i * 20, &signal, &mut layer, &config, &mut display).unwrap();
            assert!((0.0..TAU).contains(&wave.phase()));
        }

        signal.tempo_multiplier = -3.0;
        for i in 200..400 {
            wave.update(i * 20, &signal, &mut layer, &config, &mut display).unwrap();
            assert!((0.0..TAU).contains(&wave.phase()));
        }
    }

    #[test]
    fn test_erase_leaves_no_pixels() {
        let (mut wave, mut signal, mut layer, config, mut display) = setup();
        for i in 0..10 {
            signal.frequency = 110.0 * (i + 1) as f32;
            wave.update(i * 20, &signal, &mut layer, &config, &mut display).unwrap();
        }
        assert!(display.count_not(config.background) > 0);

        wave.erase(&config, &mut display).unwrap();
        assert_eq!(display.count_not(config.background), 0);
        assert!(!wave.is_drawn());
    }

    #[test]
    fn test_silence_hides_wave() {
        let (mut wave, mut signal, mut layer, config, mut display) = setup();
        wave.update(0, &signal, &mut layer, &config, &mut display).unwrap();
        signal.silent = true;
        wave.update(20, &signal, &mut layer, &config, &mut display).unwrap();
        assert_eq!(display.count_not(config.background), 0);
        assert!(!wave.is_drawn());
    }

    #[test]
    fn test_disabled_layer_freezes() {
        let (mut wave, signal, mut layer, config, mut display) = setup();
        layer.set_enabled(false);
        assert!(!wave.update(0, &signal, &mut layer, &config, &mut display).unwrap());
        assert_eq!(wave.phase(), 0.0);
        assert_eq!(display.count_not(config.background), 0);
        assert_eq!(layer.last_position(), None);
    }

    #[test]
    fn test_amplitude_clamped_to_band() {
        let (mut wave, mut signal, mut layer, config, mut display) = setup();
        signal.amplitude = 50.0;
        wave.update(0, &signal, &mut layer, &config, &mut display).unwrap();
        assert_eq!(
            wave.drawn_amplitude_px(),
            Some(config.wave_half_height as f32)
        );

        let top = config.wave_center_y - config.wave_half_height;
        let bottom = config.wave_center_y + config.wave_half_height;
        for y in (0..top).chain(bottom + 1..config.size.height as i32) {
            for x in 0..config.size.width as i32 {
                assert_eq!(display.pixel(x, y), Some(config.background));
            }
        }
    }

    #[test]
    fn test_cycles_clamped() {
        let config = SceneConfig::default();
        let mut signal = SignalState::default();
        signal.frequency = 20.0;
        assert_eq!(Curve::new(0.0, &signal, &config).cycles, MIN_CYCLES);
        signal.frequency = 20_000.0;
        assert_eq!(Curve::new(0.0, &signal, &config).cycles, MAX_CYCLES);
        signal.frequency = 440.0;
        assert_eq!(Curve::new(0.0, &signal, &config).cycles, 4.0);
    }
}
