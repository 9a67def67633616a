//! Scene state and command dispatch
//!
//! The [`Scene`] owns every piece of display state: layer flags and
//! positions, the latest signal values and the animation updaters. Commands
//! are applied with [`Scene::apply`]; animations advance with
//! [`Scene::tick`]. Both take the display as a parameter so the scene itself
//! holds no hardware.

use embedded_graphics::prelude::Point;
use mustem_protocol::{Command, LayerId, WindingPoint};

use crate::backend::{DisplayBackend, DisplayError};
use crate::beat::BeatMarker;
use crate::color::to_rgb565;
use crate::config::SceneConfig;
use crate::layer::Layers;
use crate::signal::SignalState;
use crate::spectrum::SpectrumAnimator;
use crate::wave::WaveAnimator;

/// Everything drawn on the display
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    layers: Layers,
    signal: SignalState,
    wave: WaveAnimator,
    spectrum: SpectrumAnimator,
    beat: BeatMarker,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Scene {
    /// Create a scene with all layers enabled and default signals
    pub const fn new(config: SceneConfig) -> Self {
        Self {
            config,
            layers: Layers::new(),
            signal: SignalState::new(),
            wave: WaveAnimator::new(),
            spectrum: SpectrumAnimator::new(),
            beat: BeatMarker::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn signal(&self) -> &SignalState {
        &self.signal
    }

    pub fn wave(&self) -> &WaveAnimator {
        &self.wave
    }

    pub fn spectrum(&self) -> &SpectrumAnimator {
        &self.spectrum
    }

    pub fn beat(&self) -> &BeatMarker {
        &self.beat
    }

    /// Blank the display to match a fresh scene
    pub fn init<D: DisplayBackend>(&mut self, display: &mut D) -> Result<(), DisplayError> {
        display.fill_screen(self.config.background)?;
        self.reset();
        display.flush()
    }

    /// Apply one command received at `now_ms`
    pub fn apply<D: DisplayBackend>(
        &mut self,
        command: &Command,
        now_ms: u32,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        let drew = match *command {
            Command::Clear | Command::ClearAll => {
                display.fill_screen(self.config.background)?;
                self.reset();
                true
            }
            Command::ClearWindings => {
                self.clear_windings(display)?;
                true
            }
            Command::SetLayer { layer, enabled } => self.set_layer(layer, enabled, display)?,
            Command::Winding(point) => self.winding(point, display)?,
            Command::Wave(update) => {
                self.signal.apply_wave(update);
                false
            }
            Command::Rhythm {
                bpm,
                beat_strength,
                tempo_multiplier,
            } => {
                self.signal.apply_rhythm(
                    bpm,
                    beat_strength,
                    tempo_multiplier,
                    now_ms,
                    self.config.beat_threshold,
                );
                false
            }
            Command::Spectrum(values) => {
                self.spectrum.set_targets(values);
                false
            }
            Command::Silence(silent) => {
                self.signal.silent = silent;
                false
            }
        };
        if drew {
            display.flush()?;
        }
        Ok(())
    }

    /// Run the time-gated updaters
    ///
    /// Returns true if any updater ran.
    pub fn tick<D: DisplayBackend>(
        &mut self,
        now_ms: u32,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        let wave = self.wave.update(
            now_ms,
            &self.signal,
            self.layers.get_mut(LayerId::Wave),
            &self.config,
            display,
        )?;
        let spectrum = self.spectrum.update(
            now_ms,
            self.signal.silent,
            self.layers.get_mut(LayerId::Spectrum),
            &self.config,
            display,
        )?;
        let beat = self.beat.update(now_ms, &self.signal, &self.config, display)?;

        let ran = wave || spectrum || beat;
        if ran {
            display.flush()?;
        }
        Ok(ran)
    }

    /// Shortest updater interval
    ///
    /// Ticking at this period keeps every updater on schedule.
    pub fn tick_interval_ms(&self) -> u32 {
        self.config
            .wave_interval_ms
            .min(self.config.spectrum_interval_ms)
            .min(self.config.beat_interval_ms)
    }

    fn reset(&mut self) {
        self.layers.forget_positions();
        self.signal = SignalState::new();
        self.wave.reset();
        self.spectrum.reset();
        self.beat.reset();
    }

    fn clear_windings<D: DisplayBackend>(&mut self, display: &mut D) -> Result<(), DisplayError> {
        display.fill_screen(self.config.background)?;
        self.layers.get_mut(LayerId::Winding).forget_position();
        self.beat.forget_drawn();
        self.wave.redraw(
            &self.signal,
            self.layers.get_mut(LayerId::Wave),
            &self.config,
            display,
        )?;
        self.spectrum.redraw(
            self.layers.get_mut(LayerId::Spectrum),
            &self.config,
            display,
        )
    }

    fn set_layer<D: DisplayBackend>(
        &mut self,
        layer: LayerId,
        enabled: bool,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        if self.layers.is_enabled(layer) == enabled {
            return Ok(false);
        }
        self.layers.get_mut(layer).set_enabled(enabled);
        if enabled {
            return Ok(false);
        }
        match layer {
            LayerId::Wave => self.wave.erase(&self.config, display)?,
            LayerId::Spectrum => self.spectrum.erase(&self.config, display)?,
            // Winding strokes stay until the next clear
            LayerId::Winding => return Ok(false),
        }
        Ok(true)
    }

    fn winding<D: DisplayBackend>(
        &mut self,
        point: WindingPoint,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        let state = self.layers.get_mut(LayerId::Winding);
        if !state.is_enabled() {
            return Ok(false);
        }

        let current = self.config.clamp_to_screen(Point::new(point.x, point.y));
        let color = to_rgb565(point.color);
        match state.last_position() {
            Some(previous) => display.draw_line(previous, current, color)?,
            None => display.draw_pixel(current, color)?,
        }
        state.record_position(current);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{FrameBuffer, Op, RecordingDisplay};
    use mustem_protocol::{ParseError, Rgb, SPECTRUM_BARS};
    use proptest::prelude::*;

    fn apply_line<D: DisplayBackend>(scene: &mut Scene, line: &str, now_ms: u32, display: &mut D) {
        if let Ok(command) = Command::parse(line) {
            scene.apply(&command, now_ms, display).unwrap();
        }
    }

    fn pixels(display: &RecordingDisplay) -> std::vec::Vec<Point> {
        display
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Pixel(p, _) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_winding_plots_single_point() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "WINDING:10,20,255,0,0", 0, &mut display);

        assert_eq!(pixels(&display), std::vec![Point::new(10, 20)]);
        assert_eq!(
            scene.layers().get(LayerId::Winding).last_position(),
            Some(Point::new(10, 20))
        );
    }

    #[test]
    fn test_second_winding_connects_points() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "WINDING:10,20,255,0,0", 0, &mut display);
        display.clear();
        apply_line(&mut scene, "WINDING:14,20,255,0,0", 0, &mut display);

        let points = pixels(&display);
        assert_eq!(points.first(), Some(&Point::new(10, 20)));
        assert_eq!(points.last(), Some(&Point::new(14, 20)));
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn test_winding_disabled_draws_nothing() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "WINDING:10,20,255,0,0", 0, &mut display);
        apply_line(&mut scene, "LAYER_WINDING_OFF", 0, &mut display);
        display.clear();

        apply_line(&mut scene, "WINDING:50,50,255,0,0", 0, &mut display);
        assert!(pixels(&display).is_empty());
        assert_eq!(
            scene.layers().get(LayerId::Winding).last_position(),
            Some(Point::new(10, 20))
        );
    }

    #[test]
    fn test_winding_color_packed() {
        let mut scene = Scene::default();
        let mut display = FrameBuffer::new(320, 240, scene.config().background);
        apply_line(&mut scene, "WINDING:5,5,255,255,255", 0, &mut display);
        assert_eq!(display.pixel(5, 5), Some(to_rgb565(Rgb::WHITE)));
    }

    #[test]
    fn test_clear_all_restores_defaults_keeps_layer_flags() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "WAVE:0.5,880,2.0,0.9", 0, &mut display);
        apply_line(&mut scene, "RHYTHM:140.0,0.9,1.2", 0, &mut display);
        apply_line(&mut scene, "WINDING:1,1,1,1,1", 0, &mut display);
        apply_line(&mut scene, "SPECTRUM:9,9,9,9,9,9,9,9,9,9", 0, &mut display);
        apply_line(&mut scene, "SILENCE:1", 0, &mut display);
        apply_line(&mut scene, "LAYER_SPECTRUM_OFF", 0, &mut display);
        scene.tick(0, &mut display).unwrap();

        apply_line(&mut scene, "CLEAR_ALL", 10, &mut display);
        assert_eq!(*scene.signal(), SignalState::default());
        assert_eq!(scene.wave().phase(), 0.0);
        assert_eq!(scene.spectrum().targets(), &[0; SPECTRUM_BARS]);
        assert_eq!(scene.layers().get(LayerId::Winding).last_position(), None);
        assert!(!scene.layers().is_enabled(LayerId::Spectrum));
        assert!(scene.layers().is_enabled(LayerId::Wave));

        // A legacy update after the clear lands on top of defaults
        apply_line(&mut scene, "WAVE:0.25", 20, &mut display);
        let signal = scene.signal();
        assert_eq!(signal.amplitude, 0.25);
        assert_eq!(signal.frequency, 440.0);
        assert_eq!(signal.tempo_multiplier, 1.0);
        assert_eq!(signal.beat_strength, 0.0);
    }

    #[test]
    fn test_clear_blanks_screen() {
        let mut scene = Scene::default();
        let mut display = FrameBuffer::new(320, 240, scene.config().background);
        apply_line(&mut scene, "WAVE:0.1,440,1.0,0.0", 0, &mut display);
        apply_line(&mut scene, "WINDING:1,1,255,0,0", 0, &mut display);
        scene.tick(0, &mut display).unwrap();
        assert!(display.count_not(scene.config().background) > 0);

        apply_line(&mut scene, "CLEAR", 5, &mut display);
        assert_eq!(display.count_not(scene.config().background), 0);
        assert!(!scene.wave().is_drawn());
    }

    #[test]
    fn test_malformed_wave_keeps_state() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "WAVE:0.5,440,1.0,0.9", 0, &mut display);
        assert_eq!(Command::parse("WAVE:bad,data"), Err(ParseError::Malformed));
        apply_line(&mut scene, "WAVE:bad,data", 0, &mut display);
        assert_eq!(scene.signal().amplitude, 0.5);
        assert_eq!(scene.signal().beat_strength, 0.9);
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "HELLO:1,2", 0, &mut display);
        assert!(display.ops.is_empty());
        assert_eq!(*scene.signal(), SignalState::default());
    }

    #[test]
    fn test_wave_toggle_preserves_values_and_erases() {
        let mut scene = Scene::default();
        let bg = scene.config().background;
        let mut display = FrameBuffer::new(320, 240, bg);
        apply_line(&mut scene, "WAVE:0.08,660,1.5,0.2", 0, &mut display);
        scene.tick(0, &mut display).unwrap();
        assert!(display.count_not(bg) > 0);

        apply_line(&mut scene, "LAYER_WAVE_OFF", 5, &mut display);
        assert_eq!(display.count_not(bg), 0);
        scene.tick(40, &mut display).unwrap();
        assert_eq!(display.count_not(bg), 0);

        apply_line(&mut scene, "LAYER_WAVE_ON", 50, &mut display);
        let signal = scene.signal();
        assert_eq!(signal.amplitude, 0.08);
        assert_eq!(signal.frequency, 660.0);

        scene.tick(60, &mut display).unwrap();
        assert!(scene.wave().is_drawn());
        assert!(display.count_not(bg) > 0);
    }

    #[test]
    fn test_spectrum_reaches_target_through_ticks() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "SPECTRUM:255,0,0,0,0,0,0,0,0,0", 0, &mut display);

        let mut prev = 0.0;
        for i in 0..100 {
            scene.tick(i * 30, &mut display).unwrap();
            let value = scene.spectrum().displayed(0);
            assert!(value >= prev && value <= 255.0);
            prev = value;
        }
        assert_eq!(prev, 255.0);
    }

    #[test]
    fn test_clear_windings_redraws_other_layers() {
        let mut scene = Scene::default();
        let bg = scene.config().background;
        let mut display = FrameBuffer::new(320, 240, bg);
        apply_line(&mut scene, "WAVE:0.05,440,1.0,0.0", 0, &mut display);
        apply_line(&mut scene, "SPECTRUM:255,255,255,255,255,255,255,255,255,255", 0, &mut display);
        for i in 0..50 {
            scene.tick(i * 30, &mut display).unwrap();
        }
        apply_line(&mut scene, "WINDING:10,10,255,255,255", 1500, &mut display);
        let phase = scene.wave().phase();

        apply_line(&mut scene, "CLEAR_WINDINGS", 1500, &mut display);
        assert_eq!(display.pixel(10, 10), Some(bg));
        assert_eq!(scene.layers().get(LayerId::Winding).last_position(), None);
        assert_eq!(scene.wave().phase(), phase);
        assert!(scene.wave().is_drawn());
        assert_eq!(scene.spectrum().painted_height(0), 60);
        assert_eq!(scene.signal().amplitude, 0.05);
    }

    #[test]
    fn test_rhythm_lights_beat_marker() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "RHYTHM:120.0,0.900,1.000", 1000, &mut display);
        assert_eq!(scene.signal().last_beat_ms, Some(1000));
        scene.tick(1000, &mut display).unwrap();
        assert!(scene.beat().is_lit());
        scene.tick(1200, &mut display).unwrap();
        assert!(!scene.beat().is_lit());
    }

    #[test]
    fn test_weak_rhythm_does_not_mark_beat() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        apply_line(&mut scene, "RHYTHM:96.0,0.300,0.800", 1000, &mut display);
        assert_eq!(scene.signal().last_beat_ms, None);
        assert_eq!(scene.signal().bpm, 96.0);
        assert_eq!(scene.signal().tempo_multiplier, 0.8);
    }

    #[test]
    fn test_silence_hides_wave_until_resumed() {
        let mut scene = Scene::default();
        let bg = scene.config().background;
        let mut display = FrameBuffer::new(320, 240, bg);
        apply_line(&mut scene, "WAVE:0.05,440,1.0,0.0", 0, &mut display);
        scene.tick(0, &mut display).unwrap();
        apply_line(&mut scene, "SILENCE:1", 10, &mut display);
        scene.tick(20, &mut display).unwrap();
        assert!(!scene.wave().is_drawn());

        apply_line(&mut scene, "SILENCE:0", 30, &mut display);
        scene.tick(40, &mut display).unwrap();
        assert!(scene.wave().is_drawn());
    }

    #[test]
    fn test_tick_flushes_only_when_work_done() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        assert!(scene.tick(0, &mut display).unwrap());
        display.clear();
        assert!(!scene.tick(5, &mut display).unwrap());
        assert!(display.ops.is_empty());
    }

    #[test]
    fn test_init_blanks_display() {
        let mut scene = Scene::default();
        let mut display = RecordingDisplay::new(320, 240);
        scene.init(&mut display).unwrap();
        assert_eq!(
            display.ops,
            std::vec![Op::FillScreen(scene.config().background), Op::Flush]
        );
    }

    proptest! {
        #[test]
        fn prop_winding_clamped_to_screen(
            x in -10_000i32..10_000,
            y in -10_000i32..10_000,
        ) {
            let mut scene = Scene::default();
            let mut display = RecordingDisplay::new(320, 240);
            let line = std::format!("WINDING:{},{},0,255,0", x, y);
            apply_line(&mut scene, &line, 0, &mut display);

            let expected = Point::new(x.clamp(0, 319), y.clamp(0, 239));
            prop_assert_eq!(pixels(&display), std::vec![expected]);
        }

        #[test]
        fn prop_garbage_lines_never_change_signals(line in "[A-Z_:,0-9.a-z-]{0,40}") {
            let mut scene = Scene::default();
            let mut display = RecordingDisplay::new(320, 240);
            apply_line(&mut scene, "WAVE:0.5,440,1.0,0.9", 0, &mut display);
            let before = *scene.signal();
            let parsed = Command::parse(&line);
            apply_line(&mut scene, &line, 0, &mut display);
            if parsed.is_err() {
                prop_assert_eq!(*scene.signal(), before);
            }
        }
    }
}
