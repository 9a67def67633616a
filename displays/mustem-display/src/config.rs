//! Scene configuration
//!
//! Screen layout, refresh intervals and animation gains. `Default` carries
//! the values used on the 320x240 ILI9341 panel.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor, Size};
use embedded_graphics::primitives::Rectangle;

/// Panel width in pixels (landscape)
pub const SCREEN_WIDTH: u32 = 320;

/// Panel height in pixels (landscape)
pub const SCREEN_HEIGHT: u32 = 240;

/// Display-side configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    /// Screen size in pixels
    pub size: Size,
    /// Color used to blank and erase
    pub background: Rgb565,

    /// Minimum time between wave redraws
    pub wave_interval_ms: u32,
    /// Minimum time between spectrum updates
    pub spectrum_interval_ms: u32,
    /// Minimum time between beat marker updates
    pub beat_interval_ms: u32,

    /// Phase advance per wave redraw at tempo multiplier 1 (radians)
    pub wave_base_speed: f32,
    /// Extra phase speed per unit of beat strength
    pub beat_boost_gain: f32,
    /// Pixels of wave amplitude per unit of signal amplitude
    pub wave_gain: f32,
    /// Vertical center of the wave band
    pub wave_center_y: i32,
    /// Half height of the wave band; amplitude is clamped to it
    pub wave_half_height: i32,
    /// Horizontal distance between wave vertices
    pub wave_step_px: u32,

    /// Fraction of the remaining distance a bar moves per update
    pub spectrum_lerp: f32,
    /// Area holding the spectrum bars; bars grow up from its bottom edge
    pub spectrum_area: Rectangle,
    /// Empty columns between neighbouring bars
    pub spectrum_gap_px: u32,

    /// Beat strength a `RHYTHM` update must exceed to mark a beat
    pub beat_threshold: f32,
    /// How long the beat marker stays lit
    pub beat_flash_ms: u32,
    /// Beat marker square
    pub beat_marker: Rectangle,
    /// Beat marker color
    pub beat_color: Rgb565,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneConfig {
    /// Configuration for the 320x240 panel
    pub const fn new() -> Self {
        Self {
            size: Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            background: Rgb565::BLACK,
            wave_interval_ms: 20,
            spectrum_interval_ms: 30,
            beat_interval_ms: 20,
            wave_base_speed: 0.15,
            beat_boost_gain: 0.5,
            wave_gain: 400.0,
            wave_center_y: 120,
            wave_half_height: 40,
            wave_step_px: 4,
            spectrum_lerp: 0.25,
            spectrum_area: Rectangle::new(Point::new(0, 180), Size::new(SCREEN_WIDTH, 60)),
            spectrum_gap_px: 2,
            beat_threshold: 0.7,
            beat_flash_ms: 150,
            beat_marker: Rectangle::new(Point::new(300, 6), Size::new(12, 12)),
            beat_color: Rgb565::WHITE,
        }
    }

    /// Clamp a point into the screen
    pub fn clamp_to_screen(&self, point: Point) -> Point {
        let max_x = self.size.width.saturating_sub(1) as i32;
        let max_y = self.size.height.saturating_sub(1) as i32;
        Point::new(point.x.clamp(0, max_x), point.y.clamp(0, max_y))
    }

    /// Lerp factor limited to a usable range
    ///
    /// Zero would freeze the bars and anything above one overshoots.
    pub fn effective_lerp(&self) -> f32 {
        if self.spectrum_lerp.is_finite() {
            self.spectrum_lerp.clamp(0.01, 1.0)
        } else {
            1.0
        }
    }
}
