//! Winding curve generation
//!
//! A winding is a short circular trace whose angular speed follows the
//! dominant frequency: `POINTS_PER_WINDING` points of
//! `(cx + r cos(2π f t), cy + r sin(2π f t))` with `t` spread evenly over
//! `WINDING_DURATION_S`, endpoints included. Points are produced lazily so
//! the sender never buffers a whole curve.

use core::f32::consts::TAU;

use mustem_protocol::{frequency_to_rgb, Rgb, WindingPoint};
use num_traits::Float;

/// Points emitted per winding
pub const POINTS_PER_WINDING: usize = 100;

/// Time span covered by one winding
pub const WINDING_DURATION_S: f32 = 0.08;

/// Curve center
pub const CENTER_X: f32 = 160.0;
pub const CENTER_Y: f32 = 120.0;

/// Curve radius in pixels
pub const RADIUS: f32 = 80.0;

/// Dimmest fade applied to a winding color
pub const MIN_FADE: f32 = 0.3;

/// Fade factor for a winding drawn `elapsed_ms` after the last clear
///
/// Windings start at full brightness and dim toward [`MIN_FADE`] once less
/// than one second remains before the next clear.
pub fn fade_factor(clear_interval_ms: u32, elapsed_ms: u32) -> f32 {
    let remaining_s = (clear_interval_ms as f32 - elapsed_ms as f32) / 1000.0;
    remaining_s.clamp(MIN_FADE, 1.0)
}

/// Iterator over the points of one winding
#[derive(Debug, Clone)]
pub struct WindingPoints {
    frequency: f32,
    color: Rgb,
    index: usize,
}

impl WindingPoints {
    /// Winding for `frequency_hz`, colored by frequency and dimmed by `fade`
    pub fn new(frequency_hz: f32, fade: f32) -> Self {
        let frequency = if frequency_hz.is_finite() { frequency_hz } else { 0.0 };
        Self {
            frequency,
            color: frequency_to_rgb(frequency).scaled(fade),
            index: 0,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    fn point(&self, index: usize) -> WindingPoint {
        let t = WINDING_DURATION_S * index as f32 / (POINTS_PER_WINDING - 1) as f32;
        let angle = TAU * self.frequency * t;
        WindingPoint {
            x: (CENTER_X + RADIUS * angle.cos()) as i32,
            y: (CENTER_Y + RADIUS * angle.sin()) as i32,
            color: self.color,
        }
    }
}

impl Iterator for WindingPoints {
    type Item = WindingPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= POINTS_PER_WINDING {
            return None;
        }
        let point = self.point(self.index);
        self.index += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = POINTS_PER_WINDING - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WindingPoints {}
