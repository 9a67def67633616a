//! Display colors
//!
//! Packing of protocol colors into RGB565 and the spectrum bar palette.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use mustem_protocol::color::{frequency_to_rgb, wavelength_to_rgb, REFERENCE_WAVELENGTH_NM};
use mustem_protocol::Rgb;

/// Display color for a sound frequency; black for invalid frequencies
pub fn frequency_to_color(frequency_hz: f32) -> Rgb565 {
    to_rgb565(frequency_to_rgb(frequency_hz))
}

/// Pack an RGB888 color for the display
pub fn to_rgb565(color: Rgb) -> Rgb565 {
    Rgb565::from(Rgb888::new(color.r, color.g, color.b))
}

/// Color of spectrum bar `index` out of `count`
///
/// Bars sweep the visible band from red (lowest band) to violet.
pub fn spectrum_bar_color(index: usize, count: usize) -> Rgb565 {
    let t = if count > 1 {
        index.min(count - 1) as f32 / (count - 1) as f32
    } else {
        0.0
    };
    to_rgb565(wavelength_to_rgb(REFERENCE_WAVELENGTH_NM - t * 300.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::RgbColor;

    #[test]
    fn test_rgb565_packing() {
        assert_eq!(to_rgb565(Rgb::WHITE), Rgb565::new(31, 63, 31));
        assert_eq!(to_rgb565(Rgb::BLACK), Rgb565::new(0, 0, 0));
    }

    #[test]
    fn test_invalid_frequency_is_black() {
        assert_eq!(frequency_to_color(f32::NAN), Rgb565::BLACK);
        assert_ne!(frequency_to_color(440.0), Rgb565::BLACK);
    }

    #[test]
    fn test_spectrum_palette_runs_red_to_violet() {
        let first = spectrum_bar_color(0, 10);
        let last = spectrum_bar_color(9, 10);
        assert!(first.r() > 0 && first.b() == 0);
        assert!(last.b() > 0);
        assert_eq!(spectrum_bar_color(0, 1), first);
    }
}
