//! Sound to light color mapping
//!
//! A sound frequency is mapped to a light wavelength one octave per octave:
//! 20 Hz lands on 700 nm (red) and every doubling of the frequency halves
//! the wavelength. Wavelengths that leave the visible band are folded back
//! into 400..700 nm, then converted with a piecewise spectral model.

use num_traits::Float;

use crate::command::Rgb;

/// Reference sound frequency mapped to [`REFERENCE_WAVELENGTH_NM`]
pub const REFERENCE_FREQUENCY_HZ: f32 = 20.0;

/// Wavelength of the reference frequency (red)
pub const REFERENCE_WAVELENGTH_NM: f32 = 700.0;

/// Shortest visible wavelength
pub const VISIBLE_MIN_NM: f32 = 380.0;

/// Longest visible wavelength
pub const VISIBLE_MAX_NM: f32 = 750.0;

const GAMMA: f32 = 0.8;

/// Light wavelength for a sound frequency, folded into the visible band
///
/// Returns `None` for frequencies that are not strictly positive and finite.
pub fn frequency_to_wavelength(frequency_hz: f32) -> Option<f32> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return None;
    }
    let octaves = (frequency_hz / REFERENCE_FREQUENCY_HZ).log2();
    let mut nm = REFERENCE_WAVELENGTH_NM / octaves.exp2();
    if !(VISIBLE_MIN_NM..=VISIBLE_MAX_NM).contains(&nm) {
        nm = 400.0 + nm % 300.0;
    }
    Some(nm)
}

/// Convert a visible wavelength to RGB888
///
/// Wavelengths outside 380..=750 nm are black. Intensity falls off towards
/// both ends of the band.
pub fn wavelength_to_rgb(nm: f32) -> Rgb {
    if !(VISIBLE_MIN_NM..=VISIBLE_MAX_NM).contains(&nm) {
        return Rgb::BLACK;
    }

    let (r, g, b) = if nm < 440.0 {
        (-(nm - 440.0) / (440.0 - 380.0), 0.0, 1.0)
    } else if nm < 490.0 {
        (0.0, (nm - 440.0) / (490.0 - 440.0), 1.0)
    } else if nm < 510.0 {
        (0.0, 1.0, -(nm - 510.0) / (510.0 - 490.0))
    } else if nm < 580.0 {
        ((nm - 510.0) / (580.0 - 510.0), 1.0, 0.0)
    } else if nm < 645.0 {
        (1.0, -(nm - 645.0) / (645.0 - 580.0), 0.0)
    } else {
        (1.0, 0.0, 0.0)
    };

    let factor = if nm < 420.0 {
        0.3 + 0.7 * (nm - 380.0) / (420.0 - 380.0)
    } else if nm >= 645.0 {
        0.3 + 0.7 * (750.0 - nm) / (750.0 - 645.0)
    } else {
        1.0
    };

    Rgb::new(
        channel(r * factor),
        channel(g * factor),
        channel(b * factor),
    )
}

/// RGB888 color for a sound frequency; black for invalid frequencies
pub fn frequency_to_rgb(frequency_hz: f32) -> Rgb {
    frequency_to_wavelength(frequency_hz).map_or(Rgb::BLACK, wavelength_to_rgb)
}

fn channel(level: f32) -> u8 {
    if level <= 0.0 {
        return 0;
    }
    (255.0 * level.powf(GAMMA)).round().clamp(0.0, 255.0) as u8
}
