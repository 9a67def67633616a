//! Band energies from Goertzel probes
//!
//! A band's level is the mean magnitude of a few probes spread
//! logarithmically across it. Magnitudes are scaled so a full-scale sine
//! on a probe frequency reads 1.0.

use core::f32::consts::TAU;

use mustem_protocol::SPECTRUM_BARS;
use num_traits::Float;

/// Lowest analysed frequency
pub const MIN_FREQUENCY_HZ: f32 = 20.0;

/// Upper edge of the bass band
pub const BASS_MAX_HZ: f32 = 250.0;

/// Upper edge of the mid band
pub const MID_MAX_HZ: f32 = 2000.0;

/// Bass, mid and treble levels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriBand {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl TriBand {
    pub fn as_array(&self) -> [f32; 3] {
        [self.bass, self.mid, self.treble]
    }
}

/// Amplitude of the `frequency_hz` component of `block`
///
/// Returns 0.0 for empty blocks and for frequencies at or above Nyquist.
pub fn goertzel_magnitude(block: &[f32], sample_rate_hz: u32, frequency_hz: f32) -> f32 {
    let nyquist = sample_rate_hz as f32 / 2.0;
    if block.is_empty() || !(frequency_hz > 0.0 && frequency_hz < nyquist) {
        return 0.0;
    }

    let coeff = 2.0 * (TAU * frequency_hz / sample_rate_hz as f32).cos();
    let (mut s1, mut s2) = (0.0f32, 0.0f32);
    for &x in block {
        let s0 = x + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    let power = s1 * s1 + s2 * s2 - coeff * s1 * s2;
    power.max(0.0).sqrt() * 2.0 / block.len() as f32
}

/// Mean probe magnitude over `low_hz..high_hz`
pub fn band_level(block: &[f32], sample_rate_hz: u32, low_hz: f32, high_hz: f32, probes: usize) -> f32 {
    if probes == 0 || !(high_hz > low_hz && low_hz > 0.0) {
        return 0.0;
    }
    let ratio = high_hz / low_hz;
    let sum: f32 = (0..probes)
        .map(|j| {
            let f = low_hz * ratio.powf((j as f32 + 0.5) / probes as f32);
            goertzel_magnitude(block, sample_rate_hz, f)
        })
        .sum();
    sum / probes as f32
}

/// Edge `index` of `count` log-spaced bands between `low_hz` and `high_hz`
pub fn band_edge(index: usize, count: usize, low_hz: f32, high_hz: f32) -> f32 {
    low_hz * (high_hz / low_hz).powf(index as f32 / count.max(1) as f32)
}

/// Spectrum bar values for 10 log-spaced bands from 20 Hz to Nyquist
///
/// Each band level is multiplied by `gain * boost` and clamped to 0..=255.
pub fn spectrum_levels(
    block: &[f32],
    sample_rate_hz: u32,
    probes: usize,
    gain: f32,
    boost: f32,
) -> [u8; SPECTRUM_BARS] {
    let nyquist = sample_rate_hz as f32 / 2.0;
    let mut levels = [0u8; SPECTRUM_BARS];
    for (i, level) in levels.iter_mut().enumerate() {
        let low = band_edge(i, SPECTRUM_BARS, MIN_FREQUENCY_HZ, nyquist);
        let high = band_edge(i + 1, SPECTRUM_BARS, MIN_FREQUENCY_HZ, nyquist);
        let value = band_level(block, sample_rate_hz, low, high, probes) * gain * boost;
        *level = if value.is_finite() {
            value.clamp(0.0, 255.0) as u8
        } else {
            0
        };
    }
    levels
}

/// Bass (20-250 Hz), mid (250-2000 Hz) and treble (2000 Hz-Nyquist) levels
pub fn tri_band_levels(block: &[f32], sample_rate_hz: u32, probes: usize) -> TriBand {
    let nyquist = sample_rate_hz as f32 / 2.0;
    TriBand {
        bass: band_level(block, sample_rate_hz, MIN_FREQUENCY_HZ, BASS_MAX_HZ.min(nyquist), probes),
        mid: band_level(block, sample_rate_hz, BASS_MAX_HZ, MID_MAX_HZ.min(nyquist), probes),
        treble: band_level(block, sample_rate_hz, MID_MAX_HZ, nyquist, probes),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    fn sine(freq: f32, rate: u32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (TAU * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_magnitude_of_probe_frequency() {
        // 440 Hz falls on bin 44 of an 800 sample block at 8 kHz
        let block = sine(440.0, 8000, 800, 0.5);
        let m = goertzel_magnitude(&block, 8000, 440.0);
        assert!((m - 0.5).abs() < 0.01, "{m}");
        assert!(goertzel_magnitude(&block, 8000, 1500.0) < 0.02);
    }

    #[test]
    fn test_magnitude_edge_cases() {
        let block = sine(440.0, 8000, 800, 0.5);
        assert_eq!(goertzel_magnitude(&[], 8000, 440.0), 0.0);
        assert_eq!(goertzel_magnitude(&block, 8000, 4000.0), 0.0);
        assert_eq!(goertzel_magnitude(&block, 8000, -1.0), 0.0);
    }

    #[test]
    fn test_band_edges_span_range() {
        assert!((band_edge(0, 10, 20.0, 4000.0) - 20.0).abs() < 1e-3);
        assert!((band_edge(10, 10, 20.0, 4000.0) - 4000.0).abs() < 0.5);
        for i in 0..10 {
            assert!(band_edge(i, 10, 20.0, 4000.0) < band_edge(i + 1, 10, 20.0, 4000.0));
        }
    }

    #[test]
    fn test_tri_band_picks_bass() {
        let block = sine(100.0, 8000, 800, 0.8);
        let bands = tri_band_levels(&block, 8000, 4);
        assert!(bands.bass > bands.mid);
        assert!(bands.bass > bands.treble);
    }

    #[test]
    fn test_tri_band_picks_treble() {
        let block = sine(3000.0, 8000, 800, 0.8);
        let bands = tri_band_levels(&block, 8000, 4);
        assert!(bands.treble > bands.bass);
        assert!(bands.treble > bands.mid);
    }

    #[test]
    fn test_spectrum_levels_silence_and_clamp() {
        let silent = [0.0f32; 800];
        assert_eq!(spectrum_levels(&silent, 8000, 3, 1000.0, 1.0), [0; SPECTRUM_BARS]);

        let loud = sine(1000.0, 8000, 800, 1.0);
        let levels = spectrum_levels(&loud, 8000, 3, 1.0e6, 1.0);
        assert!(levels.iter().any(|&v| v == 255));
    }

    #[test]
    fn test_spectrum_peak_moves_with_frequency() {
        let low = spectrum_levels(&sine(60.0, 8000, 800, 0.5), 8000, 3, 1000.0, 1.0);
        let high = spectrum_levels(&sine(2500.0, 8000, 800, 0.5), 8000, 3, 1000.0, 1.0);
        let argmax = |v: &[u8; SPECTRUM_BARS]| {
            v.iter()
                .enumerate()
                .max_by_key(|(_, value)| **value)
                .map(|(i, _)| i)
                .unwrap()
        };
        assert!(argmax(&low) < argmax(&high));
    }
}
