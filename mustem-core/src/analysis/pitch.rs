//! Zero-crossing pitch estimate

/// Estimate the dominant frequency from sign changes
///
/// A crossing is counted when the signal moves from above `hysteresis` to
/// below `-hysteresis` or back, so noise around zero does not add
/// crossings. Returns `None` when fewer than two crossings are seen.
pub fn zero_crossing_frequency(block: &[f32], sample_rate_hz: u32, hysteresis: f32) -> Option<f32> {
    if block.is_empty() || sample_rate_hz == 0 {
        return None;
    }
    let h = hysteresis.abs();

    let mut positive: Option<bool> = None;
    let mut crossings = 0u32;
    for &s in block {
        let side = if s > h {
            Some(true)
        } else if s < -h {
            Some(false)
        } else {
            None
        };
        if let Some(side) = side {
            if positive.is_some_and(|p| p != side) {
                crossings += 1;
            }
            positive = Some(side);
        }
    }

    if crossings < 2 {
        return None;
    }
    let duration_s = block.len() as f32 / sample_rate_hz as f32;
    Some(crossings as f32 / 2.0 / duration_s)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::f32::consts::TAU;
    use num_traits::Float;
    use std::vec::Vec;

    fn sine(freq: f32, rate: u32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (TAU * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_sine_frequency() {
        for freq in [110.0, 440.0, 1000.0] {
            let block = sine(freq, 8000, 800, 0.5);
            let estimate = zero_crossing_frequency(&block, 8000, 0.02).unwrap();
            assert!((estimate - freq).abs() / freq < 0.06, "{freq} -> {estimate}");
        }
    }

    #[test]
    fn test_quiet_block_has_no_pitch() {
        let block = sine(440.0, 8000, 800, 0.01);
        assert_eq!(zero_crossing_frequency(&block, 8000, 0.02), None);
        assert_eq!(zero_crossing_frequency(&[], 8000, 0.02), None);
    }

    #[test]
    fn test_hysteresis_ignores_chatter() {
        // Noise around zero between two real half cycles
        let mut block = Vec::new();
        block.extend([0.5; 10]);
        block.extend([0.01, -0.01, 0.01, -0.01]);
        block.extend([-0.5; 10]);
        block.extend([0.5; 10]);
        let estimate = zero_crossing_frequency(&block, 34, 0.02).unwrap();
        // Two crossings in one second
        assert_eq!(estimate, 1.0);
    }
}
