//! Block energy measures

use num_traits::Float;

/// Mean absolute amplitude; 0.0 for an empty block
pub fn mean_abs(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    block.iter().map(|s| s.abs()).sum::<f32>() / block.len() as f32
}

/// Root mean square; 0.0 for an empty block
pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    (block.iter().map(|s| s * s).sum::<f32>() / block.len() as f32).sqrt()
}

/// Subtract the block mean
///
/// Removes the bias left by a microphone that does not sit exactly at mid
/// scale.
pub fn remove_dc(block: &mut [f32]) {
    if block.is_empty() {
        return;
    }
    let mean = block.iter().sum::<f32>() / block.len() as f32;
    for s in block.iter_mut() {
        *s -= mean;
    }
}
