//! Audio feature extraction
//!
//! Works on blocks of samples normalized to -1.0..=1.0. Nothing here needs
//! an FFT: pitch comes from zero crossings and band energies from Goertzel
//! probes, which keeps the per-block cost predictable on a core without an
//! FPU.

pub mod beat;
pub mod energy;
pub mod features;
pub mod goertzel;
pub mod pitch;
pub mod silence;

pub use beat::{tempo_multiplier, BeatDetector, BeatEvent, MAX_BEAT_HISTORY};
pub use energy::{mean_abs, remove_dc, rms};
pub use features::{FeatureExtractor, Features};
pub use goertzel::{band_level, goertzel_magnitude, spectrum_levels, tri_band_levels, TriBand};
pub use pitch::zero_crossing_frequency;
pub use silence::SilenceDetector;
