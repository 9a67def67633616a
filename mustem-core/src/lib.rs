//! Board-agnostic core logic for the MUSTEM sensor board
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (sample source, vibration motor)
//! - Fixed-rate acquisition pacing and sample blocks
//! - Audio feature extraction (energy, pitch, bands, beats, silence)
//! - Display command pacing and winding curve generation
//! - Haptic intensity mapping
//! - Configuration types and the embedded config parser

#![no_std]
#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod haptic;
pub mod planner;
pub mod sampler;
pub mod traits;
pub mod winding;
