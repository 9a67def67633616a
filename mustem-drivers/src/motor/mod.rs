//! Motor driver implementations
//!
//! Vibration motors are PWM-driven DC motors with a slew-limited intensity
//! and a minimum effective duty cycle.

pub mod vibration;

pub use vibration::{PwmVibration, VibrationConfig, VibrationMotor};
