//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod motor;
pub mod sample;

pub use motor::{MotorError, VibrationMotorDriver, VibrationState};
pub use sample::{SampleError, SampleSource};
