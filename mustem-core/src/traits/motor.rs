//! Vibration motor driver trait
//!
//! Vibration motors are small DC motors driven by PWM. Intensity follows a
//! stream of targets, so drivers slew toward the latest target instead of
//! running discrete start/stop sequences.

/// Errors that can occur with motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Motor is disabled
    Disabled,
    /// PWM output rejected the duty cycle
    Pwm,
}

/// Ramp state of a vibration motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VibrationState {
    /// Output is off
    #[default]
    Idle,
    /// Intensity is rising toward the target
    RampingUp,
    /// Intensity is at the target
    Holding,
    /// Intensity is falling toward the target
    RampingDown,
}

/// Trait for PWM vibration motors
pub trait VibrationMotorDriver {
    /// Enable or disable the driver
    ///
    /// When disabled the output is forced off.
    fn enable(&mut self, enabled: bool);

    /// Check if the driver is enabled
    fn is_enabled(&self) -> bool;

    /// Set the target intensity as a percentage (0-100)
    fn set_intensity(&mut self, percent: u8) -> Result<(), MotorError>;

    /// Get the current target intensity
    fn intensity(&self) -> u8;

    /// Get the intensity currently applied (may differ during ramping)
    fn actual_intensity(&self) -> u8;

    /// Advance the ramp by `delta_ms`
    ///
    /// Returns the duty cycle percentage to apply to PWM.
    fn update(&mut self, delta_ms: u32) -> u8;

    /// Check if the motor has reached its target
    fn is_at_intensity(&self) -> bool {
        self.intensity() == self.actual_intensity()
    }
}
