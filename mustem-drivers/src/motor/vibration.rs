//! Vibration motor driver with PWM intensity control
//!
//! This driver provides:
//! - Intensity targets as a percentage (0-100%)
//! - Slew-limited ramping, separately for rising and falling intensity
//! - Minimum duty cycle handling (below which the motor won't spin)
//!
//! # Usage
//!
//! Intensity targets arrive once per analysis block while `update()` runs
//! from a faster periodic task. The ramp is rate limited rather than timed,
//! so a new target simply changes where the slew is heading.
//!
//! ```ignore
//! let mut motor = VibrationMotor::new(config);
//! motor.enable(true);
//! motor.set_intensity(60)?;
//!
//! // In the periodic motor task:
//! let duty = motor.update(5);
//! pwm.set_duty_cycle_percent(duty)?;
//! ```

use embedded_hal::pwm::SetDutyCycle;
use mustem_core::config::HapticConfig;
use mustem_core::traits::{MotorError, VibrationMotorDriver, VibrationState};

/// Intensity resolution (hundredths of a percent)
const SCALE: u32 = 100;

/// Full intensity in scaled units
const FULL: u32 = 100 * SCALE;

/// Vibration motor driver configuration
#[derive(Debug, Clone)]
pub struct VibrationConfig {
    /// Minimum duty cycle percentage (below this the motor won't spin)
    pub min_duty: u8,
    /// Time to ramp from 0 to 100% (0 = instant)
    pub ramp_up_ms: u16,
    /// Time to ramp from 100 to 0% (0 = instant)
    pub ramp_down_ms: u16,
}

impl Default for VibrationConfig {
    fn default() -> Self {
        Self::from(&HapticConfig::default())
    }
}

impl From<&HapticConfig> for VibrationConfig {
    fn from(config: &HapticConfig) -> Self {
        Self {
            min_duty: config.min_duty.min(100),
            ramp_up_ms: config.ramp_up_ms,
            ramp_down_ms: config.ramp_down_ms,
        }
    }
}

/// Vibration motor driver state
///
/// Tracks target and actual intensity and computes the PWM duty cycle.
#[derive(Debug, Clone)]
pub struct VibrationMotor {
    config: VibrationConfig,
    /// Target intensity (0-100%)
    target: u8,
    /// Current intensity in hundredths of a percent
    actual_scaled: u32,
    enabled: bool,
    state: VibrationState,
}

impl VibrationMotor {
    pub fn new(config: VibrationConfig) -> Self {
        Self {
            config,
            target: 0,
            actual_scaled: 0,
            enabled: false,
            state: VibrationState::Idle,
        }
    }

    /// Get the current ramp state
    pub fn state(&self) -> VibrationState {
        self.state
    }

    pub fn config(&self) -> &VibrationConfig {
        &self.config
    }

    /// Scale an intensity percentage to a duty cycle
    ///
    /// Maps 1-100% onto min_duty-100% so that any non-zero intensity is
    /// felt; 0% stays off.
    fn scale_duty(&self, intensity: u8) -> u8 {
        if intensity == 0 {
            0
        } else {
            let min = self.config.min_duty as u32;
            let range = 100 - min;
            let scaled = min + (intensity as u32 * range / 100);
            scaled.min(100) as u8
        }
    }

    /// Largest change allowed over `delta_ms` for a full-range ramp of `ramp_ms`
    fn max_step(ramp_ms: u16, delta_ms: u32) -> u32 {
        if ramp_ms == 0 {
            FULL
        } else {
            (FULL.saturating_mul(delta_ms) / ramp_ms as u32).max(1)
        }
    }

    fn update_state(&mut self) {
        let target = self.target as u32 * SCALE;
        self.state = if self.actual_scaled < target {
            VibrationState::RampingUp
        } else if self.actual_scaled > target {
            VibrationState::RampingDown
        } else if target == 0 {
            VibrationState::Idle
        } else {
            VibrationState::Holding
        };
    }
}

impl VibrationMotorDriver for VibrationMotor {
    fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.target = 0;
            self.actual_scaled = 0;
            self.state = VibrationState::Idle;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_intensity(&mut self, percent: u8) -> Result<(), MotorError> {
        if !self.enabled {
            return Err(MotorError::Disabled);
        }
        self.target = percent.min(100);
        self.update_state();
        Ok(())
    }

    fn intensity(&self) -> u8 {
        self.target
    }

    fn actual_intensity(&self) -> u8 {
        (self.actual_scaled / SCALE) as u8
    }

    fn update(&mut self, delta_ms: u32) -> u8 {
        if !self.enabled {
            self.actual_scaled = 0;
            self.state = VibrationState::Idle;
            return 0;
        }

        let target = self.target as u32 * SCALE;
        if self.actual_scaled < target {
            let step = Self::max_step(self.config.ramp_up_ms, delta_ms);
            self.actual_scaled = self.actual_scaled.saturating_add(step).min(target);
        } else if self.actual_scaled > target {
            let step = Self::max_step(self.config.ramp_down_ms, delta_ms);
            self.actual_scaled = self.actual_scaled.saturating_sub(step).max(target);
        }
        self.update_state();

        self.scale_duty(self.actual_intensity())
    }
}

/// A vibration motor bound to its PWM output
pub struct PwmVibration<P> {
    motor: VibrationMotor,
    pwm: P,
}

impl<P: SetDutyCycle> PwmVibration<P> {
    pub fn new(motor: VibrationMotor, pwm: P) -> Self {
        Self { motor, pwm }
    }

    pub fn motor(&self) -> &VibrationMotor {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut VibrationMotor {
        &mut self.motor
    }

    /// Advance the ramp and apply the resulting duty cycle
    pub fn update(&mut self, delta_ms: u32) -> Result<u8, MotorError> {
        let duty = self.motor.update(delta_ms);
        self.pwm
            .set_duty_cycle_percent(duty)
            .map_err(|_| MotorError::Pwm)?;
        Ok(duty)
    }

    /// Force the output off and disable the motor
    pub fn shutdown(&mut self) -> Result<(), MotorError> {
        self.motor.enable(false);
        self.pwm.set_duty_cycle_fully_off().map_err(|_| MotorError::Pwm)
    }

    pub fn release(self) -> (VibrationMotor, P) {
        (self.motor, self.pwm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    fn instant() -> VibrationConfig {
        VibrationConfig {
            min_duty: 0,
            ramp_up_ms: 0,
            ramp_down_ms: 0,
        }
    }

    #[test]
    fn test_initial_state() {
        let motor = VibrationMotor::new(VibrationConfig::default());

        assert!(!motor.is_enabled());
        assert_eq!(motor.intensity(), 0);
        assert_eq!(motor.actual_intensity(), 0);
        assert_eq!(motor.state(), VibrationState::Idle);
    }

    #[test]
    fn test_set_requires_enable() {
        let mut motor = VibrationMotor::new(VibrationConfig::default());
        assert_eq!(motor.set_intensity(50), Err(MotorError::Disabled));

        motor.enable(true);
        assert_eq!(motor.set_intensity(150), Ok(()));
        assert_eq!(motor.intensity(), 100);
    }

    #[test]
    fn test_ramp_up_rate() {
        let config = VibrationConfig {
            min_duty: 0,
            ramp_up_ms: 100,
            ramp_down_ms: 100,
        };
        let mut motor = VibrationMotor::new(config);
        motor.enable(true);
        motor.set_intensity(100).unwrap();
        assert_eq!(motor.state(), VibrationState::RampingUp);

        for _ in 0..5 {
            motor.update(10);
        }
        assert_eq!(motor.actual_intensity(), 50);
        assert_eq!(motor.state(), VibrationState::RampingUp);

        for _ in 0..5 {
            motor.update(10);
        }
        assert_eq!(motor.actual_intensity(), 100);
        assert_eq!(motor.state(), VibrationState::Holding);
        assert!(motor.is_at_intensity());
    }

    #[test]
    fn test_retarget_mid_ramp() {
        let config = VibrationConfig {
            min_duty: 0,
            ramp_up_ms: 100,
            ramp_down_ms: 200,
        };
        let mut motor = VibrationMotor::new(config);
        motor.enable(true);
        motor.set_intensity(80).unwrap();
        motor.update(50);
        assert_eq!(motor.actual_intensity(), 50);

        motor.set_intensity(20).unwrap();
        assert_eq!(motor.state(), VibrationState::RampingDown);
        motor.update(20);
        assert_eq!(motor.actual_intensity(), 40);
        motor.update(1000);
        assert_eq!(motor.actual_intensity(), 20);
        assert_eq!(motor.state(), VibrationState::Holding);
    }

    #[test]
    fn test_instant_ramp() {
        let mut motor = VibrationMotor::new(instant());
        motor.enable(true);
        motor.set_intensity(70).unwrap();
        assert_eq!(motor.update(1), 70);
        motor.set_intensity(0).unwrap();
        assert_eq!(motor.update(1), 0);
        assert_eq!(motor.state(), VibrationState::Idle);
    }

    #[test]
    fn test_duty_scaling() {
        let config = VibrationConfig {
            min_duty: 20,
            ramp_up_ms: 0,
            ramp_down_ms: 0,
        };
        let mut motor = VibrationMotor::new(config);
        motor.enable(true);

        assert_eq!(motor.update(1), 0);

        motor.set_intensity(100).unwrap();
        assert_eq!(motor.update(1), 100);

        // 20 + (50% of 80) = 60
        motor.set_intensity(50).unwrap();
        assert_eq!(motor.update(1), 60);

        motor.set_intensity(1).unwrap();
        assert_eq!(motor.update(1), 20);
    }

    #[test]
    fn test_disable_forces_off() {
        let mut motor = VibrationMotor::new(instant());
        motor.enable(true);
        motor.set_intensity(90).unwrap();
        motor.update(1);

        motor.enable(false);
        assert_eq!(motor.update(1), 0);
        assert_eq!(motor.actual_intensity(), 0);
        assert_eq!(motor.state(), VibrationState::Idle);
    }

    #[test]
    fn test_from_haptic_config() {
        let haptic = HapticConfig {
            min_duty: 30,
            ramp_up_ms: 10,
            ramp_down_ms: 20,
            ..HapticConfig::default()
        };
        let config = VibrationConfig::from(&haptic);
        assert_eq!(config.min_duty, 30);
        assert_eq!(config.ramp_up_ms, 10);
        assert_eq!(config.ramp_down_ms, 20);
    }

    struct MockPwm {
        duty: u16,
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_pwm_output_follows_motor() {
        let mut motor = VibrationMotor::new(instant());
        motor.enable(true);
        let mut out = PwmVibration::new(motor, MockPwm { duty: 0 });

        out.motor_mut().set_intensity(40).unwrap();
        assert_eq!(out.update(1), Ok(40));
        let (_, pwm) = out.release();
        assert_eq!(pwm.duty, 400);
    }

    #[test]
    fn test_pwm_shutdown() {
        let mut motor = VibrationMotor::new(instant());
        motor.enable(true);
        let mut out = PwmVibration::new(motor, MockPwm { duty: 0 });
        out.motor_mut().set_intensity(100).unwrap();
        out.update(1).unwrap();

        out.shutdown().unwrap();
        assert!(!out.motor().is_enabled());
        let (_, pwm) = out.release();
        assert_eq!(pwm.duty, 0);
    }
}
