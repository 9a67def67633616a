//! Vibration motor task
//!
//! Applies the latest intensity targets from the analysis task and steps
//! the motor ramps at a fixed rate.

use defmt::*;
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Duration, Ticker};

use mustem_core::haptic::MOTOR_COUNT;
use mustem_core::traits::VibrationMotorDriver;
use mustem_drivers::motor::PwmVibration;

use crate::channels::HAPTIC;

/// Ramp update period
const UPDATE_MS: u32 = 5;

pub type Motor = PwmVibration<PwmOutput<'static>>;

/// Haptic task - drives the bass, mid and treble motors
#[embassy_executor::task]
pub async fn haptic_task(mut motors: [Motor; MOTOR_COUNT]) {
    info!("Haptic task started");

    for motor in motors.iter_mut() {
        motor.motor_mut().enable(true);
    }

    let mut ticker = Ticker::every(Duration::from_millis(UPDATE_MS as u64));

    loop {
        if let Some(targets) = HAPTIC.try_take() {
            trace!("Haptic targets: {}", targets);
            for (motor, percent) in motors.iter_mut().zip(targets) {
                if !motor.motor().is_enabled() {
                    continue;
                }
                if let Err(e) = motor.motor_mut().set_intensity(percent) {
                    warn!("Failed to set motor intensity: {:?}", e);
                }
            }
        }

        for (index, motor) in motors.iter_mut().enumerate() {
            if !motor.motor().is_enabled() {
                continue;
            }
            if let Err(e) = motor.update(UPDATE_MS) {
                error!("Motor {} PWM error: {:?}", index, e);
                if motor.shutdown().is_err() {
                    error!("Motor {} shutdown failed", index);
                }
            }
        }

        ticker.next().await;
    }
}
