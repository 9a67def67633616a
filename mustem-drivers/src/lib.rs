//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in mustem-core and mustem-display:
//!
//! - Vibration motors (PWM with soft ramping)
//! - ILI9341 TFT over SPI

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod motor;
