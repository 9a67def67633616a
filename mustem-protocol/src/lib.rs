//! MUSTEM Serial Protocol
//!
//! This crate defines the text protocol spoken between the host (or sensor
//! board) and the layered TFT display, plus the telemetry line the sensor
//! board reports back.
//!
//! # Protocol Overview
//!
//! Every message is a single ASCII line terminated by `\n` or `\r`:
//! ```text
//! ┌──────────┬───┬───────────────────────────┬────┐
//! │ PREFIX   │ : │ comma separated payload   │ \n │
//! └──────────┴───┴───────────────────────────┴────┘
//!   or an exact keyword such as CLEAR / LAYER_WAVE_OFF
//! ```
//!
//! Lines are accumulated by [`LineReader`], which bounds the line length and
//! resynchronizes on the next terminator after an over-long line. Complete
//! lines are turned into a tagged [`Command`] by [`Command::parse`]; nothing
//! in this crate acts on a command.
//!
//! Both ends share the sound to light color mapping in [`color`], so a
//! frequency drawn by the display and a winding color chosen by the sender
//! agree.

#![no_std]
#![deny(unsafe_code)]

pub mod color;
pub mod command;
pub mod layer;
pub mod line;
pub mod telemetry;

pub use color::frequency_to_rgb;
pub use command::{
    Command, EncodeError, ParseError, Rgb, WaveUpdate, WindingPoint, SPECTRUM_BARS,
};
pub use layer::LayerId;
pub use line::{Line, LineError, LineReader, MAX_LINE_LEN};
pub use telemetry::{Telemetry, TelemetryError};
