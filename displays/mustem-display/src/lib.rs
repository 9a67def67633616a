//! Layered scene for the MUSTEM TFT display
//!
//! This crate provides:
//! - `DisplayBackend` trait for the pixel display (RGB565 TFT)
//! - `Scene`, the state applied by protocol commands and advanced by ticks
//! - Time-gated animation updaters (wave, spectrum bars, beat marker)
//! - Sound-frequency to light-color mapping
//!
//! # Architecture
//!
//! The receiving firmware turns serial bytes into [`mustem_protocol::Command`]s
//! and hands them to a single [`Scene`] along with the display. The scene is
//! the only owner of layer and signal state:
//!
//! ```text
//!   Command ──► Scene::apply ──► SignalState / LayerState / targets
//!                                        │
//!   timer   ──► Scene::tick  ──► WaveAnimator ─┐
//!                               SpectrumAnimator ├──► DisplayBackend
//!                               BeatMarker ──────┘
//! ```
//!
//! Updaters only repaint what changed: the wave erases its previous curve
//! before drawing the new one and spectrum bars fill or clear only the
//! difference in height.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod beat;
pub mod color;
pub mod config;
pub mod gate;
pub mod layer;
pub mod scene;
pub mod signal;
pub mod spectrum;
pub mod wave;

#[cfg(test)]
mod testing;

pub use backend::{DisplayBackend, DisplayError};
pub use config::SceneConfig;
pub use layer::{LayerState, Layers};
pub use scene::Scene;
pub use signal::SignalState;

// Graphics types used in the public API
pub use embedded_graphics::pixelcolor::Rgb565;
pub use embedded_graphics::prelude::{Point, Size};
pub use embedded_graphics::primitives::Rectangle;
