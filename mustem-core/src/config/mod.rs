//! Configuration types
//!
//! Sender board configuration, embedded as TOML and parsed on device.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ConfigError};
pub use types::*;
