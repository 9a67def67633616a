//! Configuration loading
//!
//! The configuration is compiled in from `mustem.toml` (validated by the
//! build script). A parse failure at runtime falls back to defaults so the
//! board still comes up.

use defmt::*;

use mustem_core::config::{parse_config, SenderConfig};

/// Embedded configuration (compiled into firmware)
/// Edit mustem.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../mustem.toml");

/// Parse the embedded configuration
pub fn load_config() -> SenderConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config loaded: {} Hz, {} samples per block, telemetry={}",
                config.sampling.sample_rate_hz, config.sampling.block_size, config.telemetry
            );
            config
        }
        Err(e) => {
            error!("Embedded config rejected: {:?}, using defaults", e);
            SenderConfig::default()
        }
    }
}
