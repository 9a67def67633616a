//! Build script for mustem-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates mustem.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate mustem.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=mustem.toml");

    let config_path = Path::new("mustem.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: mustem.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a mustem.toml configuration file.           ║\n\
            ║  Please create one in the mustem-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read mustem.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in mustem.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_sampling(&config, &mut errors);
    validate_analysis(&config, &mut errors);
    validate_haptic(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in mustem.toml                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=mustem.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: [&str; 4] = ["sampling", "analysis", "cadence", "haptic"];

/// Only known sections, and `telemetry` at the root
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (key, value) in table {
        match value {
            toml::Value::Table(_) if SECTIONS.contains(&key.as_str()) => {}
            toml::Value::Table(_) => errors.push(format!("Unknown section [{}]", key)),
            toml::Value::Boolean(_) if key == "telemetry" => {}
            _ => errors.push(format!("Unknown top-level key '{}'", key)),
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn float(config: &toml::Value, section: &str, key: &str) -> Option<f64> {
    let value = config.get(section)?.get(key)?;
    value.as_float().or_else(|| value.as_integer().map(|v| v as f64))
}

fn validate_sampling(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(rate) = integer(config, "sampling", "sample_rate_hz") {
        if !(1..=100_000).contains(&rate) {
            errors.push("[sampling] sample_rate_hz must be 1-100000".to_string());
        }
    }
    if let Some(size) = integer(config, "sampling", "block_size") {
        if !(1..=1024).contains(&size) {
            errors.push("[sampling] block_size must be 1-1024".to_string());
        }
    }
}

fn validate_analysis(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(history) = integer(config, "analysis", "beat_history") {
        if !(1..=64).contains(&history) {
            errors.push("[analysis] beat_history must be 1-64".to_string());
        }
    }
    if let Some(threshold) = float(config, "analysis", "silence_threshold") {
        if !(0.0..=1.0).contains(&threshold) {
            errors.push("[analysis] silence_threshold must be 0-1".to_string());
        }
    }
}

fn validate_haptic(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(smoothing) = float(config, "haptic", "smoothing") {
        if !(0.0..=1.0).contains(&smoothing) {
            errors.push("[haptic] smoothing must be 0-1".to_string());
        }
    }
    for key in ["min_duty", "beat_pulse_percent"] {
        if let Some(percent) = integer(config, "haptic", key) {
            if !(0..=100).contains(&percent) {
                errors.push(format!("[haptic] {} must be 0-100", key));
            }
        }
    }
}
