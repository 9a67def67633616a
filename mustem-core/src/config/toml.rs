//! Minimal TOML parser for the sender configuration
//!
//! Handles only the subset the configuration needs and allocates nothing.
//!
//! Supported features:
//! - `key = value` pairs (integer, float, boolean)
//! - `[section]` headers
//! - Comments (`# ...`), whole-line or trailing
//! - Underscores in numbers (`sample_rate_hz = 8_000`)
//!
//! NOT supported:
//! - Strings, arrays, inline tables
//! - Dotted keys and nested sections
//!
//! Unknown sections and keys are errors so a typo cannot silently fall back
//! to a default.

use core::str::FromStr;

use heapless::String;

use super::types::{ConfigIssue, SenderConfig};

/// Parse error, with the 1-based line it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Malformed line (no `=`, unterminated header)
    Syntax { line: u32 },
    /// Section header names no known section
    UnknownSection { line: u32 },
    /// Key not valid in its section
    UnknownKey { line: u32 },
    /// Value has the wrong type or does not fit
    InvalidValue { line: u32 },
    /// Parsed values are inconsistent
    Invalid(ConfigIssue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sampling,
    Analysis,
    Cadence,
    Haptic,
}

/// Parse TOML configuration into a validated [`SenderConfig`]
///
/// Keys that are not present keep their defaults.
pub fn parse_config(input: &str) -> Result<SenderConfig, ConfigError> {
    let mut config = SenderConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line = (index + 1) as u32;
        let text = strip_comment(raw).trim();

        // Skip empty lines and comments
        if text.is_empty() {
            continue;
        }

        if let Some(header) = text.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ConfigError::Syntax { line })?;
            section = parse_section(name.trim()).ok_or(ConfigError::UnknownSection { line })?;
            continue;
        }

        let (key, value) = text.split_once('=').ok_or(ConfigError::Syntax { line })?;
        apply_value(&mut config, section, key.trim(), value.trim(), line)?;
    }

    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section(name: &str) -> Option<Section> {
    match name {
        "sampling" => Some(Section::Sampling),
        "analysis" => Some(Section::Analysis),
        "cadence" => Some(Section::Cadence),
        "haptic" => Some(Section::Haptic),
        _ => None,
    }
}

fn apply_value(
    config: &mut SenderConfig,
    section: Section,
    key: &str,
    value: &str,
    line: u32,
) -> Result<(), ConfigError> {
    let v = Value { text: value, line };

    match (section, key) {
        (Section::Root, "telemetry") => config.telemetry = v.boolean()?,

        (Section::Sampling, "sample_rate_hz") => config.sampling.sample_rate_hz = v.number()?,
        (Section::Sampling, "block_size") => config.sampling.block_size = v.number()?,
        (Section::Sampling, "jitter_tolerance_us") => {
            config.sampling.jitter_tolerance_us = v.number()?
        }

        (Section::Analysis, "pitch_hysteresis") => config.analysis.pitch_hysteresis = v.float()?,
        (Section::Analysis, "probes_per_band") => config.analysis.probes_per_band = v.number()?,
        (Section::Analysis, "spectrum_gain") => config.analysis.spectrum_gain = v.float()?,
        (Section::Analysis, "spectrum_beat_boost") => {
            config.analysis.spectrum_beat_boost = v.float()?
        }
        (Section::Analysis, "beat_sensitivity") => config.analysis.beat_sensitivity = v.float()?,
        (Section::Analysis, "beat_history") => config.analysis.beat_history = v.number()?,
        (Section::Analysis, "beat_refractory_ms") => {
            config.analysis.beat_refractory_ms = v.number()?
        }
        (Section::Analysis, "beat_min_energy") => config.analysis.beat_min_energy = v.float()?,
        (Section::Analysis, "silence_threshold") => {
            config.analysis.silence_threshold = v.float()?
        }
        (Section::Analysis, "silence_blocks") => config.analysis.silence_blocks = v.number()?,

        (Section::Cadence, "wave_interval_ms") => config.cadence.wave_interval_ms = v.number()?,
        (Section::Cadence, "spectrum_interval_ms") => {
            config.cadence.spectrum_interval_ms = v.number()?
        }
        (Section::Cadence, "rhythm_interval_ms") => {
            config.cadence.rhythm_interval_ms = v.number()?
        }
        (Section::Cadence, "winding_clear_interval_ms") => {
            config.cadence.winding_clear_interval_ms = v.number()?
        }
        (Section::Cadence, "windings") => config.cadence.windings = v.boolean()?,

        (Section::Haptic, "gain") => config.haptic.gain = v.float()?,
        (Section::Haptic, "smoothing") => config.haptic.smoothing = v.float()?,
        (Section::Haptic, "beat_pulse_percent") => config.haptic.beat_pulse_percent = v.number()?,
        (Section::Haptic, "beat_pulse_ms") => config.haptic.beat_pulse_ms = v.number()?,
        (Section::Haptic, "min_duty") => config.haptic.min_duty = v.number()?,
        (Section::Haptic, "ramp_up_ms") => config.haptic.ramp_up_ms = v.number()?,
        (Section::Haptic, "ramp_down_ms") => config.haptic.ramp_down_ms = v.number()?,

        _ => return Err(ConfigError::UnknownKey { line }),
    }
    Ok(())
}

/// A value with the line it came from
struct Value<'a> {
    text: &'a str,
    line: u32,
}

impl Value<'_> {
    fn invalid(&self) -> ConfigError {
        ConfigError::InvalidValue { line: self.line }
    }

    fn boolean(&self) -> Result<bool, ConfigError> {
        match self.text {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(self.invalid()),
        }
    }

    /// Integer of any width, rejecting values that do not fit
    fn number<T: FromStr>(&self) -> Result<T, ConfigError> {
        self.digits()?.parse().map_err(|_| self.invalid())
    }

    /// Finite float; integers are accepted too
    fn float(&self) -> Result<f32, ConfigError> {
        let value: f32 = self.digits()?.parse().map_err(|_| self.invalid())?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid())
        }
    }

    /// Text with TOML digit separators removed
    fn digits(&self) -> Result<String<32>, ConfigError> {
        let mut out = String::new();
        for c in self.text.chars().filter(|c| *c != '_') {
            out.push(c).map_err(|_| self.invalid())?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# MUSTEM sender
telemetry = false

[sampling]
sample_rate_hz = 10_000   # 10 kHz
block_size = 1000

[analysis]
beat_sensitivity = 1.6
silence_blocks = 20

[cadence]
windings = false
rhythm_interval_ms = 1500

[haptic]
gain = 150
smoothing = 0.25
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert!(!config.telemetry);
        assert_eq!(config.sampling.sample_rate_hz, 10_000);
        assert_eq!(config.sampling.block_size, 1000);
        assert_eq!(config.analysis.beat_sensitivity, 1.6);
        assert_eq!(config.analysis.silence_blocks, 20);
        assert!(!config.cadence.windings);
        assert_eq!(config.cadence.rhythm_interval_ms, 1500);
        assert_eq!(config.haptic.gain, 150.0);
        assert_eq!(config.haptic.smoothing, 0.25);

        // Untouched keys keep defaults
        assert_eq!(config.cadence.wave_interval_ms, 50);
        assert_eq!(config.haptic.min_duty, 25);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config(""), Ok(SenderConfig::default()));
        assert_eq!(parse_config("# nothing\n\n"), Ok(SenderConfig::default()));
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[sampling]\n[display]\n"),
            Err(ConfigError::UnknownSection { line: 2 })
        );
    }

    #[test]
    fn test_unknown_key_reports_line() {
        assert_eq!(
            parse_config("[haptic]\ngain = 1\ngian = 2\n"),
            Err(ConfigError::UnknownKey { line: 3 })
        );
        // Keys are scoped to their section
        assert_eq!(
            parse_config("gain = 1\n"),
            Err(ConfigError::UnknownKey { line: 1 })
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("telemetry = yes\n"),
            Err(ConfigError::InvalidValue { line: 1 })
        );
        assert_eq!(
            parse_config("[haptic]\nmin_duty = 300\n"),
            Err(ConfigError::InvalidValue { line: 2 })
        );
        assert_eq!(
            parse_config("[haptic]\ngain = inf\n"),
            Err(ConfigError::InvalidValue { line: 2 })
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            parse_config("[sampling\n"),
            Err(ConfigError::Syntax { line: 1 })
        );
        assert_eq!(
            parse_config("[sampling]\nblock_size 12\n"),
            Err(ConfigError::Syntax { line: 2 })
        );
    }

    #[test]
    fn test_validation_runs_after_parse() {
        assert_eq!(
            parse_config("[sampling]\nblock_size = 0\n"),
            Err(ConfigError::Invalid(ConfigIssue::BlockSize))
        );
    }
}
