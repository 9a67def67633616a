//! Display commands
//!
//! A command line is either an exact keyword or a `PREFIX:payload` pair:
//!
//! | Line                                   | Command                         |
//! |----------------------------------------|---------------------------------|
//! | `CLEAR`, `CLEAR_ALL`                   | [`Command::Clear`], [`Command::ClearAll`] |
//! | `CLEAR_WINDINGS`                       | [`Command::ClearWindings`]      |
//! | `LAYER_<NAME>_ON` / `LAYER_<NAME>_OFF` | [`Command::SetLayer`]           |
//! | `WINDING:x,y,r,g,b`                    | [`Command::Winding`]            |
//! | `WAVE:amp,freq,tempo,beat` or `WAVE:amp` | [`Command::Wave`]             |
//! | `RHYTHM:bpm,beat,tempo`                | [`Command::Rhythm`]             |
//! | `SPECTRUM:v0,...,v9`                   | [`Command::Spectrum`]           |
//! | `SILENCE:0` / `SILENCE:1`              | [`Command::Silence`]            |
//!
//! Payload arity is fixed per prefix. A payload with the wrong number of
//! fields, or a field that is not a finite number, is [`ParseError::Malformed`].

use core::fmt::{self, Write};
use core::str::FromStr;

use crate::layer::LayerId;
use crate::line::Line;

/// Number of bars carried by a `SPECTRUM` command
pub const SPECTRUM_BARS: usize = 10;

/// Errors from [`Command::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Keyword or prefix not recognized
    Unknown,
    /// Recognized prefix with an unusable payload
    Malformed,
}

/// Errors from command encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer cannot hold the encoded line
    BufferTooSmall,
}

/// 24-bit color as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every component by `factor` (clamped to 0.0..=1.0)
    pub fn scaled(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * factor) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// A single winding curve point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindingPoint {
    /// Horizontal position in pixels (not yet clamped to the screen)
    pub x: i32,
    /// Vertical position in pixels (not yet clamped to the screen)
    pub y: i32,
    /// Point color
    pub color: Rgb,
}

/// Payload of a `WAVE` command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveUpdate {
    /// Current four-field format
    Full {
        amplitude: f32,
        frequency: f32,
        tempo_multiplier: f32,
        beat_strength: f32,
    },
    /// Legacy single-value format
    AmplitudeOnly(f32),
}

/// A parsed display command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Blank the screen and reset all state
    Clear,
    /// Same effect as [`Command::Clear`]
    ClearAll,
    /// Blank the screen, redraw wave and spectrum, forget the winding position
    ClearWindings,
    /// Enable or disable a layer
    SetLayer { layer: LayerId, enabled: bool },
    /// Plot or connect a winding point
    Winding(WindingPoint),
    /// Update the wave signal scalars
    Wave(WaveUpdate),
    /// Update tempo and beat state
    Rhythm {
        bpm: f32,
        beat_strength: f32,
        tempo_multiplier: f32,
    },
    /// Set spectrum bar targets
    Spectrum([u8; SPECTRUM_BARS]),
    /// Enter or leave silence mode
    Silence(bool),
}

impl Command {
    /// Parse a command from a line (terminator already removed)
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();

        match line {
            "CLEAR" => return Ok(Command::Clear),
            "CLEAR_ALL" => return Ok(Command::ClearAll),
            "CLEAR_WINDINGS" => return Ok(Command::ClearWindings),
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("LAYER_") {
            return parse_layer(rest);
        }

        let (prefix, payload) = line.split_once(':').ok_or(ParseError::Unknown)?;
        match prefix {
            "WINDING" => parse_winding(payload),
            "WAVE" => parse_wave(payload),
            "RHYTHM" => {
                let [bpm, beat_strength, tempo_multiplier] = parse_floats(payload)?;
                Ok(Command::Rhythm {
                    bpm,
                    beat_strength,
                    tempo_multiplier,
                })
            }
            "SPECTRUM" => {
                let values: [i64; SPECTRUM_BARS] = parse_fields(payload)?;
                Ok(Command::Spectrum(values.map(clamp_u8)))
            }
            "SILENCE" => {
                let [flag]: [i32; 1] = parse_fields(payload)?;
                Ok(Command::Silence(flag != 0))
            }
            _ => Err(ParseError::Unknown),
        }
    }

    /// True for commands that blank the whole screen
    pub fn clears_screen(&self) -> bool {
        matches!(
            self,
            Command::Clear | Command::ClearAll | Command::ClearWindings
        )
    }

    /// Render this command as a newline-terminated line
    pub fn to_line(&self) -> Result<Line, EncodeError> {
        let mut line = Line::new();
        writeln!(line, "{}", self).map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(line)
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written, terminator included.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let line = self.to_line()?;
        let bytes = line.as_bytes();
        if buffer.len() < bytes.len() {
            return Err(EncodeError::BufferTooSmall);
        }
        buffer[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

impl fmt::Display for Command {
    /// Writes the line without its terminator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Clear => f.write_str("CLEAR"),
            Command::ClearAll => f.write_str("CLEAR_ALL"),
            Command::ClearWindings => f.write_str("CLEAR_WINDINGS"),
            Command::SetLayer { layer, enabled } => {
                let state = if *enabled { "ON" } else { "OFF" };
                write!(f, "LAYER_{}_{}", layer.name(), state)
            }
            Command::Winding(p) => write!(
                f,
                "WINDING:{},{},{},{},{}",
                p.x, p.y, p.color.r, p.color.g, p.color.b
            ),
            Command::Wave(WaveUpdate::Full {
                amplitude,
                frequency,
                tempo_multiplier,
                beat_strength,
            }) => write!(
                f,
                "WAVE:{:.3},{:.1},{:.3},{:.3}",
                amplitude, frequency, tempo_multiplier, beat_strength
            ),
            Command::Wave(WaveUpdate::AmplitudeOnly(amplitude)) => {
                write!(f, "WAVE:{:.3}", amplitude)
            }
            Command::Rhythm {
                bpm,
                beat_strength,
                tempo_multiplier,
            } => write!(
                f,
                "RHYTHM:{:.1},{:.3},{:.3}",
                bpm, beat_strength, tempo_multiplier
            ),
            Command::Spectrum(values) => {
                f.write_str("SPECTRUM:")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            Command::Silence(silent) => write!(f, "SILENCE:{}", u8::from(*silent)),
        }
    }
}

fn parse_layer(rest: &str) -> Result<Command, ParseError> {
    let (name, state) = rest.rsplit_once('_').ok_or(ParseError::Unknown)?;
    let layer = LayerId::from_name(name).ok_or(ParseError::Unknown)?;
    let enabled = match state {
        "ON" => true,
        "OFF" => false,
        _ => return Err(ParseError::Unknown),
    };
    Ok(Command::SetLayer { layer, enabled })
}

/// Coordinates and channels are clamped into range; only integers that do
/// not fit in 64 bits are malformed.
fn parse_winding(payload: &str) -> Result<Command, ParseError> {
    let [x, y, r, g, b]: [i64; 5] = parse_fields(payload)?;
    Ok(Command::Winding(WindingPoint {
        x: clamp_i32(x),
        y: clamp_i32(y),
        color: Rgb::new(clamp_u8(r), clamp_u8(g), clamp_u8(b)),
    }))
}

fn parse_wave(payload: &str) -> Result<Command, ParseError> {
    if let Ok([amplitude, frequency, tempo_multiplier, beat_strength]) = parse_floats(payload) {
        return Ok(Command::Wave(WaveUpdate::Full {
            amplitude,
            frequency,
            tempo_multiplier,
            beat_strength,
        }));
    }

    // Legacy senders put the amplitude alone in the payload
    let [amplitude] = parse_floats(payload)?;
    Ok(Command::Wave(WaveUpdate::AmplitudeOnly(amplitude)))
}

/// Split `payload` into exactly `N` comma-separated fields
fn parse_fields<T, const N: usize>(payload: &str) -> Result<[T; N], ParseError>
where
    T: FromStr + Copy + Default,
{
    let mut out = [T::default(); N];
    let mut parts = payload.split(',');

    for slot in out.iter_mut() {
        let part = parts.next().ok_or(ParseError::Malformed)?;
        *slot = part.trim().parse().map_err(|_| ParseError::Malformed)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::Malformed);
    }

    Ok(out)
}

fn parse_floats<const N: usize>(payload: &str) -> Result<[f32; N], ParseError> {
    let values: [f32; N] = parse_fields(payload)?;
    if values.iter().all(|v| v.is_finite()) {
        Ok(values)
    } else {
        Err(ParseError::Malformed)
    }
}

fn clamp_u8(value: i64) -> u8 {
    value.clamp(0, u8::MAX as i64) as u8
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
