//! Display command planning
//!
//! Turns the features of each analysis block into the serial commands the
//! display expects, at the display's cadence:
//!
//! | Command          | Cadence                          |
//! |------------------|----------------------------------|
//! | `SILENCE`        | on every silence transition      |
//! | `RHYTHM`         | `rhythm_interval_ms`             |
//! | `CLEAR_WINDINGS` | `winding_clear_interval_ms`      |
//! | `WINDING`        | one winding per block            |
//! | `WAVE`           | `wave_interval_ms`               |
//! | `SPECTRUM`       | `spectrum_interval_ms`           |
//!
//! While the input is silent only `SILENCE` transitions are produced.

use mustem_protocol::Command;

use crate::analysis::Features;
use crate::config::CadenceConfig;
use crate::winding::{fade_factor, WindingPoints};

/// Minimum-interval gate over a wrapping millisecond clock
#[derive(Debug, Clone, Copy, Default)]
struct Cadence {
    last_ms: Option<u32>,
}

impl Cadence {
    /// True (and re-armed) when `interval_ms` has passed; the first call is due
    fn due(&mut self, now_ms: u32, interval_ms: u32) -> bool {
        let due = self
            .last_ms
            .map_or(true, |last| now_ms.wrapping_sub(last) >= interval_ms);
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}

/// Plans display commands from block features
#[derive(Debug, Clone)]
pub struct CommandPlanner {
    cadence: CadenceConfig,
    rhythm: Cadence,
    wave: Cadence,
    spectrum: Cadence,
    last_clear_ms: Option<u32>,
    windings: u32,
}

impl CommandPlanner {
    pub fn new(cadence: &CadenceConfig) -> Self {
        Self {
            cadence: *cadence,
            rhythm: Cadence::default(),
            wave: Cadence::default(),
            spectrum: Cadence::default(),
            last_clear_ms: None,
            windings: 0,
        }
    }

    /// Windings emitted since the last clear
    pub fn windings_since_clear(&self) -> u32 {
        self.windings
    }

    /// Forget all cadence state
    pub fn reset(&mut self) {
        *self = Self::new(&self.cadence);
    }

    /// Commands that bring the display to a known state
    pub fn start<F: FnMut(Command)>(&mut self, mut emit: F) {
        self.reset();
        emit(Command::ClearAll);
    }

    /// Emit the commands due for one block
    pub fn plan<F: FnMut(Command)>(&mut self, features: &Features, mut emit: F) {
        let now = features.time_ms;

        if let Some(silent) = features.silence_changed {
            emit(Command::Silence(silent));
        }
        if features.silent {
            return;
        }

        if self.rhythm.due(now, self.cadence.rhythm_interval_ms) {
            emit(Command::Rhythm {
                bpm: features.bpm,
                beat_strength: features.beat_strength,
                tempo_multiplier: features.tempo_multiplier,
            });
        }

        if self.cadence.windings {
            self.plan_winding(features, &mut emit);
        }

        if self.wave.due(now, self.cadence.wave_interval_ms) {
            emit(Command::Wave(features.wave_update()));
        }

        if self.spectrum.due(now, self.cadence.spectrum_interval_ms) {
            emit(Command::Spectrum(features.spectrum));
        }
    }

    fn plan_winding<F: FnMut(Command)>(&mut self, features: &Features, emit: &mut F) {
        let now = features.time_ms;
        let interval = self.cadence.winding_clear_interval_ms;

        let last_clear = match self.last_clear_ms {
            Some(last) if now.wrapping_sub(last) >= interval => {
                emit(Command::ClearWindings);
                self.windings = 0;
                now
            }
            Some(last) => last,
            None => now,
        };
        self.last_clear_ms = Some(last_clear);

        let fade = fade_factor(interval, now.wrapping_sub(last_clear));
        for point in WindingPoints::new(features.frequency, fade) {
            emit(Command::Winding(point));
        }
        self.windings = self.windings.saturating_add(1);
    }
}
