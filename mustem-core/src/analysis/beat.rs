//! Energy beat detector and tempo tracker
//!
//! A block is a beat when its energy exceeds the running average of recent
//! blocks by the sensitivity ratio and the refractory time has passed since
//! the previous beat. Inter-beat intervals that correspond to 60-200 BPM
//! feed the tempo estimate, which is the median of the last five interval
//! medians.

use heapless::{Deque, Vec};

/// Largest supported energy history
pub const MAX_BEAT_HISTORY: usize = 64;

/// Blocks required before beats can be reported
const MIN_HISTORY: usize = 4;

/// Intervals kept for the tempo estimate
const MAX_INTERVALS: usize = 8;

/// Tempo estimates kept for smoothing
const MAX_ESTIMATES: usize = 5;

/// Tempo reported before any beat
pub const DEFAULT_BPM: f32 = 120.0;

/// Slowest accepted tempo
pub const MIN_BPM: f32 = 60.0;

/// Fastest accepted tempo
pub const MAX_BPM: f32 = 200.0;

/// A detected beat
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeatEvent {
    /// How far the block rose over the average (0.0..=1.0)
    pub strength: f32,
    /// Block time
    pub time_ms: u32,
}

/// Phase speed factor for a tempo, relative to 120 BPM
pub fn tempo_multiplier(bpm: f32) -> f32 {
    (bpm / DEFAULT_BPM).clamp(0.3, 3.0)
}

/// Running beat detector
#[derive(Debug, Clone)]
pub struct BeatDetector {
    history: Deque<f32, MAX_BEAT_HISTORY>,
    window: usize,
    sensitivity: f32,
    refractory_ms: u32,
    min_energy: f32,
    last_beat_ms: Option<u32>,
    intervals: Deque<u32, MAX_INTERVALS>,
    estimates: Deque<f32, MAX_ESTIMATES>,
    bpm: f32,
    strength: f32,
}

impl BeatDetector {
    /// Create a detector averaging over `window` blocks
    ///
    /// `window` is limited to [`MAX_BEAT_HISTORY`].
    pub fn new(window: usize, sensitivity: f32, refractory_ms: u32, min_energy: f32) -> Self {
        Self {
            history: Deque::new(),
            window: window.clamp(1, MAX_BEAT_HISTORY),
            sensitivity,
            refractory_ms,
            min_energy,
            last_beat_ms: None,
            intervals: Deque::new(),
            estimates: Deque::new(),
            bpm: DEFAULT_BPM,
            strength: 0.0,
        }
    }

    /// Current tempo estimate
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Strength of the most recent block relative to the average
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Tempo multiplier for the current estimate
    pub fn tempo_multiplier(&self) -> f32 {
        tempo_multiplier(self.bpm)
    }

    /// Forget history and tempo
    pub fn reset(&mut self) {
        self.history.clear();
        self.intervals.clear();
        self.estimates.clear();
        self.last_beat_ms = None;
        self.bpm = DEFAULT_BPM;
        self.strength = 0.0;
    }

    /// Feed the energy of one block
    pub fn process(&mut self, energy: f32, now_ms: u32) -> Option<BeatEvent> {
        let energy = if energy.is_finite() { energy.max(0.0) } else { 0.0 };
        let event = self.detect(energy, now_ms);

        if self.history.len() >= self.window {
            self.history.pop_front();
        }
        // Window never exceeds capacity, so there is always room here
        let _ = self.history.push_back(energy);

        event
    }

    fn detect(&mut self, energy: f32, now_ms: u32) -> Option<BeatEvent> {
        if self.history.len() < MIN_HISTORY.min(self.window) {
            self.strength = 0.0;
            return None;
        }

        let average = self.history.iter().sum::<f32>() / self.history.len() as f32;
        self.strength = if average > f32::EPSILON {
            (energy / average - 1.0).clamp(0.0, 1.0)
        } else if energy > self.min_energy {
            1.0
        } else {
            0.0
        };

        let loud = energy > self.min_energy && energy > average * self.sensitivity;
        let rested = self
            .last_beat_ms
            .map_or(true, |last| now_ms.wrapping_sub(last) >= self.refractory_ms);
        if !(loud && rested) {
            return None;
        }

        if let Some(last) = self.last_beat_ms {
            self.record_interval(now_ms.wrapping_sub(last));
        }
        self.last_beat_ms = Some(now_ms);
        Some(BeatEvent {
            strength: self.strength,
            time_ms: now_ms,
        })
    }

    fn record_interval(&mut self, interval_ms: u32) {
        if interval_ms == 0 {
            return;
        }
        let bpm = 60_000.0 / interval_ms as f32;
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return;
        }

        if self.intervals.is_full() {
            self.intervals.pop_front();
        }
        let _ = self.intervals.push_back(interval_ms);

        let mut intervals: Vec<f32, MAX_INTERVALS> = self.intervals.iter().map(|&i| i as f32).collect();
        let estimate = 60_000.0 / median(&mut intervals);

        if self.estimates.is_full() {
            self.estimates.pop_front();
        }
        let _ = self.estimates.push_back(estimate);

        let mut estimates: Vec<f32, MAX_ESTIMATES> = self.estimates.iter().copied().collect();
        self.bpm = median(&mut estimates);
    }
}

/// Median of a non-empty slice (sorts in place)
fn median(values: &mut [f32]) -> f32 {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
