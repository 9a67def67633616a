//! Fixed-rate acquisition pacing
//!
//! The acquisition step must run once per sampling period. The firmware
//! drives [`FixedRateSampler::poll`] from a ticker; the sampler decides
//! whether a slot is due, reports slots serviced later than the jitter
//! tolerance, and skips (never replays) slots that were missed entirely.
//! Accepted samples accumulate in a [`BlockBuffer`].

use heapless::Vec;

use crate::config::SamplingConfig;

/// Largest supported analysis block
pub const BLOCK_CAPACITY: usize = 1024;

/// Errors reported by [`FixedRateSampler::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerError {
    /// The slot was serviced later than the tolerance allows
    ///
    /// The slot still counts as serviced; the sample may be taken.
    Jitter { late_by_us: u32 },
}

/// Outcome of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// Next slot has not started yet
    NotDue,
    /// A slot is due, take one sample
    Due,
}

/// Paces acquisition at a fixed period
///
/// Times are microsecond counters that may wrap.
#[derive(Debug, Clone)]
pub struct FixedRateSampler {
    period_us: u32,
    tolerance_us: u32,
    next_due_us: Option<u32>,
    missed: u32,
    serviced: u32,
}

impl FixedRateSampler {
    pub fn new(period_us: u32, tolerance_us: u32) -> Self {
        Self {
            period_us: period_us.max(1),
            tolerance_us,
            next_due_us: None,
            missed: 0,
            serviced: 0,
        }
    }

    pub fn from_config(config: &SamplingConfig) -> Self {
        Self::new(config.period_us(), config.jitter_tolerance_us)
    }

    pub fn period_us(&self) -> u32 {
        self.period_us
    }

    /// Slots skipped because they were missed entirely
    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// Slots reported as due
    pub fn serviced(&self) -> u32 {
        self.serviced
    }

    /// Start of the next slot, if pacing has started
    pub fn next_due_us(&self) -> Option<u32> {
        self.next_due_us
    }

    /// Anchor the slot grid to a known schedule
    ///
    /// The first slot starts at `first_due_us`; polls before it are not due.
    pub fn start_at(&mut self, first_due_us: u32) {
        self.next_due_us = Some(first_due_us);
    }

    /// Restart pacing at the next poll
    pub fn reset(&mut self) {
        self.next_due_us = None;
        self.missed = 0;
        self.serviced = 0;
    }

    /// Check whether a slot is due at `now_us`
    ///
    /// Without [`start_at`](Self::start_at) the first poll is always due and
    /// anchors the slot grid. A wake up to the tolerance (at most half a
    /// period) before a slot services that slot on time.
    pub fn poll(&mut self, now_us: u32) -> Result<Slot, SamplerError> {
        let Some(due) = self.next_due_us else {
            self.next_due_us = Some(now_us.wrapping_add(self.period_us));
            self.serviced = self.serviced.wrapping_add(1);
            return Ok(Slot::Due);
        };

        let late = now_us.wrapping_sub(due) as i32;
        if late < 0 {
            let early_window = self.tolerance_us.min(self.period_us / 2);
            if late.unsigned_abs() > early_window {
                return Ok(Slot::NotDue);
            }
        }
        let late = late.max(0) as u32;

        let skipped = late / self.period_us;
        self.missed = self.missed.saturating_add(skipped);
        self.next_due_us = Some(
            due.wrapping_add(skipped.wrapping_add(1).wrapping_mul(self.period_us)),
        );
        self.serviced = self.serviced.wrapping_add(1);

        if late > self.tolerance_us {
            Err(SamplerError::Jitter { late_by_us: late })
        } else {
            Ok(Slot::Due)
        }
    }
}

/// Accumulates normalized samples into blocks of a configured size
#[derive(Debug, Clone)]
pub struct BlockBuffer {
    samples: Vec<f32, BLOCK_CAPACITY>,
    size: usize,
}

impl BlockBuffer {
    /// Create a buffer for blocks of `size` samples (limited to [`BLOCK_CAPACITY`])
    pub fn new(size: usize) -> Self {
        Self {
            samples: Vec::new(),
            size: size.clamp(1, BLOCK_CAPACITY),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.size
    }

    /// Append a sample; returns true once the block is complete
    ///
    /// Samples pushed into a complete block are dropped.
    pub fn push(&mut self, sample: f32) -> bool {
        if !self.is_full() {
            // Size never exceeds capacity
            let _ = self.samples.push(sample);
        }
        self.is_full()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
