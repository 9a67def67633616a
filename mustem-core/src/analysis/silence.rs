//! Silence detector

/// Reports silence after a run of quiet blocks
///
/// A block is quiet when its RMS is below the threshold. Silence starts
/// once `blocks_needed` consecutive quiet blocks are seen and ends on the
/// first loud block.
#[derive(Debug, Clone)]
pub struct SilenceDetector {
    threshold: f32,
    blocks_needed: u32,
    quiet_blocks: u32,
    silent: bool,
}

impl SilenceDetector {
    pub fn new(threshold: f32, blocks_needed: u32) -> Self {
        Self {
            threshold,
            blocks_needed: blocks_needed.max(1),
            quiet_blocks: 0,
            silent: false,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Consecutive quiet blocks so far
    pub fn quiet_blocks(&self) -> u32 {
        self.quiet_blocks
    }

    /// Feed the RMS of one block
    ///
    /// Returns `Some(state)` when the silence state changes.
    pub fn update(&mut self, rms: f32) -> Option<bool> {
        if rms < self.threshold {
            self.quiet_blocks = self.quiet_blocks.saturating_add(1);
        } else {
            self.quiet_blocks = 0;
        }

        let silent = self.quiet_blocks >= self.blocks_needed;
        if silent == self.silent {
            return None;
        }
        self.silent = silent;
        Some(silent)
    }
}
