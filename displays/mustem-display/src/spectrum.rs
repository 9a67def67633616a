//! Spectrum bar updater
//!
//! Bars ease toward their target heights. A bar is repainted only once its
//! displayed value has moved more than one unit from what is on screen, and
//! then only the rows between the old and new heights are touched.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use mustem_protocol::SPECTRUM_BARS;
use num_traits::Float;

use crate::backend::{DisplayBackend, DisplayError};
use crate::color::spectrum_bar_color;
use crate::config::SceneConfig;
use crate::gate::UpdateGate;
use crate::layer::LayerState;

/// Largest bar value
pub const BAR_MAX: f32 = 255.0;

/// Distance under which a bar snaps to its target
const SNAP: f32 = 0.5;

/// Smallest change that triggers a repaint
const REDRAW_THRESHOLD: f32 = 1.0;

/// Interpolated spectrum bars
#[derive(Debug, Clone)]
pub struct SpectrumAnimator {
    targets: [u8; SPECTRUM_BARS],
    displayed: [f32; SPECTRUM_BARS],
    /// Value each bar had when last painted
    painted: [f32; SPECTRUM_BARS],
    /// Height in pixels of each bar on screen
    painted_px: [u32; SPECTRUM_BARS],
    gate: UpdateGate,
}

impl Default for SpectrumAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnimator {
    pub const fn new() -> Self {
        Self {
            targets: [0; SPECTRUM_BARS],
            displayed: [0.0; SPECTRUM_BARS],
            painted: [0.0; SPECTRUM_BARS],
            painted_px: [0; SPECTRUM_BARS],
            gate: UpdateGate::new(),
        }
    }

    /// Set the heights the bars move toward
    pub fn set_targets(&mut self, targets: [u8; SPECTRUM_BARS]) {
        self.targets = targets;
    }

    pub fn targets(&self) -> &[u8; SPECTRUM_BARS] {
        &self.targets
    }

    /// Current interpolated value of a bar
    pub fn displayed(&self, bar: usize) -> f32 {
        self.displayed.get(bar).copied().unwrap_or(0.0)
    }

    /// Height in pixels of a bar as painted on screen
    pub fn painted_height(&self, bar: usize) -> u32 {
        self.painted_px.get(bar).copied().unwrap_or(0)
    }

    /// Everything back to zero with nothing on screen
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Forget what is on screen after it was blanked
    pub fn forget_painted(&mut self) {
        self.painted = [0.0; SPECTRUM_BARS];
        self.painted_px = [0; SPECTRUM_BARS];
    }

    /// Ease the bars and repaint those that moved, if the interval elapsed
    ///
    /// While `silent` every bar decays toward zero regardless of its target.
    /// Returns true if the updater ran.
    pub fn update<D: DisplayBackend>(
        &mut self,
        now_ms: u32,
        silent: bool,
        layer: &mut LayerState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<bool, DisplayError> {
        if !layer.is_enabled() || !self.gate.ready(now_ms, config.spectrum_interval_ms) {
            return Ok(false);
        }

        let lerp = config.effective_lerp();
        for bar in 0..SPECTRUM_BARS {
            let target = if silent { 0.0 } else { f32::from(self.targets[bar]) };
            self.displayed[bar] = step_toward(self.displayed[bar], target, lerp);

            let displayed = self.displayed[bar];
            let settled = displayed == target && self.painted[bar] != displayed;
            if (displayed - self.painted[bar]).abs() > REDRAW_THRESHOLD || settled {
                self.paint(bar, layer, config, display)?;
            }
        }
        Ok(true)
    }

    /// Paint every bar at its displayed value
    ///
    /// Used after the screen was blanked underneath the bars.
    pub fn redraw<D: DisplayBackend>(
        &mut self,
        layer: &mut LayerState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        self.forget_painted();
        if !layer.is_enabled() {
            return Ok(());
        }
        for bar in 0..SPECTRUM_BARS {
            self.paint(bar, layer, config, display)?;
        }
        Ok(())
    }

    /// Remove all bars from the screen, keeping their values
    pub fn erase<D: DisplayBackend>(
        &mut self,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        for bar in 0..SPECTRUM_BARS {
            let height = self.painted_px[bar];
            if height > 0 {
                display.fill_rect(rows(bar, 0, height, config), config.background)?;
            }
        }
        self.forget_painted();
        Ok(())
    }

    fn paint<D: DisplayBackend>(
        &mut self,
        bar: usize,
        layer: &mut LayerState,
        config: &SceneConfig,
        display: &mut D,
    ) -> Result<(), DisplayError> {
        let old = self.painted_px[bar];
        let new = height_px(self.displayed[bar], config);

        if new > old {
            let color = spectrum_bar_color(bar, SPECTRUM_BARS);
            display.fill_rect(rows(bar, old, new, config), color)?;
        } else if new < old {
            display.fill_rect(rows(bar, new, old, config), config.background)?;
        }

        self.painted[bar] = self.displayed[bar];
        self.painted_px[bar] = new;
        let top = rows(bar, 0, new, config).top_left;
        layer.record_position(top);
        Ok(())
    }
}

/// Move `current` a fraction of the way to `target`, snapping when close
///
/// With `lerp` in (0, 1] the result never passes the target.
pub fn step_toward(current: f32, target: f32, lerp: f32) -> f32 {
    let next = current + (target - current) * lerp;
    if (target - next).abs() < SNAP {
        target
    } else {
        next
    }
}

fn height_px(value: f32, config: &SceneConfig) -> u32 {
    let max = config.spectrum_area.size.height;
    let px = (value.clamp(0.0, BAR_MAX) / BAR_MAX * max as f32).round() as u32;
    px.min(max)
}

/// Rows `from..to` of a bar, counted up from the bottom of the area
fn rows(bar: usize, from: u32, to: u32, config: &SceneConfig) -> Rectangle {
    let area = config.spectrum_area;
    let slot = area.size.width / SPECTRUM_BARS as u32;
    let width = slot.saturating_sub(config.spectrum_gap_px).max(1);
    let bottom = area.top_left.y + area.size.height as i32;

    Rectangle::new(
        Point::new(area.top_left.x + (bar as u32 * slot) as i32, bottom - to as i32),
        Size::new(width, to.saturating_sub(from)),
    )
}
