//! Per-layer state

use embedded_graphics::prelude::Point;
use mustem_protocol::LayerId;

/// Enable flag and last drawn position of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    /// Last drawn position, `None` when nothing has been drawn yet
    last: Option<Point>,
    enabled: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerState {
    /// Enabled layer with no previous position
    pub const fn new() -> Self {
        Self {
            last: None,
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn last_position(&self) -> Option<Point> {
        self.last
    }

    /// Record the position just drawn
    ///
    /// Ignored while the layer is disabled.
    pub fn record_position(&mut self, point: Point) {
        if self.enabled {
            self.last = Some(point);
        }
    }

    /// Forget the previous position
    pub fn forget_position(&mut self) {
        self.last = None;
    }
}

/// State of every layer, indexed by [`LayerId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layers {
    states: [LayerState; LayerId::ALL.len()],
}

impl Layers {
    /// All layers enabled, no positions
    pub const fn new() -> Self {
        Self {
            states: [LayerState::new(); LayerId::ALL.len()],
        }
    }

    pub fn get(&self, layer: LayerId) -> &LayerState {
        &self.states[layer.index()]
    }

    pub fn get_mut(&mut self, layer: LayerId) -> &mut LayerState {
        &mut self.states[layer.index()]
    }

    pub fn is_enabled(&self, layer: LayerId) -> bool {
        self.get(layer).is_enabled()
    }

    /// Forget every position, keeping the enable flags
    pub fn forget_positions(&mut self) {
        for state in &mut self.states {
            state.forget_position();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_start_enabled() {
        let layers = Layers::new();
        for layer in LayerId::ALL {
            assert!(layers.is_enabled(layer));
            assert_eq!(layers.get(layer).last_position(), None);
        }
    }

    #[test]
    fn test_position_not_recorded_while_disabled() {
        let mut state = LayerState::new();
        state.record_position(Point::new(1, 2));
        state.set_enabled(false);
        state.record_position(Point::new(3, 4));
        assert_eq!(state.last_position(), Some(Point::new(1, 2)));
    }

    #[test]
    fn test_forget_positions_keeps_flags() {
        let mut layers = Layers::new();
        layers.get_mut(LayerId::Winding).record_position(Point::new(5, 5));
        layers.get_mut(LayerId::Wave).set_enabled(false);

        layers.forget_positions();
        assert_eq!(layers.get(LayerId::Winding).last_position(), None);
        assert!(!layers.is_enabled(LayerId::Wave));
        assert!(layers.is_enabled(LayerId::Winding));
    }
}
