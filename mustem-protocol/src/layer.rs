//! Visual layer identifiers

/// One of the independently toggleable layers drawn on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerId {
    /// Winding curve points sent by the host
    Winding,
    /// Phase-driven sine wave
    Wave,
    /// Spectrum bars
    Spectrum,
}

impl LayerId {
    /// All layers, in drawing order
    pub const ALL: [LayerId; 3] = [LayerId::Winding, LayerId::Wave, LayerId::Spectrum];

    /// Name used in `LAYER_<NAME>_ON/OFF` commands
    pub const fn name(self) -> &'static str {
        match self {
            LayerId::Winding => "WINDING",
            LayerId::Wave => "WAVE",
            LayerId::Spectrum => "SPECTRUM",
        }
    }

    /// Look up a layer by its command name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.name() == name)
    }

    /// Index into per-layer arrays
    pub const fn index(self) -> usize {
        self as usize
    }
}
