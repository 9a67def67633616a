//! Minimum-interval gate for time-driven updaters

/// Tracks when an updater last ran
///
/// Times are milliseconds from a free-running counter; differences use
/// wrapping arithmetic so the gate keeps working across counter rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateGate {
    last_ms: Option<u32>,
}

impl UpdateGate {
    pub const fn new() -> Self {
        Self { last_ms: None }
    }

    /// True if at least `interval_ms` passed since the last accepted call
    ///
    /// An accepted call becomes the new reference time. The first call is
    /// always accepted.
    pub fn ready(&mut self, now_ms: u32, interval_ms: u32) -> bool {
        let due = match self.last_ms {
            Some(last) => now_ms.wrapping_sub(last) >= interval_ms,
            None => true,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    pub fn last_ms(&self) -> Option<u32> {
        self.last_ms
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_due() {
        let mut gate = UpdateGate::new();
        assert!(gate.ready(12345, 20));
        assert_eq!(gate.last_ms(), Some(12345));
    }

    #[test]
    fn test_interval_respected() {
        let mut gate = UpdateGate::new();
        assert!(gate.ready(0, 20));
        assert!(!gate.ready(19, 20));
        assert!(gate.ready(20, 20));
        assert!(!gate.ready(39, 20));
        assert!(gate.ready(100, 20));
    }

    #[test]
    fn test_counter_rollover() {
        let mut gate = UpdateGate::new();
        assert!(gate.ready(u32::MAX - 5, 20));
        assert!(!gate.ready(10, 20));
        assert!(gate.ready(14, 20));
    }
}
