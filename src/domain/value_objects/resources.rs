//! Bounded gameplay counters (hope, stress, hit points)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hard ceiling for the adjustable hope maximum
pub const HOPE_CEILING: u8 = 6;
/// Lowest value the hope maximum may be lowered to
pub const HOPE_FLOOR: u8 = 1;
pub const DEFAULT_HOPE_MAX: u8 = 6;
pub const DEFAULT_STRESS_MAX: u8 = 6;

/// An integer counter that always stays within `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CounterRepr")]
pub struct ResourceCounter {
    current: u8,
    max: u8,
}

#[derive(Deserialize)]
struct CounterRepr {
    current: u8,
    max: u8,
}

impl From<CounterRepr> for ResourceCounter {
    fn from(repr: CounterRepr) -> Self {
        Self::new(repr.current, repr.max)
    }
}

impl ResourceCounter {
    /// Create a counter, clamping `current` into range
    pub fn new(current: u8, max: u8) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn empty(max: u8) -> Self {
        Self::new(0, max)
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn increment(&mut self) -> u8 {
        self.current = self.current.saturating_add(1).min(self.max);
        self.current
    }

    pub fn decrement(&mut self) -> u8 {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Respond to a slot checkbox changing state.
    ///
    /// Checking any slot fills the next empty one; unchecking clears the last
    /// filled one. The slot index only identifies which checkbox fired.
    pub fn toggle_slot(&mut self, _index: u8, checked: bool) -> u8 {
        if checked {
            self.increment()
        } else {
            self.decrement()
        }
    }

    pub fn set_current(&mut self, value: u8) -> u8 {
        self.current = value.min(self.max);
        self.current
    }

    /// Change the maximum, lowering the current value if it no longer fits
    pub fn set_max(&mut self, max: u8) {
        self.max = max;
        self.current = self.current.min(max);
    }
}

/// The counters a character sheet tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Hope,
    Stress,
    HitPoints,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Hope => write!(f, "hope"),
            ResourceKind::Stress => write!(f, "stress"),
            ResourceKind::HitPoints => write!(f, "hit_points"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hope" => Ok(ResourceKind::Hope),
            "stress" => Ok(ResourceKind::Stress),
            "hp" | "hit_points" | "hit-points" => Ok(ResourceKind::HitPoints),
            other => Err(format!("Unknown resource: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_fills_and_clears_next_slot() {
        let mut stress = ResourceCounter::new(4, DEFAULT_STRESS_MAX);
        assert_eq!(stress.toggle_slot(4, true), 5);
        assert_eq!(stress.toggle_slot(4, false), 4);
    }

    #[test]
    fn test_any_operation_sequence_stays_in_range() {
        // Deterministic pseudo-random walk over increments and decrements
        let mut counter = ResourceCounter::empty(DEFAULT_STRESS_MAX);
        let mut seed: u32 = 17;
        for step in 0..500u32 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let checked = (seed >> 16) % 3 != 0;
            counter.toggle_slot((step % 8) as u8, checked);
            assert!(counter.current() <= counter.max());
        }

        for _ in 0..20 {
            counter.decrement();
        }
        assert_eq!(counter.current(), 0);
        for _ in 0..20 {
            counter.increment();
        }
        assert_eq!(counter.current(), DEFAULT_STRESS_MAX);
    }

    #[test]
    fn test_set_max_lowers_current() {
        let mut hope = ResourceCounter::new(5, HOPE_CEILING);
        hope.set_max(3);
        assert_eq!(hope.current(), 3);
        assert_eq!(hope.max(), 3);
    }

    #[test]
    fn test_deserialization_clamps_out_of_range_values() {
        let counter: ResourceCounter = serde_json::from_str(r#"{"current": 9, "max": 6}"#).unwrap();
        assert_eq!(counter.current(), 6);
    }

    #[test]
    fn test_resource_kind_parsing() {
        assert_eq!("Hope".parse::<ResourceKind>(), Ok(ResourceKind::Hope));
        assert_eq!("hit-points".parse::<ResourceKind>(), Ok(ResourceKind::HitPoints));
        assert!("fear".parse::<ResourceKind>().is_err());
    }
}
