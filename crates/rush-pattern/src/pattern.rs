// Spawn patterns and the weighted table they are drawn from.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest number of lanes a burst may occupy.
pub const BURST_MAX_LANES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    /// One instant note
    Single,
    /// Two-note chord
    Double,
    /// Three-note chord
    Triple,
    /// One hold note
    Hold,
    /// Up to three independent instant notes at once
    Burst,
}

impl PatternType {
    pub const ALL: [PatternType; 5] = [
        PatternType::Single,
        PatternType::Double,
        PatternType::Triple,
        PatternType::Hold,
        PatternType::Burst,
    ];

    /// Minimum number of free lanes needed to spawn this pattern.
    pub fn required_lanes(self) -> usize {
        match self {
            Self::Single | Self::Hold | Self::Burst => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }

    /// Number of lanes actually used given `available` free lanes.
    ///
    /// `None` when the pattern cannot be placed.
    pub fn lane_count(self, available: usize) -> Option<usize> {
        if available < self.required_lanes() {
            return None;
        }
        match self {
            Self::Burst => Some(available.min(BURST_MAX_LANES)),
            _ => Some(self.required_lanes()),
        }
    }

    /// Whether spawned notes share a chord id.
    pub fn is_chord(self) -> bool {
        matches!(self, Self::Double | Self::Triple)
    }
}

/// Relative pattern weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PatternWeights {
    pub single: u32,
    pub double: u32,
    pub triple: u32,
    pub hold: u32,
    pub burst: u32,
}

impl Default for PatternWeights {
    fn default() -> Self {
        Self {
            single: 40,
            double: 30,
            triple: 15,
            hold: 5,
            burst: 10,
        }
    }
}

impl PatternWeights {
    pub fn of(&self, pattern: PatternType) -> u32 {
        match pattern {
            PatternType::Single => self.single,
            PatternType::Double => self.double,
            PatternType::Triple => self.triple,
            PatternType::Hold => self.hold,
            PatternType::Burst => self.burst,
        }
    }

    /// Weights with only `pattern` selectable.
    pub fn only(pattern: PatternType) -> Self {
        let mut weights = Self {
            single: 0,
            double: 0,
            triple: 0,
            hold: 0,
            burst: 0,
        };
        match pattern {
            PatternType::Single => weights.single = 1,
            PatternType::Double => weights.double = 1,
            PatternType::Triple => weights.triple = 1,
            PatternType::Hold => weights.hold = 1,
            PatternType::Burst => weights.burst = 1,
        }
        weights
    }

    /// Sum of all weights, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        PatternType::ALL
            .iter()
            .map(|&p| self.of(p))
            .fold(0u32, u32::saturating_add)
    }
}

/// Discrete distribution over patterns.
///
/// Sampling takes the random source as an argument so callers control
/// determinism.
#[derive(Debug, Clone)]
pub struct PatternTable {
    /// (pattern, cumulative upper bound), zero-weight entries dropped
    entries: Vec<(PatternType, u32)>,
    total: u32,
}

impl PatternTable {
    pub fn new(weights: &PatternWeights) -> Self {
        let mut entries = Vec::with_capacity(PatternType::ALL.len());
        let mut total = 0u32;
        for pattern in PatternType::ALL {
            let w = weights.of(pattern);
            if w == 0 {
                continue;
            }
            total = total.saturating_add(w);
            entries.push((pattern, total));
        }
        Self { entries, total }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Pattern selected by `roll`, where `roll` is uniform in `[0, total)`.
    ///
    /// Out-of-range rolls select the last pattern; an empty table yields `Single`.
    pub fn pick(&self, roll: u32) -> PatternType {
        self.entries
            .iter()
            .find(|(_, upper)| roll < *upper)
            .or(self.entries.last())
            .map(|(p, _)| *p)
            .unwrap_or(PatternType::Single)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PatternType {
        if self.total == 0 {
            return PatternType::Single;
        }
        self.pick(rng.gen_range(0..self.total))
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::new(&PatternWeights::default())
    }
}


#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    fn weights() -> impl Strategy<Value = PatternWeights> {
        (0u32..50, 0u32..50, 0u32..50, 0u32..50, 0u32..50).prop_map(
            |(single, double, triple, hold, burst)| PatternWeights {
                single,
                double,
                triple,
                hold,
                burst,
            },
        )
    }

    proptest! {
        #[test]
        fn picked_pattern_has_weight(w in weights(), roll in 0u32..250) {
            let table = PatternTable::new(&w);
            prop_assert_eq!(table.total(), w.total());
            if w.total() > 0 {
                prop_assert!(w.of(table.pick(roll % w.total())) > 0);
            }
        }

        #[test]
        fn burst_never_exceeds_available(available in 0usize..12) {
            if let Some(n) = PatternType::Burst.lane_count(available) {
                prop_assert!(n >= 1 && n <= available && n <= BURST_MAX_LANES);
            }
        }
    }
}
