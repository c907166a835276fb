// Lane layout: maps input keys to lanes and back.
//
// The core only ever sees lane indices; this table is the single place
// where a physical key identity is resolved.

use serde::{Deserialize, Serialize};

/// Fixed key table, one key per lane in lane order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<char>", into = "Vec<char>")]
pub struct LaneLayout {
    keys: Vec<char>,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self::three_key()
    }
}

impl From<Vec<char>> for LaneLayout {
    fn from(keys: Vec<char>) -> Self {
        Self::new(keys)
    }
}

impl From<LaneLayout> for Vec<char> {
    fn from(layout: LaneLayout) -> Self {
        layout.keys
    }
}

impl LaneLayout {
    pub fn new(keys: Vec<char>) -> Self {
        Self {
            keys: keys.into_iter().map(|k| k.to_ascii_lowercase()).collect(),
        }
    }

    /// `a s d`
    pub fn three_key() -> Self {
        Self::new(vec!['a', 's', 'd'])
    }

    /// Home row, `a` through `l`.
    pub fn nine_key() -> Self {
        Self::new(vec!['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l'])
    }

    pub fn lane_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    /// Lane bound to `key`, case-insensitive. `None` for unbound keys.
    pub fn lane_of(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        self.keys.iter().position(|k| k.to_ascii_lowercase() == key)
    }

    pub fn key_of(&self, lane: usize) -> Option<char> {
        self.keys.get(lane).copied()
    }

    /// First key bound to more than one lane, if any.
    pub fn duplicate_key(&self) -> Option<char> {
        self.keys
            .iter()
            .enumerate()
            .find(|(i, k)| {
                self.keys[..*i]
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(k))
            })
            .map(|(_, &k)| k)
    }
}
