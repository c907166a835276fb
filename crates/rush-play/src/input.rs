// Lane input events, already resolved from physical keys.

use rush_model::LaneLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub action: KeyAction,
    pub lane: usize,
    /// Time of the key change (ms)
    pub timestamp: i64,
}

impl InputEvent {
    pub fn down(lane: usize, timestamp: i64) -> Self {
        Self {
            action: KeyAction::Down,
            lane,
            timestamp,
        }
    }

    pub fn up(lane: usize, timestamp: i64) -> Self {
        Self {
            action: KeyAction::Up,
            lane,
            timestamp,
        }
    }

    /// Resolve a key character through `layout`. Unbound keys yield `None`.
    pub fn from_key(
        layout: &LaneLayout,
        key: char,
        action: KeyAction,
        timestamp: i64,
    ) -> Option<Self> {
        layout.lane_of(key).map(|lane| Self {
            action,
            lane,
            timestamp,
        })
    }
}
