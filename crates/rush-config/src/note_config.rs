use serde::{Deserialize, Serialize};

/// Note travel along the lane axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct NoteConfig {
    /// Travel speed (units per second)
    pub speed: f64,
    /// Position where notes appear
    pub spawn_position: f64,
    /// Position past which a note's tail leaves the screen
    pub despawn_position: f64,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            speed: 600.0,
            spawn_position: 1250.0,
            despawn_position: -50.0,
        }
    }
}

impl NoteConfig {
    /// Seconds a note head needs from spawn to `target`.
    pub fn travel_secs(&self, target: f64) -> f64 {
        if self.speed <= 0.0 {
            return 0.0;
        }
        (self.spawn_position - target).max(0.0) / self.speed
    }
}
