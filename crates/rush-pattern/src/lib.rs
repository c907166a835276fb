// Note spawning: weighted pattern table, difficulty ramp, lane selection

pub mod difficulty;
pub mod pattern;
pub mod spawn_scheduler;

pub use difficulty::Difficulty;
pub use pattern::{PatternTable, PatternType, PatternWeights};
pub use spawn_scheduler::{SpawnProperty, SpawnScheduler};
