// Session configuration (lanes, note travel, judge, spawn, rush, score)

pub mod game_config;
pub mod note_config;

pub use game_config::{DEFAULT_CONFIG_PATH, GameConfig};
pub use note_config::NoteConfig;
