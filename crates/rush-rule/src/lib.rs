// Hit grading windows, combo counter, rush gauge, score accumulation

mod combo;
mod judge_property;
mod player_rule;
mod rush_gauge;
mod score_data;

pub use combo::Combo;
pub use judge_property::{Grade, GradeMultipliers, JudgeProperty};
pub use player_rule::PlayerRule;
pub use rush_gauge::{RushGauge, RushProperty, RushState, RushTransition};
pub use score_data::{ScoreData, ScoreProperty};

/// Progress at or above which a released hold grades Good.
pub const HOLD_GOOD_PROGRESS: f64 = 0.8;
