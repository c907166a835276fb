use crate::judge_property::JudgeProperty;
use crate::rush_gauge::{RushGauge, RushProperty};
use crate::score_data::ScoreProperty;

/// Rule set of a session: grading windows, rush gauge and point formula.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerRule {
    pub judge: JudgeProperty,
    pub rush: RushProperty,
    pub score: ScoreProperty,
}

impl PlayerRule {
    pub fn new(judge: JudgeProperty, rush: RushProperty, score: ScoreProperty) -> Self {
        Self { judge, rush, score }
    }

    /// Fresh gauge for this rule set.
    pub fn rush_gauge(&self) -> RushGauge {
        RushGauge::new(self.rush)
    }
}
