use serde::{Deserialize, Serialize};

use crate::HOLD_GOOD_PROGRESS;

/// Accuracy grade of a judged note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Perfect,
    Good,
    Ok,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::Perfect, Grade::Good, Grade::Ok];

    /// Popup text shown by the feedback layer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect!",
            Self::Good => "Good!",
            Self::Ok => "OK",
        }
    }

    /// Popup color (RGB).
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Perfect => [0, 255, 0],
            Self::Good => [255, 215, 0],
            Self::Ok => [255, 255, 255],
        }
    }

    /// Grade of a released hold note from its held fraction.
    ///
    /// Perfect only for a full hold; Good from 0.8; OK otherwise.
    pub fn from_hold_progress(progress: f64) -> Self {
        if progress >= 1.0 {
            Self::Perfect
        } else if progress >= HOLD_GOOD_PROGRESS {
            Self::Good
        } else {
            Self::Ok
        }
    }
}

/// Score multiplier per grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct GradeMultipliers {
    pub perfect: f64,
    pub good: f64,
    pub ok: f64,
}

impl Default for GradeMultipliers {
    fn default() -> Self {
        Self {
            perfect: 1.5,
            good: 1.0,
            ok: 0.5,
        }
    }
}

impl GradeMultipliers {
    pub fn of(&self, grade: Grade) -> f64 {
        match grade {
            Grade::Perfect => self.perfect,
            Grade::Good => self.good,
            Grade::Ok => self.ok,
        }
    }
}

/// Hit window and grading thresholds, in travel units from the hit zone.
///
/// Expected ordering: `0 <= perfect_threshold <= good_threshold < hit_window`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct JudgeProperty {
    /// Position of the hit zone along the travel axis
    pub hit_zone_position: f64,
    /// Maximum (exclusive) distance at which a note can be judged
    pub hit_window: f64,
    /// Maximum (inclusive) distance for Perfect
    pub perfect_threshold: f64,
    /// Maximum (inclusive) distance for Good
    pub good_threshold: f64,
    pub multipliers: GradeMultipliers,
}

impl Default for JudgeProperty {
    fn default() -> Self {
        Self {
            hit_zone_position: 200.0,
            hit_window: 60.0,
            perfect_threshold: 10.0,
            good_threshold: 25.0,
            multipliers: GradeMultipliers::default(),
        }
    }
}

impl JudgeProperty {
    /// Grade a timing error (distance from the hit zone).
    ///
    /// Returns `None` when the error is at or beyond the hit window.
    pub fn judge(&self, error: f64) -> Option<Grade> {
        let error = error.abs();
        if error >= self.hit_window {
            None
        } else if error <= self.perfect_threshold {
            Some(Grade::Perfect)
        } else if error <= self.good_threshold {
            Some(Grade::Good)
        } else {
            Some(Grade::Ok)
        }
    }

    /// Grade a note head at `position`.
    pub fn judge_position(&self, position: f64) -> Option<Grade> {
        self.judge(position - self.hit_zone_position)
    }

    /// Whether `position` lies inside the hit window.
    pub fn in_window(&self, position: f64) -> bool {
        (position - self.hit_zone_position).abs() < self.hit_window
    }

    /// Position below which an unjudged note is considered passed.
    pub fn late_limit(&self) -> f64 {
        self.hit_zone_position - self.hit_window
    }

    pub fn multiplier(&self, grade: Grade) -> f64 {
        self.multipliers.of(grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop() -> JudgeProperty {
        JudgeProperty::default()
    }

    #[test]
    fn grade_boundaries_are_inclusive() {
        let p = prop();
        assert_eq!(p.judge(0.0), Some(Grade::Perfect));
        assert_eq!(p.judge(10.0), Some(Grade::Perfect));
        assert_eq!(p.judge(10.001), Some(Grade::Good));
        assert_eq!(p.judge(25.0), Some(Grade::Good));
        assert_eq!(p.judge(25.001), Some(Grade::Ok));
        assert_eq!(p.judge(59.999), Some(Grade::Ok));
    }

    #[test]
    fn hit_window_edge_is_exclusive() {
        let p = prop();
        assert_eq!(p.judge(60.0), None);
        assert_eq!(p.judge(75.0), None);
        assert!(!p.in_window(260.0));
        assert!(p.in_window(259.9));
    }

    #[test]
    fn early_and_late_errors_grade_the_same() {
        let p = prop();
        assert_eq!(p.judge_position(215.0), p.judge_position(185.0));
        assert_eq!(p.judge_position(215.0), Some(Grade::Good));
    }

    #[test]
    fn late_limit_is_hit_zone_minus_window() {
        assert_eq!(prop().late_limit(), 140.0);
    }

    #[test]
    fn default_multipliers() {
        let p = prop();
        assert_eq!(p.multiplier(Grade::Perfect), 1.5);
        assert_eq!(p.multiplier(Grade::Good), 1.0);
        assert_eq!(p.multiplier(Grade::Ok), 0.5);
    }

    #[test]
    fn hold_progress_grades() {
        assert_eq!(Grade::from_hold_progress(1.0), Grade::Perfect);
        assert_eq!(Grade::from_hold_progress(0.99), Grade::Good);
        assert_eq!(Grade::from_hold_progress(0.8), Grade::Good);
        assert_eq!(Grade::from_hold_progress(0.79), Grade::Ok);
        assert_eq!(Grade::from_hold_progress(0.0), Grade::Ok);
    }

    #[test]
    fn labels_and_colors_are_distinct() {
        let labels: Vec<_> = Grade::ALL.iter().map(|g| g.label()).collect();
        assert_eq!(labels, ["Perfect!", "Good!", "OK"]);
        assert_ne!(Grade::Perfect.color(), Grade::Good.color());
        assert_ne!(Grade::Good.color(), Grade::Ok.color());
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let p: JudgeProperty = serde_json::from_str(r#"{"hitWindow": 80.0}"#).unwrap();
        assert_eq!(p.hit_window, 80.0);
        assert_eq!(p.perfect_threshold, 10.0);
        assert_eq!(p.multipliers, GradeMultipliers::default());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn grading_partitions_the_window(error in -200.0f64..200.0) {
                let p = JudgeProperty::default();
                let e = error.abs();
                match p.judge(error) {
                    Some(Grade::Perfect) => prop_assert!(e <= p.perfect_threshold),
                    Some(Grade::Good) => {
                        prop_assert!(e > p.perfect_threshold && e <= p.good_threshold)
                    }
                    Some(Grade::Ok) => {
                        prop_assert!(e > p.good_threshold && e < p.hit_window)
                    }
                    None => prop_assert!(e >= p.hit_window),
                }
            }
        }
    }
}
