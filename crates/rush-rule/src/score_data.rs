use serde::{Deserialize, Serialize};

use crate::judge_property::Grade;

/// Point formula constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoreProperty {
    /// Base points of an instant note before grade scaling
    pub tap_base: u64,
    /// Extra base points per current combo step (instant notes only)
    pub combo_bonus: u64,
    /// Flat base of a hold note, scaled by held fraction
    pub hold_base: u64,
}

impl Default for ScoreProperty {
    fn default() -> Self {
        Self {
            tap_base: 100,
            combo_bonus: 10,
            hold_base: 200,
        }
    }
}

impl ScoreProperty {
    /// Points for an instant note.
    ///
    /// `floor((tap_base + combo * combo_bonus) * grade_multiplier)`, then
    /// `floor(points * rush_multiplier)` (the rush multiplier is 1.0 outside
    /// rush mode).
    pub fn tap_points(&self, grade_multiplier: f64, combo: u32, rush_multiplier: f64) -> u64 {
        let base = self.tap_base + u64::from(combo) * self.combo_bonus;
        apply_rush(scaled(base, grade_multiplier), rush_multiplier)
    }

    /// Points for a hold note held for `progress` of its duration.
    ///
    /// Not combo-scaled. `progress` is clamped to [0, 1].
    pub fn hold_points(&self, progress: f64, rush_multiplier: f64) -> u64 {
        apply_rush(
            scaled(self.hold_base, progress.clamp(0.0, 1.0)),
            rush_multiplier,
        )
    }
}

fn scaled(base: u64, multiplier: f64) -> u64 {
    (base as f64 * multiplier.max(0.0)).floor() as u64
}

fn apply_rush(points: u64, rush_multiplier: f64) -> u64 {
    if rush_multiplier == 1.0 {
        points
    } else {
        scaled(points, rush_multiplier)
    }
}

/// Score and judgment statistics of one session.
///
/// `total` never decreases within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreData {
    /// Accumulated points
    pub total: u64,
    /// Perfect judgments (instant and hold)
    pub perfect: u32,
    /// Good judgments
    pub good: u32,
    /// OK judgments
    pub ok: u32,
    /// Instant notes that passed the hit window unhit
    pub expired: u32,
    /// Key presses that matched no note
    pub empty_press: u32,
    /// Hold heads that passed the hit window unpressed
    pub hold_missed: u32,
    /// Chords whose every member was hit
    pub chords_completed: u32,
    /// Chords lost to an expired member
    pub chords_forfeited: u32,
    /// Holds released or auto-completed
    pub holds_completed: u32,
    /// Highest combo reached
    pub max_combo: u32,
}

impl ScoreData {
    /// Add points to the total. Returns the points added.
    pub fn add(&mut self, points: u64) -> u64 {
        self.total = self.total.saturating_add(points);
        points
    }

    pub fn record_grade(&mut self, grade: Grade) {
        match grade {
            Grade::Perfect => self.perfect += 1,
            Grade::Good => self.good += 1,
            Grade::Ok => self.ok += 1,
        }
    }

    pub fn grade_count(&self, grade: Grade) -> u32 {
        match grade {
            Grade::Perfect => self.perfect,
            Grade::Good => self.good,
            Grade::Ok => self.ok,
        }
    }

    /// Number of graded judgments.
    pub fn judged(&self) -> u32 {
        self.perfect + self.good + self.ok
    }

    /// Number of miss events of any kind.
    pub fn misses(&self) -> u32 {
        self.expired + self.empty_press + self.hold_missed
    }

    pub fn update_max_combo(&mut self, combo: u32) {
        self.max_combo = self.max_combo.max(combo);
    }

    /// Share of judged notes that were graded at all, in [0, 1].
    ///
    /// Empty presses are not notes and do not count against accuracy.
    pub fn hit_rate(&self) -> f64 {
        let judged = self.judged();
        let total = judged + self.expired + self.hold_missed;
        if total == 0 {
            return 0.0;
        }
        f64::from(judged) / f64::from(total)
    }
}
