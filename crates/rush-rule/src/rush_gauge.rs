//! Rush gauge: a secondary meter filled by successful hits.
//!
//! Two states. `Normal` fills on every hit and drains slowly; once the meter
//! saturates at `max` the gauge enters `RushActive`, during which point
//! awards are multiplied and the meter drains quickly. Reaching 0 returns
//! the gauge to `Normal`.
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RushProperty {
    /// Meter capacity; saturation enters rush mode
    pub max: f64,
    /// Gain per successful hit while Normal
    pub gain_normal: f64,
    /// Gain per successful hit while RushActive (0 makes rush a pure spend-down)
    pub gain_rush: f64,
    /// Drain per second while Normal
    pub decay_normal: f64,
    /// Drain per second while RushActive
    pub decay_rush: f64,
    /// Score multiplier applied while RushActive
    pub multiplier: f64,
}

impl Default for RushProperty {
    fn default() -> Self {
        Self {
            max: 300.0,
            gain_normal: 10.0,
            gain_rush: 0.0,
            decay_normal: 5.0,
            decay_rush: 25.0,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RushState {
    #[default]
    Normal,
    RushActive,
}

/// State change produced by a gain or decay step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RushTransition {
    Entered,
    Exited,
}

#[derive(Debug, Clone)]
pub struct RushGauge {
    value: f64,
    state: RushState,
    property: RushProperty,
}

impl RushGauge {
    pub fn new(property: RushProperty) -> Self {
        Self {
            value: 0.0,
            state: RushState::Normal,
            property,
        }
    }

    /// Credit one successful hit.
    ///
    /// Returns `Entered` when this gain saturates the meter from `Normal`.
    pub fn gain(&mut self) -> Option<RushTransition> {
        let gain = match self.state {
            RushState::Normal => self.property.gain_normal,
            RushState::RushActive => self.property.gain_rush,
        };
        self.value = (self.value + gain.max(0.0)).clamp(0.0, self.property.max);

        if self.state == RushState::Normal && self.value >= self.property.max {
            self.value = self.property.max;
            self.state = RushState::RushActive;
            debug!(meter = self.value, "rush mode entered");
            return Some(RushTransition::Entered);
        }
        None
    }

    /// Drain the meter for `dt` seconds. Negative `dt` is treated as 0.
    ///
    /// Returns `Exited` when the meter empties while `RushActive`.
    pub fn decay(&mut self, dt: f64) -> Option<RushTransition> {
        let dt = dt.max(0.0);
        let rate = match self.state {
            RushState::Normal => self.property.decay_normal,
            RushState::RushActive => self.property.decay_rush,
        };
        self.value = (self.value - rate.max(0.0) * dt).clamp(0.0, self.property.max);

        if self.state == RushState::RushActive && self.value <= 0.0 {
            self.value = 0.0;
            self.state = RushState::Normal;
            debug!("rush mode ended");
            return Some(RushTransition::Exited);
        }
        None
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Fill ratio in [0, 1].
    pub fn ratio(&self) -> f64 {
        if self.property.max <= 0.0 {
            return 0.0;
        }
        self.value / self.property.max
    }

    pub fn state(&self) -> RushState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RushState::RushActive
    }

    pub fn is_max(&self) -> bool {
        self.value >= self.property.max
    }

    /// Score multiplier in effect right now.
    pub fn multiplier(&self) -> f64 {
        match self.state {
            RushState::Normal => 1.0,
            RushState::RushActive => self.property.multiplier,
        }
    }

    pub fn property(&self) -> &RushProperty {
        &self.property
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.state = RushState::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RushProperty {
        RushProperty {
            max: 30.0,
            gain_normal: 10.0,
            gain_rush: 0.0,
            decay_normal: 5.0,
            decay_rush: 10.0,
            multiplier: 2.0,
        }
    }

    #[test]
    fn starts_empty_and_normal() {
        let gauge = RushGauge::new(RushProperty::default());
        assert_eq!(gauge.value(), 0.0);
        assert_eq!(gauge.state(), RushState::Normal);
        assert_eq!(gauge.multiplier(), 1.0);
    }

    #[test]
    fn enters_rush_exactly_on_saturation() {
        let mut gauge = RushGauge::new(small());
        assert_eq!(gauge.gain(), None);
        assert_eq!(gauge.gain(), None);
        assert!(!gauge.is_active());
        assert_eq!(gauge.gain(), Some(RushTransition::Entered));
        assert!(gauge.is_active());
        assert!(gauge.is_max());
        assert_eq!(gauge.multiplier(), 2.0);
    }

    #[test]
    fn gain_clamps_at_max() {
        let mut gauge = RushGauge::new(RushProperty {
            gain_normal: 25.0,
            ..small()
        });
        gauge.gain();
        assert_eq!(gauge.gain(), Some(RushTransition::Entered));
        assert_eq!(gauge.value(), 30.0);
    }

    #[test]
    fn rush_gain_zero_does_not_refill() {
        let mut gauge = RushGauge::new(small());
        for _ in 0..3 {
            gauge.gain();
        }
        gauge.decay(1.0);
        assert_eq!(gauge.value(), 20.0);
        assert_eq!(gauge.gain(), None);
        assert_eq!(gauge.value(), 20.0);
    }

    #[test]
    fn rush_decays_faster_than_normal() {
        let mut normal = RushGauge::new(small());
        normal.gain();
        normal.gain();
        normal.decay(1.0);
        assert_eq!(normal.value(), 15.0);

        let mut rush = RushGauge::new(small());
        for _ in 0..3 {
            rush.gain();
        }
        rush.decay(1.0);
        assert_eq!(rush.value(), 20.0);
    }

    #[test]
    fn exits_rush_when_drained() {
        let mut gauge = RushGauge::new(small());
        for _ in 0..3 {
            gauge.gain();
        }
        assert_eq!(gauge.decay(2.0), None);
        assert_eq!(gauge.value(), 10.0);
        assert_eq!(gauge.decay(1.5), Some(RushTransition::Exited));
        assert_eq!(gauge.value(), 0.0);
        assert_eq!(gauge.state(), RushState::Normal);
        assert_eq!(gauge.decay(1.0), None);
    }

    #[test]
    fn normal_decay_floors_at_zero_without_transition() {
        let mut gauge = RushGauge::new(small());
        gauge.gain();
        assert_eq!(gauge.decay(100.0), None);
        assert_eq!(gauge.value(), 0.0);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut gauge = RushGauge::new(small());
        gauge.gain();
        gauge.decay(-3.0);
        assert_eq!(gauge.value(), 10.0);
    }

    #[test]
    fn reset_returns_to_empty_normal() {
        let mut gauge = RushGauge::new(small());
        for _ in 0..3 {
            gauge.gain();
        }
        gauge.reset();
        assert_eq!(gauge.value(), 0.0);
        assert!(!gauge.is_active());
    }

    #[test]
    fn ratio_tracks_fill() {
        let mut gauge = RushGauge::new(small());
        gauge.gain();
        assert!((gauge.ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Gain,
            Decay(f64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![Just(Op::Gain), (-1.0f64..5.0).prop_map(Op::Decay)]
        }

        proptest! {
            #[test]
            fn meter_stays_in_bounds(ops in proptest::collection::vec(op(), 0..200)) {
                let mut gauge = RushGauge::new(RushProperty::default());
                let max = gauge.property().max;
                for op in ops {
                    match op {
                        Op::Gain => { gauge.gain(); }
                        Op::Decay(dt) => { gauge.decay(dt); }
                    }
                    prop_assert!(gauge.value() >= 0.0);
                    prop_assert!(gauge.value() <= max);
                }
            }

            #[test]
            fn transitions_match_state_changes(ops in proptest::collection::vec(op(), 0..200)) {
                let mut gauge = RushGauge::new(small());
                for op in ops {
                    let before = gauge.state();
                    let transition = match op {
                        Op::Gain => gauge.gain(),
                        Op::Decay(dt) => gauge.decay(dt),
                    };
                    let after = gauge.state();
                    match transition {
                        Some(RushTransition::Entered) => {
                            prop_assert_eq!(before, RushState::Normal);
                            prop_assert_eq!(after, RushState::RushActive);
                            prop_assert_eq!(gauge.value(), small().max);
                        }
                        Some(RushTransition::Exited) => {
                            prop_assert_eq!(before, RushState::RushActive);
                            prop_assert_eq!(after, RushState::Normal);
                            prop_assert_eq!(gauge.value(), 0.0);
                        }
                        None => prop_assert_eq!(before, after),
                    }
                }
            }
        }
    }
}
