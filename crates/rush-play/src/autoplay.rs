// Autoplay: synthesizes lane input from the live notes.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rush_model::{Note, NoteId, NoteKind};
use rush_rule::JudgeProperty;

use crate::input::InputEvent;

/// Input generator that presses notes as they reach the hit zone.
///
/// `offset` shifts the aim point away from the hit zone (positive presses
/// early), and `miss_rate` drops that fraction of notes entirely.
#[derive(Debug, Clone)]
pub struct Autoplay {
    offset: f64,
    miss_rate: f64,
    rng: StdRng,
    /// Notes chosen to be dropped
    skipped: HashSet<NoteId>,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Autoplay {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            miss_rate: 0.0,
            rng: StdRng::seed_from_u64(0),
            skipped: HashSet::new(),
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Drop `rate` (clamped to [0, 1]) of the notes, drawn from `seed`.
    pub fn with_miss_rate(mut self, rate: f64, seed: u64) -> Self {
        self.miss_rate = rate.clamp(0.0, 1.0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn miss_rate(&self) -> f64 {
        self.miss_rate
    }

    /// Input for the frame at `now`, given the notes as they stand.
    ///
    /// Releases fully held holds and presses at most one due note per lane.
    pub fn plan(&mut self, notes: &[Note], judge: &JudgeProperty, now: i64) -> Vec<InputEvent> {
        self.skipped
            .retain(|id| notes.iter().any(|n| n.id() == *id && n.is_active()));

        let target = judge.hit_zone_position + self.offset;
        let mut pressed_lanes = Vec::new();
        let mut inputs = Vec::new();

        for note in notes.iter().filter(|n| n.is_active()) {
            let lane = note.lane();
            let due = match &note.kind {
                NoteKind::Instant { hit } => !hit,
                NoteKind::Hold(hold) => {
                    if hold.held && hold.progress >= 1.0 {
                        inputs.push(InputEvent::up(lane, now));
                    }
                    hold.is_pressable()
                }
            };
            if !due || pressed_lanes.contains(&lane) || self.skipped.contains(&note.id()) {
                continue;
            }
            let position = note.position();
            if position - target > judge.perfect_threshold || !judge.in_window(position) {
                continue;
            }
            if self.miss_rate > 0.0 && self.rng.gen_bool(self.miss_rate) {
                self.skipped.insert(note.id());
                continue;
            }
            pressed_lanes.push(lane);
            inputs.push(InputEvent::down(lane, now));
        }
        inputs
    }
}
