//! Hit resolution engine.
//!
//! Matches lane key presses and releases against the live notes, grades
//! them, and applies chord and hold completion rules. It owns the combo
//! counter, the rush gauge and the score; the notes themselves belong to
//! the session and are only flagged here, never removed.

use rush_model::{ChordId, HoldState, Note, NoteId, NoteKind};
use rush_rule::{Combo, Grade, PlayerRule, RushGauge, RushTransition, ScoreData};
use tracing::debug;

use crate::event::{JudgeEvent, MissCause};

/// Outcome of a key press or release that matched a note.
#[derive(Debug, Clone, PartialEq)]
pub enum HitResult {
    /// An instant note was graded. `chord_complete` is set when this hit
    /// was the last outstanding member of its chord.
    Hit {
        note: NoteId,
        grade: Grade,
        points: u64,
        chord_complete: bool,
    },
    /// A hold note was pressed; it pays out on release.
    HoldStart { note: NoteId },
    HoldComplete {
        note: NoteId,
        grade: Grade,
        points: u64,
        progress: f64,
    },
}

/// Per-note work found by the judging pass.
enum PassAction {
    Expire,
    AutoComplete,
    HoldMissed,
}

#[derive(Debug, Clone)]
pub struct HitResolver {
    rule: PlayerRule,
    /// Note travel speed (units per second)
    speed: f64,
    despawn_position: f64,
    combo: Combo,
    rush: RushGauge,
    score: ScoreData,
    events: Vec<JudgeEvent>,
}

impl HitResolver {
    pub fn new(rule: PlayerRule, speed: f64, despawn_position: f64) -> Self {
        Self {
            rush: rule.rush_gauge(),
            rule,
            speed,
            despawn_position,
            combo: Combo::new(),
            score: ScoreData::default(),
            events: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.combo = Combo::new();
        self.rush.reset();
        self.score = ScoreData::default();
        self.events.clear();
    }

    /// Resolve a key press in `lane`.
    ///
    /// The first unhit instant note in reach wins; otherwise the first
    /// pressable hold note in reach starts holding. When nothing is in
    /// reach the press is a miss: the combo breaks and `None` is returned.
    pub fn key_down(&mut self, notes: &mut [Note], lane: usize, now: i64) -> Option<HitResult> {
        let result = self.try_key_down(notes, lane, now);
        if result.is_none() {
            self.empty_press(lane);
        }
        result
    }

    /// Like [`key_down`](Self::key_down), but a press that matches nothing
    /// leaves the combo alone.
    pub fn try_key_down(
        &mut self,
        notes: &mut [Note],
        lane: usize,
        now: i64,
    ) -> Option<HitResult> {
        let judge = self.rule.judge;

        let instant = notes.iter().position(|n| {
            n.is_active()
                && n.lane() == lane
                && n.is_instant()
                && !n.is_hit()
                && judge.in_window(n.position())
        });
        if let Some(idx) = instant {
            return Some(self.hit_instant(notes, idx, now));
        }

        let hold = notes.iter().position(|n| {
            n.is_active()
                && n.lane() == lane
                && n.hold_state().is_some_and(HoldState::is_pressable)
                && judge.in_window(n.position())
        });
        if let Some(idx) = hold {
            let note = &mut notes[idx];
            if let Some(hold) = note.hold_state_mut() {
                hold.held = true;
                hold.hold_start_time = now;
                hold.progress = 0.0;
            }
            let (id, position) = (note.id(), note.position());
            self.events.push(JudgeEvent::HoldStart {
                note: id,
                lane,
                position,
            });
            return Some(HitResult::HoldStart { note: id });
        }
        None
    }

    /// Record a press in `lane` that matched nothing.
    pub fn empty_press(&mut self, lane: usize) {
        self.miss(None, lane, MissCause::EmptyPress, None);
    }

    /// Resolve a key release in `lane`. Only a held hold note reacts.
    pub fn key_up(&mut self, notes: &mut [Note], lane: usize, now: i64) -> Option<HitResult> {
        let idx = notes.iter().position(|n| {
            n.is_active()
                && n.lane() == lane
                && n.hold_state().is_some_and(|h| h.held && !h.completed)
        })?;
        let progress = notes[idx]
            .hold_state()
            .map_or(1.0, |h| h.progress_at(now, self.speed));
        Some(self.complete_hold(notes, idx, progress, false, now))
    }

    /// Per-frame judging after notes have moved.
    ///
    /// Refreshes hold progress, auto-completes holds whose tail passed the
    /// hit window, marks unpressed hold heads as missed, expires unhit
    /// instant notes (forfeiting their chord) and deactivates notes whose
    /// tail left the screen.
    pub fn judge_pass(&mut self, notes: &mut [Note], now: i64) {
        let late = self.rule.judge.late_limit();
        for idx in 0..notes.len() {
            if !notes[idx].is_active() {
                continue;
            }
            let position = notes[idx].position();
            let tail = notes[idx].tail_position();
            let speed = self.speed;

            let action = match &mut notes[idx].kind {
                NoteKind::Instant { hit: false } if position < late => Some(PassAction::Expire),
                NoteKind::Hold(hold) if hold.held && !hold.completed => {
                    hold.progress = hold.progress_at(now, speed);
                    (tail < late).then_some(PassAction::AutoComplete)
                }
                NoteKind::Hold(hold) if hold.is_pressable() && position < late => {
                    hold.missed = true;
                    Some(PassAction::HoldMissed)
                }
                _ => None,
            };

            match action {
                Some(PassAction::Expire) => self.expire(notes, idx),
                Some(PassAction::AutoComplete) => {
                    self.complete_hold(notes, idx, 1.0, true, now);
                }
                Some(PassAction::HoldMissed) => {
                    let (id, lane) = (notes[idx].id(), notes[idx].lane());
                    self.miss(Some(id), lane, MissCause::HoldMissed, Some(position));
                }
                None => {}
            }

            let note = &mut notes[idx];
            if note.is_active() && note.tail_position() < self.despawn_position {
                note.deactivate();
            }
        }
    }

    /// Drain the rush meter for `dt` seconds.
    pub fn decay(&mut self, dt: f64) {
        if let Some(transition) = self.rush.decay(dt) {
            self.push_rush(transition);
        }
    }

    pub fn shift_time(&mut self, offset: i64) {
        self.combo.shift_time(offset);
    }

    fn hit_instant(&mut self, notes: &mut [Note], idx: usize, now: i64) -> HitResult {
        let judge = self.rule.judge;
        let (id, lane, chord, position) = {
            let n = &notes[idx];
            (n.id(), n.lane(), n.chord(), n.position())
        };
        let grade = judge.judge_position(position).unwrap_or(Grade::Ok);
        let points = self.rule.score.tap_points(
            judge.multiplier(grade),
            self.combo.count(),
            self.rush.multiplier(),
        );
        self.score.add(points);
        self.score.record_grade(grade);
        notes[idx].mark_hit();
        self.events.push(JudgeEvent::Hit {
            note: id,
            lane,
            grade,
            points,
            position,
        });
        self.gain_rush();

        let chord_complete = match chord {
            None => {
                notes[idx].deactivate();
                self.credit_combo(now);
                false
            }
            Some(chord) => self.try_complete_chord(notes, chord, now),
        };
        HitResult::Hit {
            note: id,
            grade,
            points,
            chord_complete,
        }
    }

    /// Credit the chord once all of its live members are hit.
    fn try_complete_chord(&mut self, notes: &mut [Note], chord: ChordId, now: i64) -> bool {
        let all_hit = notes
            .iter()
            .filter(|n| n.is_active() && n.chord() == Some(chord))
            .all(Note::is_hit);
        if !all_hit {
            return false;
        }

        let mut lanes = Vec::new();
        for n in notes
            .iter_mut()
            .filter(|n| n.is_active() && n.chord() == Some(chord))
        {
            lanes.push(n.lane());
            n.deactivate();
        }
        let combo = self.credit_combo(now);
        self.score.chords_completed += 1;
        debug!(%chord, combo, "chord complete");
        self.events.push(JudgeEvent::ChordComplete {
            chord,
            lanes,
            combo,
        });
        true
    }

    fn complete_hold(
        &mut self,
        notes: &mut [Note],
        idx: usize,
        progress: f64,
        auto: bool,
        now: i64,
    ) -> HitResult {
        let progress = progress.clamp(0.0, 1.0);
        let grade = if auto {
            Grade::Perfect
        } else {
            Grade::from_hold_progress(progress)
        };
        let points = self
            .rule
            .score
            .hold_points(progress, self.rush.multiplier());
        self.score.add(points);
        self.score.record_grade(grade);
        self.score.holds_completed += 1;

        let note = &mut notes[idx];
        if let Some(hold) = note.hold_state_mut() {
            hold.held = false;
            hold.completed = true;
            hold.progress = progress;
        }
        note.deactivate();
        let (id, lane) = (note.id(), note.lane());

        self.credit_combo(now);
        self.events.push(JudgeEvent::HoldComplete {
            note: id,
            lane,
            grade,
            points,
            progress,
            auto,
        });
        self.gain_rush();
        HitResult::HoldComplete {
            note: id,
            grade,
            points,
            progress,
        }
    }

    fn expire(&mut self, notes: &mut [Note], idx: usize) {
        let note = &mut notes[idx];
        note.deactivate();
        let (id, lane, chord, position) = (note.id(), note.lane(), note.chord(), note.position());
        self.miss(Some(id), lane, MissCause::Expired, Some(position));
        if let Some(chord) = chord {
            self.forfeit_chord(notes, chord);
        }
    }

    /// Deactivate every remaining member of `chord`, hit or not.
    fn forfeit_chord(&mut self, notes: &mut [Note], chord: ChordId) {
        let mut forfeited = Vec::new();
        for n in notes
            .iter_mut()
            .filter(|n| n.is_active() && n.chord() == Some(chord))
        {
            n.deactivate();
            if !n.is_hit() {
                self.score.expired += 1;
            }
            forfeited.push((n.id(), n.lane(), n.position()));
        }
        self.score.chords_forfeited += 1;
        debug!(%chord, siblings = forfeited.len(), "chord forfeited");
        for (id, lane, position) in forfeited {
            self.events.push(JudgeEvent::Miss {
                note: Some(id),
                lane,
                cause: MissCause::ChordForfeit,
                position: Some(position),
            });
        }
    }

    fn miss(&mut self, note: Option<NoteId>, lane: usize, cause: MissCause, position: Option<f64>) {
        match cause {
            MissCause::EmptyPress => self.score.empty_press += 1,
            MissCause::Expired => self.score.expired += 1,
            MissCause::HoldMissed => self.score.hold_missed += 1,
            MissCause::ChordForfeit => {}
        }
        if self.combo.reset() {
            debug!(lane, ?cause, "combo broken");
        }
        self.events.push(JudgeEvent::Miss {
            note,
            lane,
            cause,
            position,
        });
    }

    fn credit_combo(&mut self, now: i64) -> u32 {
        let combo = self.combo.increment(now);
        self.score.update_max_combo(combo);
        combo
    }

    fn gain_rush(&mut self) {
        if let Some(transition) = self.rush.gain() {
            self.push_rush(transition);
        }
    }

    fn push_rush(&mut self, transition: RushTransition) {
        self.events.push(match transition {
            RushTransition::Entered => JudgeEvent::RushStart,
            RushTransition::Exited => JudgeEvent::RushEnd,
        });
    }

    pub fn combo(&self) -> &Combo {
        &self.combo
    }

    pub fn rush(&self) -> &RushGauge {
        &self.rush
    }

    pub fn score(&self) -> &ScoreData {
        &self.score
    }

    pub fn rule(&self) -> &PlayerRule {
        &self.rule
    }

    pub fn events(&self) -> &[JudgeEvent] {
        &self.events
    }

    /// Queue an event raised outside hit resolution.
    pub fn push_event(&mut self, event: JudgeEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<JudgeEvent> {
        std::mem::take(&mut self.events)
    }
}
