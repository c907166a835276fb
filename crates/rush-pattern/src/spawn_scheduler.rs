//! Spawn scheduler.
//!
//! Once per frame the scheduler decides whether a spawn is due, draws a
//! pattern from the weighted table, and places it on lanes that are both
//! spaced far enough from their previous note and not occupied by a live
//! hold note. A pattern that cannot be placed in full is skipped; the next
//! tick retries with a fresh draw.

use rand::Rng;
use rand::seq::SliceRandom;
use rush_model::{ChordId, Note, NoteId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::difficulty::Difficulty;
use crate::pattern::{PatternTable, PatternType, PatternWeights};

/// Spawn timing and pattern configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SpawnProperty {
    /// Spawn interval at difficulty 0 (ms)
    pub base_interval_ms: i64,
    /// Interval reduction per difficulty level (ms)
    pub interval_step_ms: i64,
    /// Interval floor (ms)
    pub min_interval_ms: i64,
    /// Real time between difficulty levels (ms)
    pub difficulty_interval_ms: i64,
    pub initial_difficulty: u32,
    pub max_difficulty: u32,
    /// Minimum distance between consecutive notes in one lane (travel units)
    pub min_note_spacing: f64,
    /// Hold length range as multiples of note speed (i.e. seconds of travel)
    pub hold_length_min: f64,
    pub hold_length_max: f64,
    pub patterns: PatternWeights,
}

impl Default for SpawnProperty {
    fn default() -> Self {
        Self {
            base_interval_ms: 1000,
            interval_step_ms: 50,
            min_interval_ms: 500,
            difficulty_interval_ms: 30_000,
            initial_difficulty: 1,
            max_difficulty: 10,
            min_note_spacing: 100.0,
            hold_length_min: 1.0,
            hold_length_max: 2.0,
            patterns: PatternWeights::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    property: SpawnProperty,
    table: PatternTable,
    lane_count: usize,
    note_speed: f64,
    spawn_position: f64,
    /// Minimum time between two spawns in one lane (ms)
    min_lane_gap_ms: f64,
    last_spawn_per_lane: Vec<Option<i64>>,
    difficulty: Difficulty,
    /// Time (ms) of the last successful spawn tick
    last_spawn_tick: i64,
    next_note_id: u64,
    next_chord_id: u32,
}

impl SpawnScheduler {
    pub fn new(
        property: SpawnProperty,
        lane_count: usize,
        note_speed: f64,
        spawn_position: f64,
    ) -> Self {
        let min_lane_gap_ms = if note_speed > 0.0 {
            property.min_note_spacing / note_speed * 1000.0
        } else {
            0.0
        };
        Self {
            table: PatternTable::new(&property.patterns),
            lane_count,
            note_speed,
            spawn_position,
            min_lane_gap_ms,
            last_spawn_per_lane: vec![None; lane_count],
            difficulty: Difficulty::new(
                property.initial_difficulty,
                property.max_difficulty,
                property.difficulty_interval_ms,
            ),
            last_spawn_tick: 0,
            next_note_id: 0,
            next_chord_id: 0,
            property,
        }
    }

    /// Clear all spawn history and start timing from `now`.
    pub fn reset(&mut self, now: i64) {
        self.last_spawn_per_lane.fill(None);
        self.difficulty.reset(now);
        self.last_spawn_tick = now;
        self.next_note_id = 0;
        self.next_chord_id = 0;
    }

    /// Shift every stored timestamp by `offset` ms (used across a pause).
    pub fn shift_time(&mut self, offset: i64) {
        self.difficulty.shift_time(offset);
        self.last_spawn_tick += offset;
        for t in self.last_spawn_per_lane.iter_mut().flatten() {
            *t += offset;
        }
    }

    /// Per-frame entry: returns the notes spawned at `now` (possibly none).
    pub fn tick<R: Rng + ?Sized>(&mut self, now: i64, active: &[Note], rng: &mut R) -> Vec<Note> {
        self.difficulty.update(now);
        if now < self.next_spawn_due_at() {
            return Vec::new();
        }
        let pattern = self.table.sample(rng);
        self.spawn(now, pattern, active, rng)
    }

    /// Place `pattern` at `now` if enough lanes are free; otherwise spawn nothing.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        now: i64,
        pattern: PatternType,
        active: &[Note],
        rng: &mut R,
    ) -> Vec<Note> {
        let available = self.available_lanes(now, active);
        let Some(count) = pattern.lane_count(available.len()) else {
            trace!(?pattern, available = available.len(), now, "spawn skipped");
            return Vec::new();
        };

        let mut lanes: Vec<usize> = available.choose_multiple(rng, count).copied().collect();
        lanes.sort_unstable();

        let chord = if pattern.is_chord() && lanes.len() > 1 {
            Some(self.next_chord())
        } else {
            None
        };

        let mut notes = Vec::with_capacity(lanes.len());
        for &lane in &lanes {
            let id = self.next_note();
            let note = match pattern {
                PatternType::Hold => {
                    let factor = self.hold_length_factor(rng);
                    Note::hold(id, lane, self.spawn_position, self.note_speed * factor)
                }
                _ => Note::instant(id, lane, chord, self.spawn_position),
            };
            self.last_spawn_per_lane[lane] = Some(now);
            notes.push(note);
        }
        self.last_spawn_tick = now;
        trace!(?pattern, ?lanes, now, "spawned");
        notes
    }

    /// Lanes spaced far enough from their last spawn and free of live holds.
    pub fn available_lanes(&self, now: i64, active: &[Note]) -> Vec<usize> {
        (0..self.lane_count)
            .filter(|&lane| match self.last_spawn_per_lane[lane] {
                Some(last) => (now - last) as f64 >= self.min_lane_gap_ms,
                None => true,
            })
            .filter(|&lane| {
                !active
                    .iter()
                    .any(|n| n.is_hold() && n.is_active() && n.lane() == lane)
            })
            .collect()
    }

    fn hold_length_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let lo = self.property.hold_length_min;
        let hi = self.property.hold_length_max;
        if hi <= lo {
            return lo;
        }
        rng.gen_range(lo..=hi)
    }

    fn next_note(&mut self) -> NoteId {
        let id = NoteId(self.next_note_id);
        self.next_note_id += 1;
        id
    }

    fn next_chord(&mut self) -> ChordId {
        let id = ChordId(self.next_chord_id);
        self.next_chord_id = self.next_chord_id.wrapping_add(1);
        id
    }

    pub fn spawn_interval(&self) -> i64 {
        self.difficulty.spawn_interval(
            self.property.base_interval_ms,
            self.property.interval_step_ms,
            self.property.min_interval_ms,
        )
    }

    pub fn next_spawn_due_at(&self) -> i64 {
        self.last_spawn_tick + self.spawn_interval()
    }

    pub fn difficulty_level(&self) -> u32 {
        self.difficulty.level()
    }

    pub fn min_lane_gap_ms(&self) -> f64 {
        self.min_lane_gap_ms
    }

    pub fn last_spawn_time(&self, lane: usize) -> Option<i64> {
        self.last_spawn_per_lane.get(lane).copied().flatten()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }
}
