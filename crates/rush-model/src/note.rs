use std::fmt;

use serde::{Deserialize, Serialize};

/// Session-unique note identifier, assigned in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub u64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier shared by all members of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChordId(pub u32);

impl fmt::Display for ChordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chord {}", self.0)
    }
}

/// Mutable judgment state of a hold note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldState {
    /// Distance from head to tail, in travel units
    pub length: f64,
    /// Key is currently down on this note
    pub held: bool,
    /// Released or auto-completed; no further judgment
    pub completed: bool,
    /// Head passed the hit window without being pressed
    pub missed: bool,
    /// Time the key went down (ms), meaningful only while `held`
    pub hold_start_time: i64,
    /// Fraction of the hold duration already held, in [0, 1]
    pub progress: f64,
}

impl HoldState {
    pub fn new(length: f64) -> Self {
        Self {
            length: length.max(0.0),
            held: false,
            completed: false,
            missed: false,
            hold_start_time: 0,
            progress: 0.0,
        }
    }

    /// Time (ms) the note needs to be held for full credit at the given speed.
    pub fn duration_ms(&self, speed: f64) -> f64 {
        if speed <= 0.0 {
            return 0.0;
        }
        self.length / speed * 1000.0
    }

    /// Held fraction at `now`, clamped to [0, 1].
    ///
    /// A zero-length hold counts as fully held the moment it is pressed.
    pub fn progress_at(&self, now: i64, speed: f64) -> f64 {
        let duration = self.duration_ms(speed);
        if duration <= 0.0 {
            return 1.0;
        }
        ((now - self.hold_start_time) as f64 / duration).clamp(0.0, 1.0)
    }

    /// Whether a key press may still start this hold.
    pub fn is_pressable(&self) -> bool {
        !self.held && !self.completed && !self.missed
    }
}

/// Note variant. The set is closed: hit resolution matches on it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoteKind {
    /// Single-timing note. `hit` becomes true once graded.
    Instant { hit: bool },
    /// Long note judged on press and release.
    Hold(HoldState),
}

/// A note travelling along a lane toward the hit zone.
///
/// `lane` and `chord` are fixed at creation. `active` only ever goes from
/// true to false; an inactive note is dropped at the next compaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    lane: usize,
    chord: Option<ChordId>,
    position: f64,
    active: bool,
    pub kind: NoteKind,
}

impl Note {
    pub fn instant(id: NoteId, lane: usize, chord: Option<ChordId>, position: f64) -> Self {
        Self {
            id,
            lane,
            chord,
            position,
            active: true,
            kind: NoteKind::Instant { hit: false },
        }
    }

    /// Hold notes never belong to a chord.
    pub fn hold(id: NoteId, lane: usize, position: f64, length: f64) -> Self {
        Self {
            id,
            lane,
            chord: None,
            position,
            active: true,
            kind: NoteKind::Hold(HoldState::new(length)),
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn chord(&self) -> Option<ChordId> {
        self.chord
    }

    /// Head position along the travel axis.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Trailing edge position. Equal to the head for instant notes.
    pub fn tail_position(&self) -> f64 {
        match &self.kind {
            NoteKind::Instant { .. } => self.position,
            NoteKind::Hold(hold) => self.position + hold.length,
        }
    }

    /// Move the note toward the hit zone by `distance` units.
    pub fn advance(&mut self, distance: f64) {
        self.position -= distance;
    }

    /// Absolute distance between the head and `target`.
    pub fn distance_to(&self, target: f64) -> f64 {
        (self.position - target).abs()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_instant(&self) -> bool {
        matches!(self.kind, NoteKind::Instant { .. })
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold(_))
    }

    /// True for an instant note that has been graded. Always false for holds.
    pub fn is_hit(&self) -> bool {
        matches!(self.kind, NoteKind::Instant { hit: true })
    }

    /// Mark an instant note as graded. No-op for holds.
    pub fn mark_hit(&mut self) {
        if let NoteKind::Instant { hit } = &mut self.kind {
            *hit = true;
        }
    }

    pub fn hold_state(&self) -> Option<&HoldState> {
        match &self.kind {
            NoteKind::Hold(hold) => Some(hold),
            NoteKind::Instant { .. } => None,
        }
    }

    pub fn hold_state_mut(&mut self) -> Option<&mut HoldState> {
        match &mut self.kind {
            NoteKind::Hold(hold) => Some(hold),
            NoteKind::Instant { .. } => None,
        }
    }
}
