use rush_model::{ChordId, NoteId};
use rush_rule::Grade;
use serde::Serialize;

/// Popup text for a hold note that has just been pressed.
pub const HOLD_START_LABEL: &str = "Hold!";

/// Why a miss was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MissCause {
    /// Key press with no note in reach
    EmptyPress,
    /// Instant note passed the hit window unhit
    Expired,
    /// Sibling of an expired chord member
    ChordForfeit,
    /// Hold head passed the hit window unpressed
    HoldMissed,
}

/// Feedback for audio, particle and popup layers.
///
/// Queued by the session in the order things happened and drained by the
/// caller once per frame. Nothing in the core waits on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum JudgeEvent {
    /// An instant note was graded.
    Hit {
        note: NoteId,
        lane: usize,
        grade: Grade,
        points: u64,
        position: f64,
    },
    /// Every member of a chord is hit; combo was credited once.
    ChordComplete {
        chord: ChordId,
        lanes: Vec<usize>,
        combo: u32,
    },
    HoldStart {
        note: NoteId,
        lane: usize,
        position: f64,
    },
    /// A hold was released or, with `auto`, completed by passing the hit zone.
    HoldComplete {
        note: NoteId,
        lane: usize,
        grade: Grade,
        points: u64,
        progress: f64,
        auto: bool,
    },
    Miss {
        note: Option<NoteId>,
        lane: usize,
        cause: MissCause,
        position: Option<f64>,
    },
    RushStart,
    RushEnd,
    DifficultyUp {
        level: u32,
    },
}

impl JudgeEvent {
    pub fn lane(&self) -> Option<usize> {
        match self {
            Self::Hit { lane, .. }
            | Self::HoldStart { lane, .. }
            | Self::HoldComplete { lane, .. }
            | Self::Miss { lane, .. } => Some(*lane),
            Self::ChordComplete { .. }
            | Self::RushStart
            | Self::RushEnd
            | Self::DifficultyUp { .. } => None,
        }
    }

    pub fn grade(&self) -> Option<Grade> {
        match self {
            Self::Hit { grade, .. } | Self::HoldComplete { grade, .. } => Some(*grade),
            _ => None,
        }
    }

    /// Points awarded by this event (0 for non-scoring events).
    pub fn points(&self) -> u64 {
        match self {
            Self::Hit { points, .. } | Self::HoldComplete { points, .. } => *points,
            _ => 0,
        }
    }

    /// Popup text, if the event shows one.
    pub fn popup_label(&self) -> Option<&'static str> {
        match self {
            Self::Hit { grade, .. } | Self::HoldComplete { grade, .. } => Some(grade.label()),
            Self::HoldStart { .. } => Some(HOLD_START_LABEL),
            _ => None,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss { .. })
    }

    /// Graded judgments: instant hits and hold completions.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. } | Self::HoldComplete { .. })
    }
}
