// Note entity model: instant/hold notes, note and chord ids, lane-key layout

pub mod lane_layout;
mod note;

pub use lane_layout::LaneLayout;
pub use note::{ChordId, HoldState, Note, NoteId, NoteKind};
