// Game session: hit resolution, frame driver, feedback events, autoplay

pub mod autoplay;
pub mod event;
pub mod hit_resolver;
pub mod input;
pub mod session;

pub use autoplay::Autoplay;
pub use event::{HOLD_START_LABEL, JudgeEvent, MissCause};
pub use hit_resolver::{HitResolver, HitResult};
pub use input::{InputEvent, KeyAction};
pub use session::{FrameReport, GameSession, SessionState, SessionView};
