//! Game session.
//!
//! Owns every piece of mutable play state: the live notes, the spawn
//! scheduler, the hit resolver (combo, rush gauge, score) and the random
//! source. One `frame` call advances the whole core by one rendered frame.

use anyhow::Result;
use rand::Rng;
use rand::rngs::StdRng;
use rush_config::GameConfig;
use rush_model::Note;
use rush_pattern::SpawnScheduler;
use rush_rule::{RushState, ScoreData};
use tracing::{debug, info};

use crate::event::JudgeEvent;
use crate::hit_resolver::{HitResolver, HitResult};
use crate::input::{InputEvent, KeyAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but not started
    Idle,
    Running,
    /// Paused at the given time (ms)
    Paused { since: i64 },
}

/// Summary of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Notes added by the scheduler
    pub spawned: usize,
    /// Graded judgments (instant hits and hold completions)
    pub hits: usize,
    pub misses: usize,
    /// Notes dropped by compaction
    pub removed: usize,
}

/// Read-only snapshot for the render collaborator.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub notes: &'a [Note],
    pub score: u64,
    pub combo: u32,
    /// Combo counter opacity in [0, 1]
    pub combo_alpha: f32,
    pub rush_meter: f64,
    /// Rush meter fill in [0, 1]
    pub rush_ratio: f64,
    pub rush_state: RushState,
    pub difficulty: u32,
}

impl SessionView<'_> {
    pub fn in_rush_mode(&self) -> bool {
        self.rush_state == RushState::RushActive
    }
}

pub struct GameSession<R: Rng = StdRng> {
    config: GameConfig,
    notes: Vec<Note>,
    scheduler: SpawnScheduler,
    resolver: HitResolver,
    rng: R,
    state: SessionState,
    /// Time of the last processed frame (ms)
    now: i64,
}

impl<R: Rng> GameSession<R> {
    /// Build a session. Fails if `config` does not validate.
    pub fn new(config: GameConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let resolver = HitResolver::new(
            config.player_rule(),
            config.note.speed,
            config.note.despawn_position,
        );
        Ok(Self {
            scheduler: config.spawn_scheduler(),
            resolver,
            rng,
            notes: Vec::new(),
            state: SessionState::Idle,
            now: 0,
            config,
        })
    }

    /// Reset all state and start running at `now`.
    pub fn start(&mut self, now: i64) {
        self.notes.clear();
        self.scheduler.reset(now);
        self.resolver.reset();
        self.state = SessionState::Running;
        self.now = now;
        info!(
            lanes = self.config.lanes.lane_count(),
            speed = self.config.note.speed,
            "session started"
        );
    }

    pub fn pause(&mut self, now: i64) {
        if self.state == SessionState::Running {
            self.state = SessionState::Paused { since: now };
            info!(now, "session paused");
        }
    }

    /// Resume after a pause, shifting every stored timestamp by the paused
    /// span so that the pause is invisible to difficulty, spawning and
    /// hold timing.
    pub fn resume(&mut self, now: i64) {
        let SessionState::Paused { since } = self.state else {
            return;
        };
        let offset = (now - since).max(0);
        self.scheduler.shift_time(offset);
        self.resolver.shift_time(offset);
        for hold in self.notes.iter_mut().filter_map(Note::hold_state_mut) {
            if hold.held {
                hold.hold_start_time += offset;
            }
        }
        self.now += offset;
        self.state = SessionState::Running;
        info!(now, paused_ms = offset, "session resumed");
    }

    /// Run one frame at `now`, `dt` seconds after the previous one.
    ///
    /// Inputs are resolved first in arrival order, then the scheduler
    /// spawns, notes move, the judging pass runs, the rush meter decays and
    /// inactive notes are dropped. Ignored unless running.
    pub fn frame(&mut self, now: i64, dt: f64, inputs: &[InputEvent]) -> FrameReport {
        if self.state != SessionState::Running {
            return FrameReport::default();
        }
        let dt = dt.max(0.0);
        let first_event = self.resolver.events().len();

        // A press only counts as empty if its lane scored nothing this frame
        let mut hit_lanes = Vec::new();
        for input in inputs {
            let lane = input.lane;
            match input.action {
                KeyAction::Down if self.accepts_input(lane) => {
                    let result =
                        self.resolver
                            .try_key_down(&mut self.notes, lane, input.timestamp);
                    if result.is_some() {
                        hit_lanes.push(lane);
                    } else if !hit_lanes.contains(&lane) {
                        self.resolver.empty_press(lane);
                    }
                }
                KeyAction::Down => {}
                KeyAction::Up => {
                    self.key_up(lane, input.timestamp);
                }
            }
        }

        let level = self.scheduler.difficulty_level();
        let spawned = self.scheduler.tick(now, &self.notes, &mut self.rng);
        let spawned_count = spawned.len();
        self.notes.extend(spawned);
        if self.scheduler.difficulty_level() > level {
            let level = self.scheduler.difficulty_level();
            debug!(level, "difficulty up");
            self.resolver.push_event(JudgeEvent::DifficultyUp { level });
        }

        let distance = self.config.note.speed * dt;
        for note in &mut self.notes {
            note.advance(distance);
        }

        self.resolver.judge_pass(&mut self.notes, now);
        self.resolver.decay(dt);

        let before = self.notes.len();
        self.notes.retain(Note::is_active);
        self.now = now;

        let events = &self.resolver.events()[first_event..];
        FrameReport {
            spawned: spawned_count,
            hits: events.iter().filter(|e| e.is_hit()).count(),
            misses: events.iter().filter(|e| e.is_miss()).count(),
            removed: before - self.notes.len(),
        }
    }

    /// Resolve a key press. Ignored unless running or for unknown lanes.
    pub fn key_down(&mut self, lane: usize, now: i64) -> Option<HitResult> {
        if !self.accepts_input(lane) {
            return None;
        }
        self.resolver.key_down(&mut self.notes, lane, now)
    }

    /// Resolve a key release. Ignored unless running or for unknown lanes.
    pub fn key_up(&mut self, lane: usize, now: i64) -> Option<HitResult> {
        if !self.accepts_input(lane) {
            return None;
        }
        self.resolver.key_up(&mut self.notes, lane, now)
    }

    fn accepts_input(&self, lane: usize) -> bool {
        if lane >= self.config.lanes.lane_count() {
            debug!(lane, "input for unknown lane ignored");
            return false;
        }
        self.state == SessionState::Running
    }

    /// Take all queued feedback events.
    pub fn drain_events(&mut self) -> Vec<JudgeEvent> {
        self.resolver.drain_events()
    }

    pub fn view(&self) -> SessionView<'_> {
        let combo = self.resolver.combo();
        let rush = self.resolver.rush();
        SessionView {
            notes: &self.notes,
            score: self.resolver.score().total,
            combo: combo.count(),
            combo_alpha: combo.fade_alpha(self.now, self.config.combo_fade_ms),
            rush_meter: rush.value(),
            rush_ratio: rush.ratio(),
            rush_state: rush.state(),
            difficulty: self.scheduler.difficulty_level(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn score(&self) -> &ScoreData {
        self.resolver.score()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, SessionState::Paused { .. })
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn resolver(&self) -> &HitResolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rush_pattern::{PatternType, PatternWeights};

    /// One note every 5 s, the first at 5000 ms.
    const FIRST_SPAWN: i64 = 5000;

    fn config(pattern: PatternType) -> GameConfig {
        let mut config = GameConfig::default();
        config.spawn.patterns = PatternWeights::only(pattern);
        config.spawn.base_interval_ms = 5000;
        config.spawn.min_interval_ms = 5000;
        config.spawn.interval_step_ms = 0;
        config
    }

    fn session(config: GameConfig) -> GameSession {
        let mut s = GameSession::new(config, StdRng::seed_from_u64(1)).unwrap();
        s.start(0);
        s
    }

    /// Run a frame at `now` that moves notes by `distance` units.
    fn travel(s: &mut GameSession, now: i64, distance: f64) -> FrameReport {
        let dt = distance / s.config().note.speed;
        s.frame(now, dt, &[])
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.spawn.base_interval_ms = 0;
        assert!(GameSession::new(config, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn idle_session_ignores_frames_and_input() {
        let mut s = GameSession::new(GameConfig::default(), StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.frame(5000, 1.0, &[]), FrameReport::default());
        assert_eq!(s.key_down(0, 5000), None);
        assert_eq!(s.score().empty_press, 0);
    }

    #[test]
    fn first_spawn_after_one_interval() {
        let mut s = session(config(PatternType::Single));
        assert_eq!(s.frame(FIRST_SPAWN - 1, 0.0, &[]).spawned, 0);
        let report = travel(&mut s, FIRST_SPAWN, 30.0);
        assert_eq!(report.spawned, 1);
        // spawned at the edge, then moved by this frame's travel
        assert!((s.notes()[0].position() - 1220.0).abs() < 1e-6);
    }

    #[test]
    fn default_first_spawn_uses_difficulty_interval() {
        let mut s = session(GameConfig::default());
        // difficulty 1: 1000 - 50
        assert_eq!(s.frame(949, 0.0, &[]).spawned, 0);
        assert!(s.frame(950, 0.0, &[]).spawned >= 1);
    }

    #[test]
    fn unknown_lane_is_ignored() {
        let mut s = session(GameConfig::default());
        assert_eq!(s.key_down(7, 0), None);
        assert_eq!(s.score().empty_press, 0);
        s.key_down(1, 0);
        assert_eq!(s.score().empty_press, 1);
    }

    #[test]
    fn inputs_are_resolved_before_notes_move() {
        let mut s = session(config(PatternType::Single));
        s.frame(FIRST_SPAWN, 0.0, &[]);
        let lane = s.notes()[0].lane();
        travel(&mut s, 6000, 1045.0);
        assert!((s.notes()[0].position() - 205.0).abs() < 1e-6);

        let report = s.frame(6016, 0.5, &[InputEvent::down(lane, 6016)]);
        assert_eq!(report.hits, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(s.score().perfect, 1);
        assert_eq!(s.view().combo, 1);
    }

    #[test]
    fn second_press_after_hit_in_same_frame_keeps_combo() {
        let mut s = session(config(PatternType::Single));
        s.frame(FIRST_SPAWN, 0.0, &[]);
        let lane = s.notes()[0].lane();
        travel(&mut s, 6000, 1045.0);

        let inputs = [InputEvent::down(lane, 6010), InputEvent::down(lane, 6011)];
        let report = s.frame(6011, 0.0, &inputs);
        assert_eq!(report.hits, 1);
        assert_eq!(report.misses, 0);
        assert_eq!(s.view().combo, 1);
        assert_eq!(s.score().empty_press, 0);

        // a later frame's empty press still breaks it
        s.frame(6020, 0.0, &[InputEvent::down(lane, 6020)]);
        assert_eq!(s.view().combo, 0);
        assert_eq!(s.score().empty_press, 1);
    }

    #[test]
    fn empty_press_in_other_lane_still_misses() {
        let mut s = session(config(PatternType::Single));
        s.frame(FIRST_SPAWN, 0.0, &[]);
        let lane = s.notes()[0].lane();
        let other = (lane + 1) % 3;
        travel(&mut s, 6000, 1045.0);

        let inputs = [InputEvent::down(lane, 6010), InputEvent::down(other, 6011)];
        s.frame(6011, 0.0, &inputs);
        assert_eq!(s.score().perfect, 1);
        assert_eq!(s.score().empty_press, 1);
        assert_eq!(s.view().combo, 0);
    }

    #[test]
    fn unhit_note_expires_and_is_compacted() {
        let mut s = session(config(PatternType::Single));
        s.frame(FIRST_SPAWN, 0.0, &[]);
        let report = travel(&mut s, 7000, 1111.0);
        assert_eq!(report.misses, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(s.score().expired, 1);
        assert!(s.notes().is_empty());
    }

    #[test]
    fn start_resets_everything() {
        let mut s = session(config(PatternType::Single));
        s.frame(FIRST_SPAWN, 0.0, &[]);
        s.key_down(0, FIRST_SPAWN);
        s.start(10_000);
        assert!(s.notes().is_empty());
        assert_eq!(s.score(), &ScoreData::default());
        assert_eq!(s.view().combo, 0);
        assert_eq!(s.view().rush_meter, 0.0);
        assert_eq!(s.scheduler().next_spawn_due_at(), 15_000);
    }

    #[test]
    fn pause_stops_frames_and_shifts_time() {
        let mut s = session(config(PatternType::Hold));
        s.frame(FIRST_SPAWN, 0.0, &[]);
        let lane = s.notes()[0].lane();
        travel(&mut s, 6000, 1045.0);
        assert!(matches!(
            s.key_down(lane, 6000),
            Some(HitResult::HoldStart { .. })
        ));

        s.pause(6500);
        assert!(s.is_paused());
        assert_eq!(s.frame(7000, 1.0, &[]), FrameReport::default());
        assert_eq!(s.key_up(lane, 7000), None);
        s.resume(11_500);
        assert!(s.is_running());

        let hold = s.notes()[0].hold_state().unwrap();
        assert!(hold.held);
        assert_eq!(hold.hold_start_time, 11_000);
        assert_eq!(s.scheduler().next_spawn_due_at(), 15_000);
    }

    #[test]
    fn pause_does_not_advance_difficulty() {
        let mut config = config(PatternType::Single);
        config.spawn.difficulty_interval_ms = 10_000;
        let mut s = session(config);
        s.pause(5_000);
        s.resume(50_000);
        s.frame(50_100, 0.1, &[]);
        assert_eq!(s.view().difficulty, 1);
        s.frame(55_000, 0.1, &[]);
        assert_eq!(s.view().difficulty, 2);
    }

    #[test]
    fn difficulty_up_is_reported() {
        let mut config = config(PatternType::Single);
        config.spawn.difficulty_interval_ms = 1000;
        let mut s = session(config);
        s.frame(1000, 1.0, &[]);
        let events = s.drain_events();
        assert!(events.contains(&JudgeEvent::DifficultyUp { level: 2 }));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn view_reflects_state() {
        let mut s = session(config(PatternType::Single));
        let view = s.view();
        assert_eq!(view.score, 0);
        assert_eq!(view.combo_alpha, 0.0);
        assert!(!view.in_rush_mode());
        assert_eq!(view.difficulty, 1);

        s.frame(FIRST_SPAWN, 0.0, &[]);
        let lane = s.notes()[0].lane();
        travel(&mut s, 6000, 1045.0);
        s.frame(6016, 0.0, &[InputEvent::down(lane, 6016)]);
        let view = s.view();
        assert_eq!(view.score, 150);
        assert_eq!(view.combo, 1);
        assert_eq!(view.combo_alpha, 1.0);
        assert!(view.rush_meter > 0.0);
        assert!(view.notes.is_empty());
    }
}
