// Simulated-clock session loop.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use rand::Rng;
use rush_config::GameConfig;
use rush_play::{Autoplay, GameSession, InputEvent, JudgeEvent};
use rush_rule::ScoreData;
use serde::Serialize;
use tracing::debug;

/// Where the frame inputs come from.
pub enum InputSource {
    Autoplay(Autoplay),
    /// Recorded events, replayed by timestamp
    Script(Vec<InputEvent>),
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub duration_ms: i64,
    pub fps: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub score: ScoreData,
    pub hit_rate: f64,
    pub difficulty: u32,
    pub rush_entries: u32,
    pub frames: u64,
}

/// Session length in milliseconds for `secs` seconds.
pub fn duration_ms(secs: u64) -> Result<i64> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| s.checked_mul(1000))
        .with_context(|| format!("duration of {secs} s is out of range"))
}

/// Read a JSON array of input events, ordered by timestamp.
pub fn read_inputs(path: &Path) -> Result<Vec<InputEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input script {}", path.display()))?;
    let mut events: Vec<InputEvent> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse input script {}", path.display()))?;
    events.sort_by_key(|e| e.timestamp);
    Ok(events)
}

/// Play a session from time 0 to `options.duration_ms`.
pub fn run<R: Rng>(
    config: GameConfig,
    rng: R,
    mut source: InputSource,
    options: &RunOptions,
) -> Result<RunSummary> {
    ensure!(options.fps > 0, "fps must be positive");
    ensure!(options.duration_ms >= 0, "duration must not be negative");

    let mut session = GameSession::new(config, rng)?;
    let judge = session.config().judge;
    let fps = i64::from(options.fps);
    let dt = 1.0 / f64::from(options.fps);
    let mut next_input = 0;
    let mut rush_entries = 0;
    let mut frames = 0;

    session.start(0);
    let total_frames = options
        .duration_ms
        .checked_mul(fps)
        .context("duration is out of range for the frame rate")?
        / 1000;
    for frame in 1..=total_frames {
        let now = frame * 1000 / fps;
        let inputs = match &mut source {
            InputSource::Autoplay(autoplay) => autoplay.plan(session.notes(), &judge, now),
            InputSource::Script(events) => {
                let end = events[next_input..]
                    .iter()
                    .position(|e| e.timestamp > now)
                    .map_or(events.len(), |i| next_input + i);
                let due = events[next_input..end].to_vec();
                next_input = end;
                due
            }
        };
        session.frame(now, dt, &inputs);
        frames += 1;

        for event in session.drain_events() {
            if event == JudgeEvent::RushStart {
                rush_entries += 1;
            }
            debug!(now, ?event, "judge event");
        }
    }

    let score = session.score().clone();
    Ok(RunSummary {
        hit_rate: score.hit_rate(),
        score,
        difficulty: session.view().difficulty,
        rush_entries,
        frames,
    })
}
