// Difficulty ramp: one level per fixed real-time interval, capped.

use tracing::debug;

#[derive(Debug, Clone)]
pub struct Difficulty {
    level: u32,
    initial: u32,
    max: u32,
    interval_ms: i64,
    /// Time (ms) of the last level step
    timer: i64,
}

impl Difficulty {
    pub fn new(initial: u32, max: u32, interval_ms: i64) -> Self {
        let max = max.max(initial);
        Self {
            level: initial,
            initial,
            max,
            interval_ms,
            timer: 0,
        }
    }

    /// Restart at the initial level with the interval timer at `now`.
    pub fn reset(&mut self, now: i64) {
        self.level = self.initial;
        self.timer = now;
    }

    /// Advance the ramp. Returns true when the level went up.
    ///
    /// At most one level is gained per call; the timer restarts at `now`
    /// even when the level is already capped.
    pub fn update(&mut self, now: i64) -> bool {
        if self.interval_ms <= 0 || now - self.timer < self.interval_ms {
            return false;
        }
        self.timer = now;
        if self.level >= self.max {
            return false;
        }
        self.level += 1;
        debug!(level = self.level, "difficulty up");
        true
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn timer(&self) -> i64 {
        self.timer
    }

    pub fn shift_time(&mut self, offset: i64) {
        self.timer += offset;
    }

    /// `max(base - level * step, floor)`
    pub fn spawn_interval(&self, base_ms: i64, step_ms: i64, floor_ms: i64) -> i64 {
        (base_ms - i64::from(self.level) * step_ms).max(floor_ms)
    }
}
