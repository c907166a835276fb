/// Consecutive-success counter.
///
/// Reset by any miss: an expired note, a forfeited chord, a hold head that
/// passed unpressed, or a key press that matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combo {
    count: u32,
    /// Time (ms) of the most recent increment
    last_combo_time: Option<i64>,
}

impl Combo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit one success. Returns the new count.
    pub fn increment(&mut self, now: i64) -> u32 {
        self.count = self.count.saturating_add(1);
        self.last_combo_time = Some(now);
        self.count
    }

    /// Break the combo. Returns true if a non-zero combo was lost.
    pub fn reset(&mut self) -> bool {
        let broken = self.count > 0;
        self.count = 0;
        broken
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn last_combo_time(&self) -> Option<i64> {
        self.last_combo_time
    }

    /// Opacity of the combo counter display at `now`.
    ///
    /// 1.0 at the moment of an increment, fading linearly to 0.0 over `fade_ms`.
    pub fn fade_alpha(&self, now: i64, fade_ms: i64) -> f32 {
        let Some(last) = self.last_combo_time else {
            return 0.0;
        };
        if fade_ms <= 0 {
            return 0.0;
        }
        let elapsed = (now - last).max(0);
        if elapsed >= fade_ms {
            return 0.0;
        }
        1.0 - elapsed as f32 / fade_ms as f32
    }

    /// Shift the last-increment timestamp, e.g. after a pause.
    pub fn shift_time(&mut self, offset: i64) {
        if let Some(t) = &mut self.last_combo_time {
            *t += offset;
        }
    }
}
