use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use rush_model::LaneLayout;
use rush_pattern::{SpawnProperty, SpawnScheduler};
use rush_rule::{JudgeProperty, PlayerRule, RushProperty, ScoreProperty};
use serde::{Deserialize, Serialize};

use crate::note_config::NoteConfig;

/// File the runner looks for when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "rush_config.json";

/// Complete session configuration (rush_config.json).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct GameConfig {
    pub lanes: LaneLayout,
    pub note: NoteConfig,
    pub judge: JudgeProperty,
    pub spawn: SpawnProperty,
    pub rush: RushProperty,
    pub score: ScoreProperty,
    /// Time for the combo counter to fade out after the last increment (ms)
    pub combo_fade_ms: i64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lanes: LaneLayout::three_key(),
            note: NoteConfig::default(),
            judge: JudgeProperty::default(),
            spawn: SpawnProperty::default(),
            rush: RushProperty::default(),
            score: ScoreProperty::default(),
            combo_fade_ms: 2000,
        }
    }
}

impl GameConfig {
    /// Default config with the nine-lane key table.
    pub fn nine_key() -> Self {
        Self {
            lanes: LaneLayout::nine_key(),
            ..Self::default()
        }
    }

    /// Read config from a JSON file. Missing fields take their defaults.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject configurations the session cannot run with.
    ///
    /// Checked once before a session is built; nothing is clamped here.
    pub fn validate(&self) -> Result<()> {
        let lanes = self.lanes.lane_count();
        ensure!(lanes > 0, "lanes: at least one lane key is required");
        if let Some(key) = self.lanes.duplicate_key() {
            bail!("lanes: key '{key}' is bound to more than one lane");
        }

        let note = &self.note;
        ensure!(
            note.speed.is_finite() && note.speed > 0.0,
            "note.speed must be positive (got {})",
            note.speed
        );

        let judge = &self.judge;
        ensure!(
            judge.hit_window > 0.0,
            "judge.hitWindow must be positive (got {})",
            judge.hit_window
        );
        ensure!(
            0.0 <= judge.perfect_threshold
                && judge.perfect_threshold <= judge.good_threshold
                && judge.good_threshold < judge.hit_window,
            "judge thresholds out of order: need 0 <= perfectThreshold ({}) <= goodThreshold ({}) < hitWindow ({})",
            judge.perfect_threshold,
            judge.good_threshold,
            judge.hit_window
        );
        for (name, m) in [
            ("perfect", judge.multipliers.perfect),
            ("good", judge.multipliers.good),
            ("ok", judge.multipliers.ok),
        ] {
            ensure!(m >= 0.0, "judge.multipliers.{name} must not be negative (got {m})");
        }
        ensure!(
            judge.hit_zone_position < note.spawn_position,
            "note.spawnPosition ({}) must lie beyond judge.hitZonePosition ({})",
            note.spawn_position,
            judge.hit_zone_position
        );
        ensure!(
            note.despawn_position < judge.late_limit(),
            "note.despawnPosition ({}) must lie past the hit window ({})",
            note.despawn_position,
            judge.late_limit()
        );

        let spawn = &self.spawn;
        ensure!(
            spawn.base_interval_ms > 0,
            "spawn.baseIntervalMs must be positive (got {})",
            spawn.base_interval_ms
        );
        ensure!(
            spawn.min_interval_ms > 0,
            "spawn.minIntervalMs must be positive (got {})",
            spawn.min_interval_ms
        );
        ensure!(
            spawn.interval_step_ms >= 0,
            "spawn.intervalStepMs must not be negative (got {})",
            spawn.interval_step_ms
        );
        ensure!(
            spawn.difficulty_interval_ms > 0,
            "spawn.difficultyIntervalMs must be positive (got {})",
            spawn.difficulty_interval_ms
        );
        ensure!(
            spawn.initial_difficulty <= spawn.max_difficulty,
            "spawn.initialDifficulty ({}) exceeds spawn.maxDifficulty ({})",
            spawn.initial_difficulty,
            spawn.max_difficulty
        );
        ensure!(
            spawn.min_note_spacing >= 0.0,
            "spawn.minNoteSpacing must not be negative (got {})",
            spawn.min_note_spacing
        );
        ensure!(
            0.0 < spawn.hold_length_min && spawn.hold_length_min <= spawn.hold_length_max,
            "spawn hold length range invalid: need 0 < holdLengthMin ({}) <= holdLengthMax ({})",
            spawn.hold_length_min,
            spawn.hold_length_max
        );
        ensure!(
            spawn.patterns.total() > 0,
            "spawn.patterns: at least one pattern weight must be non-zero"
        );

        let rush = &self.rush;
        ensure!(rush.max > 0.0, "rush.max must be positive (got {})", rush.max);
        ensure!(
            rush.gain_normal >= 0.0 && rush.gain_rush >= 0.0,
            "rush gains must not be negative"
        );
        ensure!(
            rush.decay_normal >= 0.0 && rush.decay_rush >= 0.0,
            "rush decays must not be negative"
        );
        ensure!(
            rush.multiplier >= 1.0,
            "rush.multiplier must be at least 1 (got {})",
            rush.multiplier
        );

        ensure!(
            self.combo_fade_ms >= 0,
            "comboFadeMs must not be negative (got {})",
            self.combo_fade_ms
        );
        Ok(())
    }

    pub fn player_rule(&self) -> PlayerRule {
        PlayerRule::new(self.judge, self.rush, self.score)
    }

    pub fn spawn_scheduler(&self) -> SpawnScheduler {
        SpawnScheduler::new(
            self.spawn,
            self.lanes.lane_count(),
            self.note.speed,
            self.note.spawn_position,
        )
    }
}
