//! Player configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Session behaviour while listening
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Progress push interval while playing (5-60)
    pub sync_interval_secs: u64,

    /// Start playing once the session is ready
    pub auto_play: bool,

    /// Rewind seconds applied to a stored resume position
    pub resume_rewind_secs: u64,

    /// Remote "skip forward" distance
    pub jump_forward_secs: u64,

    /// Remote "skip back" distance
    pub jump_backward_secs: u64,

    /// How early the sleep timer may fire before its target
    pub sleep_fire_epsilon_secs: f64,

    /// Playback speed for new sessions (0.5 - 3.0)
    pub default_rate: f32,

    /// Position report interval of the headless transport
    pub tick_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: 15,
            auto_play: true,
            resume_rewind_secs: 0,
            jump_forward_secs: 30,
            jump_backward_secs: 10,
            sleep_fire_epsilon_secs: 0.5,
            default_rate: 1.0,
            tick_interval_ms: 250,
        }
    }
}

impl ConfigSection for PlayerConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.sync_interval_secs, 5, 60, "player.sync_interval_secs"),
            Validator::in_range(self.resume_rewind_secs, 0, 60, "player.resume_rewind_secs"),
            Validator::in_range(self.jump_forward_secs, 1, 300, "player.jump_forward_secs"),
            Validator::in_range(self.jump_backward_secs, 1, 300, "player.jump_backward_secs"),
            Validator::in_range(
                self.sleep_fire_epsilon_secs,
                0.0,
                5.0,
                "player.sleep_fire_epsilon_secs",
            ),
            Validator::in_range(self.default_rate, 0.5, 3.0, "player.default_rate"),
            Validator::in_range(self.tick_interval_ms, 50, 1000, "player.tick_interval_ms"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.sync_interval_secs = other.sync_interval_secs;
        self.auto_play = other.auto_play;
        self.resume_rewind_secs = other.resume_rewind_secs;
        self.jump_forward_secs = other.jump_forward_secs;
        self.jump_backward_secs = other.jump_backward_secs;
        self.sleep_fire_epsilon_secs = other.sleep_fire_epsilon_secs;
        self.default_rate = other.default_rate;
        self.tick_interval_ms = other.tick_interval_ms;
    }

    fn section_name(&self) -> &'static str {
        "player"
    }
}
