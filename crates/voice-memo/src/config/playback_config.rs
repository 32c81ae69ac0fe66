use crate::config::{
    DEFAULT_POSITION_POLL_MS, DEFAULT_REWIND_STEP_MS, default_position_poll_ms,
    default_rewind_step_ms,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playback timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How far `rewind` moves back, in milliseconds.
    #[serde(default = "default_rewind_step_ms")]
    pub rewind_step_ms: u64,
    /// How often the playback position is reported, in milliseconds.
    #[serde(default = "default_position_poll_ms")]
    pub position_poll_ms: u64,
}

impl PlaybackConfig {
    /// Rewind step as a duration.
    pub fn rewind_step(&self) -> Duration {
        Duration::from_millis(self.rewind_step_ms)
    }

    /// Position poll interval as a duration.
    pub fn position_poll(&self) -> Duration {
        Duration::from_millis(self.position_poll_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rewind_step_ms: DEFAULT_REWIND_STEP_MS,
            position_poll_ms: DEFAULT_POSITION_POLL_MS,
        }
    }
}
