use std::time::Duration;

/// Default distance moved back by one rewind.
pub const DEFAULT_REWIND_STEP: Duration = Duration::from_secs(1);

/// Tuning for the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How far `rewind()` moves the playback position back.
    pub rewind_step: Duration,
    /// Period of the elapsed-time ticker while recording.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rewind_step: DEFAULT_REWIND_STEP,
            tick_interval: Duration::from_secs(1),
        }
    }
}
