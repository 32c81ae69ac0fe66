use chrono::{DateTime, Utc};

/// Observable state of the session controller. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No audio resource is held.
    #[default]
    Idle,
    /// The capture device is recording.
    Recording {
        /// When capture started.
        started_at: DateTime<Utc>,
        /// Whole seconds counted by the ticker.
        elapsed_seconds: u64,
    },
    /// An entry is playing.
    Playing {
        /// Entry being played.
        entry_id: i64,
        /// Position in whole seconds.
        position_seconds: u64,
    },
    /// An entry is loaded but paused.
    Paused {
        /// Entry that is loaded.
        entry_id: i64,
        /// Position in whole seconds.
        position_seconds: u64,
    },
}

impl SessionState {
    /// Entry holding the playback resource, if any.
    pub fn active_entry(&self) -> Option<i64> {
        match *self {
            SessionState::Playing { entry_id, .. } | SessionState::Paused { entry_id, .. } => {
                Some(entry_id)
            }
            _ => None,
        }
    }

    /// Playback position in whole seconds, 0 when nothing is loaded.
    pub fn position_seconds(&self) -> u64 {
        match *self {
            SessionState::Playing {
                position_seconds, ..
            }
            | SessionState::Paused {
                position_seconds, ..
            } => position_seconds,
            _ => 0,
        }
    }

    /// Whether capture is running.
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording { .. })
    }

    /// Whether no resource is held.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}
