use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Voice memo core errors with source location tracking.
#[derive(Error, Debug)]
pub enum MemoError {
    /// Microphone access was not granted.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture or playback backend failed to start or load.
    #[error("Failed to acquire audio resource: {reason} {location}")]
    ResourceAcquireFailed {
        /// Description of the acquire failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An operation on an already acquired resource failed.
    #[error("Audio resource error: {reason} {location}")]
    ResourceFailed {
        /// Description of the resource failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The requested transition conflicts with the current session state.
    #[error("Conflict: {reason} {location}")]
    Conflict {
        /// Why the request was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No recording with the given id exists.
    #[error("Recording {id} not found {location}")]
    EntryNotFound {
        /// The id that was looked up.
        id: i64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Key-value store read or write failed.
    #[error("Persistence error: {reason} {location}")]
    Persistence {
        /// Description of the store failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persisted bytes could not be parsed.
    #[error("Malformed persisted data: {reason} {location}")]
    MalformedData {
        /// Parser message.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Feedback text was empty after trimming.
    #[error("Feedback text is empty {location}")]
    EmptyFeedback {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl MemoError {
    /// Whether the error blocks the requested action and should be shown to the user.
    ///
    /// Persistence and parse failures are recovered locally and only logged.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            MemoError::Persistence { .. } | MemoError::MalformedData { .. }
        )
    }
}

impl From<std::io::Error> for MemoError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        MemoError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`MemoError`].
pub type Result<T> = std::result::Result<T, MemoError>;
