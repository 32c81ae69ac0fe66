use voice_memo_core::MemoError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the voice-memo binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Session or store error from voice-memo-core.
    #[error("Memo error: {source} {location}")]
    Memo {
        /// The underlying core error.
        #[source]
        source: MemoError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A console line did not parse as a command.
    #[error("Invalid command: {reason} {location}")]
    InvalidCommand {
        /// What was wrong with the line.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Log sink or subscriber setup failed.
    #[error("Logging setup failed: {reason} {location}")]
    LoggingError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// The wrapped core error, if this is one.
    pub fn memo(&self) -> Option<&MemoError> {
        match self {
            AppError::Memo { source, .. } => Some(source),
            _ => None,
        }
    }
}

// Manual From<MemoError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<MemoError> for AppError {
    #[track_caller]
    fn from(source: MemoError) -> Self {
        AppError::Memo {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
