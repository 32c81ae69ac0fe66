use crate::{AppError, AppResult};

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Commands sent from the console to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start capturing a new recording.
    Record,
    /// Stop capturing and save the recording.
    StopRecording,
    /// Play (or resume) a recording.
    Play {
        /// Recording id.
        id: i64,
    },
    /// Pause playback.
    Pause,
    /// Resume paused playback.
    Resume,
    /// Stop playback.
    Stop,
    /// Move playback back one step.
    Rewind,
    /// Give a recording a new title.
    Rename {
        /// Recording id.
        id: i64,
        /// New title, trimmed by the store.
        title: String,
    },
    /// Delete a recording.
    Delete {
        /// Recording id.
        id: i64,
    },
    /// List recordings whose title contains `filter`.
    List {
        /// Case-insensitive search text, empty for all.
        filter: String,
    },
    /// Select the capture quality profile.
    Quality {
        /// `true` for high, `false` for minimal.
        high: bool,
    },
    /// Store a feedback note.
    Feedback {
        /// Note text.
        text: String,
    },
    /// Print the current state.
    Status,
    /// Print the command summary.
    Help,
    /// Request application shutdown.
    Shutdown,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(line: &str) -> AppResult<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "record" => AppCommand::Record,
            "stop-recording" => AppCommand::StopRecording,
            "play" => AppCommand::Play { id: parse_id(rest)? },
            "pause" => AppCommand::Pause,
            "resume" => AppCommand::Resume,
            "stop" => AppCommand::Stop,
            "rewind" => AppCommand::Rewind,
            "rename" => {
                let (id, title) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                AppCommand::Rename {
                    id: parse_id(id)?,
                    title: title.trim().to_string(),
                }
            }
            "delete" => AppCommand::Delete { id: parse_id(rest)? },
            "list" => AppCommand::List {
                filter: rest.to_string(),
            },
            "quality" => match rest.to_ascii_lowercase().as_str() {
                "high" => AppCommand::Quality { high: true },
                "minimal" => AppCommand::Quality { high: false },
                other => {
                    return Err(AppError::InvalidCommand {
                        reason: format!("quality must be high or minimal, got {:?}", other),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
            "feedback" => AppCommand::Feedback {
                text: rest.to_string(),
            },
            "status" => AppCommand::Status,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" => AppCommand::Shutdown,
            "" => {
                return Err(AppError::InvalidCommand {
                    reason: "empty line".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            other => {
                return Err(AppError::InvalidCommand {
                    reason: format!("unknown command {:?}", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(command)
    }
}

#[track_caller]
fn parse_id(text: &str) -> AppResult<i64> {
    text.trim().parse().map_err(|_| AppError::InvalidCommand {
        reason: format!("expected a recording id, got {:?}", text),
        location: ErrorLocation::from(Location::caller()),
    })
}
