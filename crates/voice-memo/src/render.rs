//! Text rendering for the console front end.

use crate::AppError;

use std::mem::discriminant;

use voice_memo_core::{
    ListedRecording, MemoError, SessionState, format_clock, progress_fraction,
};

const PROGRESS_WIDTH: usize = 20;

/// Command summary printed by `help`.
pub(crate) const HELP: &str = "\
Commands:
  record                 start recording
  stop-recording         stop and save the recording
  play <id>              play or resume a recording
  pause | resume | stop  control playback
  rewind                 jump back one step
  rename <id> <title>    rename a recording
  delete <id>            delete a recording
  list [filter]          list recordings, optionally filtered by title
  quality <high|minimal> select the recording quality
  feedback <text>        leave feedback
  status                 show what is happening
  quit                   save and exit";

/// Whether moving from `previous` to `next` is worth announcing.
///
/// Timer and position ticks within the same state are not.
pub(crate) fn phase_changed(previous: &SessionState, next: &SessionState) -> bool {
    discriminant(previous) != discriminant(next) || previous.active_entry() != next.active_entry()
}

/// One-line description of `state`. `active` is the loaded entry, if known.
pub(crate) fn describe_state(state: &SessionState, active: Option<&ListedRecording>) -> String {
    match *state {
        SessionState::Idle => "Idle".to_string(),
        SessionState::Recording {
            elapsed_seconds, ..
        } => format!("Recording {}", format_clock(elapsed_seconds)),
        SessionState::Playing {
            entry_id,
            position_seconds,
        } => format!(
            "Playing {}",
            describe_position(entry_id, position_seconds, active)
        ),
        SessionState::Paused {
            entry_id,
            position_seconds,
        } => format!(
            "Paused {}",
            describe_position(entry_id, position_seconds, active)
        ),
    }
}

fn describe_position(entry_id: i64, position_seconds: u64, active: Option<&ListedRecording>) -> String {
    let Some(listed) = active.filter(|listed| listed.entry.id == entry_id) else {
        return format!("#{} {}", entry_id, format_clock(position_seconds));
    };

    let duration = listed.entry.duration_seconds;
    format!(
        "\"{}\" {} / {} {}",
        listed.title,
        format_clock(position_seconds),
        format_clock(duration),
        progress_bar(progress_fraction(position_seconds, duration))
    )
}

/// `[#####-----]` style bar for a fraction in `[0, 1]`.
pub(crate) fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize)
        .min(PROGRESS_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

/// Table of recordings, the loaded one marked with `>`.
pub(crate) fn listing(recordings: &[ListedRecording], active: Option<i64>) -> String {
    if recordings.is_empty() {
        return "No recordings".to_string();
    }

    recordings
        .iter()
        .map(|listed| {
            let marker = if Some(listed.entry.id) == active { '>' } else { ' ' };
            format!(
                "{} {:>15}  {:<24}  {}  {}",
                marker,
                listed.entry.id,
                listed.title,
                format_clock(listed.entry.duration_seconds),
                listed.entry.created_at
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// User-facing text for an error, without source locations.
pub(crate) fn notice(error: &AppError) -> String {
    match error {
        AppError::Memo { source, .. } => memo_notice(source),
        AppError::InvalidCommand { reason, .. } => format!("{} (type help)", reason),
        other => other.to_string(),
    }
}

fn memo_notice(error: &MemoError) -> String {
    match error {
        MemoError::PermissionDenied { .. } => {
            "Microphone permission is required to record".to_string()
        }
        MemoError::ResourceAcquireFailed { reason, .. } => {
            format!("Audio device unavailable: {}", reason)
        }
        MemoError::ResourceFailed { reason, .. } => format!("Audio error: {}", reason),
        MemoError::Conflict { reason, .. } => format!("Not now: {}", reason),
        MemoError::EntryNotFound { id, .. } => format!("No recording with id {}", id),
        MemoError::EmptyFeedback { .. } => "Feedback cannot be empty".to_string(),
        other => other.to_string(),
    }
}
