mod feedback_entry;
mod format;
mod listed_recording;
mod recording_entry;
mod settings;

pub use {
    feedback_entry::FeedbackEntry,
    format::{format_clock, progress_fraction},
    listed_recording::ListedRecording,
    recording_entry::{RecordingEntry, placeholder_title},
    settings::Settings,
};
