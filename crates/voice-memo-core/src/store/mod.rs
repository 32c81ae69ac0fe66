mod codec;
mod feedback_store;
mod file_gateway;
mod gateway;
mod memory_gateway;
mod persist_writer;
mod recording_store;
mod settings_store;

pub(crate) use {codec::load_json, persist_writer::PersistWriter};

pub use {
    feedback_store::FeedbackStore, file_gateway::FileGateway, gateway::PersistenceGateway,
    memory_gateway::MemoryGateway, recording_store::RecordingStore,
    settings_store::SettingsStore,
};

/// Store key holding the JSON recording list.
pub const RECORDINGS_KEY: &str = "voice_notes_v2";

/// Store key holding the JSON settings object.
pub const SETTINGS_KEY: &str = "voice_notes_settings_v1";

/// Store key holding the JSON feedback list.
pub const FEEDBACK_KEY: &str = "voice_notes_feedbacks";
