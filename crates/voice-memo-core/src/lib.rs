//! Voice Memo Core Library
//!
//! Recording/playback session controller over a single audio resource, the
//! newest-first recording list it maintains, and the key-value persistence
//! contract both are stored through.
//!
//! # Example
//!
//! ```no_run
//! use voice_memo_core::{CpalBackend, CoreResult, FileGateway, SessionConfig, SessionController};
//!
//! use std::{sync::Arc, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let backend = Arc::new(CpalBackend::new("recordings", Duration::from_millis(250))?);
//!     let gateway = Arc::new(FileGateway::open("store")?);
//!     let controller = SessionController::load(backend, gateway, SessionConfig::default()).await;
//!
//!     controller.start_recording().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     if let Some(entry) = controller.stop_recording().await? {
//!         println!("Saved {} ({}s)", entry.id, entry.duration_seconds);
//!     }
//!
//!     controller.shutdown().await;
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod model;
mod session;
mod store;
mod task;

pub use {
    audio::{
        AudioBackend, CaptureResource, CapturedAudio, CpalBackend, PermissionStatus,
        PlaybackEvent, PlaybackResource, QualityProfile,
    },
    error::MemoError,
    error::Result as CoreResult,
    model::{
        FeedbackEntry, ListedRecording, RecordingEntry, Settings, format_clock, placeholder_title,
        progress_fraction,
    },
    session::{SessionConfig, SessionController, SessionState},
    store::{
        FEEDBACK_KEY, FeedbackStore, FileGateway, MemoryGateway, PersistenceGateway,
        RECORDINGS_KEY, RecordingStore, SETTINGS_KEY, SettingsStore,
    },
};
