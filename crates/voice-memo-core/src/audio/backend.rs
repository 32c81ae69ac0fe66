use crate::{CoreResult, audio::QualityProfile};

use tokio::sync::mpsc;

/// Outcome of a microphone permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Capture may start.
    Granted,
    /// Capture must not start.
    Denied,
}

/// A finished capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAudio {
    /// Locator of the recorded payload.
    pub uri: String,
    /// Captured length in milliseconds.
    pub duration_ms: u64,
}

/// Notifications emitted by a loaded playback resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback position moved.
    PositionChanged {
        /// New position in milliseconds.
        position_ms: u64,
    },
    /// Playback reached the end of the media. Emitted at most once.
    EndOfMedia,
}

/// Host audio subsystem.
///
/// Implementations:
/// - [`CpalBackend`](crate::CpalBackend): default input/output devices, WAV payloads
/// - test doubles that script acquire failures and playback events
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Ask whether the microphone may be used.
    async fn request_permission(&self) -> CoreResult<PermissionStatus>;

    /// Acquire the capture device and start recording.
    async fn start_capture(&self, profile: QualityProfile) -> CoreResult<Box<dyn CaptureResource>>;

    /// Load the payload at `uri` for playback. Playback starts paused.
    async fn load_playback(&self, uri: &str) -> CoreResult<Box<dyn PlaybackResource>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// An acquired, running capture. Dropping it releases the device.
#[async_trait::async_trait]
pub trait CaptureResource: Send {
    /// Stop capturing, release the device and finish the payload.
    async fn finalize(self: Box<Self>) -> CoreResult<CapturedAudio>;
}

/// An acquired playback handle. Dropping it releases the device.
#[async_trait::async_trait]
pub trait PlaybackResource: Send {
    /// Take the event stream. Returns `None` after the first call.
    fn take_events(&mut self) -> Option<mpsc::Receiver<PlaybackEvent>>;

    /// Start or continue playback.
    async fn play(&mut self) -> CoreResult<()>;

    /// Pause, keeping the position.
    async fn pause(&mut self) -> CoreResult<()>;

    /// Move to `position_ms`, clamped to the media length.
    async fn seek(&mut self, position_ms: u64) -> CoreResult<()>;

    /// Current position in milliseconds.
    fn position_ms(&self) -> u64;

    /// Media length in milliseconds.
    fn duration_ms(&self) -> u64;

    /// Stop playback and release the device.
    async fn unload(self: Box<Self>) -> CoreResult<()>;
}
