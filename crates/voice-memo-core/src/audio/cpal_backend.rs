use crate::{
    CoreResult, MemoError,
    audio::{
        AudioBackend, CaptureResource, CpalCapture, CpalPlayback, PermissionStatus,
        PlaybackResource, QualityProfile,
    },
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use cpal::traits::HostTrait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Audio backend on the default cpal host.
///
/// Captures are written as `recording-<uuid>.wav` under the recordings
/// directory; the file path is the entry's uri.
#[derive(Debug, Clone)]
pub struct CpalBackend {
    recordings_dir: PathBuf,
    poll_interval: Duration,
}

impl CpalBackend {
    /// Create a backend writing into `recordings_dir`.
    ///
    /// `poll_interval` is how often playback position notifications fire.
    ///
    /// # Errors
    ///
    /// Returns error if the recordings directory cannot be created.
    #[track_caller]
    #[instrument(skip(recordings_dir), fields(recordings_dir = ?recordings_dir.as_ref()))]
    pub fn new<P: AsRef<Path>>(recordings_dir: P, poll_interval: Duration) -> CoreResult<Self> {
        let recordings_dir = recordings_dir.as_ref().to_path_buf();
        if !recordings_dir.exists() {
            fs::create_dir_all(&recordings_dir)?;
            debug!(recordings_dir = ?recordings_dir, "Created recordings directory");
        }

        info!("CpalBackend initialized");

        Ok(Self {
            recordings_dir,
            poll_interval,
        })
    }
}

#[async_trait::async_trait]
impl AudioBackend for CpalBackend {
    async fn request_permission(&self) -> CoreResult<PermissionStatus> {
        // Desktop hosts have no permission prompt; an available input device is the grant.
        let available = cpal::default_host().default_input_device().is_some();
        if !available {
            warn!("No input device available, treating microphone as denied");
            return Ok(PermissionStatus::Denied);
        }
        Ok(PermissionStatus::Granted)
    }

    async fn start_capture(&self, profile: QualityProfile) -> CoreResult<Box<dyn CaptureResource>> {
        let path = self
            .recordings_dir
            .join(format!("recording-{}.wav", Uuid::new_v4()));
        let capture = tokio::task::spawn_blocking(move || CpalCapture::start(path, profile))
            .await
            .map_err(|e| MemoError::ResourceAcquireFailed {
                reason: format!("Capture start task failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })??;
        Ok(Box::new(capture))
    }

    async fn load_playback(&self, uri: &str) -> CoreResult<Box<dyn PlaybackResource>> {
        let uri = uri.to_string();
        let poll_interval = self.poll_interval;
        let playback =
            tokio::task::spawn_blocking(move || CpalPlayback::load(&uri, poll_interval))
                .await
                .map_err(|e| MemoError::ResourceAcquireFailed {
                    reason: format!("Playback load task failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })??;
        Ok(Box::new(playback))
    }

    fn name(&self) -> &str {
        "cpal"
    }
}

/// Error for a host without a default device in `direction`.
#[track_caller]
pub(crate) fn no_device_found(direction: &str) -> MemoError {
    MemoError::ResourceAcquireFailed {
        reason: format!("No {} device found", direction),
        location: ErrorLocation::from(Location::caller()),
    }
}
