use crate::{
    CoreResult, MemoError,
    audio::{
        CaptureResource, CapturedAudio, QualityProfile, cpal_backend::no_device_found,
        wav::PayloadWriter, wav::frames_to_ms,
    },
};

use std::{
    fs,
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
};

use cpal::{
    Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// A running microphone capture streaming into a WAV payload.
///
/// The audio callback only forwards sample blocks over a channel; a blocking
/// writer task drains the channel into the file. Dropping the capture stops
/// the stream, which closes the channel and lets the writer finish the file.
pub struct CpalCapture {
    session_id: Uuid,
    path: PathBuf,
    sample_rate: u32,
    stream: Option<Stream>,
    /// Signals the audio callback to stop forwarding. Set before the stream
    /// is dropped so no in-flight callback sends after finalize begins.
    shutdown: Arc<AtomicBool>,
    writer: Option<JoinHandle<CoreResult<u64>>>,
}

impl CpalCapture {
    /// Open the default input device and start writing to `path`.
    #[track_caller]
    #[instrument(skip(path), fields(path = %path.display()))]
    pub(crate) fn start(path: PathBuf, profile: QualityProfile) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| no_device_found("input"))?;

        let config = device
            .default_input_config()
            .map_err(|e| MemoError::ResourceAcquireFailed {
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let sample_rate = config.sample_rate();
        let channels = config.channels();
        let shutdown = Arc::new(AtomicBool::new(false));
        let (block_tx, block_rx) = mpsc::channel::<Vec<f32>>();

        let callback_shutdown = Arc::clone(&shutdown);
        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if callback_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // Receiver gone means the writer failed; nothing left to do.
                    let _ = block_tx.send(data.to_vec());
                },
                |err| {
                    error!("Capture stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MemoError::ResourceAcquireFailed {
                reason: format!("Failed to build input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        // Create the file before starting the stream so a failure leaves no device held.
        let mut payload = PayloadWriter::create(&path, profile, sample_rate, channels)?;

        if let Err(e) = stream.play() {
            drop(payload);
            discard_payload(&path);
            return Err(MemoError::ResourceAcquireFailed {
                reason: format!("Failed to start input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let writer = tokio::task::spawn_blocking(move || {
            while let Ok(block) = block_rx.recv() {
                payload
                    .write_block(&block)
                    .map_err(|e| MemoError::ResourceFailed {
                        reason: format!("Failed to write samples: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }
            payload.finish().map_err(|e| MemoError::ResourceFailed {
                reason: format!("Failed to finish payload: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
        });

        let session_id = Uuid::new_v4();
        info!(
            session_id = %session_id,
            sample_rate,
            channels,
            ?profile,
            "Audio capture started"
        );

        Ok(Self {
            session_id,
            path,
            sample_rate,
            stream: Some(stream),
            shutdown,
            writer: Some(writer),
        })
    }

    fn stop_stream(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(stream) = self.stream.take() {
            // Dropping the stream drops the callback and with it the sender,
            // which ends the writer loop.
            drop(stream);
            debug!(session_id = %self.session_id, "Capture stream released");
        }
    }
}

#[async_trait::async_trait]
impl CaptureResource for CpalCapture {
    async fn finalize(mut self: Box<Self>) -> CoreResult<CapturedAudio> {
        self.stop_stream();

        let frames = match self.writer.take() {
            Some(writer) => join_writer(&self.path, writer).await?,
            None => 0,
        };

        let duration_ms = frames_to_ms(frames, self.sample_rate);

        info!(
            session_id = %self.session_id,
            frames,
            duration_ms,
            "Audio capture finalized"
        );

        Ok(CapturedAudio {
            uri: self.path.display().to_string(),
            duration_ms,
        })
    }
}

/// Wait for the payload writer. A failed payload is removed since no entry
/// will ever reference it.
pub(crate) async fn join_writer(
    path: &Path,
    writer: JoinHandle<CoreResult<u64>>,
) -> CoreResult<u64> {
    let result = match writer.await {
        Ok(result) => result,
        Err(e) => Err(MemoError::ResourceFailed {
            reason: format!("Payload writer task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }),
    };

    if result.is_err() {
        discard_payload(path);
    }
    result
}

fn discard_payload(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Discarded unusable payload"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to discard payload: {}", e),
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!(session_id = %self.session_id, "Capture dropped without finalize");
        }
        self.stop_stream();
    }
}
