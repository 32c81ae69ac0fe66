use crate::{
    CoreResult, MemoError,
    audio::{
        PlaybackEvent, PlaybackResource, cpal_backend::no_device_found, wav::MonoClip,
        wav::frames_to_ms, wav::read_mono,
    },
    task::TaskGuard,
};

use std::{
    panic::Location,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use cpal::{
    Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct Cursor {
    /// Position in source frames. Fractional when device and payload rates differ.
    frame: f64,
    paused: bool,
    ended: bool,
}

/// Decoded clip plus the cursor shared by the output callback, the notifier
/// and the transport controls.
pub(crate) struct PlaybackShared {
    clip: MonoClip,
    cursor: Mutex<Cursor>,
}

impl PlaybackShared {
    /// Wrap `clip` with a cursor paused at 0.
    pub(crate) fn new(clip: MonoClip) -> Self {
        Self {
            clip,
            cursor: Mutex::new(Cursor {
                paused: true,
                ..Cursor::default()
            }),
        }
    }

    fn cursor(&self) -> std::sync::MutexGuard<'_, Cursor> {
        // A poisoned cursor is still a valid position; keep playing from it.
        self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn position_ms(&self) -> u64 {
        let frame = self.cursor().frame as u64;
        frames_to_ms(frame, self.clip.sample_rate)
    }

    pub(crate) fn duration_ms(&self) -> u64 {
        self.clip.duration_ms()
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.cursor().ended
    }

    /// Fill one interleaved output buffer, advancing `step` source frames per
    /// device frame. The cursor is marked ended once it passes the last sample.
    pub(crate) fn render(&self, data: &mut [f32], channels: usize, step: f64) {
        let samples = &self.clip.samples;
        let mut cursor = self.cursor();
        for frame in data.chunks_mut(channels.max(1)) {
            let index = cursor.frame as usize;
            let value = if cursor.paused || cursor.ended {
                0.0
            } else if index >= samples.len() {
                cursor.ended = true;
                0.0
            } else {
                cursor.frame += step;
                samples[index]
            };
            frame.fill(value);
        }
    }

    /// Resume rendering. An ended clip restarts from 0.
    pub(crate) fn play(&self) {
        let mut cursor = self.cursor();
        if cursor.ended {
            cursor.frame = 0.0;
            cursor.ended = false;
        }
        cursor.paused = false;
    }

    pub(crate) fn pause(&self) {
        self.cursor().paused = true;
    }

    /// Move to `position_ms`, clamped to the clip duration.
    pub(crate) fn seek(&self, position_ms: u64) {
        let frame = position_ms.min(self.clip.duration_ms()) as f64
            * f64::from(self.clip.sample_rate)
            / 1000.0;

        let mut cursor = self.cursor();
        cursor.frame = frame;
        cursor.ended = false;
    }

    /// Poll the cursor, sending each new position and then a single
    /// [`PlaybackEvent::EndOfMedia`] before stopping.
    pub(crate) async fn notify(
        self: Arc<Self>,
        event_tx: mpsc::Sender<PlaybackEvent>,
        poll_interval: Duration,
    ) {
        let mut interval = tokio::time::interval(poll_interval);
        let mut last_position = None;

        loop {
            interval.tick().await;

            if self.is_ended() {
                let _ = event_tx.send(PlaybackEvent::EndOfMedia).await;
                break;
            }

            let position_ms = self.position_ms();
            if last_position != Some(position_ms) {
                last_position = Some(position_ms);
                if event_tx
                    .send(PlaybackEvent::PositionChanged { position_ms })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }

        debug!("Playback notifier stopped");
    }
}

/// A loaded payload on the default output device.
///
/// The output stream runs from load to unload and renders silence while
/// paused, so play/pause/seek only touch the shared cursor. A notifier task
/// turns cursor movement into [`PlaybackEvent`]s.
pub struct CpalPlayback {
    uri: String,
    shared: Arc<PlaybackShared>,
    stream: Option<Stream>,
    events: Option<mpsc::Receiver<PlaybackEvent>>,
    notifier: Option<TaskGuard>,
}

impl CpalPlayback {
    /// Decode `uri` and open the default output device, paused at 0.
    ///
    /// Blocks on file decode and device setup; call from a blocking task
    /// inside the runtime.
    #[track_caller]
    #[instrument]
    pub(crate) fn load(uri: &str, poll_interval: Duration) -> CoreResult<Self> {
        let clip = read_mono(Path::new(uri))?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| no_device_found("output"))?;

        let config = device
            .default_output_config()
            .map_err(|e| MemoError::ResourceAcquireFailed {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let output_rate = config.sample_rate();
        let channels = usize::from(config.channels().max(1));
        let step = f64::from(clip.sample_rate) / f64::from(output_rate.max(1));

        let shared = Arc::new(PlaybackShared::new(clip));

        let callback_shared = Arc::clone(&shared);
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback_shared.render(data, channels, step);
                },
                |err| {
                    error!("Playback stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MemoError::ResourceAcquireFailed {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| MemoError::ResourceAcquireFailed {
            reason: format!("Failed to start output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let notifier = TaskGuard::spawn(
            "playback-notifier",
            Arc::clone(&shared).notify(event_tx, poll_interval),
        );

        info!(
            duration_ms = shared.duration_ms(),
            output_rate, channels, "Playback loaded"
        );

        Ok(Self {
            uri: uri.to_string(),
            shared,
            stream: Some(stream),
            events: Some(event_rx),
            notifier: Some(notifier),
        })
    }

    fn release(&mut self) {
        if let Some(notifier) = self.notifier.take() {
            notifier.cancel();
        }
        if let Some(stream) = self.stream.take() {
            drop(stream);
            debug!(uri = %self.uri, "Playback stream released");
        }
    }
}

#[async_trait::async_trait]
impl PlaybackResource for CpalPlayback {
    fn take_events(&mut self) -> Option<mpsc::Receiver<PlaybackEvent>> {
        self.events.take()
    }

    async fn play(&mut self) -> CoreResult<()> {
        self.shared.play();
        Ok(())
    }

    async fn pause(&mut self) -> CoreResult<()> {
        self.shared.pause();
        Ok(())
    }

    async fn seek(&mut self, position_ms: u64) -> CoreResult<()> {
        self.shared.seek(position_ms);
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        self.shared.position_ms()
    }

    fn duration_ms(&self) -> u64 {
        self.shared.duration_ms()
    }

    async fn unload(mut self: Box<Self>) -> CoreResult<()> {
        self.release();
        info!(uri = %self.uri, "Playback unloaded");
        Ok(())
    }
}

impl Drop for CpalPlayback {
    fn drop(&mut self) {
        self.release();
    }
}
