//! Session controller: sole owner of the audio resource.
//!
//! Every operation runs under one async mutex that is held across its
//! resource and store awaits, so overlapping UI events are applied one after
//! another and at most one capture or playback resource is ever held.
//!
//! Background work (the 1 Hz recording ticker, the playback event feed) is
//! owned by [`TaskGuard`]s stored next to the resource they serve. Leaving a
//! state drops its guard, which aborts the task. Each task also carries the
//! generation of the resource it was spawned for and exits as soon as that
//! resource is no longer the active one.

use crate::{
    CoreResult, ListedRecording, MemoError, RecordingEntry, Settings,
    audio::{
        AudioBackend, CaptureResource, PermissionStatus, PlaybackEvent, PlaybackResource,
        QualityProfile,
    },
    session::{SessionConfig, SessionState},
    store::{PersistenceGateway, RecordingStore, SettingsStore},
    task::TaskGuard,
};

use std::{
    panic::Location,
    sync::{Arc, Weak},
    time::Duration,
};

use chrono::{DateTime, SecondsFormat, Utc};
use error_location::ErrorLocation;
use tokio::{
    sync::{Mutex, mpsc, watch},
    time::{Instant, interval_at},
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

struct ActiveCapture {
    session_id: Uuid,
    generation: u64,
    started_at: DateTime<Utc>,
    elapsed_seconds: u64,
    resource: Box<dyn CaptureResource>,
    ticker: TaskGuard,
}

struct ActivePlayback {
    entry_id: i64,
    generation: u64,
    position_ms: u64,
    paused: bool,
    resource: Box<dyn PlaybackResource>,
    feed: Option<TaskGuard>,
}

/// Who is tearing down the playback resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teardown {
    /// A controller operation; the feed task is aborted.
    Operation,
    /// The feed task itself, after end of media; it must not abort itself.
    Feed,
}

struct Inner {
    backend: Arc<dyn AudioBackend>,
    recordings: RecordingStore,
    settings: SettingsStore,
    config: SessionConfig,
    state_tx: watch::Sender<SessionState>,
    capture: Option<ActiveCapture>,
    playback: Option<ActivePlayback>,
    generation: u64,
}

/// Recording and playback state machine over a single audio resource.
///
/// Cloning yields another handle to the same controller. Resources are
/// released by [`SessionController::shutdown`], or when the last handle drops.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Mutex<Inner>>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionController {
    /// Load the recording list and settings, then build a controller.
    ///
    /// Never fails: unreadable persisted data degrades to empty/defaults.
    #[instrument(skip_all, fields(backend = backend.name()))]
    pub async fn load(
        backend: Arc<dyn AudioBackend>,
        gateway: Arc<dyn PersistenceGateway>,
        config: SessionConfig,
    ) -> Self {
        let recordings = RecordingStore::load(Arc::clone(&gateway)).await;
        let settings = SettingsStore::load(gateway).await;
        Self::new(backend, recordings, settings, config)
    }

    /// Build a controller over already loaded stores.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        recordings: RecordingStore,
        settings: SettingsStore,
        config: SessionConfig,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        info!(
            backend = backend.name(),
            recordings = recordings.len(),
            "SessionController initialized"
        );

        Self {
            inner: Arc::new(Mutex::new(Inner {
                backend,
                recordings,
                settings,
                config,
                state_tx,
                capture: None,
                playback: None,
                generation: 0,
            })),
            state_rx,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Start capturing at the configured quality profile.
    ///
    /// Any loaded playback is stopped first.
    ///
    /// # Errors
    ///
    /// - [`MemoError::Conflict`] if already recording (nothing is acquired)
    /// - [`MemoError::PermissionDenied`] if the microphone is not granted
    /// - [`MemoError::ResourceAcquireFailed`] if the capture device fails to start
    #[instrument(skip(self))]
    pub async fn start_recording(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.capture.is_some() {
            return Err(MemoError::Conflict {
                reason: "already recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if inner.backend.request_permission().await? == PermissionStatus::Denied {
            warn!("Microphone permission denied");
            return Err(MemoError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if inner.playback.is_some() {
            inner.release_playback(Teardown::Operation).await;
        }

        let profile = QualityProfile::from(inner.settings.settings());
        let resource = inner.backend.start_capture(profile).await?;

        inner.generation += 1;
        let generation = inner.generation;
        let session_id = Uuid::new_v4();
        let ticker = TaskGuard::spawn(
            "recording-ticker",
            run_ticker(
                Arc::downgrade(&self.inner),
                generation,
                inner.config.tick_interval,
            ),
        );

        inner.capture = Some(ActiveCapture {
            session_id,
            generation,
            started_at: Utc::now(),
            elapsed_seconds: 0,
            resource,
            ticker,
        });
        inner.publish();

        info!(session_id = %session_id, ?profile, "Recording started");

        Ok(())
    }

    /// Stop capturing and save the new entry at the top of the list.
    ///
    /// Returns `None` when nothing was recording.
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::ResourceFailed`] if the payload could not be
    /// finished. The device is released and the state is Idle either way.
    #[instrument(skip(self))]
    pub async fn stop_recording(&self) -> CoreResult<Option<RecordingEntry>> {
        let mut inner = self.inner.lock().await;
        inner.finish_capture().await
    }

    /// Play entry `id`.
    ///
    /// A different loaded entry is released before `id` is acquired. Playing
    /// the paused entry resumes it; playing the playing entry does nothing.
    ///
    /// # Errors
    ///
    /// - [`MemoError::Conflict`] while recording
    /// - [`MemoError::EntryNotFound`] if `id` is not in the list
    /// - [`MemoError::ResourceAcquireFailed`] if loading fails; the state is Idle
    #[instrument(skip(self))]
    pub async fn play(&self, id: i64) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.capture.is_some() {
            return Err(MemoError::Conflict {
                reason: "cannot play while recording".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let uri = match inner.recordings.get(id) {
            Some(entry) => entry.uri.clone(),
            None => {
                return Err(MemoError::EntryNotFound {
                    id,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        match inner.playback.as_ref().map(|p| (p.entry_id, p.paused)) {
            Some((active, true)) if active == id => return inner.resume_playback().await,
            Some((active, false)) if active == id => {
                debug!("Entry already playing");
                return Ok(());
            }
            Some(_) => inner.release_playback(Teardown::Operation).await,
            None => {}
        }

        let mut resource = inner.backend.load_playback(&uri).await?;

        if let Err(e) = resource.play().await {
            if let Err(unload) = resource.unload().await {
                warn!(error = ?unload, "Failed to unload after play failure");
            }
            return Err(MemoError::ResourceAcquireFailed {
                reason: format!("Failed to start playback: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        inner.generation += 1;
        let generation = inner.generation;
        let feed = match resource.take_events() {
            Some(events) => Some(TaskGuard::spawn(
                "playback-feed",
                run_feed(Arc::downgrade(&self.inner), generation, events),
            )),
            None => {
                warn!("Playback resource has no event stream, end of media will not be observed");
                None
            }
        };

        inner.playback = Some(ActivePlayback {
            entry_id: id,
            generation,
            position_ms: resource.position_ms(),
            paused: false,
            resource,
            feed,
        });
        inner.publish();

        info!(entry_id = id, "Playback started");

        Ok(())
    }

    /// Pause playback, keeping the position. No-op unless playing.
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::ResourceFailed`] if the resource rejects the pause.
    #[instrument(skip(self))]
    pub async fn pause(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;

        let Some(playback) = inner.playback.as_mut().filter(|p| !p.paused) else {
            debug!("Pause ignored, nothing playing");
            return Ok(());
        };

        playback.resource.pause().await?;
        playback.paused = true;
        playback.position_ms = playback.resource.position_ms();
        let entry_id = playback.entry_id;
        inner.publish();

        info!(entry_id, "Playback paused");

        Ok(())
    }

    /// Resume paused playback. No-op unless paused.
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::ResourceFailed`] if the resource rejects the resume.
    #[instrument(skip(self))]
    pub async fn resume(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.resume_playback().await
    }

    /// Stop playback and release the resource. No-op unless loaded.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if inner.playback.is_some() {
            inner.release_playback(Teardown::Operation).await;
        }
    }

    /// Move playback back by the configured step, never below 0.
    ///
    /// Keeps the current Playing/Paused state. No-op unless loaded.
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::ResourceFailed`] if the seek fails.
    #[instrument(skip(self))]
    pub async fn rewind(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        let step_ms = duration_ms(inner.config.rewind_step);

        let Some(playback) = inner.playback.as_mut() else {
            debug!("Rewind ignored, nothing loaded");
            return Ok(());
        };

        let target_ms = playback.resource.position_ms().saturating_sub(step_ms);
        playback.resource.seek(target_ms).await?;
        playback.position_ms = target_ms;
        inner.publish();

        debug!(position_ms = target_ms, "Playback rewound");

        Ok(())
    }

    /// Delete entry `id`, stopping its playback first if it is loaded.
    ///
    /// Returns the removed entry, `None` if no entry matched.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Option<RecordingEntry> {
        let mut inner = self.inner.lock().await;

        if inner.playback.as_ref().is_some_and(|p| p.entry_id == id) {
            info!(entry_id = id, "Stopping playback of deleted entry");
            inner.release_playback(Teardown::Operation).await;
        }

        inner.recordings.remove(id)
    }

    /// Rename entry `id`. Returns the stored title, `None` if no entry matched.
    #[instrument(skip(self, title))]
    pub async fn rename(&self, id: i64, title: &str) -> Option<String> {
        let mut inner = self.inner.lock().await;
        inner.recordings.rename(id, title)
    }

    /// Snapshot of the recording list, newest first.
    pub async fn recordings(&self) -> Vec<RecordingEntry> {
        let inner = self.inner.lock().await;
        inner.recordings.entries().to_vec()
    }

    /// Entries whose display title contains `query`, ignoring case.
    pub async fn filter(&self, query: &str) -> Vec<RecordingEntry> {
        let inner = self.inner.lock().await;
        inner.recordings.filter(query)
    }

    /// Matching entries with their display titles.
    pub async fn listing(&self, query: &str) -> Vec<ListedRecording> {
        let inner = self.inner.lock().await;
        inner.recordings.listing(query)
    }

    /// Current settings.
    pub async fn settings(&self) -> Settings {
        let inner = self.inner.lock().await;
        inner.settings.settings()
    }

    /// Replace settings. Takes effect at the next `start_recording`.
    #[instrument(skip(self))]
    pub async fn update_settings(&self, settings: Settings) {
        let mut inner = self.inner.lock().await;
        inner.settings.update(settings);
    }

    /// Wait until the latest list and settings reach the store.
    pub async fn flush(&self) {
        let inner = self.inner.lock().await;
        inner.recordings.flush().await;
        inner.settings.flush().await;
    }

    /// Release every resource and flush the stores.
    ///
    /// A running capture is finalized and saved like `stop_recording`.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;

        if inner.capture.is_some() {
            if let Err(e) = inner.finish_capture().await {
                warn!(error = ?e, "Failed to finalize capture during shutdown");
            }
        }

        if inner.playback.is_some() {
            inner.release_playback(Teardown::Operation).await;
        }

        inner.recordings.flush().await;
        inner.settings.flush().await;

        info!("SessionController shut down");
    }
}

impl Inner {
    fn snapshot(&self) -> SessionState {
        if let Some(capture) = &self.capture {
            return SessionState::Recording {
                started_at: capture.started_at,
                elapsed_seconds: capture.elapsed_seconds,
            };
        }

        match &self.playback {
            Some(playback) if playback.paused => SessionState::Paused {
                entry_id: playback.entry_id,
                position_seconds: playback.position_ms / 1000,
            },
            Some(playback) => SessionState::Playing {
                entry_id: playback.entry_id,
                position_seconds: playback.position_ms / 1000,
            },
            None => SessionState::Idle,
        }
    }

    fn publish(&self) {
        let next = self.snapshot();
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    async fn finish_capture(&mut self) -> CoreResult<Option<RecordingEntry>> {
        let Some(capture) = self.capture.take() else {
            debug!("Stop recording ignored, not recording");
            return Ok(None);
        };

        let ActiveCapture {
            session_id,
            resource,
            ticker,
            ..
        } = capture;
        ticker.cancel();
        self.publish();

        let captured = resource.finalize().await?;

        let now = Utc::now();
        let entry = RecordingEntry {
            id: self.recordings.next_id(now.timestamp_millis()),
            uri: captured.uri,
            duration_seconds: captured.duration_ms / 1000,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            title: Some(self.recordings.next_title()),
        };
        self.recordings.append(entry.clone());

        info!(
            session_id = %session_id,
            entry_id = entry.id,
            duration_seconds = entry.duration_seconds,
            "Recording stopped"
        );

        Ok(Some(entry))
    }

    async fn resume_playback(&mut self) -> CoreResult<()> {
        let Some(playback) = self.playback.as_mut().filter(|p| p.paused) else {
            debug!("Resume ignored, nothing paused");
            return Ok(());
        };

        playback.resource.play().await?;
        playback.paused = false;
        let entry_id = playback.entry_id;
        self.publish();

        info!(entry_id, "Playback resumed");

        Ok(())
    }

    async fn release_playback(&mut self, teardown: Teardown) {
        let Some(playback) = self.playback.take() else {
            return;
        };

        let ActivePlayback {
            entry_id,
            resource,
            feed,
            ..
        } = playback;

        if let Some(feed) = feed {
            match teardown {
                Teardown::Operation => feed.cancel(),
                Teardown::Feed => feed.detach(),
            }
        }

        if let Err(e) = resource.unload().await {
            warn!(entry_id, error = ?e, "Failed to unload playback resource");
        }

        self.publish();

        info!(entry_id, ?teardown, "Playback stopped");
    }

    /// Apply one playback notification. Returns whether the feed should continue.
    async fn apply_playback_event(&mut self, generation: u64, event: PlaybackEvent) -> bool {
        let Some(playback) = self
            .playback
            .as_mut()
            .filter(|p| p.generation == generation)
        else {
            return false;
        };

        let finished = match event {
            PlaybackEvent::PositionChanged { position_ms } => {
                playback.position_ms = position_ms;
                let duration_ms = playback.resource.duration_ms();
                duration_ms > 0 && position_ms >= duration_ms
            }
            PlaybackEvent::EndOfMedia => true,
        };

        if finished {
            debug!(entry_id = playback.entry_id, "End of media");
            self.release_playback(Teardown::Feed).await;
            return false;
        }

        self.publish();
        true
    }
}

async fn run_ticker(weak: Weak<Mutex<Inner>>, generation: u64, period: Duration) {
    let mut ticks = interval_at(Instant::now() + period, period);

    loop {
        ticks.tick().await;

        let Some(shared) = weak.upgrade() else {
            break;
        };
        let mut inner = shared.lock().await;

        match inner.capture.as_mut() {
            Some(capture) if capture.generation == generation => capture.elapsed_seconds += 1,
            _ => break,
        }
        inner.publish();
    }
}

async fn run_feed(
    weak: Weak<Mutex<Inner>>,
    generation: u64,
    mut events: mpsc::Receiver<PlaybackEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(shared) = weak.upgrade() else {
            break;
        };
        let mut inner = shared.lock().await;

        if !inner.apply_playback_event(generation, event).await {
            break;
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
