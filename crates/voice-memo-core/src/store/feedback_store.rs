use crate::{
    CoreResult, FeedbackEntry, MemoError,
    store::{FEEDBACK_KEY, PersistWriter, PersistenceGateway, load_json},
};

use std::{panic::Location, sync::Arc};

use chrono::{SecondsFormat, Utc};
use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Locally stored user feedback, newest first.
pub struct FeedbackStore {
    entries: Vec<FeedbackEntry>,
    writer: PersistWriter,
}

impl FeedbackStore {
    /// Load stored feedback, empty when absent or unreadable.
    #[instrument(skip(gateway))]
    pub async fn load(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let entries: Vec<FeedbackEntry> = load_json(gateway.as_ref(), FEEDBACK_KEY)
            .await
            .unwrap_or_default();

        Self {
            entries,
            writer: PersistWriter::spawn(gateway, FEEDBACK_KEY),
        }
    }

    /// Stored feedback, newest first.
    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    /// Store trimmed `text` as a new feedback entry.
    ///
    /// # Errors
    ///
    /// Returns [`MemoError::EmptyFeedback`] when `text` is blank.
    #[track_caller]
    #[instrument(skip(self, text))]
    pub fn submit(&mut self, text: &str) -> CoreResult<FeedbackEntry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MemoError::EmptyFeedback {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let now = Utc::now();
        let now_ms = now.timestamp_millis();
        let id = match self.entries.first() {
            Some(latest) if now_ms <= latest.id => latest.id + 1,
            _ => now_ms,
        };

        let entry = FeedbackEntry {
            id,
            text: text.to_string(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        self.entries.insert(0, entry.clone());
        self.writer.submit(&self.entries);

        info!(feedback_id = id, text_len = text.len(), "Feedback stored");

        Ok(entry)
    }

    /// Wait for the latest feedback list to reach the store.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }
}
