//! Ordered, newest-first list of saved recordings.
//!
//! The in-memory list is authoritative for the running process. Every
//! mutation re-serializes the whole list and hands it to a background
//! writer; persistence failures are logged and never undo the mutation.

use crate::{
    CoreResult, ListedRecording, MemoError, RecordingEntry,
    model::placeholder_title,
    store::{PersistWriter, PersistenceGateway, RECORDINGS_KEY, codec::decode, load_json},
};

use std::{collections::HashSet, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// The single writable copy of the recording list.
pub struct RecordingStore {
    entries: Vec<RecordingEntry>,
    writer: PersistWriter,
}

impl RecordingStore {
    /// Load the list from the store.
    ///
    /// Never fails: a missing key, a read error or malformed JSON all yield
    /// an empty list. Duplicate ids keep their first occurrence.
    #[instrument(skip(gateway))]
    pub async fn load(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let entries: Vec<RecordingEntry> = load_json(gateway.as_ref(), RECORDINGS_KEY)
            .await
            .unwrap_or_default();
        let entries = dedupe(entries);

        info!(count = entries.len(), "Recording list loaded");

        Self {
            entries,
            writer: PersistWriter::spawn(gateway, RECORDINGS_KEY),
        }
    }

    /// Parse the persisted JSON form of a recording list.
    #[track_caller]
    pub fn parse(bytes: &[u8]) -> CoreResult<Vec<RecordingEntry>> {
        decode(bytes)
    }

    /// Serialize a recording list to its persisted JSON form.
    #[track_caller]
    pub fn serialize(entries: &[RecordingEntry]) -> CoreResult<Vec<u8>> {
        serde_json::to_vec(entries).map_err(|e| MemoError::MalformedData {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Current list, newest first.
    pub fn entries(&self) -> &[RecordingEntry] {
        &self.entries
    }

    /// Number of saved recordings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no recordings are saved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with `id`, if present.
    pub fn get(&self, id: i64) -> Option<&RecordingEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Whether an entry with `id` exists.
    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    /// Id for a recording created at `now_ms`.
    ///
    /// Uses the timestamp unless that would not exceed every existing id.
    pub fn next_id(&self, now_ms: i64) -> i64 {
        let max = self.entries.iter().map(|entry| entry.id).max();
        match max {
            Some(max) if now_ms <= max => max + 1,
            _ => now_ms,
        }
    }

    /// Title given to the next recording.
    pub fn next_title(&self) -> String {
        placeholder_title(self.entries.len() + 1)
    }

    /// Prepend `entry` and persist.
    ///
    /// An entry whose id is already present is rejected and `false` returned.
    #[instrument(skip(self, entry), fields(entry_id = entry.id))]
    pub fn append(&mut self, entry: RecordingEntry) -> bool {
        if self.contains(entry.id) {
            warn!("Duplicate recording id, entry not added");
            return false;
        }

        self.entries.insert(0, entry);
        self.persist();

        info!(count = self.entries.len(), "Recording added");

        true
    }

    /// Replace the title of `id` with the trimmed `new_title`.
    ///
    /// A blank title falls back to the entry's placeholder. Returns the stored
    /// title, or `None` if no entry matched (nothing is persisted then).
    #[instrument(skip(self, new_title))]
    pub fn rename(&mut self, id: i64, new_title: &str) -> Option<String> {
        let len = self.entries.len();
        let index = self.entries.iter().position(|entry| entry.id == id)?;

        let trimmed = new_title.trim();
        let title = if trimmed.is_empty() {
            placeholder_title(len - index)
        } else {
            trimmed.to_string()
        };

        self.entries[index].title = Some(title.clone());
        self.persist();

        info!(title = %title, "Recording renamed");

        Some(title)
    }

    /// Remove the entry with `id` and persist.
    ///
    /// The caller must stop any playback of this entry first.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: i64) -> Option<RecordingEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        let removed = self.entries.remove(index);
        self.persist();

        info!(count = self.entries.len(), "Recording removed");

        Some(removed)
    }

    /// Entries whose display title contains `query`, ignoring case.
    ///
    /// List order is preserved. An empty query matches everything.
    pub fn filter(&self, query: &str) -> Vec<RecordingEntry> {
        self.listing(query)
            .into_iter()
            .map(|listed| listed.entry)
            .collect()
    }

    /// Like [`RecordingStore::filter`], keeping each match's display title.
    pub fn listing(&self, query: &str) -> Vec<ListedRecording> {
        let needle = query.to_lowercase();
        let len = self.entries.len();

        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let title = entry.display_title(len - index);
                title.to_lowercase().contains(&needle).then(|| ListedRecording {
                    title,
                    entry: entry.clone(),
                })
            })
            .collect()
    }

    /// Wait for the latest list snapshot to reach the store.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn persist(&mut self) {
        self.writer.submit(&self.entries);
        debug!(count = self.entries.len(), "Recording list queued for persistence");
    }
}

fn dedupe(entries: Vec<RecordingEntry>) -> Vec<RecordingEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let before = entries.len();

    let unique: Vec<RecordingEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id))
        .collect();

    if unique.len() != before {
        warn!(
            dropped = before - unique.len(),
            "Duplicate recording ids in persisted list, keeping first occurrence"
        );
    }

    unique
}
