use serde::{Deserialize, Serialize};

/// Metadata for one saved voice recording.
///
/// Serialized as `{id, uri, duration, createdAt, title?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingEntry {
    /// Unique id, creation time in milliseconds. Never reused.
    pub id: i64,
    /// Locator of the recorded audio payload. Immutable once set.
    pub uri: String,
    /// Length in whole seconds, fixed when recording stops.
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    /// ISO-8601 creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// User-visible title. Absent or blank means "use the placeholder".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RecordingEntry {
    /// Title shown to the user.
    ///
    /// `ordinal` is the entry's 1-based position counted from the oldest
    /// entry; it only matters when no usable title is stored.
    pub fn display_title(&self, ordinal: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => placeholder_title(ordinal),
        }
    }
}

/// Sequential placeholder title, e.g. `Record 007`.
pub fn placeholder_title(ordinal: usize) -> String {
    format!("Record {:03}", ordinal)
}
