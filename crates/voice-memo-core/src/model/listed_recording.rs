use crate::RecordingEntry;

/// A recording paired with the title it is shown under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRecording {
    /// Effective display title (stored title or placeholder).
    pub title: String,
    /// The underlying entry.
    pub entry: RecordingEntry,
}
