use serde::{Deserialize, Serialize};

/// A piece of user feedback kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Creation time in milliseconds.
    pub id: i64,
    /// Trimmed, non-empty feedback text.
    pub text: String,
    /// ISO-8601 creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: String,
}
