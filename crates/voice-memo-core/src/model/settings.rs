use serde::{Deserialize, Serialize};

/// User settings persisted next to the recording list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Capture at the high quality profile instead of the minimal one.
    #[serde(rename = "highQuality", default = "default_true")]
    pub high_quality: bool,
    /// Declared but not read by any flow.
    #[serde(rename = "autoSave", default = "default_true")]
    pub auto_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            high_quality: true,
            auto_save: true,
        }
    }
}

fn default_true() -> bool {
    true
}
