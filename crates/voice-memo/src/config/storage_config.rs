use serde::{Deserialize, Serialize};

use std::path::PathBuf;

/// Where the key-value store and the audio payloads live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the key-value store (one JSON file per key).
    pub data_dir: PathBuf,
    /// Directory captured recordings are written to.
    pub recordings_dir: PathBuf,
}
