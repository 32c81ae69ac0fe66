use crate::config::{DEFAULT_LOG_FILTER, default_log_filter};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Log sink configuration. `RUST_LOG` overrides `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Directory of the daily log files. Defaults to `<data_dir>/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Write JSON lines instead of plain text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: None,
            json: false,
        }
    }
}
