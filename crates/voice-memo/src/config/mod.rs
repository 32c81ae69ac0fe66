mod logging_config;
mod playback_config;
#[allow(clippy::module_inception)]
mod config;
mod storage_config;

pub(crate) use {
    config::Config, logging_config::LoggingConfig, playback_config::PlaybackConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_REWIND_STEP_MS: u64 = 1_000;
pub(crate) const DEFAULT_POSITION_POLL_MS: u64 = 250;
pub(crate) const DEFAULT_LOG_FILTER: &str = "voice_memo=info,voice_memo_core=info";

pub(crate) fn default_rewind_step_ms() -> u64 {
    DEFAULT_REWIND_STEP_MS
}

pub(crate) fn default_position_poll_ms() -> u64 {
    DEFAULT_POSITION_POLL_MS
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
