//! Log sink setup.
//!
//! Logs go to a daily rolling file so they never interleave with the console.

use crate::{AppError, AppResult, config::Config};

use std::{fs, panic::Location};

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "voice-memo.log";

/// Install the global subscriber. Keep the returned guard alive until exit.
#[track_caller]
pub(crate) fn init_logging(config: &Config) -> AppResult<WorkerGuard> {
    let log_dir = config.log_dir();
    fs::create_dir_all(&log_dir)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .map_err(|e| AppError::LoggingError {
            reason: format!("Invalid log filter {:?}: {}", config.logging.filter, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);

    let installed = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AppError::LoggingError {
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(guard)
}
