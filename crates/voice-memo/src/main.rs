//! Voice-Memo: record, list and play back voice memos from the console.

mod app;
mod app_command;
mod config;
mod console_input;
mod error;
mod logging;
mod render;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console_input::ConsoleInput,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{error, info};
use voice_memo_core::{
    CpalBackend, FeedbackStore, FileGateway, PersistenceGateway, SessionController,
};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let log_guard = match logging::init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config));

    // The console reader is parked in a blocking read; do not wait for it.
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);

    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            error!(error = ?e, "App error");
            eprintln!("{}", e);
            1
        }
    };

    drop(log_guard);
    std::process::exit(code);
}

async fn run(config: Config) -> AppResult<()> {
    info!(
        data_dir = ?config.storage.data_dir,
        recordings_dir = ?config.storage.recordings_dir,
        "Starting session"
    );

    let backend = CpalBackend::new(
        &config.storage.recordings_dir,
        config.playback.position_poll(),
    )?;
    let gateway: Arc<dyn PersistenceGateway> =
        Arc::new(FileGateway::open(&config.storage.data_dir)?);

    let controller = SessionController::load(
        Arc::new(backend),
        Arc::clone(&gateway),
        config.session_config(),
    )
    .await;
    let feedback = FeedbackStore::load(gateway).await;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let _input = ConsoleInput::new(command_tx).spawn();

    let app = App {
        controller,
        feedback,
        command_rx,
    };

    app.run().await
}
