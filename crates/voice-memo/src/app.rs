use crate::{AppCommand, AppError, AppResult, render};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};
use voice_memo_core::{FeedbackStore, SessionController, SessionState, Settings};

/// Main application state.
///
/// Owns the session controller and the feedback store, applies console
/// commands one at a time and announces state transitions.
pub struct App {
    pub(crate) controller: SessionController,
    pub(crate) feedback: FeedbackStore,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
}

impl App {
    /// Run the main application event loop until `quit` or end of input.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voice-Memo starting");

        let mut state_rx = self.controller.subscribe();
        let mut last_state = *state_rx.borrow_and_update();

        println!("{}", render::listing(&self.controller.listing("").await, None));
        println!("Type help for commands.");

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    match self.handle_command(cmd).await {
                        Ok(Some(output)) => println!("{}", output),
                        Ok(None) => {}
                        Err(e) => report(&e),
                    }
                }

                Ok(()) = state_rx.changed() => {
                    let state = *state_rx.borrow_and_update();
                    if render::phase_changed(&last_state, &state) {
                        println!("{}", self.describe(&state).await);
                    }
                    last_state = state;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.controller.shutdown().await;
        self.feedback.flush().await;

        info!("Voice-Memo shut down successfully");

        Ok(())
    }

    /// Apply one command. Returns text to print, if any.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) -> AppResult<Option<String>> {
        let output = match cmd {
            AppCommand::Record => {
                self.controller.start_recording().await?;
                None
            }
            AppCommand::StopRecording => match self.controller.stop_recording().await? {
                Some(entry) => Some(format!(
                    "Saved {} ({})",
                    entry.title.as_deref().unwrap_or_default(),
                    voice_memo_core::format_clock(entry.duration_seconds)
                )),
                None => Some("Not recording".to_string()),
            },
            AppCommand::Play { id } => {
                self.controller.play(id).await?;
                None
            }
            AppCommand::Pause => {
                self.controller.pause().await?;
                None
            }
            AppCommand::Resume => {
                self.controller.resume().await?;
                None
            }
            AppCommand::Stop => {
                self.controller.stop().await;
                None
            }
            AppCommand::Rewind => {
                self.controller.rewind().await?;
                let state = self.controller.state();
                Some(self.describe(&state).await)
            }
            AppCommand::Rename { id, title } => match self.controller.rename(id, &title).await {
                Some(stored) => Some(format!("Renamed to {}", stored)),
                None => return Err(not_found(id)),
            },
            AppCommand::Delete { id } => match self.controller.delete(id).await {
                Some(_) => Some(format!("Deleted {}", id)),
                None => return Err(not_found(id)),
            },
            AppCommand::List { filter } => {
                let active = self.controller.state().active_entry();
                Some(render::listing(&self.controller.listing(&filter).await, active))
            }
            AppCommand::Quality { high } => {
                let settings = self.controller.settings().await;
                self.controller
                    .update_settings(Settings {
                        high_quality: high,
                        ..settings
                    })
                    .await;
                Some(format!(
                    "Recording quality: {}",
                    if high { "high" } else { "minimal" }
                ))
            }
            AppCommand::Feedback { text } => {
                self.feedback.submit(&text)?;
                Some("Thanks for the feedback".to_string())
            }
            AppCommand::Status => {
                let state = self.controller.state();
                Some(self.describe(&state).await)
            }
            AppCommand::Help => Some(render::HELP.to_string()),
            AppCommand::Shutdown => None,
        };

        Ok(output)
    }

    async fn describe(&self, state: &SessionState) -> String {
        let active = match state.active_entry() {
            Some(id) => self
                .controller
                .listing("")
                .await
                .into_iter()
                .find(|listed| listed.entry.id == id),
            None => None,
        };
        render::describe_state(state, active.as_ref())
    }
}

#[track_caller]
fn not_found(id: i64) -> AppError {
    AppError::from(voice_memo_core::MemoError::EntryNotFound {
        id,
        location: ErrorLocation::from(Location::caller()),
    })
}

fn report(e: &AppError) {
    if e.memo().is_some_and(|memo| !memo.is_user_visible()) {
        warn!(error = ?e, "Command failed");
        return;
    }
    error!(error = ?e, "Command failed");
    println!("! {}", render::notice(e));
}
