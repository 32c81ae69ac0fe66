//! Line-oriented console input.
//!
//! Stdin is read on a blocking task; each line is parsed into an
//! [`AppCommand`] and forwarded to the application over a channel. EOF is
//! treated as a shutdown request.

use crate::{AppCommand, render};

use std::io::{self, BufRead, Write};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

/// Console reader forwarding parsed commands to the application.
pub struct ConsoleInput {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleInput {
    /// Create a reader that sends into `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Read stdin until EOF or until the application stops listening.
    ///
    /// The task blocks in `read_line`, so it cannot be joined on shutdown;
    /// the runtime abandons it on exit.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            self.forward_lines(stdin.lock(), &mut stdout);
        })
    }

    /// Parse every line of `reader` and forward it. Parse errors are written
    /// to `notices` and reading continues.
    ///
    /// Must run outside the async runtime (uses `blocking_send`).
    pub fn forward_lines<R: BufRead>(&self, reader: R, notices: &mut dyn Write) {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Failed to read console input");
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<AppCommand>() {
                Ok(command) => command,
                Err(e) => {
                    debug!(error = ?e, "Rejected console line");
                    let _ = writeln!(notices, "! {}", render::notice(&e));
                    continue;
                }
            };

            let shutdown = command == AppCommand::Shutdown;
            if self.command_tx.blocking_send(command).is_err() {
                debug!("Application stopped listening, console input ends");
                return;
            }
            if shutdown {
                return;
            }
        }

        info!("Console input closed, requesting shutdown");
        let _ = self.command_tx.blocking_send(AppCommand::Shutdown);
    }
}
