use std::future::Future;

use tokio::task::JoinHandle;
use tracing::debug;

/// RAII owner of a background task.
///
/// Dropping the guard aborts the task, so a timer or feed can never outlive
/// the state that spawned it. A task that tears down its own owner must call
/// [`TaskGuard::detach`] instead, since aborting the running task would cancel
/// it at its next await.
pub(crate) struct TaskGuard {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TaskGuard {
    /// Spawn `future` on the current tokio runtime.
    pub(crate) fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!(task = name, "Background task spawned");
        Self {
            name,
            handle: Some(tokio::spawn(future)),
        }
    }

    /// Abort the task now.
    pub(crate) fn cancel(mut self) {
        self.abort();
    }

    /// Release ownership without aborting; the task finishes on its own.
    pub(crate) fn detach(mut self) {
        self.handle.take();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(task = self.name, "Background task cancelled");
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.abort();
    }
}
