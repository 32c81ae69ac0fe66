use crate::{store::PersistenceGateway, task::TaskGuard};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    revision: u64,
    bytes: Option<Arc<Vec<u8>>>,
}

/// Background writer for one store key.
///
/// Callers hand over the freshly serialized snapshot and move on; the writer
/// task stores snapshots in submission order and skips any that were already
/// superseded, so the last write always wins. Write failures are logged.
pub(crate) struct PersistWriter {
    key: &'static str,
    revision: u64,
    snapshot_tx: watch::Sender<Snapshot>,
    written_rx: watch::Receiver<u64>,
    _task: TaskGuard,
}

impl PersistWriter {
    /// Spawn the writer task for `key`.
    pub(crate) fn spawn(gateway: Arc<dyn PersistenceGateway>, key: &'static str) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (written_tx, written_rx) = watch::channel(0u64);

        let task = TaskGuard::spawn(
            "persist-writer",
            Self::run(gateway, key, snapshot_rx, written_tx),
        );

        Self {
            key,
            revision: 0,
            snapshot_tx,
            written_rx,
            _task: task,
        }
    }

    /// Serialize `value` and queue it for storage.
    pub(crate) fn submit<T: Serialize + ?Sized>(&mut self, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = self.key, error = %e, "Failed to serialize value, not persisted");
                return;
            }
        };

        self.revision += 1;
        self.snapshot_tx.send_replace(Snapshot {
            revision: self.revision,
            bytes: Some(Arc::new(bytes)),
        });
    }

    /// Wait until the latest submitted snapshot has been handed to the gateway.
    ///
    /// Returns immediately if nothing was submitted or the writer is gone.
    pub(crate) async fn flush(&self) {
        let target = self.revision;
        let mut written_rx = self.written_rx.clone();
        if written_rx.wait_for(|written| *written >= target).await.is_err() {
            warn!(key = self.key, "Persist writer stopped before flush completed");
        }
    }

    async fn run(
        gateway: Arc<dyn PersistenceGateway>,
        key: &'static str,
        mut snapshot_rx: watch::Receiver<Snapshot>,
        written_tx: watch::Sender<u64>,
    ) {
        while snapshot_rx.changed().await.is_ok() {
            let snapshot = snapshot_rx.borrow_and_update().clone();
            let Some(bytes) = snapshot.bytes else {
                continue;
            };

            match gateway.set(key, bytes.as_ref().clone()).await {
                Ok(()) => debug!(key, revision = snapshot.revision, "Snapshot persisted"),
                Err(e) => warn!(
                    key,
                    revision = snapshot.revision,
                    error = ?e,
                    "Failed to persist snapshot, in-memory state kept"
                ),
            }

            written_tx.send_replace(snapshot.revision);
        }
    }
}
