//! Debounced persistence writes.
//!
//! Rapid successive edits produce one write: the saver coalesces snapshots
//! and flushes after a short idle window. A write in flight never blocks new
//! reducer actions; a later snapshot simply supersedes an earlier one
//! (last-write-wins, acceptable because the document is atomically
//! overwritten, not patched).

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

use crate::document::FALLBACK_KEY;
use crate::store::StateStore;

/// Persistence status, for optional UI feedback. Failures surface here, not
/// as errors on the dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Idle,
    Pending,
    Synced,
    Error,
}

/// Handle to the background save task.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<Value>,
    status: watch::Receiver<SaveStatus>,
    handle: tokio::task::JoinHandle<()>,
}

impl DebouncedSaver {
    /// Default idle window before a scheduled snapshot is flushed.
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(800);

    /// Spawn the save task. Every flush writes the snapshot under `user_key`
    /// and refreshes the global fallback copy.
    pub fn spawn(store: Arc<dyn StateStore>, user_key: String, window: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);

        let handle = tokio::spawn(async move {
            let mut pending: Option<Value> = None;

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(document) => {
                            pending = Some(document);
                            let _ = status_tx.send(SaveStatus::Pending);
                        }
                        // Sender dropped: flush whatever is pending and stop.
                        None => break,
                    },
                    _ = tokio::time::sleep(window), if pending.is_some() => {
                        if let Some(document) = pending.take() {
                            flush(&store, &user_key, &document, &status_tx).await;
                        }
                    }
                }
            }

            if let Some(document) = pending.take() {
                flush(&store, &user_key, &document, &status_tx).await;
            }
        });

        Self { tx, status, handle }
    }

    /// Schedule the latest snapshot for saving. Coalesces with any snapshot
    /// already waiting.
    pub fn schedule(&self, document: Value) {
        if self.tx.send(document).is_err() {
            error!("save task is gone; state change will not be persisted");
        }
    }

    pub fn status(&self) -> SaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Flush any pending snapshot and stop the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(err) = self.handle.await {
            error!(error = %err, "save task panicked during shutdown");
        }
    }
}

async fn flush(
    store: &Arc<dyn StateStore>,
    user_key: &str,
    document: &Value,
    status_tx: &watch::Sender<SaveStatus>,
) {
    let user_save = store.save(user_key, document).await;
    let fallback_save = store.save(FALLBACK_KEY, document).await;

    match user_save.and(fallback_save) {
        Ok(()) => {
            debug!(key = user_key, "state document saved");
            let _ = status_tx.send(SaveStatus::Synced);
        }
        Err(err) => {
            error!(error = %err, key = user_key, "failed to save state document");
            let _ = status_tx.send(SaveStatus::Error);
        }
    }
}
