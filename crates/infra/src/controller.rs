//! The single owner of the application state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, info};

use dokon_ledger::{reduce, Action, AppState, Applied};

use crate::document::{decode_state, user_key, FALLBACK_KEY};
use crate::saver::{DebouncedSaver, SaveStatus};
use crate::store::StateStore;

/// Owns the in-memory [`AppState`] and serializes every mutation.
///
/// All reducer calls go through [`ShopController::dispatch`], which holds the
/// write lock for the duration of the (synchronous, cheap) reduce call; this
/// is the event-loop analogue of the historical single-threaded host.
/// Persistence is scheduled on the debounced saver and never blocks dispatch.
pub struct ShopController {
    state: RwLock<AppState>,
    saver: DebouncedSaver,
}

impl ShopController {
    /// Load the owner's document (falling back to the global copy, then to
    /// defaults) and start the save task.
    ///
    /// Load failures are logged and treated as "no data": the shop starts
    /// empty rather than refusing to start.
    pub async fn load(
        store: Arc<dyn StateStore>,
        owner: &str,
        window: Duration,
    ) -> Self {
        let key = user_key(owner);

        let document = match store.load(&key).await {
            Ok(Some(document)) => Some(document),
            Ok(None) => match store.load(FALLBACK_KEY).await {
                Ok(document) => document,
                Err(err) => {
                    error!(error = %err, "failed to load fallback state document");
                    None
                }
            },
            Err(err) => {
                error!(error = %err, key, "failed to load state document");
                None
            }
        };

        let state = match document {
            Some(document) => decode_state(document),
            None => {
                info!(key, "no stored state document; starting empty");
                AppState::default()
            }
        };

        Self {
            state: RwLock::new(state),
            saver: DebouncedSaver::spawn(store, key, window),
        }
    }

    /// Apply one action. On a real change the new snapshot is scheduled for a
    /// debounced save; identity no-ops schedule nothing.
    pub async fn dispatch(&self, action: Action) -> Applied {
        let mut state = self.state.write().await;
        let applied = reduce(&mut state, &action);

        if applied.is_changed() {
            match serde_json::to_value(&*state) {
                Ok(document) => self.saver.schedule(document),
                Err(err) => error!(error = %err, "failed to encode state document"),
            }
        }

        applied
    }

    /// Read-only copy of the current state for reporting/rendering layers.
    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Run a read-only closure against the current state without cloning it.
    pub async fn with_state<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&*self.state.read().await)
    }

    /// Effective capability set for a username (protected admins resolve to
    /// all-true, unknown usernames to all-false).
    pub async fn capabilities(&self, username: &str) -> dokon_accounts::PermissionSet {
        let state = self.state.read().await;
        dokon_accounts::capabilities(&state.accounts, username)
    }

    pub fn save_status(&self) -> SaveStatus {
        self.saver.status()
    }

    /// Flush any pending save and stop the background task.
    pub async fn shutdown(self) {
        self.saver.shutdown().await;
    }
}
