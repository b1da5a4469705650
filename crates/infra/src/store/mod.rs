//! Key-value persistence backend for the state document.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryStateStore;
pub use sqlite::SqliteStateStore;

/// Persistence backend failure.
///
/// Callers treat a load failure as "no data" and a save failure as "not
/// saved" (surfaced through [`crate::saver::SaveStatus`]), never as a reason
/// to stop serving the in-memory state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Load/save a JSON document by key.
///
/// The document granularity is the whole application state: saves atomically
/// overwrite the previous document (last-write-wins), there are no partial
/// updates.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn save(&self, key: &str, document: &Value) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        (**self).save(key, document).await
    }
}
