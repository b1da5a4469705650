use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use super::{StateStore, StoreError};

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents (test helper).
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(documents.get(key).cloned())
    }

    async fn save(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        documents.insert(key.to_string(), document.clone());
        Ok(())
    }
}
