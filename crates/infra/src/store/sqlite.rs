//! SQLite-backed document store for the desktop deployment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use tokio::sync::Mutex;

use super::{StateStore, StoreError};

/// Stores each state document as a JSON text blob in a `documents` table,
/// keyed by document key (lazy pool initialization on first use).
#[derive(Debug, Clone)]
pub struct SqliteStateStore {
    pool: Arc<Mutex<Option<SqlitePool>>>,
    db_path: PathBuf,
}

impl SqliteStateStore {
    /// Create a store for the given database file (initialized on first use).
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            pool: Arc::new(Mutex::new(None)),
            db_path,
        }
    }

    /// Resolve the default database path: `{app_data_dir}/dokon/state.db`.
    pub fn default_db_path() -> anyhow::Result<PathBuf> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .context("failed to resolve OS app data directory")?;

        let mut dir = base;
        dir.push("dokon");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory at {dir:?}"))?;

        dir.push("state.db");
        Ok(dir)
    }

    async fn ensure_initialized(&self) -> anyhow::Result<()> {
        let mut pool_guard = self.pool.lock().await;
        if pool_guard.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data directory at {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite store at {:?}", self.db_path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                doc_key  TEXT PRIMARY KEY,
                data     TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create documents table")?;

        *pool_guard = Some(pool);
        Ok(())
    }

    async fn get_pool(&self) -> anyhow::Result<SqlitePool> {
        self.ensure_initialized().await?;
        let pool_guard = self.pool.lock().await;
        pool_guard
            .as_ref()
            .cloned()
            .context("pool missing after initialization")
    }

    async fn load_inner(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let pool = self.get_pool().await?;

        let row = sqlx::query("SELECT data FROM documents WHERE doc_key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .context("failed to fetch document")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let data: String = row.try_get("data")?;
        let document =
            serde_json::from_str(&data).context("stored document is not valid JSON")?;
        Ok(Some(document))
    }

    async fn save_inner(&self, key: &str, document: &Value) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;

        let payload =
            serde_json::to_string(document).context("failed to serialize document")?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO documents (doc_key, data, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(doc_key)
            DO UPDATE SET data = excluded.data, saved_at = excluded.saved_at
            "#,
        )
        .bind(key)
        .bind(&payload)
        .bind(&now)
        .execute(&pool)
        .await
        .context("failed to upsert document")?;

        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.load_inner(key)
            .await
            .map_err(|e| StoreError::Backend(format!("{e:#}")))
    }

    async fn save(&self, key: &str, document: &Value) -> Result<(), StoreError> {
        self.save_inner(key, document)
            .await
            .map_err(|e| StoreError::Backend(format!("{e:#}")))
    }
}
