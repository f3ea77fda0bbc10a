use crate::{missing_key, Storage};
use async_trait::async_trait;
use serde_json::Value;
use signalbot_core::{error::SignalError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// SQLite-backed storage: one `kv` table of JSON text.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) the database file and ensure the schema exists.
    pub async fn open(path: &str) -> Result<Self, SignalError> {
        let db_path = shellexpand(path);

        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SignalError::Storage(format!("failed to create storage dir: {e}"))
                })?;
            }
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| SignalError::Storage(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| SignalError::Storage(format!("failed to connect to sqlite: {e}")))?;

        let storage = Self::with_pool(pool).await?;
        info!("sqlite storage initialized at {db_path}");
        Ok(storage)
    }

    /// Wrap an existing pool, creating the table if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, SignalError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| SignalError::Storage(format!("migration failed: {e}")))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn exists(&self, key: &str) -> Result<bool, SignalError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SignalError::Storage(format!("sqlite exists failed: {e}")))?;
        Ok(row.is_some())
    }

    async fn read(&self, key: &str) -> Result<Value, SignalError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SignalError::Storage(format!("sqlite load failed: {e}")))?;
        let (raw,) = row.ok_or_else(|| missing_key("sqlite", key))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), SignalError> {
        let raw = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
        )
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(|e| SignalError::Storage(format!("sqlite save failed: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SignalError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| SignalError::Storage(format!("sqlite delete failed: {e}")))?;
        Ok(())
    }
}
