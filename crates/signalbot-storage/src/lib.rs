//! # signalbot-storage
//!
//! Key-value persistence for bot commands. Values are JSON documents.

mod memory;
mod redis_store;
mod sqlite;


pub use memory::InMemoryStorage;
pub use redis_store::RedisStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use serde_json::Value;
use signalbot_core::{config::StorageConfig, error::SignalError};
use std::sync::Arc;
use tracing::info;

/// Persistent key-value store shared by all commands.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, SignalError>;

    /// Read a stored value. A missing key is an error.
    async fn read(&self, key: &str) -> Result<Value, SignalError>;

    async fn save(&self, key: &str, value: &Value) -> Result<(), SignalError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), SignalError>;
}

/// Open the backend selected by config.
pub async fn build(config: &StorageConfig) -> Result<Arc<dyn Storage>, SignalError> {
    let storage: Arc<dyn Storage> = match config {
        StorageConfig::InMemory => Arc::new(InMemoryStorage::new()),
        StorageConfig::Sqlite { sqlite_db } => Arc::new(SqliteStorage::open(sqlite_db).await?),
        StorageConfig::Redis {
            redis_host,
            redis_port,
        } => Arc::new(RedisStorage::connect(redis_host, *redis_port).await?),
    };
    info!("storage backend ready: {config:?}");
    Ok(storage)
}

pub(crate) fn missing_key(backend: &str, key: &str) -> SignalError {
    SignalError::Storage(format!("{backend} load failed: no value for key '{key}'"))
}
