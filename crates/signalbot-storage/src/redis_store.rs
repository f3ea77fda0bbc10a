use crate::{missing_key, Storage};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use signalbot_core::error::SignalError;
use tracing::info;

/// Redis-backed storage using database 0.
#[derive(Clone)]
pub struct RedisStorage {
    connection: ConnectionManager,
}

impl RedisStorage {
    pub async fn connect(host: &str, port: u16) -> Result<Self, SignalError> {
        let url = format!("redis://{host}:{port}/0");
        let client = redis::Client::open(url.as_str())
            .map_err(|e| SignalError::Storage(format!("invalid redis address {url}: {e}")))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| SignalError::Storage(format!("failed to connect to redis: {e}")))?;
        info!("redis storage connected at {host}:{port}");
        Ok(Self { connection })
    }
}

fn redis_err(op: &str, e: redis::RedisError) -> SignalError {
    SignalError::Storage(format!("redis {op} failed: {e}"))
}

#[async_trait]
impl Storage for RedisStorage {
    async fn exists(&self, key: &str) -> Result<bool, SignalError> {
        let mut conn = self.connection.clone();
        conn.exists(key).await.map_err(|e| redis_err("exists", e))
    }

    async fn read(&self, key: &str) -> Result<Value, SignalError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(key).await.map_err(|e| redis_err("load", e))?;
        let raw = raw.ok_or_else(|| missing_key("redis", key))?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), SignalError> {
        let raw = serde_json::to_string(value)?;
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(key, raw)
            .await
            .map_err(|e| redis_err("save", e))
    }

    async fn delete(&self, key: &str) -> Result<(), SignalError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key).await.map_err(|e| redis_err("delete", e))
    }
}
