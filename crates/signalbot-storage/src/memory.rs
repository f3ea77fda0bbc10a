use crate::{missing_key, Storage};
use async_trait::async_trait;
use serde_json::Value;
use signalbot_core::error::SignalError;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local storage. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn exists(&self, key: &str) -> Result<bool, SignalError> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Value, SignalError> {
        let entries = self.entries.read().await;
        let raw = entries.get(key).ok_or_else(|| missing_key("in-memory", key))?;
        Ok(serde_json::from_str(raw)?)
    }

    async fn save(&self, key: &str, value: &Value) -> Result<(), SignalError> {
        // Stored serialized so reads hand out independent copies.
        let raw = serde_json::to_string(value)?;
        self.entries.write().await.insert(key.to_string(), raw);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SignalError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
