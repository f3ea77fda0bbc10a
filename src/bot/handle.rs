//! Outbound operations shared by the bot and every handler context.

use super::registry::Registry;
use super::resolver::Resolver;
use signalbot_core::{
    error::SignalError,
    message::{Message, OutgoingMessage, ReceiptType},
    traits::{ContactUpdate, GroupUpdate, Transport},
};
use signalbot_storage::Storage;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Cheap-to-clone handle to the transport, resolver, storage and registry.
///
/// Every outbound address goes through the [`Resolver`] first.
#[derive(Clone)]
pub struct BotHandle {
    transport: Arc<dyn Transport>,
    resolver: Resolver,
    storage: Arc<dyn Storage>,
    registry: Arc<RwLock<Registry>>,
}

impl BotHandle {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        resolver: Resolver,
        storage: Arc<dyn Storage>,
        registry: Arc<RwLock<Registry>>,
    ) -> Self {
        Self {
            transport,
            resolver,
            storage,
            registry,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Help lines of the registered commands.
    pub async fn describe_commands(&self) -> Vec<String> {
        self.registry.read().await.descriptions()
    }

    /// Send a message and return its timestamp.
    pub async fn send(
        &self,
        receiver: &str,
        message: &OutgoingMessage,
    ) -> Result<i64, SignalError> {
        let receiver = self.resolver.resolve(receiver)?;
        let timestamp = self.transport.send(&receiver, message).await?;
        info!("New message {timestamp} sent to {receiver}");
        Ok(timestamp)
    }

    /// React to `message` in the chat it came from.
    pub async fn react(&self, message: &Message, emoji: &str) -> Result<(), SignalError> {
        let recipient = self.resolver.resolve(message.recipient())?;
        self.transport
            .react(&recipient, emoji, &message.source, message.timestamp)
            .await?;
        info!("New reaction: {emoji}");
        Ok(())
    }

    /// Send a receipt for `message`. Group chats do not support receipts;
    /// those are skipped with a warning.
    pub async fn receipt(
        &self,
        message: &Message,
        receipt_type: ReceiptType,
    ) -> Result<(), SignalError> {
        if message.is_group() {
            warn!("Receipts are not supported for groups");
            return Ok(());
        }
        let recipient = self.resolver.resolve(message.recipient())?;
        self.transport
            .receipt(&recipient, receipt_type, message.timestamp)
            .await?;
        info!("Receipt: {}", receipt_type.as_str());
        Ok(())
    }

    pub async fn start_typing(&self, receiver: &str) -> Result<(), SignalError> {
        let receiver = self.resolver.resolve(receiver)?;
        self.transport.start_typing(&receiver).await
    }

    pub async fn stop_typing(&self, receiver: &str) -> Result<(), SignalError> {
        let receiver = self.resolver.resolve(receiver)?;
        self.transport.stop_typing(&receiver).await
    }

    /// Delete a sent message for everyone. Returns the delete's timestamp.
    pub async fn remote_delete(&self, receiver: &str, timestamp: i64) -> Result<i64, SignalError> {
        let receiver = self.resolver.resolve(receiver)?;
        let deleted = self.transport.remote_delete(&receiver, timestamp).await?;
        info!("Deleted message with timestamp {timestamp}");
        Ok(deleted)
    }

    pub async fn update_contact(
        &self,
        receiver: &str,
        update: &ContactUpdate,
    ) -> Result<(), SignalError> {
        let receiver = self.resolver.resolve(receiver)?;
        self.transport.update_contact(&receiver, update).await
    }

    pub async fn update_group(&self, group: &str, update: &GroupUpdate) -> Result<(), SignalError> {
        let group_id = self.resolver.resolve(group)?;
        self.transport.update_group(&group_id, update).await
    }

    /// Remove a downloaded attachment from the signal service.
    pub async fn delete_attachment(&self, local_ref: &str) -> Result<(), SignalError> {
        self.transport.delete_attachment(local_ref).await
    }
}
