use crate::{
    error::SignalError,
    group::Group,
    message::{OutgoingMessage, ReceiptType},
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Downloads attachment and link-preview contents by their local id.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch_attachment(&self, id: &str) -> Result<Vec<u8>, SignalError>;
}

/// Changes to apply to a contact.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub expiration_in_seconds: Option<u32>,
}

/// Changes to apply to a group.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<Vec<u8>>,
    pub expiration_in_seconds: Option<u32>,
}

/// Messenger transport, the bot's only link to the signal service.
///
/// Addresses passed to outbound calls are already resolved (phone number,
/// uuid, username, or public group id).
#[async_trait]
pub trait Transport: AttachmentFetcher {
    /// Human-readable transport name.
    fn name(&self) -> &str;

    /// Open the inbound stream of raw envelopes.
    ///
    /// The receiver yields one item per payload. An `Err` item, or the
    /// channel closing, means the connection is gone.
    async fn receive(&self) -> Result<mpsc::Receiver<Result<String, SignalError>>, SignalError>;

    /// Send a message and return its timestamp.
    async fn send(&self, recipient: &str, message: &OutgoingMessage) -> Result<i64, SignalError>;

    /// React to a message identified by author and timestamp.
    async fn react(
        &self,
        recipient: &str,
        emoji: &str,
        target_author: &str,
        target_timestamp: i64,
    ) -> Result<(), SignalError>;

    /// Delete a previously sent message for everyone. Returns the delete's timestamp.
    async fn remote_delete(&self, recipient: &str, timestamp: i64) -> Result<i64, SignalError>;

    async fn start_typing(&self, recipient: &str) -> Result<(), SignalError>;

    async fn stop_typing(&self, recipient: &str) -> Result<(), SignalError>;

    /// Send a read or viewed receipt for a message.
    async fn receipt(
        &self,
        recipient: &str,
        receipt_type: ReceiptType,
        timestamp: i64,
    ) -> Result<(), SignalError>;

    /// List every group the account is a member of.
    async fn list_groups(&self) -> Result<Vec<Group>, SignalError>;

    /// Remove a downloaded attachment from the signal service.
    async fn delete_attachment(&self, _id: &str) -> Result<(), SignalError> {
        Ok(())
    }

    async fn update_contact(
        &self,
        _recipient: &str,
        _update: &ContactUpdate,
    ) -> Result<(), SignalError> {
        Ok(())
    }

    async fn update_group(&self, _group_id: &str, _update: &GroupUpdate) -> Result<(), SignalError> {
        Ok(())
    }

    /// Whether the signal service is reachable.
    async fn is_available(&self) -> bool {
        true
    }

    /// Version string of the signal service, if it reports one.
    async fn version(&self) -> Result<Option<String>, SignalError> {
        Ok(None)
    }
}
