//! Per-message handler context.

use super::handle::BotHandle;
use signalbot_core::{
    error::SignalError,
    message::{Message, OutgoingMessage, QuoteRef, ReceiptType},
};
use signalbot_storage::Storage;
use std::sync::Arc;

/// What a handler gets for one matched message: the message itself and
/// helpers that answer in the chat it came from.
pub struct Context {
    pub message: Message,
    bot: BotHandle,
}

impl Context {
    pub fn new(message: Message, bot: BotHandle) -> Self {
        Self { message, bot }
    }

    pub fn bot(&self) -> &BotHandle {
        &self.bot
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        self.bot.storage()
    }

    pub async fn send(&self, text: &str) -> Result<i64, SignalError> {
        self.send_message(&OutgoingMessage::text(text)).await
    }

    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<i64, SignalError> {
        self.bot.send(self.message.recipient(), message).await
    }

    /// Send `text` quoting the originating message.
    pub async fn reply(&self, text: &str) -> Result<i64, SignalError> {
        let mut outgoing = OutgoingMessage::text(text);
        outgoing.quote = Some(QuoteRef::from_message(&self.message));
        self.send_message(&outgoing).await
    }

    /// Replace the text of a message previously sent to this chat.
    pub async fn edit(&self, text: &str, edit_timestamp: i64) -> Result<i64, SignalError> {
        let mut outgoing = OutgoingMessage::text(text);
        outgoing.edit_timestamp = Some(edit_timestamp);
        self.send_message(&outgoing).await
    }

    pub async fn react(&self, emoji: &str) -> Result<(), SignalError> {
        self.bot.react(&self.message, emoji).await
    }

    pub async fn receipt(&self, receipt_type: ReceiptType) -> Result<(), SignalError> {
        self.bot.receipt(&self.message, receipt_type).await
    }

    pub async fn start_typing(&self) -> Result<(), SignalError> {
        self.bot.start_typing(self.message.recipient()).await
    }

    pub async fn stop_typing(&self) -> Result<(), SignalError> {
        self.bot.stop_typing(self.message.recipient()).await
    }

    pub async fn remote_delete(&self, timestamp: i64) -> Result<i64, SignalError> {
        self.bot
            .remote_delete(self.message.recipient(), timestamp)
            .await
    }
}
