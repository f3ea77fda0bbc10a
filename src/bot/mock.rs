//! Scripted in-process transport for tests.

use async_trait::async_trait;
use signalbot_core::{
    error::SignalError,
    group::Group,
    message::{OutgoingMessage, ReceiptType},
    traits::{AttachmentFetcher, Transport},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// In-process transport: inbound payloads are injected by the test,
/// outbound calls are recorded.
#[derive(Default)]
pub(crate) struct MockTransport {
    pub(crate) groups: Mutex<Vec<Group>>,
    pub(crate) streams: Mutex<Vec<mpsc::Sender<Result<String, SignalError>>>>,
    pub(crate) sent: Mutex<Vec<(String, OutgoingMessage)>>,
    pub(crate) reactions: Mutex<Vec<(String, String, String, i64)>>,
    pub(crate) receipts: Mutex<Vec<(String, ReceiptType, i64)>>,
    pub(crate) version: Mutex<Option<String>>,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) receive_calls: AtomicUsize,
    pub(crate) typing: Mutex<Vec<(String, bool)>>,
    pub(crate) deleted_attachments: Mutex<Vec<String>>,
}

impl MockTransport {
    pub(crate) fn with_groups(groups: Vec<Group>) -> Arc<Self> {
        let mock = Self::default();
        *mock.groups.lock().unwrap() = groups;
        Arc::new(mock)
    }

    /// Deliver a payload on the most recently opened stream.
    pub(crate) fn inject(&self, raw: String) {
        let streams = self.streams.lock().unwrap();
        let tx = streams.last().expect("no open stream");
        tx.try_send(Ok(raw)).unwrap();
    }

    /// Push a receive error on the most recently opened stream.
    pub(crate) fn fail_stream(&self, reason: &str) {
        let streams = self.streams.lock().unwrap();
        let tx = streams.last().expect("no open stream");
        tx.try_send(Err(SignalError::Receive(reason.to_string())))
            .unwrap();
    }

    /// Drop every open stream sender, ending the streams.
    pub(crate) fn close_streams(&self) {
        self.streams.lock().unwrap().clear();
    }

    pub(crate) fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttachmentFetcher for MockTransport {
    async fn fetch_attachment(&self, id: &str) -> Result<Vec<u8>, SignalError> {
        Ok(id.as_bytes().to_vec())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn receive(&self) -> Result<mpsc::Receiver<Result<String, SignalError>>, SignalError> {
        let (tx, rx) = mpsc::channel(64);
        self.streams.lock().unwrap().push(tx);
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        Ok(rx)
    }

    async fn send(&self, recipient: &str, message: &OutgoingMessage) -> Result<i64, SignalError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((recipient.to_string(), message.clone()));
        Ok(1_700_000_000_000 + sent.len() as i64)
    }

    async fn react(
        &self,
        recipient: &str,
        emoji: &str,
        target_author: &str,
        target_timestamp: i64,
    ) -> Result<(), SignalError> {
        self.reactions.lock().unwrap().push((
            recipient.to_string(),
            emoji.to_string(),
            target_author.to_string(),
            target_timestamp,
        ));
        Ok(())
    }

    async fn remote_delete(&self, _recipient: &str, _timestamp: i64) -> Result<i64, SignalError> {
        Ok(1_700_000_000_999)
    }

    async fn start_typing(&self, recipient: &str) -> Result<(), SignalError> {
        self.typing
            .lock()
            .unwrap()
            .push((recipient.to_string(), true));
        Ok(())
    }

    async fn stop_typing(&self, recipient: &str) -> Result<(), SignalError> {
        self.typing
            .lock()
            .unwrap()
            .push((recipient.to_string(), false));
        Ok(())
    }

    async fn receipt(
        &self,
        recipient: &str,
        receipt_type: ReceiptType,
        timestamp: i64,
    ) -> Result<(), SignalError> {
        self.receipts
            .lock()
            .unwrap()
            .push((recipient.to_string(), receipt_type, timestamp));
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, SignalError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn delete_attachment(&self, id: &str) -> Result<(), SignalError> {
        self.deleted_attachments.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn version(&self) -> Result<Option<String>, SignalError> {
        Ok(self.version.lock().unwrap().clone())
    }
}
