//! signal-cli-rest-api transport.
//!
//! Outbound calls go over REST (`/v1/...`, `/v2/send`); inbound envelopes
//! arrive on the `/v1/receive/{number}` WebSocket.
//! Docs: <https://bbernhard.github.io/signal-cli-rest-api/>

mod receive;
pub(crate) mod send;
pub(crate) mod types;
pub(crate) mod uris;


use async_trait::async_trait;
use signalbot_core::{
    config::{ConnectionMode, SignalConfig},
    error::SignalError,
    group::Group,
    message::{OutgoingMessage, ReceiptType},
    traits::{AttachmentFetcher, ContactUpdate, GroupUpdate, Transport},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use types::{AboutResponse, ApiGroup};
use uris::Uris;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one account on a signal-cli-rest-api instance.
pub struct SignalApi {
    client: reqwest::Client,
    uris: Uris,
    phone_number: String,
    mode: ConnectionMode,
    /// Scheme in use; settled by [`SignalApi::check_service`] in auto mode.
    use_https: AtomicBool,
}

impl SignalApi {
    pub fn new(service: &str, phone_number: &str, mode: ConnectionMode) -> Self {
        Self {
            client: reqwest::Client::new(),
            uris: Uris::new(service, phone_number),
            phone_number: phone_number.to_string(),
            mode,
            use_https: AtomicBool::new(mode != ConnectionMode::Http),
        }
    }

    pub fn from_config(config: &SignalConfig) -> Self {
        Self::new(&config.service, &config.phone_number, config.connection_mode)
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Whether calls currently go over HTTPS.
    pub fn https(&self) -> bool {
        self.use_https.load(Ordering::Relaxed)
    }

    /// Probe `/v1/health`. In auto mode HTTPS is tried first and the scheme
    /// that answers is kept for every later call.
    pub async fn check_service(&self) -> bool {
        match self.mode {
            ConnectionMode::Https => self.health(true).await,
            ConnectionMode::Http => self.health(false).await,
            ConnectionMode::Auto => {
                if self.health(true).await {
                    self.use_https.store(true, Ordering::Relaxed);
                    return true;
                }
                if self.health(false).await {
                    info!("signal service reachable over plain http");
                    self.use_https.store(false, Ordering::Relaxed);
                    return true;
                }
                false
            }
        }
    }

    async fn health(&self, https: bool) -> bool {
        match self
            .client
            .get(self.uris.health(https))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status() == reqwest::StatusCode::NO_CONTENT,
            Err(e) => {
                debug!("health check ({}) failed: {e}", scheme_name(https));
                false
            }
        }
    }
}

fn scheme_name(https: bool) -> &'static str {
    if https {
        "https"
    } else {
        "http"
    }
}

/// Map a non-success status to a transport error carrying the response body.
pub(crate) async fn check_status(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, SignalError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SignalError::Transport(format!("{what} got {status}: {body}")))
}

#[async_trait]
impl AttachmentFetcher for SignalApi {
    async fn fetch_attachment(&self, id: &str) -> Result<Vec<u8>, SignalError> {
        let resp = self
            .client
            .get(self.uris.attachment(self.https(), id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SignalError::Attachment(format!("fetch {id} failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SignalError::Attachment(format!("fetch {id} got {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SignalError::Attachment(format!("read {id} failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transport for SignalApi {
    fn name(&self) -> &str {
        "signal-cli-rest-api"
    }

    async fn receive(&self) -> Result<mpsc::Receiver<Result<String, SignalError>>, SignalError> {
        receive::open(&self.uris.receive_ws(self.https())).await
    }

    async fn send(&self, recipient: &str, message: &OutgoingMessage) -> Result<i64, SignalError> {
        self.send_message(recipient, message).await
    }

    async fn react(
        &self,
        recipient: &str,
        emoji: &str,
        target_author: &str,
        target_timestamp: i64,
    ) -> Result<(), SignalError> {
        self.send_reaction(recipient, emoji, target_author, target_timestamp)
            .await
    }

    async fn remote_delete(&self, recipient: &str, timestamp: i64) -> Result<i64, SignalError> {
        self.send_remote_delete(recipient, timestamp).await
    }

    async fn start_typing(&self, recipient: &str) -> Result<(), SignalError> {
        self.typing(recipient, true).await
    }

    async fn stop_typing(&self, recipient: &str) -> Result<(), SignalError> {
        self.typing(recipient, false).await
    }

    async fn receipt(
        &self,
        recipient: &str,
        receipt_type: ReceiptType,
        timestamp: i64,
    ) -> Result<(), SignalError> {
        self.send_receipt(recipient, receipt_type, timestamp).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>, SignalError> {
        let resp = self
            .client
            .get(self.uris.groups(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("list groups failed: {e}")))?;
        let resp = check_status(resp, "list groups").await?;
        let groups: Vec<ApiGroup> = resp
            .json()
            .await
            .map_err(|e| SignalError::Transport(format!("list groups parse failed: {e}")))?;
        Ok(groups.into_iter().map(into_group).collect())
    }

    async fn delete_attachment(&self, id: &str) -> Result<(), SignalError> {
        let resp = self
            .client
            .delete(self.uris.attachment(self.https(), id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SignalError::Attachment(format!("delete {id} failed: {e}")))?;
        check_status(resp, "delete attachment").await?;
        Ok(())
    }

    async fn update_contact(
        &self,
        recipient: &str,
        update: &ContactUpdate,
    ) -> Result<(), SignalError> {
        self.put_contact(recipient, update).await
    }

    async fn update_group(&self, group_id: &str, update: &GroupUpdate) -> Result<(), SignalError> {
        self.put_group(group_id, update).await
    }

    async fn is_available(&self) -> bool {
        self.check_service().await
    }

    async fn version(&self) -> Result<Option<String>, SignalError> {
        let resp = self
            .client
            .get(self.uris.about(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("about failed: {e}")))?;
        let resp = check_status(resp, "about").await?;
        let about: AboutResponse = resp
            .json()
            .await
            .map_err(|e| SignalError::Transport(format!("about parse failed: {e}")))?;
        Ok(about.version)
    }
}

pub(crate) fn into_group(group: ApiGroup) -> Group {
    Group {
        id: group.id,
        internal_id: group.internal_id,
        name: group.name.unwrap_or_default(),
    }
}
