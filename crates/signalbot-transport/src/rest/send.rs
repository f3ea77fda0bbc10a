//! Outbound REST calls.

use super::types::{
    ContactRequest, GroupUpdateRequest, LinkPreviewBody, MentionBody, ReactionRequest,
    ReceiptRequest, RecipientRequest, RemoteDeleteRequest, SendRequest, TimestampResponse,
};
use super::{check_status, SignalApi, REQUEST_TIMEOUT};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use signalbot_core::{
    error::SignalError,
    message::{Mention, OutgoingMessage, ReceiptType, TextMode},
    traits::{ContactUpdate, GroupUpdate},
};
use tracing::debug;

/// Build the `/v2/send` body for one recipient.
pub(crate) fn build_send_request(
    number: &str,
    recipient: &str,
    message: &OutgoingMessage,
) -> SendRequest {
    let quote = message.quote.as_ref();
    SendRequest {
        base64_attachments: message.attachments.iter().map(|a| STANDARD.encode(a)).collect(),
        message: message.text.clone(),
        number: number.to_string(),
        recipients: vec![recipient.to_string()],
        quote_author: quote.map(|q| q.author.clone()),
        quote_mentions: quote
            .map(|q| q.mentions.iter().filter_map(mention_body).collect())
            .unwrap_or_default(),
        quote_message: quote.map(|q| q.text.clone()),
        quote_timestamp: quote.map(|q| q.timestamp),
        mentions: message.mentions.iter().filter_map(mention_body).collect(),
        text_mode: message.text_mode.map(|mode| match mode {
            TextMode::Normal => "normal".to_string(),
            TextMode::Styled => "styled".to_string(),
        }),
        edit_timestamp: message.edit_timestamp,
        link_preview: message.link_preview.as_ref().map(|p| LinkPreviewBody {
            base64_thumbnail: p.thumbnail.as_ref().map(|t| STANDARD.encode(t)),
            title: p.title.clone(),
            description: p.description.clone(),
            url: p.url.clone(),
        }),
        view_once: message.view_once,
    }
}

/// Outbound mentions address the user by uuid, falling back to number.
fn mention_body(mention: &Mention) -> Option<MentionBody> {
    let author = mention.uuid.as_ref().or(mention.number.as_ref())?;
    Some(MentionBody {
        author: author.clone(),
        start: mention.start,
        length: mention.length,
    })
}

impl SignalApi {
    pub(crate) async fn send_message(
        &self,
        recipient: &str,
        message: &OutgoingMessage,
    ) -> Result<i64, SignalError> {
        let body = build_send_request(&self.phone_number, recipient, message);
        let resp = self
            .client
            .post(self.uris.send(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("send failed: {e}")))?;
        let resp = check_status(resp, "send").await?;
        let sent: TimestampResponse = resp
            .json()
            .await
            .map_err(|e| SignalError::Transport(format!("send response parse failed: {e}")))?;
        debug!("sent message to {recipient} at {}", sent.timestamp);
        Ok(sent.timestamp)
    }

    pub(crate) async fn send_reaction(
        &self,
        recipient: &str,
        emoji: &str,
        target_author: &str,
        target_timestamp: i64,
    ) -> Result<(), SignalError> {
        let body = ReactionRequest {
            recipient,
            reaction: emoji,
            target_author,
            timestamp: target_timestamp,
        };
        let resp = self
            .client
            .post(self.uris.reactions(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("react failed: {e}")))?;
        check_status(resp, "react").await?;
        Ok(())
    }

    pub(crate) async fn send_receipt(
        &self,
        recipient: &str,
        receipt_type: ReceiptType,
        timestamp: i64,
    ) -> Result<(), SignalError> {
        let body = ReceiptRequest {
            recipient,
            receipt_type: receipt_type.as_str(),
            timestamp,
        };
        let resp = self
            .client
            .post(self.uris.receipts(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("receipt failed: {e}")))?;
        check_status(resp, "receipt").await?;
        Ok(())
    }

    /// PUT starts the indicator, DELETE stops it.
    pub(crate) async fn typing(&self, recipient: &str, start: bool) -> Result<(), SignalError> {
        let uri = self.uris.typing_indicator(self.https());
        let request = if start {
            self.client.put(uri)
        } else {
            self.client.delete(uri)
        };
        let resp = request
            .timeout(REQUEST_TIMEOUT)
            .json(&RecipientRequest { recipient })
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("typing indicator failed: {e}")))?;
        check_status(resp, "typing indicator").await?;
        Ok(())
    }

    pub(crate) async fn send_remote_delete(
        &self,
        recipient: &str,
        timestamp: i64,
    ) -> Result<i64, SignalError> {
        let resp = self
            .client
            .delete(self.uris.remote_delete(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .json(&RemoteDeleteRequest {
                recipient,
                timestamp,
            })
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("remote delete failed: {e}")))?;
        let resp = check_status(resp, "remote delete").await?;
        let deleted: TimestampResponse = resp.json().await.map_err(|e| {
            SignalError::Transport(format!("remote delete response parse failed: {e}"))
        })?;
        Ok(deleted.timestamp)
    }

    pub(crate) async fn put_contact(
        &self,
        recipient: &str,
        update: &ContactUpdate,
    ) -> Result<(), SignalError> {
        let body = ContactRequest {
            recipient,
            name: update.name.as_deref(),
            expiration_in_seconds: update.expiration_in_seconds,
        };
        let resp = self
            .client
            .put(self.uris.contacts(self.https()))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("update contact failed: {e}")))?;
        check_status(resp, "update contact").await?;
        Ok(())
    }

    pub(crate) async fn put_group(
        &self,
        group_id: &str,
        update: &GroupUpdate,
    ) -> Result<(), SignalError> {
        let body = group_update_request(update);
        let resp = self
            .client
            .put(self.uris.group(self.https(), group_id))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignalError::Transport(format!("update group failed: {e}")))?;
        check_status(resp, "update group").await?;
        Ok(())
    }
}

pub(crate) fn group_update_request(update: &GroupUpdate) -> GroupUpdateRequest<'_> {
    GroupUpdateRequest {
        base64_avatar: update.avatar.as_ref().map(|a| STANDARD.encode(a)),
        description: update.description.as_deref(),
        expiration_time: update.expiration_in_seconds,
        name: update.name.as_deref(),
    }
}
