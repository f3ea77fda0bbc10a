//! Envelope decoding: raw signal-cli-rest-api payloads into [`Message`]s.
//!
//! Classification is positional: the first recognized wrapper decides the
//! variant, then the resolved body may be refined into a delete or group
//! update. Anything unrecognized becomes [`UnknownFormat`].


use crate::{
    error::UnknownFormat,
    message::{LinkPreview, Mention, Message, MessageType, Quote, ReadReceipt},
    traits::AttachmentFetcher,
};
use futures_util::future::join_all;
use serde_json::{json, Value};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Variant plus the body that fields are extracted from.
struct Classified<'a> {
    kind: MessageType,
    body: Cow<'a, Value>,
    target_sent_timestamp: Option<i64>,
    remote_delete_timestamp: Option<i64>,
    updated_group_id: Option<String>,
}

/// Decode one raw payload.
///
/// With a `fetcher`, attachments and link-preview thumbnails are downloaded
/// and `view_once` is read; without one those fields stay empty.
pub async fn decode(
    raw: &str,
    fetcher: Option<&dyn AttachmentFetcher>,
) -> Result<Message, UnknownFormat> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| UnknownFormat::new(format!("payload is not json: {e}")))?;

    let envelope = root
        .get("envelope")
        .filter(|e| e.is_object())
        .ok_or_else(|| UnknownFormat::new("missing envelope"))?;

    let source = required_str(envelope, "source")?;
    let source_uuid = required_str(envelope, "sourceUuid")?;
    let timestamp = envelope
        .get("timestamp")
        .and_then(as_timestamp)
        .ok_or_else(|| UnknownFormat::new("missing envelope timestamp"))?;
    let source_number = envelope
        .get("sourceNumber")
        .and_then(Value::as_str)
        .map(str::to_string);

    let classified = classify(envelope)?;
    let body: &Value = &classified.body;

    let mut message = Message::new(&source, &source_uuid, timestamp, classified.kind);
    message.source_number = source_number;
    message.text = parse_text(body)?;
    message.group = body
        .get("groupInfo")
        .and_then(|g| g.get("groupId"))
        .and_then(Value::as_str)
        .map(str::to_string);
    message.reaction = body
        .get("reaction")
        .and_then(|r| r.get("emoji"))
        .and_then(Value::as_str)
        .map(str::to_string);
    message.mentions = parse_mentions(body);
    message.quote = parse_quote(body);
    message.read_receipts = parse_read_receipts(body);
    message.target_sent_timestamp = classified.target_sent_timestamp;
    message.remote_delete_timestamp = classified.remote_delete_timestamp;
    message.updated_group_id = classified.updated_group_id;

    if let Some(fetcher) = fetcher {
        let ids = attachment_ids(body);
        let ((local_refs, attachments), previews) =
            tokio::join!(fetch_attachments(fetcher, &ids), parse_previews(fetcher, body));
        message.attachments = attachments;
        message.attachment_local_refs = local_refs;
        message.link_previews = previews;
        message.view_once = body
            .get("viewOnce")
            .and_then(Value::as_bool)
            .unwrap_or(false);
    }

    message.raw_payload = Some(raw.to_string());
    Ok(message)
}

fn classify(envelope: &Value) -> Result<Classified<'_>, UnknownFormat> {
    let mut target_sent_timestamp = None;

    let (mut kind, body) = if let Some(sync) = envelope.get("syncMessage") {
        if sync.as_object().map_or(true, |o| o.is_empty()) {
            // Linked devices emit these as no-ops.
            return Err(UnknownFormat::new("empty sync message"));
        }

        if let Some(read) = sync.get("readMessages") {
            (
                MessageType::Read,
                Cow::Owned(json!({ "message": "", "readMessages": read })),
            )
        } else if let Some(sync_type) = sync.get("type") {
            if sync_type.as_str() != Some("CONTACTS_SYNC") {
                return Err(UnknownFormat::new(format!(
                    "unsupported sync message type {sync_type}"
                )));
            }
            target_sent_timestamp = envelope.get("timestamp").and_then(as_timestamp);
            (MessageType::ContactSync, Cow::Owned(json!({ "message": "" })))
        } else {
            let sent = sync
                .get("sentMessage")
                .ok_or_else(|| UnknownFormat::new("sync message without sentMessage"))?;
            match sent.get("editMessage") {
                Some(edit) => {
                    let (target, inner) = unwrap_edit(edit)?;
                    target_sent_timestamp = Some(target);
                    (MessageType::Edit, Cow::Borrowed(inner))
                }
                None => (MessageType::Sync, Cow::Borrowed(sent)),
            }
        }
    } else if let Some(data) = envelope.get("dataMessage") {
        (MessageType::Data, Cow::Borrowed(data))
    } else if let Some(edit) = envelope.get("editMessage") {
        let (target, inner) = unwrap_edit(edit)?;
        target_sent_timestamp = Some(target);
        (MessageType::Edit, Cow::Borrowed(inner))
    } else {
        return Err(UnknownFormat::new("no recognized message body"));
    };

    let remote_delete_timestamp = match body.get("remoteDelete") {
        Some(delete) => {
            kind = MessageType::Delete;
            Some(
                delete
                    .get("timestamp")
                    .and_then(as_timestamp)
                    .ok_or_else(|| UnknownFormat::new("remote delete without timestamp"))?,
            )
        }
        None => None,
    };

    let mut updated_group_id = None;
    if let Some(info) = body.get("groupInfo") {
        if info.get("type").and_then(Value::as_str) == Some("UPDATE") {
            kind = MessageType::GroupUpdate;
            updated_group_id = info
                .get("groupId")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
    }

    Ok(Classified {
        kind,
        body,
        target_sent_timestamp,
        remote_delete_timestamp,
        updated_group_id,
    })
}

/// Split an `editMessage` wrapper into its target timestamp and inner body.
fn unwrap_edit(edit: &Value) -> Result<(i64, &Value), UnknownFormat> {
    let target = edit
        .get("targetSentTimestamp")
        .and_then(as_timestamp)
        .ok_or_else(|| UnknownFormat::new("edit without targetSentTimestamp"))?;
    let inner = edit
        .get("dataMessage")
        .ok_or_else(|| UnknownFormat::new("edit without dataMessage"))?;
    Ok((target, inner))
}

fn required_str(value: &Value, key: &str) -> Result<String, UnknownFormat> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| UnknownFormat::new(format!("missing envelope field '{key}'")))
}

/// Timestamps are integers on the wire; some test tooling sends floats.
fn as_timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// A missing `message` key is malformed; an explicit `null` is a non-text event.
fn parse_text(body: &Value) -> Result<Option<String>, UnknownFormat> {
    match body.get("message") {
        None => Err(UnknownFormat::new("message body without 'message' field")),
        Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(UnknownFormat::new(format!(
            "message field is not text: {other}"
        ))),
    }
}

fn parse_mentions(body: &Value) -> Vec<Mention> {
    body.get("mentions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|m| serde_json::from_value::<Mention>(m.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_quote(body: &Value) -> Option<Quote> {
    let quote = body.get("quote")?;
    match serde_json::from_value::<Quote>(quote.clone()) {
        Ok(q) => Some(q),
        Err(e) => {
            debug!("ignoring malformed quote: {e}");
            None
        }
    }
}

fn parse_read_receipts(body: &Value) -> Option<Vec<ReadReceipt>> {
    let items = body.get("readMessages")?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|r| serde_json::from_value::<ReadReceipt>(r.clone()).ok())
            .collect(),
    )
}

fn attachment_ids(body: &Value) -> Vec<String> {
    body.get("attachments")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|a| a.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Download every attachment concurrently, keeping source order.
///
/// Returns the ids and contents of the successful downloads as two aligned
/// lists; a failed download drops out of both.
async fn fetch_attachments(
    fetcher: &dyn AttachmentFetcher,
    ids: &[String],
) -> (Vec<String>, Vec<Vec<u8>>) {
    let results = join_all(ids.iter().map(|id| fetcher.fetch_attachment(id))).await;
    ids.iter()
        .zip(results)
        .filter_map(|(id, result)| match result {
            Ok(bytes) => Some((id.clone(), bytes)),
            Err(e) => {
                warn!("attachment {id} download failed: {e}");
                None
            }
        })
        .unzip()
}

async fn parse_previews(fetcher: &dyn AttachmentFetcher, body: &Value) -> Vec<LinkPreview> {
    let Some(items) = body.get("previews").and_then(Value::as_array) else {
        return Vec::new();
    };

    let previews = items.iter().filter_map(|preview| {
        let title = preview.get("title").and_then(Value::as_str);
        let url = preview.get("url").and_then(Value::as_str);
        match (title, url) {
            (Some(title), Some(url)) => Some(LinkPreview {
                thumbnail: None,
                title: title.to_string(),
                description: preview
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                url: url.to_string(),
                local_ref: preview
                    .get("image")
                    .and_then(|img| img.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            _ => {
                debug!("skipping link preview without title or url");
                None
            }
        }
    });

    join_all(previews.map(|mut preview| async move {
        if let Some(id) = preview.local_ref.as_deref() {
            match fetcher.fetch_attachment(id).await {
                Ok(bytes) => preview.thumbnail = Some(bytes),
                Err(e) => warn!("link preview thumbnail {id} download failed: {e}"),
            }
        }
        preview
    }))
    .await
}
