use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a decoded envelope. Exactly one applies per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Sent from another device linked to the bot's account.
    Sync,
    /// Received on the primary device.
    Data,
    /// Edit of a previously sent message.
    Edit,
    /// Remote delete of a previously sent message.
    Delete,
    /// The user read some messages.
    Read,
    /// A group was updated (name, members, ...).
    GroupUpdate,
    /// Contact list sync between linked devices.
    ContactSync,
}

/// A decoded inbound chat event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Sender address as reported by the transport.
    pub source: String,
    /// Sender phone number, when the transport exposes it.
    pub source_number: Option<String>,
    pub source_uuid: String,
    /// Transport-assigned send time (epoch millis).
    pub timestamp: i64,
    pub kind: MessageType,
    /// `None` when the body carries `"message": null` (reactions, deletes, ...).
    pub text: Option<String>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    pub quote: Option<Quote>,
    pub reaction: Option<String>,
    /// Downloaded attachment contents. Only populated when downloads are enabled.
    #[serde(default)]
    pub attachments: Vec<Vec<u8>>,
    /// Local attachment ids on the signal service, usable for deletion.
    /// `attachment_local_refs[i]` is the id of `attachments[i]`.
    #[serde(default)]
    pub attachment_local_refs: Vec<String>,
    #[serde(default)]
    pub link_previews: Vec<LinkPreview>,
    #[serde(default)]
    pub view_once: bool,
    /// Internal group id. Present iff this is a group message.
    pub group: Option<String>,
    pub target_sent_timestamp: Option<i64>,
    pub remote_delete_timestamp: Option<i64>,
    pub read_receipts: Option<Vec<ReadReceipt>>,
    pub updated_group_id: Option<String>,
    /// The payload this message was decoded from.
    pub raw_payload: Option<String>,
}

impl Message {
    /// Build a minimal message of the given kind. Mostly useful in tests and
    /// for handlers that synthesize events.
    pub fn new(source: &str, source_uuid: &str, timestamp: i64, kind: MessageType) -> Self {
        Self {
            source: source.to_string(),
            source_number: None,
            source_uuid: source_uuid.to_string(),
            timestamp,
            kind,
            text: None,
            mentions: Vec::new(),
            quote: None,
            reaction: None,
            attachments: Vec::new(),
            attachment_local_refs: Vec::new(),
            link_previews: Vec::new(),
            view_once: false,
            group: None,
            target_sent_timestamp: None,
            remote_delete_timestamp: None,
            read_receipts: None,
            updated_group_id: None,
            raw_payload: None,
        }
    }

    /// Where a reply should go: the group for group chats, otherwise the sender.
    pub fn recipient(&self) -> &str {
        match self.group.as_deref() {
            Some(group) => group,
            None => &self.source,
        }
    }

    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    pub fn is_private(&self) -> bool {
        !self.is_group()
    }

    /// Message text, or `""` for non-text events.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_or_empty())
    }
}

/// A message being replied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i64,
    pub author: String,
    #[serde(default)]
    pub author_number: Option<String>,
    pub author_uuid: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}

/// Metadata for a URL found in a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPreview {
    /// Thumbnail image contents, if the preview carried one and downloads are on.
    pub thumbnail: Option<Vec<u8>>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    /// Local id of the thumbnail on the signal service.
    pub local_ref: Option<String>,
}

/// A mention of another user inside the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    pub start: u32,
    pub length: u32,
}

/// One entry of a READ sync message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub sender: String,
    #[serde(default)]
    pub sender_number: Option<String>,
    #[serde(default)]
    pub sender_uuid: Option<String>,
    pub timestamp: i64,
}

/// Receipt kinds accepted by the signal service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptType {
    Read,
    Viewed,
}

impl ReceiptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Viewed => "viewed",
        }
    }
}

/// How the signal service should interpret formatting in outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    Normal,
    Styled,
}

/// Reference to a message quoted by an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRef {
    pub author: String,
    pub text: String,
    pub timestamp: i64,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl QuoteRef {
    /// Quote an inbound message.
    pub fn from_message(message: &Message) -> Self {
        Self {
            author: message.source_uuid.clone(),
            text: message.text_or_empty().to_string(),
            timestamp: message.timestamp,
            mentions: message.mentions.clone(),
        }
    }
}

/// An outgoing message. The recipient is passed separately to the transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Vec<u8>>,
    pub link_preview: Option<LinkPreview>,
    pub quote: Option<QuoteRef>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    /// Timestamp of a previously sent message this one replaces.
    pub edit_timestamp: Option<i64>,
    pub text_mode: Option<TextMode>,
    #[serde(default)]
    pub view_once: bool,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}
