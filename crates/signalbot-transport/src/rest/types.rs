//! signal-cli-rest-api request and response bodies.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest {
    pub base64_attachments: Vec<String>,
    pub message: String,
    pub number: String,
    pub recipients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_author: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quote_mentions: Vec<MentionBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<MentionBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview: Option<LinkPreviewBody>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub view_once: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct MentionBody {
    pub author: String,
    pub start: u32,
    pub length: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkPreviewBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_thumbnail: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReactionRequest<'a> {
    pub recipient: &'a str,
    pub reaction: &'a str,
    pub target_author: &'a str,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReceiptRequest<'a> {
    pub recipient: &'a str,
    pub receipt_type: &'a str,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecipientRequest<'a> {
    pub recipient: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoteDeleteRequest<'a> {
    pub recipient: &'a str,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContactRequest<'a> {
    pub recipient: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_in_seconds: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupUpdateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

/// Response of send and remote-delete.
#[derive(Debug, Deserialize)]
pub(crate) struct TimestampResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AboutResponse {
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiGroup {
    pub id: String,
    pub internal_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The service reports timestamps as strings on some endpoints.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
