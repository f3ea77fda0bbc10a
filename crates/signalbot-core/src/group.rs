use serde::{Deserialize, Serialize};

/// A Signal group as reported by the group-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Public, shareable id (`group.<base64>=`). Used as the send address.
    pub id: String,
    /// Internal routing id carried in inbound envelopes.
    pub internal_id: String,
    /// User-assigned name. Not unique.
    #[serde(default)]
    pub name: String,
}
