//! Receiver address classification and resolution.

use super::directory::GroupDirectory;
use once_cell::sync::Lazy;
use regex::Regex;
use signalbot_core::error::SignalError;
use std::sync::Arc;
use uuid::Uuid;

static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("phone regex"));

static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}\.[1-9][0-9]{1,8}$").expect("username regex"));

static GROUP_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^group\.[A-Za-z0-9]{59}=$").expect("group id regex"));

/// E.164 syntax: `+`, non-zero country digit, 7 to 15 digits total.
///
/// Only the shape is checked. Unassigned numbers such as `+1000000` still
/// pass and are sent as-is instead of falling through to the group lookup;
/// the service rejects them on send.
pub fn is_phone_number(address: &str) -> bool {
    PHONE_NUMBER.is_match(address)
}

pub fn is_uuid(address: &str) -> bool {
    Uuid::parse_str(address).is_ok()
}

/// Signal username: 3-32 word characters, a dot, then 2-9 digits without a
/// leading zero.
pub fn is_username(address: &str) -> bool {
    USERNAME.is_match(address)
}

/// Public group id: `group.` followed by 59 alphanumerics and `=`.
pub fn is_group_id(address: &str) -> bool {
    GROUP_ID.is_match(address)
}

/// Maps any accepted address form to one the transport can send to.
#[derive(Clone)]
pub struct Resolver {
    directory: Arc<GroupDirectory>,
}

impl Resolver {
    pub fn new(directory: Arc<GroupDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Arc<GroupDirectory> {
        &self.directory
    }

    /// Phone numbers, uuids, usernames and public group ids pass through;
    /// internal group ids and group names map to the public id.
    pub fn resolve(&self, address: &str) -> Result<String, SignalError> {
        if is_phone_number(address)
            || is_uuid(address)
            || is_username(address)
            || is_group_id(address)
        {
            return Ok(address.to_string());
        }

        let index = self.directory.snapshot();
        if let Some(group) = index.by_internal_id(address) {
            return Ok(group.id.clone());
        }
        if let Some(group) = index.by_name(address) {
            return Ok(group.id.clone());
        }

        Err(SignalError::UnresolvableReceiver(address.to_string()))
    }
}
