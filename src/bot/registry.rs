//! Registered commands and the message matcher.

use super::command::Command;
use super::directory::{GroupDirectory, GroupIndex};
use super::resolver::is_group_id;
use super::triggers::Predicate;
use signalbot_core::message::Message;
use std::sync::Arc;
use tracing::warn;

/// Which private chats an entry listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactFilter {
    All,
    None,
    /// Sender addresses as they appear in `Message::source`.
    List(Vec<String>),
}

/// Which groups an entry listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    All,
    None,
    /// Public group ids or group names. Names are resolved to ids by
    /// [`Registry::resolve`].
    List(Vec<String>),
}

/// One registered command with its filters.
pub struct Entry {
    pub command: Arc<dyn Command>,
    pub contacts: ContactFilter,
    /// Group filter as registered.
    pub groups: GroupFilter,
    pub predicate: Option<Predicate>,
    /// Group filter with names replaced by public ids.
    resolved_groups: GroupFilter,
}

impl Entry {
    pub fn resolved_groups(&self) -> &GroupFilter {
        &self.resolved_groups
    }

    /// Contact/group gate, then the predicate.
    pub fn matches(&self, message: &Message, index: &GroupIndex) -> bool {
        let gate = match message.group.as_deref() {
            None => match &self.contacts {
                ContactFilter::All => true,
                ContactFilter::None => false,
                ContactFilter::List(contacts) => contacts.iter().any(|c| *c == message.source),
            },
            Some(internal_id) => match &self.resolved_groups {
                GroupFilter::All => true,
                GroupFilter::None => false,
                GroupFilter::List(ids) => index
                    .by_internal_id(internal_id)
                    .is_some_and(|group| ids.contains(&group.id)),
            },
        };
        gate && self.predicate.as_ref().map_or(true, |p| p(message))
    }
}

/// Commands in registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        command: Arc<dyn Command>,
        contacts: ContactFilter,
        groups: GroupFilter,
        predicate: Option<Predicate>,
    ) {
        self.entries.push(Entry {
            command,
            contacts,
            resolved_groups: groups.clone(),
            groups,
            predicate,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turn group names into public ids using the current directory.
    /// Group ids win over names; unknown entries are logged and dropped.
    pub fn resolve(&mut self, directory: &GroupDirectory) {
        let index = directory.snapshot();
        for entry in &mut self.entries {
            entry.resolved_groups = match &entry.groups {
                GroupFilter::List(items) => GroupFilter::List(
                    items
                        .iter()
                        .filter_map(|item| {
                            if is_group_id(item) {
                                return Some(item.clone());
                            }
                            match index.by_name(item) {
                                Some(group) => Some(group.id.clone()),
                                None => {
                                    warn!(
                                        "[{}] '{item}' is not a valid group name or id",
                                        entry.command.name()
                                    );
                                    None
                                }
                            }
                        })
                        .collect(),
                ),
                other => other.clone(),
            };
        }
    }

    /// Commands that should handle `message`, in registration order.
    pub fn matching(&self, message: &Message, index: &GroupIndex) -> Vec<Arc<dyn Command>> {
        self.entries
            .iter()
            .filter(|entry| entry.matches(message, index))
            .map(|entry| Arc::clone(&entry.command))
            .collect()
    }

    /// `describe()` of every command that provides one.
    pub fn descriptions(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| entry.command.describe())
            .collect()
    }
}
