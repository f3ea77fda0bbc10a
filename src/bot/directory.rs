//! Group directory: lookups by public id, internal id, and name.

use signalbot_core::{error::SignalError, group::Group, traits::Transport};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Immutable lookup tables built from one group listing.
#[derive(Debug, Default)]
pub struct GroupIndex {
    groups: Vec<Group>,
    by_id: HashMap<String, usize>,
    by_internal_id: HashMap<String, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl GroupIndex {
    pub fn new(groups: Vec<Group>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_internal_id = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, group) in groups.iter().enumerate() {
            by_id.insert(group.id.clone(), i);
            by_internal_id.insert(group.internal_id.clone(), i);
            by_name.entry(group.name.clone()).or_default().push(i);
        }
        Self {
            groups,
            by_id,
            by_internal_id,
            by_name,
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&Group> {
        self.by_id.get(id).map(|&i| &self.groups[i])
    }

    pub fn by_internal_id(&self, internal_id: &str) -> Option<&Group> {
        self.by_internal_id
            .get(internal_id)
            .map(|&i| &self.groups[i])
    }

    /// First group listed under `name`. Duplicate names log a warning.
    pub fn by_name(&self, name: &str) -> Option<&Group> {
        let matches = self.by_name.get(name)?;
        if matches.len() > 1 {
            warn!("there is more than one group named '{name}', using the first one");
        }
        matches.first().map(|&i| &self.groups[i])
    }
}

/// Process-wide group directory.
///
/// Readers take an `Arc` snapshot; [`refresh`](Self::refresh) builds a new
/// index and swaps it in, so nobody sees a half-built one.
pub struct GroupDirectory {
    transport: Arc<dyn Transport>,
    index: RwLock<Arc<GroupIndex>>,
}

impl GroupDirectory {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            index: RwLock::new(Arc::new(GroupIndex::default())),
        }
    }

    /// Replace the index with a fresh listing from the transport.
    pub async fn refresh(&self) -> Result<usize, SignalError> {
        let groups = self.transport.list_groups().await?;
        let index = Arc::new(GroupIndex::new(groups));
        let count = index.len();
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
        info!("{count} groups detected");
        Ok(count)
    }

    pub fn snapshot(&self) -> Arc<GroupIndex> {
        Arc::clone(&self.index.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn by_id(&self, id: &str) -> Option<Group> {
        self.snapshot().by_id(id).cloned()
    }

    pub fn by_internal_id(&self, internal_id: &str) -> Option<Group> {
        self.snapshot().by_internal_id(internal_id).cloned()
    }

    pub fn by_name(&self, name: &str) -> Option<Group> {
        self.snapshot().by_name(name).cloned()
    }
}
