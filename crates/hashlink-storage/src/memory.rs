use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hashlink_core::{Result, ShortKey, Storage};
use tracing::{debug, trace};

/// In-memory implementation of the Storage trait using DashMap.
///
/// DashMap shards its locks, so concurrent handlers can read and write
/// different keys without blocking each other. Links do not survive a
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    links: DashMap<String, String>,
}

impl InMemoryStorage {
    /// Creates an empty in-memory storage.
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
        }
    }

    /// Creates an empty in-memory storage with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no links are stored.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put(&self, key: &ShortKey, original_url: &str) -> Result<()> {
        // The entry guard holds the shard lock, so check-and-insert is atomic.
        match self.links.entry(key.as_str().to_owned()) {
            Entry::Occupied(_) => {
                trace!(key = %key, "key already stored, ignoring write");
            }
            Entry::Vacant(slot) => {
                slot.insert(original_url.to_owned());
                debug!(key = %key, "stored link");
            }
        }
        Ok(())
    }

    async fn get(&self, key: &ShortKey) -> Result<Option<String>> {
        Ok(self.links.get(key.as_str()).map(|url| url.value().clone()))
    }

    async fn close(&self) {
        debug!(links = self.links.len(), "closing in-memory storage");
    }
}
