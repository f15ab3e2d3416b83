use std::collections::HashMap;
use std::sync::RwLock;

use iparo_types::{ContentId, Snapshot};
use tracing::debug;

use crate::codec::{decode_snapshot, encode_snapshot};
use crate::counts::{Counters, OpCounts};
use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;
use crate::traits::ContentStore;

/// In-memory, HashMap-based content store.
///
/// Intended for tests, simulations and embedding. Serialized snapshots are
/// held behind a `RwLock`; readers never block each other.
pub struct InMemoryContentStore {
    entries: RwLock<HashMap<ContentId, Vec<u8>>>,
    counters: Counters,
}

impl InMemoryContentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Total serialized bytes across all entries.
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(|bytes| bytes.len() as u64)
            .sum()
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn store(&self, snapshot: &Snapshot) -> StoreResult<ContentId> {
        self.counters.record_store();
        let bytes = encode_snapshot(snapshot)?;
        let id = ContentHasher::SNAPSHOT.hash(&bytes);
        let mut map = self.entries.write().expect("lock poisoned");
        // Same id always means same bytes, so an existing entry is kept.
        map.entry(id).or_insert(bytes);
        debug!(id = %id.short_hex(), seq = snapshot.seq, key = %snapshot.resource_key, "stored snapshot");
        Ok(id)
    }

    fn retrieve(&self, id: &ContentId) -> StoreResult<Snapshot> {
        self.counters.record_retrieve();
        let map = self.entries.read().expect("lock poisoned");
        let bytes = map.get(id).ok_or(StoreError::ContentNotFound(*id))?;
        if !ContentHasher::SNAPSHOT.verify(bytes, id) {
            return Err(StoreError::CorruptObject {
                id: *id,
                reason: "stored bytes do not hash to their id".into(),
            });
        }
        decode_snapshot(bytes).map_err(|e| StoreError::CorruptObject {
            id: *id,
            reason: e.to_string(),
        })
    }

    fn contains(&self, id: &ContentId) -> StoreResult<bool> {
        Ok(self.entries.read().expect("lock poisoned").contains_key(id))
    }

    fn counts(&self) -> OpCounts {
        self.counters.snapshot()
    }

    fn reset_counts(&self) {
        self.counters.reset();
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("entry_count", &self.len())
            .field("counts", &self.counts())
            .finish()
    }
}
