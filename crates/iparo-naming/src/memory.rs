//! In-memory naming service for tests and simulations.
//!
//! [`InMemoryNamingService`] keeps the current pointers and the version
//! history in `HashMap`s behind `RwLock`s. Data is lost when it is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use iparo_types::{ContentId, Timestamp};
use tracing::debug;

use crate::error::{NamingError, Result};
use crate::traits::NamingService;
use crate::types::NamingCounts;

/// An in-memory implementation of [`NamingService`].
#[derive(Debug, Default)]
pub struct InMemoryNamingService {
    current: RwLock<HashMap<String, ContentId>>,
    history: RwLock<HashMap<(String, Timestamp), ContentId>>,
    updates: AtomicU64,
    gets: AtomicU64,
}

impl InMemoryNamingService {
    /// Create a new empty naming service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of history records across all keys.
    pub fn history_len(&self) -> usize {
        self.history.read().expect("lock poisoned").len()
    }
}

impl NamingService for InMemoryNamingService {
    fn update(&self, key: &str, id: ContentId, timestamp: Option<Timestamp>) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        let at = timestamp.unwrap_or_else(Timestamp::now);
        self.current
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), id);
        self.history
            .write()
            .expect("lock poisoned")
            .insert((key.to_string(), at), id);
        debug!(key, id = %id.short_hex(), at = %at, "name updated");
    }

    fn get_latest(&self, key: &str) -> Result<ContentId> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.current
            .read()
            .expect("lock poisoned")
            .get(key)
            .copied()
            .ok_or_else(|| NamingError::NameNotFound {
                key: key.to_string(),
            })
    }

    fn get_at(&self, key: &str, timestamp: Timestamp) -> Result<ContentId> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.history
            .read()
            .expect("lock poisoned")
            .get(&(key.to_string(), timestamp))
            .copied()
            .ok_or_else(|| NamingError::VersionNotFound {
                key: key.to_string(),
                timestamp,
            })
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .current
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn counts(&self) -> NamingCounts {
        NamingCounts {
            updates: self.updates.load(Ordering::Relaxed),
            gets: self.gets.load(Ordering::Relaxed),
        }
    }

    fn reset_counts(&self) {
        self.updates.store(0, Ordering::Relaxed);
        self.gets.store(0, Ordering::Relaxed);
    }
}
