use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of a store's operation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCounts {
    /// Number of `store` calls.
    pub stores: u64,
    /// Number of `retrieve` calls.
    pub retrieves: u64,
}

/// Resettable counter pair shared by store backends.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    stores: AtomicU64,
    retrieves: AtomicU64,
}

impl Counters {
    pub(crate) fn record_store(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retrieve(&self) {
        self.retrieves.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> OpCounts {
        OpCounts {
            stores: self.stores.load(Ordering::Relaxed),
            retrieves: self.retrieves.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.stores.store(0, Ordering::Relaxed);
        self.retrieves.store(0, Ordering::Relaxed);
    }
}
