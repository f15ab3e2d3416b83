use iparo_types::{ContentId, Snapshot, SnapshotLink};

use crate::counts::OpCounts;
use crate::error::StoreResult;

/// Content-addressed snapshot store.
///
/// All implementations must satisfy these invariants:
/// - Entries are immutable once written. The same serialized snapshot always
///   produces the same id, and there is no update or delete.
/// - `store` is idempotent: storing identical content again returns the
///   existing id.
/// - Concurrent reads are always safe.
/// - Every `store` and `retrieve` call bumps the matching counter, whether
///   or not it succeeds.
pub trait ContentStore: Send + Sync {
    /// Serialize and store a snapshot, returning its content id.
    fn store(&self, snapshot: &Snapshot) -> StoreResult<ContentId>;

    /// Load the snapshot stored under `id`.
    ///
    /// Returns [`StoreError::ContentNotFound`] if nothing is stored there.
    ///
    /// [`StoreError::ContentNotFound`]: crate::StoreError::ContentNotFound
    fn retrieve(&self, id: &ContentId) -> StoreResult<Snapshot>;

    /// Check whether an entry exists. Not counted.
    fn contains(&self, id: &ContentId) -> StoreResult<bool>;

    /// Current operation counters.
    fn counts(&self) -> OpCounts;

    /// Reset both counters to zero.
    fn reset_counts(&self);

    /// Retrieve the snapshot behind `id` and build the link that points at it.
    fn resolve_link(&self, id: &ContentId) -> StoreResult<(SnapshotLink, Snapshot)> {
        let snapshot = self.retrieve(id)?;
        Ok((snapshot.link(*id), snapshot))
    }
}
