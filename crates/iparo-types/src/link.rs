use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content_id::ContentId;
use crate::temporal::Timestamp;

/// A weak back-reference to a stored snapshot.
///
/// The link owns nothing; it caches the target's sequence number and
/// timestamp so traversals can decide where to go next without
/// dereferencing the target. Equality and hashing cover all three fields.
///
/// Ordering is `(timestamp, seq, id)`. The id is only a final tie-break so
/// that `Ord` agrees with `Eq`; link sets are `BTreeSet`s and serialize in
/// this order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotLink {
    /// Sequence number of the target snapshot.
    pub seq: u64,
    /// Capture time of the target snapshot.
    pub timestamp: Timestamp,
    /// Content id under which the target is stored.
    pub id: ContentId,
}

impl SnapshotLink {
    pub fn new(seq: u64, timestamp: Timestamp, id: ContentId) -> Self {
        Self { seq, timestamp, id }
    }

    /// Returns `true` if this link points at a resource's first snapshot.
    pub fn is_first(&self) -> bool {
        self.seq == 0
    }
}

impl PartialOrd for SnapshotLink {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SnapshotLink {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.seq.cmp(&other.seq))
            .then(self.id.cmp(&other.id))
    }
}

impl fmt::Debug for SnapshotLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnapshotLink(#{} @{} {})",
            self.seq,
            self.timestamp,
            self.id.short_hex()
        )
    }
}
