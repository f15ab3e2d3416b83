use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content_id::ContentId;
use crate::link::SnapshotLink;
use crate::temporal::Timestamp;

/// One immutable capture of a resource.
///
/// Snapshots are built once by the write path and never change afterwards;
/// they are identified by the hash of their serialized form. The embedded
/// `links` point only backwards: every link has a sequence number strictly
/// below `seq`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Identity of the resource (e.g. a URL) this snapshot captures.
    pub resource_key: String,
    /// Capture time.
    pub timestamp: Timestamp,
    /// Position in the resource's chain, starting at 0.
    pub seq: u64,
    /// Opaque captured bytes.
    pub content: Vec<u8>,
    /// Back-references chosen by the linking strategy.
    pub links: BTreeSet<SnapshotLink>,
    /// Trailer field, currently always 0.
    pub nonce: u64,
}

impl Snapshot {
    /// Build a snapshot with an empty trailer.
    pub fn new(
        resource_key: impl Into<String>,
        timestamp: Timestamp,
        seq: u64,
        content: Vec<u8>,
        links: BTreeSet<SnapshotLink>,
    ) -> Self {
        Self {
            resource_key: resource_key.into(),
            timestamp,
            seq,
            content,
            links,
            nonce: 0,
        }
    }

    /// The first snapshot of a resource: sequence 0, no links.
    pub fn first(resource_key: impl Into<String>, timestamp: Timestamp, content: Vec<u8>) -> Self {
        Self::new(resource_key, timestamp, 0, content, BTreeSet::new())
    }

    /// Build the link that would reference this snapshot once stored under `id`.
    pub fn link(&self, id: ContentId) -> SnapshotLink {
        SnapshotLink::new(self.seq, self.timestamp, id)
    }

    /// The embedded link to the immediate predecessor, if present.
    pub fn predecessor(&self) -> Option<&SnapshotLink> {
        let prev = self.seq.checked_sub(1)?;
        self.links.iter().find(|l| l.seq == prev)
    }

    /// The embedded link to sequence 0, if present.
    pub fn first_link(&self) -> Option<&SnapshotLink> {
        self.links.iter().find(|l| l.seq == 0)
    }

    /// Returns `true` if no embedded link points at or beyond this snapshot.
    pub fn links_point_backwards(&self) -> bool {
        self.links.iter().all(|l| l.seq < self.seq)
    }
}
