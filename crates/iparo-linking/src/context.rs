use iparo_types::{Snapshot, SnapshotLink};

/// What a strategy knows about the resource when a new snapshot is written.
#[derive(Clone, Copy, Debug)]
pub struct LinkContext<'a> {
    /// Link to the current head.
    pub latest_link: SnapshotLink,
    /// The current head itself, already retrieved by the caller.
    pub latest_snapshot: &'a Snapshot,
    /// Link to sequence 0 if the caller already has it; strategies resolve
    /// it themselves otherwise.
    pub first_link: Option<SnapshotLink>,
}

impl<'a> LinkContext<'a> {
    pub fn new(latest_link: SnapshotLink, latest_snapshot: &'a Snapshot) -> Self {
        Self {
            latest_link,
            latest_snapshot,
            first_link: None,
        }
    }

    pub fn with_first(mut self, first_link: SnapshotLink) -> Self {
        self.first_link = Some(first_link);
        self
    }

    /// Sequence number the new snapshot will get.
    pub fn next_seq(&self) -> u64 {
        self.latest_link.seq + 1
    }
}
