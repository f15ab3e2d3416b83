//! Backward traversal over embedded snapshot links.
//!
//! A [`Navigator`] borrows a [`ContentStore`] and dereferences links one at a
//! time. Every hop costs exactly one `retrieve`, which is what simulations
//! measure, so the algorithms below never prefetch or cache snapshots.

use std::collections::BTreeSet;

use iparo_store::ContentStore;
use iparo_types::{ContentId, Snapshot, SnapshotLink, Timestamp};
use tracing::debug;

use crate::error::{RetrievalError, RetrievalResult};
use crate::mode::Mode;

/// Result of a timestamp lookup.
///
/// `known_links` is every link discovered on the way. Passing it back into
/// [`Navigator::resume_by_timestamp`] lets a later, earlier-in-time search
/// jump straight to a good starting point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Located {
    pub link: SnapshotLink,
    pub known_links: BTreeSet<SnapshotLink>,
}

/// Read-only walker over the snapshots held by a store.
pub struct Navigator<'s, S: ContentStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: ContentStore + ?Sized> Navigator<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Dereference `id` once and build the link that points at it.
    pub fn link_for(&self, id: &ContentId) -> RetrievalResult<SnapshotLink> {
        let (link, _) = self.store.resolve_link(id)?;
        Ok(link)
    }

    /// Dereference a link.
    pub fn snapshot(&self, link: &SnapshotLink) -> RetrievalResult<Snapshot> {
        Ok(self.store.retrieve(&link.id)?)
    }

    /// Find the snapshot with sequence number `target`, walking back from `start`.
    ///
    /// At each hop the walk moves to the embedded link with the smallest
    /// sequence number that is still `>= target`. Fails with
    /// [`RetrievalError::SequenceGap`] when no such link exists, and without
    /// touching the store when `target` lies above `start`.
    pub fn locate_by_sequence(
        &self,
        target: u64,
        start: SnapshotLink,
    ) -> RetrievalResult<SnapshotLink> {
        if start.seq < target {
            return Err(RetrievalError::SequenceGap {
                target,
                at: start.seq,
            });
        }

        let mut current = start;
        let mut hops = 0u64;
        while current.seq != target {
            let snapshot = self.store.retrieve(&current.id)?;
            hops += 1;
            let next = snapshot
                .links
                .iter()
                .filter(|l| l.seq >= target && l.seq < current.seq)
                .min_by_key(|l| l.seq)
                .copied();
            current = next.ok_or(RetrievalError::SequenceGap {
                target,
                at: current.seq,
            })?;
        }

        debug!(target, from = start.seq, hops, "located by sequence");
        Ok(current)
    }

    /// Find the snapshot matching `target` under `mode`, walking back from `start`.
    ///
    /// A target before the first capture resolves to the first snapshot; a
    /// target after `start` resolves to `start`.
    pub fn locate_by_timestamp(
        &self,
        target: Timestamp,
        start: SnapshotLink,
        mode: Mode,
    ) -> RetrievalResult<Located> {
        self.resume_by_timestamp(target, start, BTreeSet::new(), mode)
    }

    /// Like [`locate_by_timestamp`](Self::locate_by_timestamp), seeded with
    /// links discovered by earlier searches over the same chain.
    pub fn resume_by_timestamp(
        &self,
        target: Timestamp,
        start: SnapshotLink,
        mut known_links: BTreeSet<SnapshotLink>,
        mode: Mode,
    ) -> RetrievalResult<Located> {
        known_links.insert(start);
        let mut current = start;
        let mut steps = 0u64;

        let link = loop {
            if current.timestamp == target || current.seq == 0 {
                break current;
            }

            let prev = self.locate_by_sequence(current.seq - 1, current)?;
            known_links.insert(prev);
            steps += 1;

            let offset = i128::from(target.as_micros()) - i128::from(prev.timestamp.as_micros());
            let span =
                i128::from(current.timestamp.as_micros()) - i128::from(prev.timestamp.as_micros());

            if offset >= 0 {
                if span <= 0 {
                    // Both captures share a timestamp and the target is later.
                    break current;
                }
                break pick(mode, prev, current, offset, span);
            }

            // Target lies before `prev`: remember what `prev` points at and
            // jump to the earliest known capture not before the target.
            let prev_snapshot = self.store.retrieve(&prev.id)?;
            known_links.extend(
                prev_snapshot
                    .links
                    .iter()
                    .filter(|l| l.timestamp >= target)
                    .copied(),
            );
            current = known_links
                .iter()
                .find(|l| l.timestamp >= target && l.seq < current.seq)
                .copied()
                .ok_or(RetrievalError::Unreachable { at: current.seq })?;
        };

        debug!(target = %target, %mode, from = start.seq, found = link.seq, steps, "located by timestamp");
        Ok(Located { link, known_links })
    }

    /// Resolve a set of sequence numbers, visiting them in descending order.
    ///
    /// Each lookup starts from the previous result, so a batch costs about
    /// as much as a single walk to its smallest index.
    pub fn from_indices<I>(&self, start: SnapshotLink, indices: I) -> RetrievalResult<BTreeSet<SnapshotLink>>
    where
        I: IntoIterator<Item = u64>,
    {
        let wanted: BTreeSet<u64> = indices.into_iter().collect();
        let mut found = BTreeSet::new();
        let mut current = start;
        for target in wanted.into_iter().rev() {
            current = self.locate_by_sequence(target, current)?;
            found.insert(current);
        }
        Ok(found)
    }

    /// Resolve a set of timestamps under `mode`, visiting them in descending
    /// order and sharing discovered links between the searches.
    pub fn from_timestamps<I>(
        &self,
        start: SnapshotLink,
        timestamps: I,
        mode: Mode,
    ) -> RetrievalResult<BTreeSet<SnapshotLink>>
    where
        I: IntoIterator<Item = Timestamp>,
    {
        let wanted: BTreeSet<Timestamp> = timestamps.into_iter().collect();
        let mut found = BTreeSet::new();
        let mut current = start;
        let mut known_links = BTreeSet::new();
        for target in wanted.into_iter().rev() {
            let located = self.resume_by_timestamp(target, current, known_links, mode)?;
            current = located.link;
            known_links = located.known_links;
            found.insert(current);
        }
        Ok(found)
    }

    /// Every snapshot from `start` back to sequence 0, newest first.
    pub fn list_all(&self, start: SnapshotLink) -> RetrievalResult<Vec<SnapshotLink>> {
        let mut all = Vec::with_capacity(start.seq as usize + 1);
        let mut current = start;
        all.push(current);
        while current.seq > 0 {
            current = self
                .locate_by_sequence(current.seq - 1, current)
                .map_err(|e| match e {
                    RetrievalError::SequenceGap { at, .. } => RetrievalError::Unreachable { at },
                    other => other,
                })?;
            all.push(current);
        }
        Ok(all)
    }

    /// The first snapshot of the chain `latest` belongs to.
    ///
    /// `hint` is returned as-is when the caller already knows it.
    pub fn first_of(
        &self,
        latest: SnapshotLink,
        hint: Option<SnapshotLink>,
    ) -> RetrievalResult<SnapshotLink> {
        match hint {
            Some(first) => Ok(first),
            None => self.locate_by_sequence(0, latest),
        }
    }
}

/// Choose between two adjacent captures for a target at `offset` past
/// `prev`, where `span` is the positive distance between them.
fn pick(
    mode: Mode,
    prev: SnapshotLink,
    current: SnapshotLink,
    offset: i128,
    span: i128,
) -> SnapshotLink {
    let take_prev = match mode {
        Mode::Closest => 2 * offset <= span,
        Mode::LatestBefore => offset < span,
        Mode::EarliestAfter => offset == 0,
    };
    if take_prev {
        prev
    } else {
        current
    }
}

impl<S: ContentStore + ?Sized> std::fmt::Debug for Navigator<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("counts", &self.store.counts())
            .finish()
    }
}
