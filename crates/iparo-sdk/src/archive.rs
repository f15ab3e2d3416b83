use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use iparo_linking::{LinkContext, LinkingStrategy};
use iparo_naming::{InMemoryNamingService, NamingCounts, NamingError, NamingService};
use iparo_retrieval::{Mode, Navigator};
use iparo_store::{ContentStore, InMemoryContentStore, OpCounts};
use iparo_types::{ContentId, Snapshot, SnapshotLink, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, ArchiveResult};

/// An append-only archive of resource snapshots.
///
/// Writers to the same resource key are serialized; writers to different
/// keys and all readers proceed concurrently.
pub struct Archive<S = InMemoryContentStore, N = InMemoryNamingService> {
    store: S,
    naming: N,
    config: ArchiveConfig,
    rng: Mutex<StdRng>,
    writers: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Archive {
    /// An archive backed by in-memory store and naming service.
    pub fn in_memory(config: ArchiveConfig) -> ArchiveResult<Self> {
        Self::new(InMemoryContentStore::new(), InMemoryNamingService::new(), config)
    }
}

impl<S: ContentStore, N: NamingService> Archive<S, N> {
    pub fn new(store: S, naming: N, config: ArchiveConfig) -> ArchiveResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            store,
            naming,
            config,
            rng: Mutex::new(rng),
            writers: Mutex::new(HashMap::new()),
        })
    }

    pub fn strategy(&self) -> &LinkingStrategy {
        &self.config.strategy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn naming(&self) -> &N {
        &self.naming
    }

    fn navigator(&self) -> Navigator<'_, S> {
        Navigator::new(&self.store)
    }

    // ---- Write path ----

    /// Append a snapshot captured now.
    pub fn create_snapshot(&self, key: &str, content: impl Into<Vec<u8>>) -> ArchiveResult<ContentId> {
        self.append(key, content.into(), Timestamp::now(), self.config.clamp_clock)
    }

    /// Append a snapshot captured at `timestamp`, which must not precede the
    /// current head.
    pub fn create_snapshot_at(
        &self,
        key: &str,
        content: impl Into<Vec<u8>>,
        timestamp: Timestamp,
    ) -> ArchiveResult<ContentId> {
        self.append(key, content.into(), timestamp, false)
    }

    fn writer_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut writers = self.writers.lock().expect("lock poisoned");
        Arc::clone(writers.entry(key.to_string()).or_default())
    }

    /// Drop the key's writer lock from the map once no other writer holds
    /// or waits on it. Clones are only taken under the map lock, so the
    /// count cannot grow while it is checked.
    fn release_writer_lock(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut writers = self.writers.lock().expect("lock poisoned");
        // One reference in the map, one in `lock`.
        if Arc::strong_count(&lock) == 2 {
            writers.remove(key);
        }
    }

    fn append(
        &self,
        key: &str,
        content: Vec<u8>,
        timestamp: Timestamp,
        clamp: bool,
    ) -> ArchiveResult<ContentId> {
        let lock = self.writer_lock(key);
        let result = {
            let _guard = lock.lock().expect("lock poisoned");
            self.append_locked(key, content, timestamp, clamp)
        };
        self.release_writer_lock(key, lock);
        result
    }

    fn append_locked(
        &self,
        key: &str,
        content: Vec<u8>,
        timestamp: Timestamp,
        clamp: bool,
    ) -> ArchiveResult<ContentId> {
        let head = match self.naming.get_latest(key) {
            Ok(id) => Some(id),
            Err(NamingError::NameNotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let snapshot = match head {
            None => Snapshot::first(key, timestamp, content),
            Some(head_id) => {
                let latest_snapshot = self.store.retrieve(&head_id)?;
                let latest_link = latest_snapshot.link(head_id);
                let timestamp = self.admit_timestamp(key, timestamp, latest_link.timestamp, clamp)?;

                let first_hint = if latest_link.is_first() {
                    Some(latest_link)
                } else {
                    latest_snapshot.first_link().copied()
                };
                let ctx = match first_hint {
                    Some(first) => LinkContext::new(latest_link, &latest_snapshot).with_first(first),
                    None => LinkContext::new(latest_link, &latest_snapshot),
                };

                let mut rng = StdRng::seed_from_u64(self.rng.lock().expect("lock poisoned").gen());
                let links = self
                    .config
                    .strategy
                    .select_links_with_rng(&self.navigator(), &ctx, &mut rng)?;

                let snapshot = Snapshot::new(key, timestamp, latest_link.seq + 1, content, links);
                check_links(&snapshot, &latest_link)?;
                snapshot
            }
        };

        let id = self.store.store(&snapshot)?;
        self.naming.update(key, id, Some(snapshot.timestamp));
        debug!(
            key,
            seq = snapshot.seq,
            links = snapshot.links.len(),
            id = %id.short_hex(),
            "snapshot appended"
        );
        Ok(id)
    }

    fn admit_timestamp(
        &self,
        key: &str,
        timestamp: Timestamp,
        latest: Timestamp,
        clamp: bool,
    ) -> ArchiveResult<Timestamp> {
        if timestamp >= latest {
            return Ok(timestamp);
        }
        if clamp {
            warn!(key, %timestamp, %latest, "clock behind current head, clamping");
            return Ok(latest);
        }
        Err(ArchiveError::NonMonotonicTimestamp {
            key: key.to_string(),
            timestamp,
            latest,
        })
    }

    // ---- Read path ----

    /// Link to the current head of `key`.
    pub fn get_latest(&self, key: &str) -> ArchiveResult<SnapshotLink> {
        let id = self.naming.get_latest(key)?;
        Ok(self.navigator().link_for(&id)?)
    }

    /// Link to the first snapshot of `key`.
    pub fn get_first(&self, key: &str) -> ArchiveResult<SnapshotLink> {
        self.get_nth(key, 0)
    }

    /// Link to snapshot number `n` of `key`.
    pub fn get_nth(&self, key: &str, n: u64) -> ArchiveResult<SnapshotLink> {
        let latest = self.get_latest(key)?;
        Ok(self.navigator().locate_by_sequence(n, latest)?)
    }

    /// Link to the snapshot of `key` matching `timestamp` under `mode`.
    pub fn get_at_time(&self, key: &str, timestamp: Timestamp, mode: Mode) -> ArchiveResult<SnapshotLink> {
        let latest = self.get_latest(key)?;
        let located = self.navigator().locate_by_timestamp(timestamp, latest, mode)?;
        Ok(located.link)
    }

    /// Link to the snapshot the naming service recorded for `key` at exactly
    /// `timestamp`.
    pub fn get_as_of(&self, key: &str, timestamp: Timestamp) -> ArchiveResult<SnapshotLink> {
        let id = self.naming.get_at(key, timestamp)?;
        Ok(self.navigator().link_for(&id)?)
    }

    /// Every snapshot of `key`, newest first.
    pub fn list_all(&self, key: &str) -> ArchiveResult<Vec<SnapshotLink>> {
        let latest = self.get_latest(key)?;
        Ok(self.navigator().list_all(latest)?)
    }

    pub fn retrieve(&self, id: &ContentId) -> ArchiveResult<Snapshot> {
        Ok(self.store.retrieve(id)?)
    }

    /// Resource keys with at least one snapshot.
    pub fn keys(&self) -> Vec<String> {
        self.naming.keys()
    }

    // ---- Instrumentation ----

    pub fn store_counts(&self) -> OpCounts {
        self.store.counts()
    }

    pub fn naming_counts(&self) -> NamingCounts {
        self.naming.counts()
    }

    pub fn reset_counts(&self) {
        self.store.reset_counts();
        self.naming.reset_counts();
    }
}

/// Reject snapshots whose links would leave them unreachable from the head
/// or point at snapshots that do not exist yet.
fn check_links(snapshot: &Snapshot, latest: &SnapshotLink) -> ArchiveResult<()> {
    if !snapshot.links_point_backwards() {
        let target = snapshot.links.iter().map(|l| l.seq).max().unwrap_or(snapshot.seq);
        return Err(ArchiveError::ForwardLink {
            key: snapshot.resource_key.clone(),
            seq: snapshot.seq,
            target,
        });
    }
    if snapshot.predecessor() != Some(latest) {
        return Err(ArchiveError::Unreachable {
            key: snapshot.resource_key.clone(),
            seq: snapshot.seq,
        });
    }
    Ok(())
}

impl<S: ContentStore, N: NamingService> std::fmt::Debug for Archive<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("strategy", &self.config.strategy.to_string())
            .field("store_counts", &self.store.counts())
            .field("naming_counts", &self.naming.counts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iparo_retrieval::RetrievalError;

    const KEY: &str = "example.com";

    fn archive(strategy: LinkingStrategy) -> Archive {
        let config = ArchiveConfig {
            seed: Some(3),
            ..ArchiveConfig::with_strategy(strategy)
        };
        Archive::in_memory(config).unwrap()
    }

    fn fill(archive: &Archive, count: u64) -> Vec<ContentId> {
        (0..count)
            .map(|i| {
                archive
                    .create_snapshot_at(KEY, format!("Node {i}"), Timestamp::from_secs(i as i64 * 10))
                    .unwrap()
            })
            .collect()
    }

    fn content(archive: &Archive, link: &SnapshotLink) -> String {
        String::from_utf8(archive.retrieve(&link.id).unwrap().content).unwrap()
    }

    // ---- Write path ----

    #[test]
    fn first_snapshot_has_no_links() {
        let archive = archive(LinkingStrategy::Comprehensive);
        let id = archive.create_snapshot(KEY, "hello").unwrap();
        let snapshot = archive.retrieve(&id).unwrap();
        assert_eq!(snapshot.seq, 0);
        assert!(snapshot.links.is_empty());
        assert_eq!(snapshot.resource_key, KEY);
    }

    #[test]
    fn sequence_numbers_are_consecutive() {
        let archive = archive(LinkingStrategy::Single);
        let ids = fill(&archive, 20);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(archive.retrieve(id).unwrap().seq, i as u64);
        }
        assert_eq!(archive.get_latest(KEY).unwrap().seq, 19);
    }

    #[test]
    fn keys_have_independent_chains() {
        let archive = archive(LinkingStrategy::Single);
        archive.create_snapshot(KEY, "a0").unwrap();
        archive.create_snapshot(KEY, "a1").unwrap();
        archive.create_snapshot("other.org", "b0").unwrap();

        assert_eq!(archive.get_latest(KEY).unwrap().seq, 1);
        assert_eq!(archive.get_latest("other.org").unwrap().seq, 0);
        assert_eq!(archive.keys(), vec![KEY.to_string(), "other.org".to_string()]);
    }

    #[test]
    fn explicit_timestamp_must_not_go_backwards() {
        let archive = archive(LinkingStrategy::Single);
        archive
            .create_snapshot_at(KEY, "v0", Timestamp::from_secs(100))
            .unwrap();
        let err = archive
            .create_snapshot_at(KEY, "v1", Timestamp::from_secs(99))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NonMonotonicTimestamp { .. }));

        // Equal timestamps are allowed.
        archive
            .create_snapshot_at(KEY, "v1", Timestamp::from_secs(100))
            .unwrap();
        assert_eq!(archive.get_latest(KEY).unwrap().seq, 1);
    }

    #[test]
    fn clock_behind_head_is_clamped() {
        let archive = archive(LinkingStrategy::Single);
        let future = Timestamp::now() + 3_600_000_000;
        archive.create_snapshot_at(KEY, "v0", future).unwrap();

        let id = archive.create_snapshot(KEY, "v1").unwrap();
        assert_eq!(archive.retrieve(&id).unwrap().timestamp, future);
    }

    #[test]
    fn clock_behind_head_is_rejected_without_clamping() {
        let config = ArchiveConfig {
            clamp_clock: false,
            ..ArchiveConfig::default()
        };
        let archive = Archive::in_memory(config).unwrap();
        archive
            .create_snapshot_at(KEY, "v0", Timestamp::now() + 3_600_000_000)
            .unwrap();
        assert!(matches!(
            archive.create_snapshot(KEY, "v1"),
            Err(ArchiveError::NonMonotonicTimestamp { .. })
        ));
    }

    #[test]
    fn invalid_strategy_is_rejected_at_construction() {
        let err = Archive::in_memory(ArchiveConfig::with_strategy(LinkingStrategy::KPrevious { k: 0 }))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
    }

    #[test]
    fn check_links_requires_head_and_backward_links() {
        let id = ContentId::digest(b"x");
        let latest = SnapshotLink::new(4, Timestamp::from_secs(4), id);
        let older = SnapshotLink::new(2, Timestamp::from_secs(2), id);
        let ahead = SnapshotLink::new(5, Timestamp::from_secs(5), id);

        let next = |links: &[SnapshotLink]| {
            Snapshot::new(KEY, Timestamp::from_secs(5), 5, Vec::new(), links.iter().copied().collect())
        };

        assert!(check_links(&next(&[older, latest]), &latest).is_ok());
        assert!(matches!(
            check_links(&next(&[older]), &latest),
            Err(ArchiveError::Unreachable { seq: 5, .. })
        ));
        // Same sequence number as the head but a different capture.
        let impostor = SnapshotLink::new(4, Timestamp::from_secs(3), id);
        assert!(matches!(
            check_links(&next(&[older, impostor]), &latest),
            Err(ArchiveError::Unreachable { seq: 5, .. })
        ));
        assert!(matches!(
            check_links(&next(&[latest, ahead]), &latest),
            Err(ArchiveError::ForwardLink { seq: 5, target: 5, .. })
        ));
    }

    #[test]
    fn concurrent_writers_on_one_key_never_share_a_seq() {
        use std::thread;

        let archive = Arc::new(archive(LinkingStrategy::SequentialExponential { base: 2.0 }));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let archive = Arc::clone(&archive);
                thread::spawn(move || {
                    for i in 0..25 {
                        archive.create_snapshot(KEY, format!("t{t}-{i}")).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("writer should not panic");
        }

        let all = archive.list_all(KEY).unwrap();
        let seqs: Vec<u64> = all.iter().map(|l| l.seq).collect();
        assert_eq!(seqs, (0..100).rev().collect::<Vec<_>>());
        assert!(archive.writers.lock().unwrap().is_empty());
    }

    #[test]
    fn writer_locks_are_released_after_each_write() {
        let archive = archive(LinkingStrategy::Single);
        for i in 0..50 {
            archive.create_snapshot(&format!("site-{i}.org"), "v0").unwrap();
        }
        assert!(archive.writers.lock().unwrap().is_empty());

        // A failed write releases its lock too.
        archive
            .create_snapshot_at(KEY, "v0", Timestamp::from_secs(100))
            .unwrap();
        assert!(archive
            .create_snapshot_at(KEY, "v1", Timestamp::from_secs(50))
            .is_err());
        assert!(archive.writers.lock().unwrap().is_empty());
        assert_eq!(archive.keys().len(), 51);
    }

    // ---- Read path ----

    #[test]
    fn lookups_by_number() {
        let archive = archive(LinkingStrategy::Single);
        fill(&archive, 10);

        assert_eq!(content(&archive, &archive.get_first(KEY).unwrap()), "Node 0");
        assert_eq!(content(&archive, &archive.get_nth(KEY, 6).unwrap()), "Node 6");
        assert!(matches!(
            archive.get_nth(KEY, 10),
            Err(ArchiveError::Retrieval(RetrievalError::SequenceGap { target: 10, at: 9 }))
        ));
    }

    #[test]
    fn lookups_by_time() {
        let archive = archive(LinkingStrategy::Comprehensive);
        fill(&archive, 10);

        let at = |secs, mode| {
            let link = archive.get_at_time(KEY, Timestamp::from_secs(secs), mode).unwrap();
            content(&archive, &link)
        };
        assert_eq!(at(55, Mode::Closest), "Node 5");
        assert_eq!(at(56, Mode::Closest), "Node 6");
        assert_eq!(at(59, Mode::LatestBefore), "Node 5");
        assert_eq!(at(51, Mode::EarliestAfter), "Node 6");
        assert_eq!(at(-1, Mode::Closest), "Node 0");
        assert_eq!(at(1_000, Mode::Closest), "Node 9");
    }

    #[test]
    fn as_of_is_an_exact_history_lookup() {
        let archive = archive(LinkingStrategy::Single);
        fill(&archive, 3);

        let link = archive.get_as_of(KEY, Timestamp::from_secs(10)).unwrap();
        assert_eq!(link.seq, 1);
        assert!(matches!(
            archive.get_as_of(KEY, Timestamp::from_secs(15)),
            Err(ArchiveError::Naming(NamingError::VersionNotFound { .. }))
        ));
    }

    #[test]
    fn unknown_key_is_name_not_found() {
        let archive = archive(LinkingStrategy::Single);
        assert!(matches!(
            archive.get_latest("nowhere"),
            Err(ArchiveError::Naming(NamingError::NameNotFound { .. }))
        ));
        assert!(matches!(
            archive.list_all("nowhere"),
            Err(ArchiveError::Naming(NamingError::NameNotFound { .. }))
        ));
    }

    #[test]
    fn list_all_is_newest_first() {
        let archive = archive(LinkingStrategy::Previous);
        fill(&archive, 8);
        let all = archive.list_all(KEY).unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(content(&archive, &all[0]), "Node 7");
        assert_eq!(content(&archive, &all[7]), "Node 0");
    }

    // ---- Instrumentation ----

    #[test]
    fn counts_reflect_operations() {
        let archive = archive(LinkingStrategy::Single);
        fill(&archive, 5);
        archive.reset_counts();

        archive.get_nth(KEY, 2).unwrap();
        // One retrieve to build the head link, two hops back.
        assert_eq!(archive.store_counts(), OpCounts { stores: 0, retrieves: 3 });
        assert_eq!(archive.naming_counts(), NamingCounts { updates: 0, gets: 1 });

        archive.create_snapshot(KEY, "Node 5").unwrap();
        assert_eq!(archive.store_counts().stores, 1);
        assert_eq!(archive.naming_counts().updates, 1);

        archive.reset_counts();
        assert_eq!(archive.store_counts(), OpCounts::default());
        assert_eq!(archive.naming_counts(), NamingCounts::default());
    }
}
