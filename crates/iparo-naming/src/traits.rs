//! The [`NamingService`] trait defining the resolver interface.

use iparo_types::{ContentId, Timestamp};

use crate::error::Result;
use crate::types::NamingCounts;

/// Resolver from resource keys to the content id of their latest snapshot.
///
/// Implementations must be thread-safe (`Send + Sync`). Writers to the same
/// key are expected to be serialized by the caller; the service itself only
/// guarantees that each call is atomic.
pub trait NamingService: Send + Sync {
    /// Point `key` at `id` and record the update in the history.
    ///
    /// The history entry is keyed by `timestamp`, or by the current wall
    /// clock when `None`. Always succeeds; unknown keys are created.
    fn update(&self, key: &str, id: ContentId, timestamp: Option<Timestamp>);

    /// The content id `key` currently points at.
    fn get_latest(&self, key: &str) -> Result<ContentId>;

    /// The content id recorded for `key` at exactly `timestamp`.
    fn get_at(&self, key: &str, timestamp: Timestamp) -> Result<ContentId>;

    /// All known resource keys, sorted.
    fn keys(&self) -> Vec<String>;

    /// Current operation counters.
    fn counts(&self) -> NamingCounts;

    /// Reset both counters to zero.
    fn reset_counts(&self);
}
