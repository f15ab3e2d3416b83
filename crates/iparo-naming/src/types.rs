//! Instrumentation types for the naming service.

use serde::{Deserialize, Serialize};

/// Snapshot of a naming service's operation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingCounts {
    /// Number of `update` calls.
    pub updates: u64,
    /// Number of `get_latest` and `get_at` calls.
    pub gets: u64,
}
