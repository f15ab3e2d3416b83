//! Wire form of a snapshot inside the store.
//!
//! Snapshots are bincode-encoded. Link sets are ordered, so the same
//! snapshot always encodes to the same bytes and therefore the same id.

use iparo_types::Snapshot;

use crate::error::{StoreError, StoreResult};

/// Serialize a snapshot to its stored bytes.
pub fn encode_snapshot(snapshot: &Snapshot) -> StoreResult<Vec<u8>> {
    bincode::serialize(snapshot).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Deserialize stored bytes back into a snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> StoreResult<Snapshot> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
