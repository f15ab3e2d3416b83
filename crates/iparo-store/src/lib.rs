//! Content-addressed snapshot storage for the IPARO archive.
//!
//! This crate plays the role of an IPFS-like blob store. Every [`Snapshot`]
//! is serialized with bincode and stored under the domain-separated BLAKE3
//! hash of those bytes. The store is the only place snapshot bytes live.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests, simulations
//!   and embedding
//!
//! # Design Rules
//!
//! 1. Entries are immutable once written; there is no update or delete.
//! 2. Storing byte-identical content twice returns the same id.
//! 3. Concurrent reads are always safe.
//! 4. Every `store` and `retrieve` is counted for cost accounting; counters
//!    never influence behavior.
//!
//! [`Snapshot`]: iparo_types::Snapshot

pub mod codec;
pub mod counts;
pub mod error;
pub mod hasher;
pub mod memory;
pub mod traits;

pub use codec::{decode_snapshot, encode_snapshot};
pub use counts::OpCounts;
pub use error::{StoreError, StoreResult};
pub use hasher::ContentHasher;
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
