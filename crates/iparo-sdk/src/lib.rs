//! High-level API for the IPARO archive.
//!
//! [`Archive`] ties a content store, a naming service and a linking strategy
//! together. It is the entry point for applications and for the simulator.

pub mod archive;
pub mod config;
pub mod error;

pub use archive::Archive;
pub use config::ArchiveConfig;
pub use error::{ArchiveError, ArchiveResult};

// Re-export the types callers need to use the archive.
pub use iparo_linking::LinkingStrategy;
pub use iparo_naming::{InMemoryNamingService, NamingCounts, NamingService};
pub use iparo_retrieval::Mode;
pub use iparo_store::{ContentStore, InMemoryContentStore, OpCounts};
pub use iparo_types::{ContentId, Snapshot, SnapshotLink, TimeUnit, Timestamp};
