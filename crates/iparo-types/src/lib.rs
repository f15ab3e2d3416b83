//! Foundation types for the IPARO archive.
//!
//! An archive is an append-only chain of immutable [`Snapshot`]s per resource
//! key. Instead of a single "previous" pointer, every snapshot embeds a set of
//! [`SnapshotLink`]s to earlier snapshots of the same resource, chosen at write
//! time by a linking strategy. Every other IPARO crate depends on
//! `iparo-types`.
//!
//! # Key Types
//!
//! - [`ContentId`] -- content-addressed identifier (domain-separated BLAKE3)
//! - [`Timestamp`] -- microseconds since the UNIX epoch
//! - [`SnapshotLink`] -- weak back-reference: sequence number, timestamp, id
//! - [`Snapshot`] -- one immutable capture of a resource

pub mod content_id;
pub mod error;
pub mod link;
pub mod snapshot;
pub mod temporal;

pub use content_id::ContentId;
pub use error::TypeError;
pub use link::SnapshotLink;
pub use snapshot::Snapshot;
pub use temporal::{TimeUnit, Timestamp};
