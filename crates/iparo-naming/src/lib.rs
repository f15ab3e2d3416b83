//! Naming service for the IPARO archive.
//!
//! This crate plays the role of an IPNS-like resolver. It maps a resource key
//! (typically a URL) to the content id of that resource's latest snapshot.
//! The "current" pointer is the only mutable state in the whole archive;
//! everything it points at is immutable.
//!
//! Each update is also recorded in a `(key, timestamp) -> id` history that
//! serves exact "as of" lookups. Greedy traversals never use the history:
//! they only ask for the latest id and walk backwards from there.
//!
//! # Modules
//!
//! - [`error`] -- Error types for naming operations
//! - [`types`] -- [`NamingCounts`] instrumentation
//! - [`traits`] -- The [`NamingService`] trait defining the resolver interface
//! - [`memory`] -- In-memory [`InMemoryNamingService`]

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{NamingError, Result};
pub use memory::InMemoryNamingService;
pub use traits::NamingService;
pub use types::NamingCounts;
