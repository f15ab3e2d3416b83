//! Linking strategies for the IPARO archive.
//!
//! When a new snapshot is written, a [`LinkingStrategy`] looks at the current
//! head of the resource and decides which earlier snapshots the new one
//! should embed links to. Dense link sets make lookups cheap and snapshots
//! large; sparse ones do the opposite. Every strategy keeps the link to the
//! current head so the chain stays connected.

pub mod context;
pub mod error;
mod sequential;
pub mod strategy;
mod temporal;

pub use context::LinkContext;
pub use error::{LinkingError, LinkingResult};
pub use strategy::LinkingStrategy;
