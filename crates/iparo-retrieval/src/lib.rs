//! Greedy retrieval over IPARO snapshot links.
//!
//! There is no secondary index. Starting from a link to some snapshot
//! (normally the head returned by the naming service), the [`Navigator`]
//! walks backwards using only the links embedded in the snapshots it visits:
//!
//! - [`Navigator::locate_by_sequence`] follows, at every hop, the embedded
//!   link with the smallest sequence number that does not undershoot the
//!   target.
//! - [`Navigator::locate_by_timestamp`] interpolates between a snapshot and
//!   its predecessor and jumps backwards through the set of links it has
//!   discovered so far when the target lies earlier.
//!
//! Both are iterative loops in which the current sequence number strictly
//! decreases, so they terminate after at most `start.seq` hops.

pub mod error;
pub mod mode;
pub mod navigator;

pub use error::{RetrievalError, RetrievalResult};
pub use mode::Mode;
pub use navigator::{Located, Navigator};
