//! Error types for snapshot retrieval.

use iparo_store::StoreError;

/// Errors that can occur while walking snapshot links.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// No embedded link bridges the gap to the requested sequence number.
    #[error("sequence gap: cannot reach #{target} from #{at}")]
    SequenceGap {
        /// The requested sequence number.
        target: u64,
        /// Sequence number of the snapshot where the walk got stuck.
        at: u64,
    },

    /// A full backward walk could not reach sequence 0.
    #[error("snapshot chain broken: #{at} has no path to #0")]
    Unreachable {
        /// Sequence number of the last snapshot reached.
        at: u64,
    },

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for retrieval results.
pub type RetrievalResult<T> = Result<T, RetrievalError>;
