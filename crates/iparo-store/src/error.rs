use iparo_types::ContentId;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No entry is stored under the requested id.
    #[error("content not found: {0}")]
    ContentNotFound(ContentId),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The stored bytes no longer hash to their id, or cannot be decoded.
    #[error("corrupt entry {id}: {reason}")]
    CorruptObject { id: ContentId, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
