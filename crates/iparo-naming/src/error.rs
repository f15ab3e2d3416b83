//! Error types for naming operations.

use iparo_types::Timestamp;
use thiserror::Error;

/// Errors that can occur during naming operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    /// The resource key has never been written.
    #[error("name not found: {key}")]
    NameNotFound { key: String },

    /// No update was recorded for the key at exactly this timestamp.
    #[error("no version of {key} recorded at {timestamp}")]
    VersionNotFound { key: String, timestamp: Timestamp },
}

/// Convenience type alias for naming operations.
pub type Result<T> = std::result::Result<T, NamingError>;
