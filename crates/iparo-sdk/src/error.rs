use iparo_types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("store error: {0}")]
    Store(#[from] iparo_store::StoreError),

    #[error("naming error: {0}")]
    Naming(#[from] iparo_naming::NamingError),

    #[error("retrieval error: {0}")]
    Retrieval(#[from] iparo_retrieval::RetrievalError),

    #[error("linking error: {0}")]
    Linking(#[from] iparo_linking::LinkingError),

    #[error("{key}: links for #{seq} do not include the current head")]
    Unreachable { key: String, seq: u64 },

    #[error("{key}: snapshot #{seq} would link forward to #{target}")]
    ForwardLink { key: String, seq: u64, target: u64 },

    #[error("{key}: timestamp {timestamp} precedes the current head at {latest}")]
    NonMonotonicTimestamp {
        key: String,
        timestamp: Timestamp,
        latest: Timestamp,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
