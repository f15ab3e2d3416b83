use iparo_retrieval::RetrievalError;

/// Errors raised while choosing links for a new snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LinkingError {
    /// A strategy parameter is out of range.
    #[error("invalid strategy configuration: {0}")]
    Configuration(String),

    /// Walking the existing chain failed.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}

pub type LinkingResult<T> = Result<T, LinkingError>;
