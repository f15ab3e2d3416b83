use iparo_sdk::ArchiveError;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("invalid simulation configuration: {0}")]
    Config(String),
}

pub type SimResult<T> = Result<T, SimError>;
