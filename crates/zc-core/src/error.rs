use thiserror::Error;

pub type ZcResult<T> = Result<T, ZcError>;

#[derive(Debug, Error)]
pub enum ZcError {
    #[error("buffer too short: need {needed} bytes, have {available}")]
    ShortBuffer { needed: usize, available: usize },

    #[error("checksum backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
