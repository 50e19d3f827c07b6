use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid header configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
