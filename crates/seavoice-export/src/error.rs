use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no data available to export")]
    NoData,

    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
