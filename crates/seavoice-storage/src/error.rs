use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("slot not found: {slot}")]
    NotFound { slot: String },

    #[error("slot {slot} is missing required keys: {}", keys.join(", "))]
    MissingKeys { slot: String, keys: Vec<String> },

    #[error("no data directory available on this platform")]
    NoDataDir,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
