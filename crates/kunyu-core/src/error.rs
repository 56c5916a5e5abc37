use thiserror::Error;

#[derive(Debug, Error)]
pub enum KunyuError {
    #[error("cache storage used before initialization")]
    StorageUnavailable,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
