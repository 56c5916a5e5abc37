use kunyu_core::{KunyuError, ResourceKind};
use kunyu_parse::ParseError;
use thiserror::Error;

/// Errors surfaced by the scraping pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The site answered 404, served its invalid-id page, or a search
    /// returned no candidates.
    #[error("{kind} not found: {query}")]
    NotFound { kind: ResourceKind, query: String },

    /// Transport failure or timeout. Never retried internally.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("cache storage used before initialization")]
    StorageUnavailable,

    #[error("storage error: {0}")]
    Storage(KunyuError),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn not_found(kind: ResourceKind, query: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            query: query.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<KunyuError> for ScrapeError {
    fn from(err: KunyuError) -> Self {
        match err {
            KunyuError::StorageUnavailable => Self::StorageUnavailable,
            KunyuError::Config(message) => Self::Config(message),
            other => Self::Storage(other),
        }
    }
}
