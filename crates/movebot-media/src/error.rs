use thiserror::Error;

/// Errors from media asset bookkeeping and object storage.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media asset not found: {id}")]
    NotFound { id: String },

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("media too large: {size_bytes} bytes (max {max_bytes})")]
    TooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("object store error: {0}")]
    ObjectStore(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
