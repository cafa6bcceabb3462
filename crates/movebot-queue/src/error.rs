use thiserror::Error;

/// Errors that can occur inside the queue store or the worker loop.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("job payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("job not found: {id}")]
    JobNotFound { id: String },

    #[error("unknown job status: {0}")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;

/// How a handler failure should be treated by the queue.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Retry with backoff until `max_attempts` is exhausted.
    #[error("transient handler error: {0}")]
    Transient(String),

    /// Do not retry — e.g. a non-retryable provider 4xx.
    #[error("permanent handler error: {0}")]
    Permanent(String),
}

impl HandlerError {
    pub fn transient(msg: impl std::fmt::Display) -> Self {
        HandlerError::Transient(msg.to_string())
    }

    pub fn permanent(msg: impl std::fmt::Display) -> Self {
        HandlerError::Permanent(msg.to_string())
    }
}
