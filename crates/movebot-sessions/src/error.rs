use thiserror::Error;

/// Errors that can occur during session store operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session row exists for this `(tenant_id, chat_id)`.
    #[error("session not found: {tenant_id}/{chat_id}")]
    NotFound { tenant_id: String, chat_id: String },

    /// The guarded upsert observed a different `updated_at` than expected —
    /// another ingress handler committed first. The caller should fail the
    /// request so the provider retries.
    #[error("session write conflict: {tenant_id}/{chat_id}")]
    Conflict { tenant_id: String, chat_id: String },

    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The persisted session payload could not be decoded.
    #[error("corrupt session payload: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The persisted step string is not in the step vocabulary.
    #[error("unknown step: {0}")]
    UnknownStep(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
