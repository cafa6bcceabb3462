use thiserror::Error;

/// Errors that can occur in the lead repository.
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("lead not found: {tenant_id}/{lead_id}")]
    NotFound { tenant_id: String, lead_id: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt lead payload: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("unknown lead status: {0}")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, LeadError>;
