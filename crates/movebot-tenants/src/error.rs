use thiserror::Error;

/// Errors from tenant resolution and credential handling.
///
/// Messages deliberately avoid tenant and provider identifiers — resolution
/// failures are logged with a correlation id at the call site instead.
#[derive(Debug, Error)]
pub enum TenantError {
    /// No active binding for the `(provider, provider_account_id)` pair.
    #[error("no active channel binding for request")]
    BindingNotFound,

    /// The credential blob's context tag does not match this binding.
    #[error("credential context mismatch")]
    CryptoContextMismatch,

    /// The credential blob is malformed or has an unknown version.
    #[error("credential blob malformed")]
    CryptoMalformed,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("tenant config malformed: {0}")]
    ConfigMalformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TenantError>;
