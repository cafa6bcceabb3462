use thiserror::Error;

/// Errors raised by channel adapters.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Network-level failure — retryable.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider API rejected the call.
    #[error("provider api error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// WhatsApp-style messaging window closed (e.g. Meta error 63016).
    /// The adapter substitutes a template message; the original send is
    /// never retried as-is.
    #[error("messaging template window closed")]
    TemplateWindowClosed,

    /// No adapter is registered for this provider in this process.
    #[error("no sender registered for provider: {0}")]
    Unsupported(String),
}

impl ChannelError {
    /// Whether the failure is worth retrying at the job layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChannelError::Transport(_) => true,
            ChannelError::Api { status, .. } => *status >= 500 || *status == 429,
            ChannelError::TemplateWindowClosed => false,
            ChannelError::Unsupported(_) => false,
        }
    }
}
