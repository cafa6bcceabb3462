use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use movebot_core::types::{ChannelCredentials, Provider};

use crate::error::ChannelError;
use crate::types::OutboundMessage;

/// Outbound side of a channel adapter.
///
/// Senders are stateless over tenant credentials: the same adapter instance
/// serves every tenant bound to its provider, with the per-tenant token
/// passed on each call.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// The provider this sender delivers to.
    fn provider(&self) -> Provider;

    /// Deliver one message using the given tenant credentials.
    async fn send(
        &self,
        credentials: &ChannelCredentials,
        msg: &OutboundMessage,
    ) -> Result<(), ChannelError>;
}

/// Provider → sender map, populated at process start from config.
///
/// Providers without a registered sender fail sends with `Unsupported`;
/// their adapters live in external deployments.
#[derive(Default)]
pub struct SenderRegistry {
    senders: HashMap<Provider, Arc<dyn ChannelSender>>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sender. A sender registered twice replaces the first.
    pub fn register(&mut self, sender: Arc<dyn ChannelSender>) {
        info!(provider = %sender.provider(), "registering channel sender");
        self.senders.insert(sender.provider(), sender);
    }

    pub fn get(&self, provider: Provider) -> Result<&Arc<dyn ChannelSender>, ChannelError> {
        self.senders
            .get(&provider)
            .ok_or_else(|| ChannelError::Unsupported(provider.as_str().to_string()))
    }

    pub async fn send(
        &self,
        provider: Provider,
        credentials: &ChannelCredentials,
        msg: &OutboundMessage,
    ) -> Result<(), ChannelError> {
        self.get(provider)?.send(credentials, msg).await
    }
}
