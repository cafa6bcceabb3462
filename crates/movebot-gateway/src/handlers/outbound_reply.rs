use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use movebot_channels::{OutboundMessage, SenderRegistry};
use movebot_core::types::{Button, Provider};
use movebot_queue::{job_types, HandlerError, Job, JobHandler};
use movebot_tenants::TenantRegistry;

#[derive(Debug, Deserialize)]
struct OutboundReplyPayload {
    provider: Provider,
    chat_id: String,
    text: String,
    #[serde(default)]
    buttons: Vec<Button>,
}

/// Delivers engine replies through the channel adapter bound to the tenant.
pub struct OutboundReplyHandler {
    registry: Arc<TenantRegistry>,
    senders: Arc<SenderRegistry>,
}

impl OutboundReplyHandler {
    pub fn new(registry: Arc<TenantRegistry>, senders: Arc<SenderRegistry>) -> Self {
        Self { registry, senders }
    }
}

#[async_trait]
impl JobHandler for OutboundReplyHandler {
    fn job_type(&self) -> &'static str {
        job_types::OUTBOUND_REPLY
    }

    async fn run(&self, job: &Job) -> Result<(), HandlerError> {
        let payload: OutboundReplyPayload =
            serde_json::from_value(job.payload.clone()).map_err(HandlerError::permanent)?;

        let credentials = self
            .registry
            .credentials(&job.tenant_id, payload.provider)
            .map_err(HandlerError::permanent)?;

        let msg = OutboundMessage {
            tenant_id: job.tenant_id.clone(),
            chat_id: payload.chat_id,
            text: payload.text,
            buttons: payload.buttons,
            media_refs: Vec::new(),
        };
        self.senders
            .send(payload.provider, &credentials, &msg)
            .await
            .map_err(super::channel_error)
    }
}
