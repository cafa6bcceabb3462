use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use movebot_channels::{OutboundMessage, SenderRegistry};
use movebot_core::config::OperatorConfig;
use movebot_core::types::Provider;
use movebot_dispatch::{format_operator_message, OperatorFormat};
use movebot_leads::LeadRepository;
use movebot_media::{MediaLinkSigner, MediaStore};
use movebot_pricing::catalog::Catalog;
use movebot_queue::{job_types, HandlerError, Job, JobHandler, JobQueue};
use movebot_tenants::TenantRegistry;

/// Signed media links handed to the operator stay valid this long.
const MEDIA_LINK_TTL_SECS: i64 = 7 * 24 * 3600;

#[derive(Debug, Deserialize)]
struct NotifyOperatorPayload {
    lead_id: String,
}

/// Formats the full lead and delivers it to the tenant's operator channel.
pub struct NotifyOperatorHandler {
    registry: Arc<TenantRegistry>,
    leads: Arc<LeadRepository>,
    media: Arc<MediaStore>,
    signer: Arc<MediaLinkSigner>,
    senders: Arc<SenderRegistry>,
    catalog: Arc<Catalog>,
    operator: OperatorConfig,
    queue: Arc<JobQueue>,
}

impl NotifyOperatorHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<TenantRegistry>,
        leads: Arc<LeadRepository>,
        media: Arc<MediaStore>,
        signer: Arc<MediaLinkSigner>,
        senders: Arc<SenderRegistry>,
        catalog: Arc<Catalog>,
        operator: OperatorConfig,
        queue: Arc<JobQueue>,
    ) -> Self {
        Self {
            registry,
            leads,
            media,
            signer,
            senders,
            catalog,
            operator,
            queue,
        }
    }
}

#[async_trait]
impl JobHandler for NotifyOperatorHandler {
    fn job_type(&self) -> &'static str {
        job_types::NOTIFY_OPERATOR
    }

    async fn run(&self, job: &Job) -> Result<(), HandlerError> {
        if let Some(key) = job.idempotency_key() {
            let fresh = self
                .queue
                .try_consume_idempotency_key(key)
                .map_err(HandlerError::transient)?;
            if !fresh {
                debug!(job_id = %job.id, "operator already notified");
                return Ok(());
            }
        }

        let payload: NotifyOperatorPayload =
            serde_json::from_value(job.payload.clone()).map_err(HandlerError::permanent)?;
        let lead = self
            .leads
            .get(&job.tenant_id, &payload.lead_id)
            .map_err(HandlerError::transient)?;

        let tenant_config = self
            .registry
            .tenant_config(&job.tenant_id)
            .map_err(HandlerError::permanent)?;
        let Some(operator_chat) = tenant_config.operator_chat_id.clone() else {
            warn!(tenant_id = %job.tenant_id, "no operator channel configured, lead kept in store");
            return Ok(());
        };
        let provider = tenant_config
            .operator_provider
            .unwrap_or(Provider::Telegram);

        let assets = self
            .media
            .list_for_lead(&job.tenant_id, &payload.lead_id)
            .map_err(HandlerError::transient)?;
        let exp = chrono::Utc::now().timestamp() + MEDIA_LINK_TTL_SECS;
        let links: Vec<String> = assets
            .iter()
            .map(|a| self.signer.signed_link(&a.tenant_id, a.kind, &a.id, exp))
            .collect();

        // Few attachments ride along as message media; many become a link
        // list inside the text.
        let inline = links.len() <= self.operator.max_inline_media_count;
        let text_links: &[String] = if inline { &[] } else { &links };

        let text = format_operator_message(
            &lead,
            &self.catalog,
            text_links,
            &OperatorFormat {
                translation_enabled: self.operator.lead_translation_enabled,
                target_lang: self.operator.lead_target_lang,
            },
        );

        let credentials = self
            .registry
            .credentials(&job.tenant_id, provider)
            .map_err(HandlerError::permanent)?;
        let msg = OutboundMessage {
            tenant_id: job.tenant_id.clone(),
            chat_id: operator_chat,
            text,
            buttons: Vec::new(),
            media_refs: if inline { links } else { Vec::new() },
        };
        self.senders
            .send(provider, &credentials, &msg)
            .await
            .map_err(super::channel_error)
    }
}
