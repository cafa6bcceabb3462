use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use movebot_channels::{OutboundMessage, SenderRegistry};
use movebot_core::config::OperatorConfig;
use movebot_core::types::Provider;
use movebot_dispatch::CrewLeadView;
use movebot_leads::LeadRepository;
use movebot_pricing::catalog::Catalog;
use movebot_queue::{job_types, HandlerError, Job, JobHandler, JobQueue};
use movebot_tenants::TenantRegistry;

#[derive(Debug, Deserialize)]
struct CrewFallbackPayload {
    lead_id: String,
}

/// Delivers the sanitized crew view to the tenant's crew group.
///
/// Scheduled 2 s after finalization so the operator message lands first.
/// Re-execution with the same idempotency key sends nothing.
pub struct CrewFallbackHandler {
    registry: Arc<TenantRegistry>,
    leads: Arc<LeadRepository>,
    senders: Arc<SenderRegistry>,
    catalog: Arc<Catalog>,
    operator: OperatorConfig,
    queue: Arc<JobQueue>,
}

impl CrewFallbackHandler {
    pub fn new(
        registry: Arc<TenantRegistry>,
        leads: Arc<LeadRepository>,
        senders: Arc<SenderRegistry>,
        catalog: Arc<Catalog>,
        operator: OperatorConfig,
        queue: Arc<JobQueue>,
    ) -> Self {
        Self {
            registry,
            leads,
            senders,
            catalog,
            operator,
            queue,
        }
    }
}

#[async_trait]
impl JobHandler for CrewFallbackHandler {
    fn job_type(&self) -> &'static str {
        job_types::NOTIFY_CREW_FALLBACK
    }

    async fn run(&self, job: &Job) -> Result<(), HandlerError> {
        if let Some(key) = job.idempotency_key() {
            let fresh = self
                .queue
                .try_consume_idempotency_key(key)
                .map_err(HandlerError::transient)?;
            if !fresh {
                debug!(job_id = %job.id, "crew already notified");
                return Ok(());
            }
        }

        let payload: CrewFallbackPayload =
            serde_json::from_value(job.payload.clone()).map_err(HandlerError::permanent)?;

        let tenant_config = self
            .registry
            .tenant_config(&job.tenant_id)
            .map_err(HandlerError::permanent)?;
        let enabled = tenant_config
            .dispatch_crew_fallback_enabled
            .unwrap_or(self.operator.crew_fallback_enabled);
        if !enabled {
            return Ok(());
        }
        let Some(crew_chat) = tenant_config.crew_chat_id.clone() else {
            warn!(tenant_id = %job.tenant_id, "no crew channel configured");
            return Ok(());
        };

        let lead = self
            .leads
            .get(&job.tenant_id, &payload.lead_id)
            .map_err(HandlerError::transient)?;
        let lang = self.operator.lead_target_lang;
        let view = CrewLeadView::project(&lead, &self.catalog, lang);
        let text = view.render(lang);

        let provider = tenant_config
            .operator_provider
            .unwrap_or(Provider::Telegram);
        let credentials = self
            .registry
            .credentials(&job.tenant_id, provider)
            .map_err(HandlerError::permanent)?;
        let msg = OutboundMessage {
            tenant_id: job.tenant_id.clone(),
            chat_id: crew_chat,
            text,
            buttons: Vec::new(),
            media_refs: Vec::new(),
        };
        self.senders
            .send(provider, &credentials, &msg)
            .await
            .map_err(super::channel_error)
    }
}
