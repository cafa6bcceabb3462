use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use movebot_core::config::MovebotConfig;
use movebot_core::types::ProviderEvent;
use movebot_engine::{Effect, Engine, EngineContext, InputEvent, StepOutcome};
use movebot_leads::{LeadError, LeadRepository};
use movebot_queue::{job_types, EnqueueRequest, JobQueue, QueueError};
use movebot_sessions::{DedupOutcome, InboundDedup, SessionError, SessionState, SessionStore};
use movebot_tenants::{TenantContext, TenantError, TenantRegistry};

/// Literal response for a replayed `(provider, message_id)` tuple.
pub const DUPLICATE_IGNORED: &str = "(duplicate ignored)";

/// Crew-fallback delivery trails the operator notification by this much so
/// the full lead always arrives first.
const CREW_FALLBACK_DELAY: Duration = Duration::from_secs(2);

/// What the webhook layer sends back to the provider.
#[derive(Debug, Clone)]
pub struct IngressReply {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum IngressError {
    /// No active tenant binding — surfaces as 404 without identifiers.
    #[error("unknown channel binding")]
    UnknownBinding,

    /// Credential or config failure — surfaces as 403 without identifiers.
    #[error("tenant configuration rejected")]
    TenantRejected,

    /// The session's bot flavour is not enabled in this deployment.
    #[error("bot not enabled")]
    BotDisabled,

    /// A concurrent message for the same chat won the session write; the
    /// provider should retry. Surfaces as 500.
    #[error("session write conflict")]
    Conflict,

    /// Store failure — surfaces as 500 so the provider retries.
    #[error("store error: {0}")]
    Store(String),
}

impl From<TenantError> for IngressError {
    fn from(e: TenantError) -> Self {
        match e {
            TenantError::BindingNotFound => IngressError::UnknownBinding,
            TenantError::CryptoContextMismatch | TenantError::CryptoMalformed => {
                IngressError::TenantRejected
            }
            other => IngressError::Store(other.to_string()),
        }
    }
}

impl From<SessionError> for IngressError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Conflict { .. } => IngressError::Conflict,
            other => IngressError::Store(other.to_string()),
        }
    }
}

impl From<QueueError> for IngressError {
    fn from(e: QueueError) -> Self {
        IngressError::Store(e.to_string())
    }
}

impl From<LeadError> for IngressError {
    fn from(e: LeadError) -> Self {
        IngressError::Store(e.to_string())
    }
}

/// The ingress pipeline: tenant resolution → dedup → engine step → session
/// write → effects → outbound reply job.
///
/// Runs on the webhook handler; everything side-effecting beyond the stores
/// is deferred to the job queue.
pub struct Ingress {
    config: MovebotConfig,
    engine: Engine,
    registry: Arc<TenantRegistry>,
    sessions: Arc<SessionStore>,
    dedup: Arc<InboundDedup>,
    leads: Arc<LeadRepository>,
    queue: Arc<JobQueue>,
}

impl Ingress {
    pub fn new(
        config: MovebotConfig,
        registry: Arc<TenantRegistry>,
        sessions: Arc<SessionStore>,
        dedup: Arc<InboundDedup>,
        leads: Arc<LeadRepository>,
        queue: Arc<JobQueue>,
    ) -> Self {
        let engine = Engine::new(config.pricing.clone());
        Self {
            config,
            engine,
            registry,
            sessions,
            dedup,
            leads,
            queue,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Process one provider-normalized inbound event.
    #[instrument(skip(self, event), fields(provider = %event.provider, chat_id = %event.chat_id, message_id = %event.message_id))]
    pub fn process(&self, event: &ProviderEvent) -> Result<IngressReply, IngressError> {
        let tenant = self
            .registry
            .resolve(event.provider, &event.provider_account_id)?;

        if self
            .dedup
            .record(&tenant.tenant_id, event.provider, &event.message_id)?
            == DedupOutcome::Duplicate
        {
            return Ok(IngressReply {
                text: DUPLICATE_IGNORED.to_string(),
            });
        }

        // A failed attempt must not poison the dedup table: the provider
        // retries on 5xx, and that retry has to reach the engine.
        match self.process_fresh(&tenant, event) {
            Ok(reply) => Ok(reply),
            Err(e) => {
                if let Err(forget_err) =
                    self.dedup
                        .forget(&tenant.tenant_id, event.provider, &event.message_id)
                {
                    error!("dedup compensation failed: {forget_err}");
                }
                Err(e)
            }
        }
    }

    fn process_fresh(
        &self,
        tenant: &TenantContext,
        event: &ProviderEvent,
    ) -> Result<IngressReply, IngressError> {
        let existing = self.sessions.get(&tenant.tenant_id, &event.chat_id)?;
        let observed = existing.as_ref().map(|s| s.updated_at.clone());
        let session = existing.unwrap_or_else(|| {
            let mut s = SessionState::new(tenant.tenant_id.clone(), event.chat_id.clone());
            if let Some(lang) = tenant.config.default_language {
                s.language = lang;
            }
            s
        });

        if !self.config.bots.enabled.contains(&session.bot_type) {
            warn!(bot_type = %session.bot_type, "inbound for disabled bot");
            return Err(IngressError::BotDisabled);
        }

        let input = to_input_event(event);
        let ctx = EngineContext {
            today: chrono::Utc::now().date_naive(),
            estimate_display_enabled: tenant
                .config
                .estimate_display_enabled
                .unwrap_or(self.config.pricing.estimate_display_enabled),
        };
        let outcome = self.engine.step(&session, &input, &ctx);

        if outcome.terminal {
            self.finalize(tenant, &outcome)?;
        } else {
            self.sessions.upsert(&outcome.session, observed.as_deref())?;
        }

        for effect in &outcome.effects {
            if let Effect::CollectMedia(items) = effect {
                self.queue.enqueue(
                    EnqueueRequest::new(
                        tenant.tenant_id.clone(),
                        job_types::PROCESS_MEDIA,
                        json!({
                            "provider": event.provider,
                            "chat_id": event.chat_id,
                            "lead_id": outcome.session.lead_id,
                            "message_id": event.message_id,
                            "items": items,
                        }),
                    )
                    .idempotency_key(format!("{}:process_media_v1", event.message_id)),
                )?;
            }
        }

        self.queue.enqueue(
            EnqueueRequest::new(
                tenant.tenant_id.clone(),
                job_types::OUTBOUND_REPLY,
                json!({
                    "provider": event.provider,
                    "chat_id": event.chat_id,
                    "text": outcome.reply.text.clone(),
                    "buttons": outcome.reply.buttons.clone(),
                }),
            )
            .priority(10),
        )?;

        Ok(IngressReply {
            text: outcome.reply.text,
        })
    }

    /// Finalization: persist the lead, enqueue the notification jobs, then
    /// delete the session. The lead insert is idempotent on `lead_id`, so a
    /// crashed finalization replayed by the provider converges.
    fn finalize(&self, tenant: &TenantContext, outcome: &StepOutcome) -> Result<(), IngressError> {
        let session = &outcome.session;
        let lead = self.leads.insert(
            &session.tenant_id,
            &session.lead_id,
            &session.chat_id,
            session.language,
            &session.data,
        )?;
        info!(lead_seq = lead.lead_seq, "lead finalized");

        self.queue.enqueue(
            EnqueueRequest::new(
                session.tenant_id.clone(),
                job_types::NOTIFY_OPERATOR,
                json!({ "lead_id": session.lead_id }),
            )
            .priority(5)
            .idempotency_key(format!("{}:notify_operator_v1", session.lead_id)),
        )?;

        let crew_enabled = tenant
            .config
            .dispatch_crew_fallback_enabled
            .unwrap_or(self.config.operator.crew_fallback_enabled);
        if crew_enabled {
            self.queue.enqueue(
                EnqueueRequest::new(
                    session.tenant_id.clone(),
                    job_types::NOTIFY_CREW_FALLBACK,
                    json!({ "lead_id": session.lead_id }),
                )
                .delay(CREW_FALLBACK_DELAY)
                .idempotency_key(format!("{}:crew_fallback_v1", session.lead_id)),
            )?;
        }

        self.sessions.delete(&session.tenant_id, &session.chat_id)?;
        Ok(())
    }
}

/// Event precedence: button > location > media > text. Providers never send
/// more than one meaningfully, but a deterministic order keeps replays stable.
fn to_input_event(event: &ProviderEvent) -> InputEvent {
    if let Some(payload) = &event.button_payload {
        return InputEvent::Button(payload.clone());
    }
    if let Some(location) = event.location {
        return InputEvent::Location(location);
    }
    if !event.media.is_empty() {
        return InputEvent::Media(event.media.clone());
    }
    InputEvent::Text(event.text.clone().unwrap_or_default())
}
