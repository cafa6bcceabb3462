use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use movebot_channels::MediaFetcher;
use movebot_core::types::{InputMediaItem, Provider};
use movebot_media::store::MAX_MEDIA_BYTES;
use movebot_media::{MediaAsset, MediaKind, MediaStore, ObjectStore};
use movebot_queue::{job_types, HandlerError, Job, JobHandler, JobQueue};
use movebot_tenants::TenantRegistry;

#[derive(Debug, Deserialize)]
struct ProcessMediaPayload {
    provider: Provider,
    chat_id: String,
    /// Always from the job payload, never from the session — the session may
    /// already be finalized and deleted by the time this runs.
    lead_id: String,
    #[allow(dead_code)]
    message_id: String,
    items: Vec<InputMediaItem>,
}

/// Downloads inbound attachments, stores them, and records asset rows.
pub struct ProcessMediaHandler {
    registry: Arc<TenantRegistry>,
    fetcher: Arc<dyn MediaFetcher>,
    objects: Arc<dyn ObjectStore>,
    media: Arc<MediaStore>,
    queue: Arc<JobQueue>,
    ttl_days: u32,
}

impl ProcessMediaHandler {
    pub fn new(
        registry: Arc<TenantRegistry>,
        fetcher: Arc<dyn MediaFetcher>,
        objects: Arc<dyn ObjectStore>,
        media: Arc<MediaStore>,
        queue: Arc<JobQueue>,
        ttl_days: u32,
    ) -> Self {
        Self {
            registry,
            fetcher,
            objects,
            media,
            queue,
            ttl_days,
        }
    }
}

#[async_trait]
impl JobHandler for ProcessMediaHandler {
    fn job_type(&self) -> &'static str {
        job_types::PROCESS_MEDIA
    }

    async fn run(&self, job: &Job) -> Result<(), HandlerError> {
        if let Some(key) = job.idempotency_key() {
            let fresh = self
                .queue
                .try_consume_idempotency_key(key)
                .map_err(HandlerError::transient)?;
            if !fresh {
                debug!(job_id = %job.id, "media batch already ingested");
                return Ok(());
            }
        }

        let payload: ProcessMediaPayload =
            serde_json::from_value(job.payload.clone()).map_err(HandlerError::permanent)?;
        let credentials = self
            .registry
            .credentials(&job.tenant_id, payload.provider)
            .map_err(HandlerError::permanent)?;

        for item in &payload.items {
            if item.size_bytes > MAX_MEDIA_BYTES {
                warn!(size = item.size_bytes, "attachment over size cap, skipped");
                continue;
            }

            let (bytes, fetched_type) = self
                .fetcher
                .fetch(payload.provider, &credentials, &item.source_ref)
                .await
                .map_err(super::channel_error)?;

            // Prefer the declared type; the fetched header is the fallback.
            let content_type = if item.content_type.is_empty() {
                fetched_type
            } else {
                item.content_type.clone()
            };
            let kind = MediaKind::from_content_type(&content_type);

            let (id, object_key) =
                MediaStore::object_key(&job.tenant_id, Some(&payload.lead_id), &content_type);
            self.objects
                .put(&object_key, &bytes)
                .map_err(HandlerError::transient)?;

            let expires_at = (chrono::Utc::now()
                + chrono::Duration::days(self.ttl_days as i64))
            .to_rfc3339();
            self.media
                .insert(&MediaAsset {
                    id,
                    tenant_id: job.tenant_id.clone(),
                    lead_id: Some(payload.lead_id.clone()),
                    chat_id: payload.chat_id.clone(),
                    provider: payload.provider,
                    kind,
                    content_type,
                    size_bytes: bytes.len() as u64,
                    s3_key: object_key,
                    expires_at: Some(expires_at),
                    created_at: chrono::Utc::now().to_rfc3339(),
                })
                .map_err(HandlerError::transient)?;
        }
        Ok(())
    }
}
