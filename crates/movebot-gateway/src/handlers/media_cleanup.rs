use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use movebot_media::{MediaStore, ObjectStore};
use movebot_queue::{job_types, HandlerError, Job, JobHandler};

/// Deletes expired media objects and their rows. Enqueued periodically by
/// the poller; naturally idempotent.
pub struct MediaCleanupHandler {
    media: Arc<MediaStore>,
    objects: Arc<dyn ObjectStore>,
}

impl MediaCleanupHandler {
    pub fn new(media: Arc<MediaStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { media, objects }
    }
}

#[async_trait]
impl JobHandler for MediaCleanupHandler {
    fn job_type(&self) -> &'static str {
        job_types::MEDIA_CLEANUP
    }

    async fn run(&self, _job: &Job) -> Result<(), HandlerError> {
        let removed = self
            .media
            .cleanup_expired(self.objects.as_ref())
            .map_err(HandlerError::transient)?;
        debug!(removed, "media cleanup pass finished");
        Ok(())
    }
}
