use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use movebot_queue::{job_types, EnqueueRequest, JobQueue};

/// How often the poller wakes up.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// One cleanup job per hour, keyed by the hour so duplicates no-op.
const CLEANUP_EVERY_SECS: i64 = 3600;

/// Housekeeping loop: returns stale `running` jobs to `pending` and enqueues
/// the hourly media cleanup.
pub struct Poller {
    queue: Arc<JobQueue>,
    lease_horizon: Duration,
}

impl Poller {
    pub fn new(queue: Arc<JobQueue>, lease_horizon: Duration) -> Self {
        Self {
            queue,
            lease_horizon,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("poller started");
        let mut last_cleanup_bucket: i64 = -1;
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.queue.sweep_stale(self.lease_horizon) {
                        error!("lease sweep failed: {e}");
                    }

                    let bucket = chrono::Utc::now().timestamp() / CLEANUP_EVERY_SECS;
                    if bucket != last_cleanup_bucket {
                        last_cleanup_bucket = bucket;
                        let req = EnqueueRequest::new(
                            "system",
                            job_types::MEDIA_CLEANUP,
                            serde_json::json!({}),
                        )
                        .idempotency_key(format!("media_cleanup:{bucket}"));
                        if let Err(e) = self.queue.enqueue(req) {
                            error!("media cleanup enqueue failed: {e}");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("poller shutting down");
                        break;
                    }
                }
            }
        }
    }
}
