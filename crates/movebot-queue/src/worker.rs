use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{HandlerError, Result};
use crate::queue::JobQueue;
use crate::types::Job;

/// One job-type executor. Implementations live near their dependencies
/// (channel senders, stores) and are registered at process start for the
/// worker's role — no import-time side effects.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job type this handler executes.
    fn job_type(&self) -> &'static str;

    /// Execute one job. Re-invocation with the same payload must not
    /// duplicate external side effects (use the payload idempotency key).
    async fn run(&self, job: &Job) -> std::result::Result<(), HandlerError>;
}

/// Sequential claim → execute → mark loop over the shared queue.
///
/// A process may run several workers; each polls independently. The set of
/// registered handlers decides which job types this worker claims.
pub struct Worker {
    queue: Arc<JobQueue>,
    handlers: HashMap<&'static str, Arc<dyn JobHandler>>,
    poll_interval: Duration,
}

impl Worker {
    /// Poll intervals outside 50–500 ms are clamped.
    pub fn new(queue: Arc<JobQueue>, poll_interval: Duration) -> Self {
        let poll_interval = poll_interval.clamp(Duration::from_millis(50), Duration::from_millis(500));
        Self {
            queue,
            handlers: HashMap::new(),
            poll_interval,
        }
    }

    /// Register a handler. A handler registered twice replaces the first.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        info!(job_type = handler.job_type(), "registering job handler");
        self.handlers.insert(handler.job_type(), handler);
    }

    /// Job types this worker is allowed to claim.
    pub fn allowed_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Claim and execute at most one job. Returns whether a job was run.
    pub async fn tick(&self) -> Result<bool> {
        let allowed = self.allowed_types();
        let Some(job) = self.queue.claim(&allowed)? else {
            return Ok(false);
        };

        // The claim query only returns registered types, so a missing
        // handler is an invariant violation, not a routine skip.
        let Some(handler) = self.handlers.get(job.job_type.as_str()) else {
            error!(job_id = %job.id, job_type = %job.job_type, "claimed job has no handler");
            self.queue
                .fail(&job.id, "no handler registered", true)?;
            return Ok(true);
        };

        match handler.run(&job).await {
            Ok(()) => {
                self.queue.complete(&job.id)?;
                info!(job_id = %job.id, job_type = %job.job_type, "job completed");
            }
            Err(HandlerError::Transient(msg)) => {
                warn!(job_id = %job.id, job_type = %job.job_type, error = %msg, "job failed, will retry");
                self.queue.fail(&job.id, &msg, false)?;
            }
            Err(HandlerError::Permanent(msg)) => {
                error!(job_id = %job.id, job_type = %job.job_type, error = %msg, "job failed permanently");
                self.queue.fail(&job.id, &msg, true)?;
            }
        }
        Ok(true)
    }

    /// Main loop. Drains due jobs back-to-back, sleeps `poll_interval` when
    /// the queue is empty, and exits when `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(types = ?self.allowed_types(), "worker started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {
                    loop {
                        match self.tick().await {
                            Ok(true) => continue,
                            Ok(false) => break,
                            Err(e) => {
                                error!("worker tick error: {e}");
                                break;
                            }
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("worker shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::queue::EnqueueRequest;
    use crate::types::{job_types, JobStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        job_type: &'static str,
        runs: AtomicUsize,
        fail_with: Option<fn() -> HandlerError>,
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        fn job_type(&self) -> &'static str {
            self.job_type
        }

        async fn run(&self, _job: &Job) -> std::result::Result<(), HandlerError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }
    }

    fn queue() -> Arc<JobQueue> {
        let conn = rusqlite::Connection::open_in_memory().expect("open failed");
        init_db(&conn).expect("init failed");
        Arc::new(JobQueue::new(conn))
    }

    #[tokio::test]
    async fn tick_runs_and_completes_job() {
        let q = queue();
        let job = q
            .enqueue(EnqueueRequest::new(
                "t1",
                job_types::OUTBOUND_REPLY,
                serde_json::json!({}),
            ))
            .expect("enqueue failed");

        let handler = Arc::new(CountingHandler {
            job_type: job_types::OUTBOUND_REPLY,
            runs: AtomicUsize::new(0),
            fail_with: None,
        });
        let mut worker = Worker::new(q.clone(), Duration::from_millis(200));
        worker.register(handler.clone());

        assert!(worker.tick().await.expect("tick failed"));
        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
        assert_eq!(q.get(&job.id).expect("get failed").status, JobStatus::Completed);
        // Queue drained.
        assert!(!worker.tick().await.expect("tick failed"));
    }

    #[tokio::test]
    async fn unregistered_type_is_not_claimed() {
        let q = queue();
        q.enqueue(EnqueueRequest::new(
            "t1",
            job_types::NOTIFY_CREW_FALLBACK,
            serde_json::json!({}),
        ))
        .expect("enqueue failed");

        let mut worker = Worker::new(q.clone(), Duration::from_millis(200));
        worker.register(Arc::new(CountingHandler {
            job_type: job_types::OUTBOUND_REPLY,
            runs: AtomicUsize::new(0),
            fail_with: None,
        }));

        // Dispatch-role job stays pending for a worker without its handler.
        assert!(!worker.tick().await.expect("tick failed"));
        assert_eq!(q.list_status(JobStatus::Pending).expect("list failed").len(), 1);
    }

    #[tokio::test]
    async fn transient_failure_retries() {
        let q = queue();
        let job = q
            .enqueue(EnqueueRequest::new(
                "t1",
                job_types::OUTBOUND_REPLY,
                serde_json::json!({}),
            ))
            .expect("enqueue failed");

        let mut worker = Worker::new(q.clone(), Duration::from_millis(200));
        worker.register(Arc::new(CountingHandler {
            job_type: job_types::OUTBOUND_REPLY,
            runs: AtomicUsize::new(0),
            fail_with: Some(|| HandlerError::transient("flaky network")),
        }));

        assert!(worker.tick().await.expect("tick failed"));
        let row = q.get(&job.id).expect("get failed");
        assert_eq!(row.status, JobStatus::Pending);
        assert_eq!(row.attempts, 1);
    }

    #[tokio::test]
    async fn permanent_failure_parks_job() {
        let q = queue();
        let job = q
            .enqueue(EnqueueRequest::new(
                "t1",
                job_types::OUTBOUND_REPLY,
                serde_json::json!({}),
            ))
            .expect("enqueue failed");

        let mut worker = Worker::new(q.clone(), Duration::from_millis(200));
        worker.register(Arc::new(CountingHandler {
            job_type: job_types::OUTBOUND_REPLY,
            runs: AtomicUsize::new(0),
            fail_with: Some(|| HandlerError::permanent("template window closed")),
        }));

        assert!(worker.tick().await.expect("tick failed"));
        assert_eq!(q.get(&job.id).expect("get failed").status, JobStatus::Failed);
    }
}
