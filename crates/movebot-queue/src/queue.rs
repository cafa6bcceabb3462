use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::Connection;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::types::{Job, JobStatus};

/// Error messages stored on a job row are capped at this length.
const ERROR_TRUNCATE: usize = 500;
/// Base backoff unit in seconds.
const BACKOFF_BASE_SECS: u64 = 60;
/// Backoff ceiling in seconds.
const BACKOFF_MAX_SECS: u64 = 3600;

/// Parameters for one enqueue call.
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    pub tenant_id: String,
    pub job_type: String,
    pub payload: Value,
    pub priority: i64,
    pub delay: Duration,
    pub max_attempts: u32,
    /// Stored inside the payload; handlers with external side effects
    /// consume it to guarantee at-most-once delivery.
    pub idempotency_key: Option<String>,
}

impl EnqueueRequest {
    pub fn new(tenant_id: impl Into<String>, job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            job_type: job_type.into(),
            payload,
            priority: 0,
            delay: Duration::ZERO,
            max_attempts: 5,
            idempotency_key: None,
        }
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Durable FIFO-by-priority job queue backed by SQLite.
///
/// All side-effecting work goes through here. The `Mutex<Connection>` makes
/// every statement atomic with respect to other queue users in this process,
/// which is what gives `claim` its exactly-one-claimer guarantee.
pub struct JobQueue {
    db: Mutex<Connection>,
}

impl JobQueue {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Insert one pending job. Returns the stored row.
    #[instrument(skip(self, req), fields(tenant_id = %req.tenant_id, job_type = %req.job_type))]
    pub fn enqueue(&self, req: EnqueueRequest) -> Result<Job> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let scheduled_at = (now + chrono::Duration::from_std(req.delay).unwrap_or_default())
            .to_rfc3339();

        let mut payload = req.payload;
        if let Some(key) = &req.idempotency_key {
            if let Some(obj) = payload.as_object_mut() {
                obj.insert("idempotency_key".to_string(), Value::from(key.clone()));
            }
        }
        let payload_str = serde_json::to_string(&payload)?;

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO jobs
             (id, tenant_id, job_type, payload, status, priority, attempts,
              max_attempts, scheduled_at, created_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, 0, ?6, ?7, ?8)",
            rusqlite::params![
                id,
                req.tenant_id,
                req.job_type,
                payload_str,
                req.priority,
                req.max_attempts,
                scheduled_at,
                now_str,
            ],
        )?;
        info!(job_id = %id, "job enqueued");

        Ok(Job {
            id,
            tenant_id: req.tenant_id,
            job_type: req.job_type,
            payload,
            status: JobStatus::Pending,
            priority: req.priority,
            attempts: 0,
            max_attempts: req.max_attempts,
            scheduled_at,
            started_at: None,
            completed_at: None,
            error_message: None,
            created_at: now_str,
        })
    }

    /// Claim the next due job whose type is in `allowed_types`.
    ///
    /// One atomic UPDATE moves the row pending→running, stamps `started_at`
    /// and bumps `attempts`. Types outside the set are left untouched for
    /// workers of the right role.
    pub fn claim(&self, allowed_types: &[&str]) -> Result<Option<Job>> {
        if allowed_types.is_empty() {
            return Ok(None);
        }
        let now = Utc::now().to_rfc3339();
        let placeholders = (0..allowed_types.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE jobs
             SET status = 'running', started_at = ?1, attempts = attempts + 1
             WHERE id = (
                 SELECT id FROM jobs
                 WHERE status = 'pending' AND scheduled_at <= ?1
                   AND job_type IN ({placeholders})
                 ORDER BY priority DESC, created_at ASC
                 LIMIT 1
             )
             RETURNING id, tenant_id, job_type, payload, status, priority,
                       attempts, max_attempts, scheduled_at, started_at,
                       completed_at, error_message, created_at"
        );

        let params = std::iter::once(now.clone())
            .chain(allowed_types.iter().map(|t| t.to_string()))
            .collect::<Vec<_>>();

        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare_cached(&sql)?;
        match stmt.query_row(rusqlite::params_from_iter(params), row_to_job) {
            Ok(job) => {
                let job = job?;
                debug!(job_id = %job.id, job_type = %job.job_type, attempt = job.attempts, "job claimed");
                Ok(Some(job))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(QueueError::Database(e)),
        }
    }

    /// Mark a running job completed.
    #[instrument(skip(self))]
    pub fn complete(&self, id: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE jobs SET status = 'completed', completed_at = ?2 WHERE id = ?1",
            rusqlite::params![id, now],
        )?;
        if n == 0 {
            return Err(QueueError::JobNotFound { id: id.to_string() });
        }
        Ok(())
    }

    /// Record a handler failure.
    ///
    /// Transient failures re-schedule with exponential backoff until
    /// `max_attempts`; permanent failures (and exhausted retries) park the
    /// row in `failed`.
    #[instrument(skip(self, error))]
    pub fn fail(&self, id: &str, error: &str, permanent: bool) -> Result<()> {
        let truncated: String = error.chars().take(ERROR_TRUNCATE).collect();
        let db = self.db.lock().unwrap();
        let (attempts, max_attempts): (u32, u32) = db.query_row(
            "SELECT attempts, max_attempts FROM jobs WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        if permanent || attempts >= max_attempts {
            db.execute(
                "UPDATE jobs SET status = 'failed', error_message = ?2 WHERE id = ?1",
                rusqlite::params![id, truncated],
            )?;
            warn!(job_id = %id, attempts, permanent, "job failed");
        } else {
            let next = Utc::now() + chrono::Duration::seconds(backoff_secs(attempts) as i64);
            db.execute(
                "UPDATE jobs SET status = 'pending', scheduled_at = ?2, error_message = ?3
                 WHERE id = ?1",
                rusqlite::params![id, next.to_rfc3339(), truncated],
            )?;
            debug!(job_id = %id, attempts, "job re-scheduled with backoff");
        }
        Ok(())
    }

    /// Return running rows older than `lease_horizon` to pending.
    ///
    /// Handlers must tolerate re-execution; a swept job may still complete
    /// in its original worker.
    pub fn sweep_stale(&self, lease_horizon: Duration) -> Result<usize> {
        let cutoff = (Utc::now()
            - chrono::Duration::from_std(lease_horizon).unwrap_or_default())
        .to_rfc3339();
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE jobs SET status = 'pending'
             WHERE status = 'running' AND started_at < ?1",
            [cutoff],
        )?;
        if n > 0 {
            warn!(count = n, "stale running jobs returned to pending");
        }
        Ok(n)
    }

    /// Consume an idempotency key. Returns true the first time, false after.
    pub fn try_consume_idempotency_key(&self, key: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let inserted = db.execute(
            "INSERT OR IGNORE INTO job_idempotency (key, consumed_at) VALUES (?1, ?2)",
            rusqlite::params![key, now],
        )?;
        Ok(inserted == 1)
    }

    /// Load a job by id.
    pub fn get(&self, id: &str) -> Result<Job> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT id, tenant_id, job_type, payload, status, priority, attempts,
                    max_attempts, scheduled_at, started_at, completed_at,
                    error_message, created_at
             FROM jobs WHERE id = ?1",
            [id],
            row_to_job,
        ) {
            Ok(job) => job,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(QueueError::JobNotFound { id: id.to_string() })
            }
            Err(e) => Err(QueueError::Database(e)),
        }
    }

    /// All jobs in a status, oldest first. Used by tests and admin tooling.
    pub fn list_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, tenant_id, job_type, payload, status, priority, attempts,
                    max_attempts, scheduled_at, started_at, completed_at,
                    error_message, created_at
             FROM jobs WHERE status = ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map([status.to_string()], row_to_job)?;
        let mut jobs = Vec::new();
        for row in rows {
            jobs.push(row??);
        }
        Ok(jobs)
    }
}

/// Exponential backoff with jitter: `min(60s·2^attempts, 1h) · U(0.5, 1.5)`.
///
/// The jitter factor is derived from the subsecond clock, avoiding a rand
/// dependency.
fn backoff_secs(attempts: u32) -> u64 {
    let base = BACKOFF_BASE_SECS
        .saturating_mul(1u64 << attempts.min(10))
        .min(BACKOFF_MAX_SECS);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0) as u64;
    let factor = 0.5 + (nanos % 1000) as f64 / 1000.0;
    ((base as f64) * factor) as u64
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Job>> {
    let payload_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let attempts: i64 = row.get(6)?;
    let max_attempts: i64 = row.get(7)?;

    Ok((|| {
        Ok(Job {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            job_type: row.get(2)?,
            payload: serde_json::from_str(&payload_str)?,
            status: JobStatus::from_str(&status_str)?,
            priority: row.get(5)?,
            attempts: attempts as u32,
            max_attempts: max_attempts as u32,
            scheduled_at: row.get(8)?,
            started_at: row.get(9)?,
            completed_at: row.get(10)?,
            error_message: row.get(11)?,
            created_at: row.get(12)?,
        })
    })())
}
