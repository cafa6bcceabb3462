use serde::{Deserialize, Serialize};
use serde_json::Value;

use movebot_core::config::WorkerRole;

use crate::error::QueueError;

/// Well-known job type names and their role assignment.
pub mod job_types {
    pub const OUTBOUND_REPLY: &str = "outbound_reply";
    pub const PROCESS_MEDIA: &str = "process_media";
    pub const NOTIFY_OPERATOR: &str = "notify_operator";
    pub const NOTIFY_CREW_FALLBACK: &str = "notify_crew_fallback";
    pub const MEDIA_CLEANUP: &str = "media_cleanup";

    pub const CORE: &[&str] = &[OUTBOUND_REPLY, PROCESS_MEDIA, NOTIFY_OPERATOR, MEDIA_CLEANUP];
    pub const DISPATCH: &[&str] = &[NOTIFY_CREW_FALLBACK];
    pub const ALL: &[&str] = &[
        OUTBOUND_REPLY,
        PROCESS_MEDIA,
        NOTIFY_OPERATOR,
        MEDIA_CLEANUP,
        NOTIFY_CREW_FALLBACK,
    ];
}

/// Job types a process with the given worker role may claim.
pub fn types_for_role(role: WorkerRole) -> &'static [&'static str] {
    match role {
        WorkerRole::Core => job_types::CORE,
        WorkerRole::Dispatch => job_types::DISPATCH,
        WorkerRole::All => job_types::ALL,
    }
}

/// Lifecycle state of a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for its scheduled_at time.
    Pending,
    /// Claimed by a worker.
    Running,
    /// Finished successfully.
    Completed,
    /// Exhausted retries or hit a permanent error.
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for JobStatus {
    type Err = QueueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(QueueError::UnknownStatus(other.to_string())),
        }
    }
}

/// A persisted job row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// UUID v4 string — primary key.
    pub id: String,
    pub tenant_id: String,
    pub job_type: String,
    /// Opaque payload forwarded to the handler. May carry an
    /// `idempotency_key` field consumed by handlers with external effects.
    pub payload: Value,
    pub status: JobStatus,
    /// Higher runs first.
    pub priority: i64,
    pub attempts: u32,
    pub max_attempts: u32,
    /// Not claimable before this instant.
    pub scheduled_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
}

impl Job {
    /// The payload-embedded idempotency key, if any.
    pub fn idempotency_key(&self) -> Option<&str> {
        self.payload.get("idempotency_key").and_then(Value::as_str)
    }
}
