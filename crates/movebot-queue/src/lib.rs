pub mod db;
pub mod error;
pub mod queue;
pub mod types;
pub mod worker;

pub use error::{HandlerError, QueueError, Result};
pub use queue::{EnqueueRequest, JobQueue};
pub use types::{job_types, Job, JobStatus};
pub use worker::{JobHandler, Worker};
