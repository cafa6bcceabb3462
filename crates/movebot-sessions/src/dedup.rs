use std::sync::Mutex;

use movebot_core::types::Provider;
use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::error::Result;

/// Outcome of recording an inbound message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// First time this `(tenant, provider, message_id)` was seen.
    Fresh,
    /// Already processed — short-circuit without invoking the engine.
    Duplicate,
}

/// At-most-once guard over inbound provider messages.
///
/// The table's primary key does the work: a second insert of the same tuple
/// changes zero rows.
pub struct InboundDedup {
    db: Mutex<Connection>,
}

impl InboundDedup {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Remove a previously recorded message id.
    ///
    /// Compensation for a failed ingress attempt: the 5xx response makes the
    /// provider retry, and the retry must not be short-circuited when the
    /// first attempt never committed its session write.
    #[instrument(skip(self), fields(tenant_id, provider = %provider, message_id))]
    pub fn forget(&self, tenant_id: &str, provider: Provider, message_id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "DELETE FROM inbound_messages
             WHERE tenant_id = ?1 AND provider = ?2 AND message_id = ?3",
            rusqlite::params![tenant_id, provider.as_str(), message_id],
        )?;
        Ok(())
    }

    /// Record a message id; returns whether it was fresh or a duplicate.
    #[instrument(skip(self), fields(tenant_id, provider = %provider, message_id))]
    pub fn record(
        &self,
        tenant_id: &str,
        provider: Provider,
        message_id: &str,
    ) -> Result<DedupOutcome> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let inserted = db.execute(
            "INSERT OR IGNORE INTO inbound_messages
             (tenant_id, provider, message_id, received_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![tenant_id, provider.as_str(), message_id, now],
        )?;
        if inserted == 0 {
            debug!("duplicate inbound message ignored");
            return Ok(DedupOutcome::Duplicate);
        }
        Ok(DedupOutcome::Fresh)
    }
}
