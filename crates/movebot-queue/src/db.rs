use rusqlite::Connection;

use crate::error::Result;

/// Initialise the jobs and idempotency tables.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout. The
/// partial index only covers pending rows, which is what the claim query
/// scans.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS jobs (
            id            TEXT PRIMARY KEY,
            tenant_id     TEXT NOT NULL,
            job_type      TEXT NOT NULL,
            payload       TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'pending',
            priority      INTEGER NOT NULL DEFAULT 0,
            attempts      INTEGER NOT NULL DEFAULT 0,
            max_attempts  INTEGER NOT NULL DEFAULT 5,
            scheduled_at  TEXT NOT NULL,
            started_at    TEXT,
            completed_at  TEXT,
            error_message TEXT,
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_pending
            ON jobs(scheduled_at, priority, created_at)
            WHERE status = 'pending';
        CREATE TABLE IF NOT EXISTS job_idempotency (
            key         TEXT PRIMARY KEY,
            consumed_at TEXT NOT NULL
        );",
    )?;
    Ok(())
}
