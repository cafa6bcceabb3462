use rusqlite::Connection;

use crate::error::Result;

/// Initialise the leads table.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS leads (
            tenant_id  TEXT NOT NULL,
            lead_id    TEXT NOT NULL,
            chat_id    TEXT NOT NULL,
            lead_seq   INTEGER NOT NULL UNIQUE,
            status     TEXT NOT NULL DEFAULT 'new',
            payload    TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            PRIMARY KEY (tenant_id, lead_id)
        );
        CREATE INDEX IF NOT EXISTS idx_leads_seq ON leads(lead_seq);",
    )?;
    Ok(())
}
