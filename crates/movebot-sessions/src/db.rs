use rusqlite::Connection;

use crate::error::Result;

/// Initialise the sessions and inbound-dedup tables.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            tenant_id  TEXT NOT NULL,
            chat_id    TEXT NOT NULL,
            lead_id    TEXT NOT NULL,
            bot_type   TEXT NOT NULL,
            step       TEXT NOT NULL,
            language   TEXT NOT NULL,
            data       TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (tenant_id, chat_id)
        );
        CREATE TABLE IF NOT EXISTS inbound_messages (
            tenant_id   TEXT NOT NULL,
            provider    TEXT NOT NULL,
            message_id  TEXT NOT NULL,
            received_at TEXT NOT NULL,
            PRIMARY KEY (tenant_id, provider, message_id)
        );",
    )?;
    Ok(())
}
