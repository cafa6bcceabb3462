use rusqlite::Connection;

use crate::error::Result;

/// Initialise the media assets table.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS media_assets (
            id           TEXT PRIMARY KEY,
            tenant_id    TEXT NOT NULL,
            lead_id      TEXT,
            chat_id      TEXT NOT NULL,
            provider     TEXT NOT NULL,
            kind         TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes   INTEGER NOT NULL,
            s3_key       TEXT NOT NULL,
            expires_at   TEXT,
            created_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_media_lead
            ON media_assets(tenant_id, lead_id);
        CREATE INDEX IF NOT EXISTS idx_media_expiry
            ON media_assets(expires_at)
            WHERE expires_at IS NOT NULL;",
    )?;
    Ok(())
}
