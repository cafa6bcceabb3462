use rusqlite::Connection;

use crate::error::Result;

/// Initialise the tenants and channel-bindings tables.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout. The
/// partial unique index prevents two active tenants from claiming the same
/// provider account.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tenants (
            id         TEXT PRIMARY KEY,
            is_active  INTEGER NOT NULL DEFAULT 1,
            config     TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS channel_bindings (
            tenant_id            TEXT NOT NULL,
            provider             TEXT NOT NULL,
            provider_account_id  TEXT NOT NULL,
            credentials_blob     BLOB NOT NULL,
            is_active            INTEGER NOT NULL DEFAULT 1,
            created_at           TEXT NOT NULL,
            PRIMARY KEY (tenant_id, provider)
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_bindings_account
            ON channel_bindings(provider, provider_account_id)
            WHERE is_active = 1;",
    )?;
    Ok(())
}
