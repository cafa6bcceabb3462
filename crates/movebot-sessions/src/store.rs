use std::str::FromStr;
use std::sync::Mutex;

use movebot_core::types::Language;
use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::error::{Result, SessionError};
use crate::types::{SessionState, Step};

/// Thread-safe store for in-progress conversation sessions.
///
/// Wraps a single SQLite connection in a `Mutex`. The session row doubles as
/// the per-chat serialization point: the guarded upsert rejects writes whose
/// observed `updated_at` is stale.
pub struct SessionStore {
    db: Mutex<Connection>,
}

impl SessionStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Retrieve a session, returning `None` if it does not exist.
    #[instrument(skip(self), fields(tenant_id, chat_id))]
    pub fn get(&self, tenant_id: &str, chat_id: &str) -> Result<Option<SessionState>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT tenant_id, chat_id, lead_id, bot_type, step, language,
                    data, created_at, updated_at
             FROM sessions WHERE tenant_id = ?1 AND chat_id = ?2",
            rusqlite::params![tenant_id, chat_id],
            row_to_session,
        ) {
            Ok(s) => Ok(Some(s?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SessionError::Database(e)),
        }
    }

    /// Insert or overwrite a session row.
    ///
    /// `observed_updated_at` is the `updated_at` value read together with the
    /// session (or `None` for a brand-new session). If the row has been
    /// updated since, no write happens and `Conflict` is returned so the
    /// ingress can fail the request and let the provider retry.
    #[instrument(skip(self, session), fields(tenant_id = %session.tenant_id, chat_id = %session.chat_id, step = %session.step))]
    pub fn upsert(&self, session: &SessionState, observed_updated_at: Option<&str>) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let data = serde_json::to_string(&session.data)?;
        let db = self.db.lock().unwrap();

        let changed = match observed_updated_at {
            None => db.execute(
                "INSERT OR IGNORE INTO sessions
                 (tenant_id, chat_id, lead_id, bot_type, step, language,
                  data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    session.tenant_id,
                    session.chat_id,
                    session.lead_id,
                    session.bot_type,
                    session.step.as_str(),
                    session.language.code(),
                    data,
                    session.created_at,
                    now,
                ],
            )?,
            Some(observed) => db.execute(
                "UPDATE sessions
                 SET lead_id = ?3, bot_type = ?4, step = ?5, language = ?6,
                     data = ?7, updated_at = ?8
                 WHERE tenant_id = ?1 AND chat_id = ?2 AND updated_at = ?9",
                rusqlite::params![
                    session.tenant_id,
                    session.chat_id,
                    session.lead_id,
                    session.bot_type,
                    session.step.as_str(),
                    session.language.code(),
                    data,
                    now,
                    observed,
                ],
            )?,
        };

        if changed == 0 {
            return Err(SessionError::Conflict {
                tenant_id: session.tenant_id.clone(),
                chat_id: session.chat_id.clone(),
            });
        }
        debug!("session persisted");
        Ok(())
    }

    /// Delete the session row after finalization. Missing rows are fine —
    /// the finalization path may run twice on a provider retry.
    #[instrument(skip(self), fields(tenant_id, chat_id))]
    pub fn delete(&self, tenant_id: &str, chat_id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "DELETE FROM sessions WHERE tenant_id = ?1 AND chat_id = ?2",
            rusqlite::params![tenant_id, chat_id],
        )?;
        Ok(())
    }
}

/// Map a SQLite row to a `SessionState`, deferring payload decoding errors.
fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<SessionState>> {
    let step_str: String = row.get(4)?;
    let lang_str: String = row.get(5)?;
    let data_json: String = row.get(6)?;

    Ok((|| {
        let step = Step::from_str(&step_str)?;
        let language = Language::from_str(&lang_str)
            .map_err(|_| SessionError::UnknownStep(format!("language:{lang_str}")))?;
        let data = serde_json::from_str(&data_json)?;
        Ok(SessionState {
            tenant_id: row.get(0)?,
            chat_id: row.get(1)?,
            lead_id: row.get(2)?,
            bot_type: row.get(3)?,
            step,
            language,
            data,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    })())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::types::Step;

    fn store() -> SessionStore {
        let conn = Connection::open_in_memory().expect("open failed");
        init_db(&conn).expect("init failed");
        SessionStore::new(conn)
    }

    #[test]
    fn get_missing_returns_none() {
        let store = store();
        assert!(store.get("t1", "c1").expect("get failed").is_none());
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let store = store();
        let mut s = SessionState::new("t1", "c1");
        s.step = Step::Cargo;
        s.data.cargo_raw = "fridge".to_string();
        store.upsert(&s, None).expect("insert failed");

        let loaded = store.get("t1", "c1").expect("get failed").expect("missing");
        assert_eq!(loaded.step, Step::Cargo);
        assert_eq!(loaded.data.cargo_raw, "fridge");
        assert_eq!(loaded.lead_id, s.lead_id);
    }

    #[test]
    fn stale_update_conflicts() {
        let store = store();
        let s = SessionState::new("t1", "c1");
        store.upsert(&s, None).expect("insert failed");
        let loaded = store.get("t1", "c1").expect("get failed").expect("missing");

        // First writer wins.
        let mut first = loaded.clone();
        first.step = Step::Cargo;
        store
            .upsert(&first, Some(&loaded.updated_at))
            .expect("first update failed");

        // Second writer observed the old updated_at and must conflict.
        let mut second = loaded.clone();
        second.step = Step::PickupCount;
        let err = store
            .upsert(&second, Some(&loaded.updated_at))
            .expect_err("expected conflict");
        assert!(matches!(err, SessionError::Conflict { .. }));

        let current = store.get("t1", "c1").expect("get failed").expect("missing");
        assert_eq!(current.step, Step::Cargo);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = store();
        let s = SessionState::new("t1", "c1");
        store.upsert(&s, None).expect("insert failed");
        store.delete("t1", "c1").expect("delete failed");
        store.delete("t1", "c1").expect("second delete failed");
        assert!(store.get("t1", "c1").expect("get failed").is_none());
    }
}
