use std::str::FromStr;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{info, instrument};

use movebot_core::types::Language;
use movebot_sessions::types::LeadData;

use crate::error::{LeadError, Result};
use crate::types::{Lead, LeadPayload, LeadStatus};

/// Persists finalized leads and assigns the global lead sequence.
pub struct LeadRepository {
    db: Mutex<Connection>,
}

impl LeadRepository {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Insert a finalized lead, assigning the next `lead_seq`.
    ///
    /// The sequence select and the insert run in one transaction on the
    /// mutex-guarded connection, so a sequence number is handed out exactly
    /// once. Re-finalization of an already-inserted lead id returns the
    /// existing row unchanged (provider retry after a crashed finalization).
    #[instrument(skip(self, data, language), fields(tenant_id, lead_id))]
    pub fn insert(
        &self,
        tenant_id: &str,
        lead_id: &str,
        chat_id: &str,
        language: Language,
        data: &LeadData,
    ) -> Result<Lead> {
        let mut db = self.db.lock().unwrap();

        if let Some(existing) = get_inner(&db, tenant_id, lead_id)? {
            return Ok(existing);
        }

        let tx = db.transaction()?;
        let next_seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(lead_seq), 0) + 1 FROM leads",
            [],
            |row| row.get(0),
        )?;

        let mut data = data.clone();
        data.set_lead_number(next_seq);
        let payload = LeadPayload {
            lead_number: next_seq,
            language,
            estimate: data.estimate.clone(),
            data,
        };
        let payload_str = serde_json::to_string(&payload)?;
        let now = chrono::Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO leads
             (tenant_id, lead_id, chat_id, lead_seq, status, payload,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 'new', ?5, ?6, ?6)",
            rusqlite::params![tenant_id, lead_id, chat_id, next_seq, payload_str, now],
        )?;
        tx.commit()?;

        info!(lead_seq = next_seq, "lead persisted");
        Ok(Lead {
            tenant_id: tenant_id.to_string(),
            lead_id: lead_id.to_string(),
            chat_id: chat_id.to_string(),
            lead_seq: next_seq,
            status: LeadStatus::New,
            payload,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Load a lead by id.
    pub fn get(&self, tenant_id: &str, lead_id: &str) -> Result<Lead> {
        let db = self.db.lock().unwrap();
        get_inner(&db, tenant_id, lead_id)?.ok_or_else(|| LeadError::NotFound {
            tenant_id: tenant_id.to_string(),
            lead_id: lead_id.to_string(),
        })
    }

    /// Update the operator-side status.
    pub fn set_status(&self, tenant_id: &str, lead_id: &str, status: LeadStatus) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "UPDATE leads SET status = ?3, updated_at = ?4
             WHERE tenant_id = ?1 AND lead_id = ?2",
            rusqlite::params![tenant_id, lead_id, status.to_string(), now],
        )?;
        if n == 0 {
            return Err(LeadError::NotFound {
                tenant_id: tenant_id.to_string(),
                lead_id: lead_id.to_string(),
            });
        }
        Ok(())
    }

    /// Highest assigned sequence number, 0 when the table is empty.
    pub fn max_seq(&self) -> Result<i64> {
        let db = self.db.lock().unwrap();
        Ok(db.query_row(
            "SELECT COALESCE(MAX(lead_seq), 0) FROM leads",
            [],
            |row| row.get(0),
        )?)
    }
}

fn get_inner(db: &Connection, tenant_id: &str, lead_id: &str) -> Result<Option<Lead>> {
    match db.query_row(
        "SELECT tenant_id, lead_id, chat_id, lead_seq, status, payload,
                created_at, updated_at, deleted_at
         FROM leads WHERE tenant_id = ?1 AND lead_id = ?2",
        rusqlite::params![tenant_id, lead_id],
        row_to_lead,
    ) {
        Ok(lead) => Ok(Some(lead?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(LeadError::Database(e)),
    }
}

fn row_to_lead(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Lead>> {
    let status_str: String = row.get(4)?;
    let payload_str: String = row.get(5)?;

    Ok((|| {
        Ok(Lead {
            tenant_id: row.get(0)?,
            lead_id: row.get(1)?,
            chat_id: row.get(2)?,
            lead_seq: row.get(3)?,
            status: LeadStatus::from_str(&status_str)?,
            payload: serde_json::from_str(&payload_str)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            deleted_at: row.get(8)?,
        })
    })())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn repo() -> LeadRepository {
        let conn = Connection::open_in_memory().expect("open failed");
        init_db(&conn).expect("init failed");
        LeadRepository::new(conn)
    }

    #[test]
    fn sequence_is_monotonic_across_tenants() {
        let repo = repo();
        let a = repo
            .insert("t1", "aaa111aaa111", "c1", Language::Ru, &LeadData::default())
            .expect("insert failed");
        let b = repo
            .insert("t2", "bbb222bbb222", "c2", Language::En, &LeadData::default())
            .expect("insert failed");
        let c = repo
            .insert("t1", "ccc333ccc333", "c3", Language::He, &LeadData::default())
            .expect("insert failed");
        assert_eq!(a.lead_seq, 1);
        assert_eq!(b.lead_seq, 2);
        assert_eq!(c.lead_seq, 3);
        assert_eq!(repo.max_seq().expect("max failed"), 3);
    }

    #[test]
    fn reinsert_same_lead_id_is_idempotent() {
        let repo = repo();
        let first = repo
            .insert("t1", "aaa111aaa111", "c1", Language::Ru, &LeadData::default())
            .expect("insert failed");
        let second = repo
            .insert("t1", "aaa111aaa111", "c1", Language::Ru, &LeadData::default())
            .expect("re-insert failed");
        assert_eq!(first.lead_seq, second.lead_seq);
        assert_eq!(repo.max_seq().expect("max failed"), 1);
    }

    #[test]
    fn payload_snapshot_carries_lead_number() {
        let repo = repo();
        let mut data = LeadData::default();
        data.cargo_raw = "диван".to_string();
        let lead = repo
            .insert("t1", "aaa111aaa111", "c1", Language::Ru, &data)
            .expect("insert failed");
        assert_eq!(lead.payload.lead_number, lead.lead_seq);
        assert_eq!(lead.payload.data.lead_number(), Some(lead.lead_seq));
        assert_eq!(lead.payload.data.cargo_raw, "диван");

        let loaded = repo.get("t1", "aaa111aaa111").expect("get failed");
        assert_eq!(loaded.payload.lead_number, lead.lead_seq);
    }

    #[test]
    fn status_update_roundtrips() {
        let repo = repo();
        repo.insert("t1", "aaa111aaa111", "c1", Language::Ru, &LeadData::default())
            .expect("insert failed");
        repo.set_status("t1", "aaa111aaa111", LeadStatus::InProgress)
            .expect("status failed");
        let lead = repo.get("t1", "aaa111aaa111").expect("get failed");
        assert_eq!(lead.status, LeadStatus::InProgress);
    }

    #[test]
    fn missing_lead_errors() {
        let repo = repo();
        assert!(matches!(
            repo.get("t1", "zzz"),
            Err(LeadError::NotFound { .. })
        ));
    }
}
