use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use movebot_core::types::Provider;

use crate::error::{MediaError, Result};
use crate::types::{MediaAsset, MediaKind};

/// Hard cap on a single ingested object.
pub const MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024;

/// Blob storage seam. The production implementation is an S3-compatible
/// client owned by the deployment; `LocalDirStore` below covers dev and
/// tests.
pub trait ObjectStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Object store over a local directory. Keys map to relative paths.
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for LocalDirStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.root.join(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::ObjectStore(e)),
        }
    }
}

/// Bookkeeping for ingested media rows.
pub struct MediaStore {
    db: Mutex<Connection>,
}

impl MediaStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Build the object key for a new asset:
    /// `media/{tenant}/{lead}/{uuid}.{ext}`. Leadless assets use `unassigned`.
    pub fn object_key(tenant_id: &str, lead_id: Option<&str>, content_type: &str) -> (String, String) {
        let id = Uuid::new_v4().to_string();
        let ext = MediaKind::extension_for(content_type);
        let key = format!(
            "media/{}/{}/{}.{}",
            tenant_id,
            lead_id.unwrap_or("unassigned"),
            id,
            ext
        );
        (id, key)
    }

    /// Insert one asset row.
    #[instrument(skip(self, asset), fields(asset_id = %asset.id, tenant_id = %asset.tenant_id))]
    pub fn insert(&self, asset: &MediaAsset) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO media_assets
             (id, tenant_id, lead_id, chat_id, provider, kind, content_type,
              size_bytes, s3_key, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                asset.id,
                asset.tenant_id,
                asset.lead_id,
                asset.chat_id,
                asset.provider.as_str(),
                asset.kind.as_str(),
                asset.content_type,
                asset.size_bytes as i64,
                asset.s3_key,
                asset.expires_at,
                asset.created_at,
            ],
        )?;
        debug!("media asset recorded");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<MediaAsset> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT id, tenant_id, lead_id, chat_id, provider, kind, content_type,
                    size_bytes, s3_key, expires_at, created_at
             FROM media_assets WHERE id = ?1",
            [id],
            row_to_asset,
        ) {
            Ok(asset) => Ok(asset),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(MediaError::NotFound { id: id.to_string() })
            }
            Err(e) => Err(MediaError::Database(e)),
        }
    }

    /// All assets attached to a lead, oldest first.
    pub fn list_for_lead(&self, tenant_id: &str, lead_id: &str) -> Result<Vec<MediaAsset>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, tenant_id, lead_id, chat_id, provider, kind, content_type,
                    size_bytes, s3_key, expires_at, created_at
             FROM media_assets
             WHERE tenant_id = ?1 AND lead_id = ?2
             ORDER BY created_at",
        )?;
        let rows = stmt.query_map(rusqlite::params![tenant_id, lead_id], row_to_asset)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Delete expired assets: object first, then the row, so a failed object
    /// delete leaves the row for the next sweep. Idempotent.
    pub fn cleanup_expired(&self, objects: &dyn ObjectStore) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let expired: Vec<(String, String)> = {
            let db = self.db.lock().unwrap();
            let mut stmt = db.prepare(
                "SELECT id, s3_key FROM media_assets
                 WHERE expires_at IS NOT NULL AND expires_at < ?1",
            )?;
            let rows = stmt.query_map([&now], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.filter_map(|r| r.ok()).collect()
        };

        let mut removed = 0;
        for (id, key) in expired {
            objects.delete(&key)?;
            let db = self.db.lock().unwrap();
            db.execute("DELETE FROM media_assets WHERE id = ?1", [&id])?;
            removed += 1;
        }
        if removed > 0 {
            info!(count = removed, "expired media assets cleaned up");
        }
        Ok(removed)
    }
}

fn row_to_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<MediaAsset> {
    let provider_str: String = row.get(4)?;
    let kind_str: String = row.get(5)?;
    let size: i64 = row.get(7)?;
    Ok(MediaAsset {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        lead_id: row.get(2)?,
        chat_id: row.get(3)?,
        provider: Provider::from_str(&provider_str).unwrap_or(Provider::Telegram),
        kind: match kind_str.as_str() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Document,
        },
        content_type: row.get(6)?,
        size_bytes: size as u64,
        s3_key: row.get(8)?,
        expires_at: row.get(9)?,
        created_at: row.get(10)?,
    })
}
