use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use movebot_core::types::Provider;

use crate::crypto::CredentialCipher;
use crate::error::{Result, TenantError};
use crate::types::{TenantConfig, TenantContext};

/// Default cache TTL for resolved bindings.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Only the ciphertext is cached; credentials are decrypted per use so a
/// rotated blob takes effect on the next resolve after expiry.
struct CachedBinding {
    tenant_id: String,
    config_json: String,
    credentials_blob: Vec<u8>,
    fetched_at: Instant,
}

/// Resolves `(provider, provider_account_id)` to a tenant context.
///
/// Read-mostly: the dashmap cache serves the hot ingress path; the database
/// is only hit on a miss or after TTL expiry.
pub struct TenantRegistry {
    db: Mutex<Connection>,
    cipher: Arc<dyn CredentialCipher>,
    cache: DashMap<(Provider, String), CachedBinding>,
    ttl: Duration,
}

impl TenantRegistry {
    pub fn new(conn: Connection, cipher: Arc<dyn CredentialCipher>) -> Self {
        Self {
            db: Mutex::new(conn),
            cipher,
            cache: DashMap::new(),
            ttl: CACHE_TTL,
        }
    }

    #[cfg(test)]
    fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Resolve an inbound request to its tenant, or fail without revealing
    /// tenant/provider identifiers in the error.
    #[instrument(skip(self), fields(provider = %provider))]
    pub fn resolve(&self, provider: Provider, provider_account_id: &str) -> Result<TenantContext> {
        let key = (provider, provider_account_id.to_string());

        if let Some(cached) = self.cache.get(&key) {
            if cached.fetched_at.elapsed() < self.ttl {
                debug!("binding cache hit");
                return self.build_context(provider, &cached);
            }
        }

        let row = self.fetch_binding(provider, provider_account_id)?;
        let ctx = self.build_context(provider, &row)?;
        self.cache.insert(key, row);
        Ok(ctx)
    }

    /// Register a tenant with one channel binding. Used by provisioning and
    /// tests; the admin surface proper is out of scope.
    pub fn register_tenant(
        &self,
        tenant_id: &str,
        config: &TenantConfig,
        provider: Provider,
        provider_account_id: &str,
        credentials_blob: &[u8],
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let config_json = serde_json::to_string(config)?;
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR REPLACE INTO tenants (id, is_active, config, created_at, updated_at)
             VALUES (?1, 1, ?2, ?3, ?3)",
            rusqlite::params![tenant_id, config_json, now],
        )?;
        db.execute(
            "INSERT OR REPLACE INTO channel_bindings
             (tenant_id, provider, provider_account_id, credentials_blob, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            rusqlite::params![tenant_id, provider.as_str(), provider_account_id, credentials_blob, now],
        )?;
        info!(tenant_id, provider = %provider, "tenant binding registered");
        Ok(())
    }

    /// Decrypted credentials for a known tenant's binding. Used by job
    /// handlers, which carry a `tenant_id` instead of an account id.
    pub fn credentials(
        &self,
        tenant_id: &str,
        provider: Provider,
    ) -> Result<crate::types::ChannelCredentials> {
        let blob: Vec<u8> = {
            let db = self.db.lock().unwrap();
            match db.query_row(
                "SELECT credentials_blob FROM channel_bindings
                 WHERE tenant_id = ?1 AND provider = ?2 AND is_active = 1",
                rusqlite::params![tenant_id, provider.as_str()],
                |row| row.get(0),
            ) {
                Ok(blob) => blob,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(TenantError::BindingNotFound)
                }
                Err(e) => return Err(TenantError::Database(e)),
            }
        };
        let context_tag = format!("{}:{}", tenant_id, provider.as_str());
        self.cipher.open(&context_tag, &blob)
    }

    /// A known tenant's config blob.
    pub fn tenant_config(&self, tenant_id: &str) -> Result<TenantConfig> {
        let config_json: String = {
            let db = self.db.lock().unwrap();
            match db.query_row(
                "SELECT config FROM tenants WHERE id = ?1 AND is_active = 1",
                [tenant_id],
                |row| row.get(0),
            ) {
                Ok(json) => json,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(TenantError::BindingNotFound)
                }
                Err(e) => return Err(TenantError::Database(e)),
            }
        };
        Ok(serde_json::from_str(&config_json)?)
    }

    fn fetch_binding(&self, provider: Provider, provider_account_id: &str) -> Result<CachedBinding> {
        let db = self.db.lock().unwrap();
        let row = db.query_row(
            "SELECT b.tenant_id, t.config, b.credentials_blob
             FROM channel_bindings b
             JOIN tenants t ON t.id = b.tenant_id
             WHERE b.provider = ?1 AND b.provider_account_id = ?2
               AND b.is_active = 1 AND t.is_active = 1",
            rusqlite::params![provider.as_str(), provider_account_id],
            |row| {
                Ok(CachedBinding {
                    tenant_id: row.get(0)?,
                    config_json: row.get(1)?,
                    credentials_blob: row.get(2)?,
                    fetched_at: Instant::now(),
                })
            },
        );
        match row {
            Ok(r) => Ok(r),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(TenantError::BindingNotFound),
            Err(e) => Err(TenantError::Database(e)),
        }
    }

    fn build_context(&self, provider: Provider, row: &CachedBinding) -> Result<TenantContext> {
        let config: TenantConfig = serde_json::from_str(&row.config_json)?;
        let context_tag = format!("{}:{}", row.tenant_id, provider.as_str());
        let credentials = self.cipher.open(&context_tag, &row.credentials_blob)?;
        Ok(TenantContext {
            tenant_id: row.tenant_id.clone(),
            provider,
            config,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::TaggedPlainCipher;
    use crate::db::init_db;
    use crate::types::ChannelCredentials;

    fn registry() -> TenantRegistry {
        let conn = Connection::open_in_memory().expect("open failed");
        init_db(&conn).expect("init failed");
        TenantRegistry::new(conn, Arc::new(TaggedPlainCipher::new(b"k".to_vec())))
    }

    fn seed(reg: &TenantRegistry, tenant: &str, account: &str) {
        let cipher = TaggedPlainCipher::new(b"k".to_vec());
        let blob = cipher
            .seal(
                &format!("{tenant}:telegram"),
                &ChannelCredentials {
                    api_token: "tok".to_string(),
                    extra: serde_json::Map::new(),
                },
            )
            .expect("seal failed");
        reg.register_tenant(tenant, &TenantConfig::default(), Provider::Telegram, account, &blob)
            .expect("register failed");
    }

    #[test]
    fn resolve_known_binding() {
        let reg = registry();
        seed(&reg, "t1", "bot-1");
        let ctx = reg.resolve(Provider::Telegram, "bot-1").expect("resolve failed");
        assert_eq!(ctx.tenant_id, "t1");
        assert_eq!(ctx.credentials.api_token, "tok");
    }

    #[test]
    fn resolve_unknown_binding_fails_without_identifiers() {
        let reg = registry();
        let err = reg
            .resolve(Provider::Telegram, "ghost")
            .expect_err("expected failure");
        assert!(matches!(err, TenantError::BindingNotFound));
        assert!(!err.to_string().contains("ghost"));
    }

    #[test]
    fn second_resolve_served_from_cache() {
        let reg = registry();
        seed(&reg, "t1", "bot-1");
        reg.resolve(Provider::Telegram, "bot-1").expect("resolve failed");
        // Drop the row behind the cache's back; a cached resolve still works.
        {
            let db = reg.db.lock().unwrap();
            db.execute("DELETE FROM channel_bindings", []).expect("delete failed");
        }
        let ctx = reg.resolve(Provider::Telegram, "bot-1").expect("cached resolve failed");
        assert_eq!(ctx.tenant_id, "t1");
    }

    #[test]
    fn expired_cache_refetches() {
        let reg = registry().with_ttl(Duration::ZERO);
        seed(&reg, "t1", "bot-1");
        reg.resolve(Provider::Telegram, "bot-1").expect("resolve failed");
        {
            let db = reg.db.lock().unwrap();
            db.execute("DELETE FROM channel_bindings", []).expect("delete failed");
        }
        assert!(matches!(
            reg.resolve(Provider::Telegram, "bot-1"),
            Err(TenantError::BindingNotFound)
        ));
    }

    #[test]
    fn cross_tenant_blob_reuse_is_rejected() {
        let reg = registry();
        // Seal a blob for t1 but register it under t2 — the context tag
        // embeds the tenant id, so decryption must fail.
        let cipher = TaggedPlainCipher::new(b"k".to_vec());
        let blob = cipher
            .seal(
                "t1:telegram",
                &ChannelCredentials {
                    api_token: "tok".to_string(),
                    extra: serde_json::Map::new(),
                },
            )
            .expect("seal failed");
        reg.register_tenant("t2", &TenantConfig::default(), Provider::Telegram, "bot-2", &blob)
            .expect("register failed");
        assert!(matches!(
            reg.resolve(Provider::Telegram, "bot-2"),
            Err(TenantError::CryptoContextMismatch)
        ));
    }
}
