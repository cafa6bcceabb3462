use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, TenantError};
use crate::types::ChannelCredentials;

type HmacSha256 = Hmac<Sha256>;

/// Opens (and, for provisioning, seals) credential blobs bound to a
/// `tenant_id:provider` context tag.
///
/// The blob is versioned; a tag mismatch must fail closed without revealing
/// which side of the tag mismatched. Production deployments supply an
/// implementation backed by a real KMS/cipher.
pub trait CredentialCipher: Send + Sync {
    /// Decrypt and authenticate a blob against its context tag.
    fn open(&self, context_tag: &str, blob: &[u8]) -> Result<ChannelCredentials>;

    /// Produce a blob bound to the context tag.
    fn seal(&self, context_tag: &str, credentials: &ChannelCredentials) -> Result<Vec<u8>>;
}

/// Development cipher: the body is stored as plain JSON, but the context tag
/// is authenticated with HMAC-SHA256 so cross-tenant blob reuse still fails
/// with `CryptoContextMismatch`.
///
/// Blob layout: `v1:{hex(hmac(tag))}:{json}`.
pub struct TaggedPlainCipher {
    key: Vec<u8>,
}

impl TaggedPlainCipher {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    fn tag_mac(&self, context_tag: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("hmac accepts any key length");
        mac.update(context_tag.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl CredentialCipher for TaggedPlainCipher {
    fn open(&self, context_tag: &str, blob: &[u8]) -> Result<ChannelCredentials> {
        let text = std::str::from_utf8(blob).map_err(|_| TenantError::CryptoMalformed)?;
        let mut parts = text.splitn(3, ':');
        let version = parts.next().ok_or(TenantError::CryptoMalformed)?;
        let mac_hex = parts.next().ok_or(TenantError::CryptoMalformed)?;
        let body = parts.next().ok_or(TenantError::CryptoMalformed)?;

        if version != "v1" {
            return Err(TenantError::CryptoMalformed);
        }
        if mac_hex != self.tag_mac(context_tag) {
            return Err(TenantError::CryptoContextMismatch);
        }
        serde_json::from_str(body).map_err(|_| TenantError::CryptoMalformed)
    }

    fn seal(&self, context_tag: &str, credentials: &ChannelCredentials) -> Result<Vec<u8>> {
        let body = serde_json::to_string(credentials).map_err(TenantError::ConfigMalformed)?;
        Ok(format!("v1:{}:{}", self.tag_mac(context_tag), body).into_bytes())
    }
}
