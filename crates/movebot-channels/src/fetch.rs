use std::time::Duration;

use async_trait::async_trait;

use movebot_core::types::{ChannelCredentials, Provider};

use crate::error::ChannelError;

/// Download timeout for provider media.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves a provider-specific `source_ref` to the media bytes.
///
/// Each provider has its own ref semantics (file ids, signed URLs, SIDs);
/// the media-processing handler only sees this trait.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(
        &self,
        provider: Provider,
        credentials: &ChannelCredentials,
        source_ref: &str,
    ) -> Result<(Vec<u8>, String), ChannelError>;
}

/// Fetcher for providers whose `source_ref` is a plain downloadable URL.
pub struct HttpMediaFetcher {
    http: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self { http }
    }
}

impl Default for HttpMediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(
        &self,
        _provider: Provider,
        _credentials: &ChannelCredentials,
        source_ref: &str,
    ) -> Result<(Vec<u8>, String), ChannelError> {
        let resp = self.http.get(source_ref).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ChannelError::Api {
                status: status.as_u16(),
                body: "media download rejected".to_string(),
            });
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok((bytes, content_type))
    }
}
