use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use movebot_core::types::{ChannelCredentials, Provider};

use crate::error::ChannelError;
use crate::sender::ChannelSender;
use crate::types::OutboundMessage;

/// Outbound HTTP timeout for bot API calls.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);
/// Message length cap (Telegram limit is 4096; a margin for safety).
const TEXT_MAX: usize = 4090;

/// Generic bot-API sender (Telegram-compatible `sendMessage` surface).
///
/// Buttons are rendered as an inline keyboard, one per row, with the button
/// payload as callback data. Media refs are appended as plain links — the
/// receiving endpoint validates their signatures.
pub struct BotApiSender {
    http: reqwest::Client,
    base_url: String,
}

impl BotApiSender {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, token)
    }
}

impl Default for BotApiSender {
    fn default() -> Self {
        Self::new("https://api.telegram.org")
    }
}

#[async_trait]
impl ChannelSender for BotApiSender {
    fn provider(&self) -> Provider {
        Provider::Telegram
    }

    async fn send(
        &self,
        credentials: &ChannelCredentials,
        msg: &OutboundMessage,
    ) -> Result<(), ChannelError> {
        let mut text = msg.text.clone();
        for link in &msg.media_refs {
            text.push('\n');
            text.push_str(link);
        }
        if text.chars().count() > TEXT_MAX {
            text = text.chars().take(TEXT_MAX).collect();
            warn!(chat_id = %msg.chat_id, "outbound text truncated to channel limit");
        }

        let mut body = json!({
            "chat_id": msg.chat_id,
            "text": text,
        });
        if !msg.buttons.is_empty() {
            let rows: Vec<_> = msg
                .buttons
                .iter()
                .map(|b| json!([{ "text": b.label, "callback_data": b.payload }]))
                .collect();
            body["reply_markup"] = json!({ "inline_keyboard": rows });
        }

        let resp = self
            .http
            .post(self.endpoint(&credentials.api_token))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Api {
                status: status.as_u16(),
                body,
            });
        }
        debug!(chat_id = %msg.chat_id, "message delivered");
        Ok(())
    }
}
