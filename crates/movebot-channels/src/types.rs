use serde::{Deserialize, Serialize};

use movebot_core::types::Button;

/// A provider-normalized outbound message. The bound adapter renders it for
/// its platform (quick-reply buttons, media attachment semantics, …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub tenant_id: String,
    pub chat_id: String,
    pub text: String,
    #[serde(default)]
    pub buttons: Vec<Button>,
    /// Signed media links or provider file ids, depending on the adapter.
    #[serde(default)]
    pub media_refs: Vec<String>,
}

impl OutboundMessage {
    pub fn text_only(
        tenant_id: impl Into<String>,
        chat_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            chat_id: chat_id.into(),
            text: text.into(),
            buttons: Vec::new(),
            media_refs: Vec::new(),
        }
    }
}
