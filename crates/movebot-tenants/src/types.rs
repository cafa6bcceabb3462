use serde::{Deserialize, Serialize};

use movebot_core::types::{Language, Provider};

pub use movebot_core::types::ChannelCredentials;

/// Per-tenant configuration stored as JSON on the tenant row.
///
/// Every field is optional — absent values fall back to the process config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Where operator notifications are delivered.
    #[serde(default)]
    pub operator_provider: Option<Provider>,
    #[serde(default)]
    pub operator_chat_id: Option<String>,
    /// Where the crew-fallback message is delivered.
    #[serde(default)]
    pub crew_chat_id: Option<String>,
    /// Per-tenant override of the process-wide crew fallback toggle.
    #[serde(default)]
    pub dispatch_crew_fallback_enabled: Option<bool>,
    /// Per-tenant override of the estimate display toggle.
    #[serde(default)]
    pub estimate_display_enabled: Option<bool>,
    /// Default language before detection has run.
    #[serde(default)]
    pub default_language: Option<Language>,
}

/// Everything the ingress and handlers need about a resolved tenant.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: String,
    pub provider: Provider,
    pub config: TenantConfig,
    pub credentials: ChannelCredentials,
}
