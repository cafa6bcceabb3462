use serde::{Deserialize, Serialize};

use crate::error::MovebotError;

/// A chat provider the service accepts traffic from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// WhatsApp/SMS gateway (Twilio-style).
    Twilio,
    /// WhatsApp Cloud API.
    Meta,
    /// Generic bot API (Telegram-style).
    Telegram,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Twilio => "twilio",
            Provider::Meta => "meta",
            Provider::Telegram => "telegram",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = MovebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twilio" => Ok(Provider::Twilio),
            "meta" => Ok(Provider::Meta),
            "telegram" => Ok(Provider::Telegram),
            other => Err(MovebotError::UnknownProvider(other.to_string())),
        }
    }
}

/// Conversation language. Detected from script on free-text input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    He,
    #[default]
    En,
    Ru,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::He => "he",
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = MovebotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "he" => Ok(Language::He),
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(MovebotError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Volume class inferred from the cargo description or chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeCategory {
    Small,
    Medium,
    Large,
    Xl,
}

impl VolumeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeCategory::Small => "small",
            VolumeCategory::Medium => "medium",
            VolumeCategory::Large => "large",
            VolumeCategory::Xl => "xl",
        }
    }
}

/// Preferred arrival window for the crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Morning,
    Day,
    Evening,
    Exact,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "morning",
            TimeWindow::Day => "day",
            TimeWindow::Evening => "evening",
            TimeWindow::Exact => "exact",
        }
    }
}

/// Optional paid add-ons for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extra {
    Movers,
    Assembly,
    Packing,
}

impl Extra {
    pub fn as_str(&self) -> &'static str {
        match self {
            Extra::Movers => "movers",
            Extra::Assembly => "assembly",
            Extra::Packing => "packing",
        }
    }
}

/// A WGS-84 coordinate pair attached to an address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One media attachment on an inbound message, before ingestion.
///
/// `source_ref` is provider-specific and only meaningful to that
/// provider's media fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMediaItem {
    pub content_type: String,
    pub size_bytes: u64,
    pub source_ref: String,
}

/// A provider-normalized inbound event, as handed over by the webhook layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub provider: Provider,
    /// Provider-side account identity (phone number id, bot id, …) used to
    /// resolve the tenant.
    pub provider_account_id: String,
    pub chat_id: String,
    pub message_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub button_payload: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub media: Vec<InputMediaItem>,
}

/// Decrypted credentials for one channel binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCredentials {
    /// Bot/API token for the bound provider account.
    pub api_token: String,
    /// Provider-specific extras (phone number id, account sid, …).
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Categorical distance class between origin and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteBand {
    SameCity,
    SameMetro,
    InterRegionShort,
    InterRegionLong,
    CrossCountry,
}

impl RouteBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteBand::SameCity => "same_city",
            RouteBand::SameMetro => "same_metro",
            RouteBand::InterRegionShort => "inter_region_short",
            RouteBand::InterRegionLong => "inter_region_long",
            RouteBand::CrossCountry => "cross_country",
        }
    }

    /// True for bands that count toward the complexity score.
    pub fn is_long_haul(&self) -> bool {
        matches!(
            self,
            RouteBand::InterRegionShort | RouteBand::InterRegionLong | RouteBand::CrossCountry
        )
    }
}

/// Route classification attached to a lead once both endpoints are known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteClassification {
    pub band: RouteBand,
    pub distance_km: f64,
    /// Display names of the origin locality, indexed by language code.
    pub from_names: std::collections::HashMap<String, String>,
    /// Display names of the destination locality, indexed by language code.
    pub to_names: std::collections::HashMap<String, String>,
}

/// One recognized catalog item extracted from the cargo description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadItem {
    pub key: String,
    pub qty: u32,
    pub price_min: i64,
    pub price_max: i64,
    pub heavy: bool,
}

/// One line of the operator-side estimate breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub amount: i64,
}

/// Computed price range with its per-contribution breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub min: i64,
    pub max: i64,
    pub currency: String,
    pub breakdown: Vec<BreakdownEntry>,
    /// When true the user-facing range is replaced with "to be confirmed";
    /// the breakdown is still persisted for the operator.
    #[serde(default)]
    pub suppressed: bool,
}

/// A pickup or destination address with its access details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub address_text: String,
    pub floor_num: i32,
    pub has_elevator: bool,
    #[serde(default)]
    pub locality_key: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
}

/// One quick-reply button on an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Opaque payload echoed back as `button_payload` when pressed.
    pub payload: String,
    /// Localized label shown to the user.
    pub label: String,
}

impl Button {
    pub fn new(payload: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            label: label.into(),
        }
    }
}
