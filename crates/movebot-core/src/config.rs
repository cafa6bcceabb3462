use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::Language;

/// Upper bound accepted for a booking date, relative to today.
pub const MAX_BOOKING_HORIZON_DAYS: i64 = 180;
/// Cargo descriptions longer than this with zero recognized items suppress
/// the user-facing estimate.
pub const SUPPRESSION_MIN_CARGO_LEN: usize = 30;

/// Top-level config (movebot.toml + MOVEBOT_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MovebotConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub bots: BotsConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Key for the channel-credential cipher's context-tag MAC.
    #[serde(default = "default_credentials_key")]
    pub credentials_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            credentials_key: default_credentials_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Which job handlers a worker process registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerRole {
    /// Outbound replies, media ingestion, operator notification, cleanup.
    Core,
    /// Crew-fallback delivery only.
    Dispatch,
    #[default]
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub role: WorkerRole,
    /// Queue poll interval in milliseconds (clamped to 50–500 at use).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Running jobs older than this are returned to pending by the sweep.
    #[serde(default = "default_lease_horizon_secs")]
    pub lease_horizon_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            role: WorkerRole::default(),
            poll_interval_ms: default_poll_interval_ms(),
            lease_horizon_secs: default_lease_horizon_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotsConfig {
    /// Only listed bot ids are loadable. Inbound traffic for a session with
    /// an unlisted `bot_type` is rejected at ingress.
    #[serde(default = "default_enabled_bots")]
    pub enabled: Vec<String>,
}

impl Default for BotsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_bots(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Run the stored translation pass when formatting the operator message.
    #[serde(default)]
    pub lead_translation_enabled: bool,
    /// Target language for operator-facing lead text.
    #[serde(default = "default_operator_lang")]
    pub lead_target_lang: Language,
    /// Enqueue the crew-fallback delivery after finalization.
    /// Tenants may override via their own config blob.
    #[serde(default = "bool_true")]
    pub crew_fallback_enabled: bool,
    /// Media count at or below which attachments are delivered inline;
    /// above it the operator message carries signed links instead.
    #[serde(default = "default_max_inline_media")]
    pub max_inline_media_count: usize,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            lead_translation_enabled: false,
            lead_target_lang: default_operator_lang(),
            crew_fallback_enabled: true,
            max_inline_media_count: default_max_inline_media(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Days before an ingested asset expires and is cleaned up.
    #[serde(default = "default_media_ttl_days")]
    pub ttl_days: u32,
    /// HMAC secret for signed media links.
    #[serde(default = "default_media_secret")]
    pub sign_secret: String,
    /// Root directory for the local object store implementation.
    #[serde(default = "default_media_root")]
    pub root_dir: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_media_ttl_days(),
            sign_secret: default_media_secret(),
            root_dir: default_media_root(),
        }
    }
}

/// Pricing knobs. Every amount is in whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Show the computed range to the end user. When false the user sees a
    /// "to be confirmed" message but the breakdown is still persisted.
    #[serde(default = "bool_true")]
    pub estimate_display_enabled: bool,

    // Volume bases per category.
    #[serde(default = "default_base_small")]
    pub base_small: i64,
    #[serde(default = "default_base_medium")]
    pub base_medium: i64,
    #[serde(default = "default_base_large")]
    pub base_large: i64,
    #[serde(default = "default_base_xl")]
    pub base_xl: i64,

    /// Midpoint-sum thresholds for volume inference from extracted items.
    #[serde(default = "default_volume_small_max")]
    pub volume_small_max: i64,
    #[serde(default = "default_volume_medium_max")]
    pub volume_medium_max: i64,
    #[serde(default = "default_volume_large_max")]
    pub volume_large_max: i64,
    /// This many heavy items force the `xl` category.
    #[serde(default = "default_heavy_xl_count")]
    pub heavy_xl_count: usize,

    /// Surcharge per floor without elevator, floors above the first.
    #[serde(default = "default_per_floor_rate")]
    pub per_floor_rate: i64,

    // Route band fees.
    #[serde(default)]
    pub fee_same_city: i64,
    #[serde(default = "default_fee_same_metro")]
    pub fee_same_metro: i64,
    #[serde(default = "default_fee_inter_region_short")]
    pub fee_inter_region_short: i64,
    #[serde(default = "default_fee_inter_region_long")]
    pub fee_inter_region_long: i64,
    #[serde(default = "default_fee_cross_country")]
    pub fee_cross_country: i64,

    // Route band minimums applied to the final range.
    #[serde(default = "default_min_same_city")]
    pub min_same_city: i64,
    #[serde(default = "default_min_same_metro")]
    pub min_same_metro: i64,
    #[serde(default = "default_min_inter_region_short")]
    pub min_inter_region_short: i64,
    #[serde(default = "default_min_inter_region_long")]
    pub min_inter_region_long: i64,
    #[serde(default = "default_min_cross_country")]
    pub min_cross_country: i64,

    // Extras fees.
    #[serde(default = "default_extra_movers")]
    pub extra_movers: i64,
    #[serde(default = "default_extra_assembly")]
    pub extra_assembly: i64,
    #[serde(default = "default_extra_packing")]
    pub extra_packing: i64,

    // Complexity guards.
    #[serde(default = "default_complex_multiplier")]
    pub complex_multiplier: f64,
    #[serde(default = "default_risk_buffer")]
    pub risk_buffer: f64,
    #[serde(default = "default_complex_min_floor")]
    pub complex_min_floor: i64,

    /// Extra catalog entries merged over the built-in item table.
    #[serde(default)]
    pub catalog: Vec<CatalogItemConfig>,
}

/// One config-supplied catalog item. Overrides a built-in entry with the
/// same key, otherwise extends the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItemConfig {
    pub key: String,
    pub price_min: i64,
    pub price_max: i64,
    #[serde(default)]
    pub heavy: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub label_ru: String,
    pub label_en: String,
    pub label_he: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            estimate_display_enabled: true,
            base_small: default_base_small(),
            base_medium: default_base_medium(),
            base_large: default_base_large(),
            base_xl: default_base_xl(),
            volume_small_max: default_volume_small_max(),
            volume_medium_max: default_volume_medium_max(),
            volume_large_max: default_volume_large_max(),
            heavy_xl_count: default_heavy_xl_count(),
            per_floor_rate: default_per_floor_rate(),
            fee_same_city: 0,
            fee_same_metro: default_fee_same_metro(),
            fee_inter_region_short: default_fee_inter_region_short(),
            fee_inter_region_long: default_fee_inter_region_long(),
            fee_cross_country: default_fee_cross_country(),
            min_same_city: default_min_same_city(),
            min_same_metro: default_min_same_metro(),
            min_inter_region_short: default_min_inter_region_short(),
            min_inter_region_long: default_min_inter_region_long(),
            min_cross_country: default_min_cross_country(),
            extra_movers: default_extra_movers(),
            extra_assembly: default_extra_assembly(),
            extra_packing: default_extra_packing(),
            complex_multiplier: default_complex_multiplier(),
            risk_buffer: default_risk_buffer(),
            complex_min_floor: default_complex_min_floor(),
            catalog: Vec::new(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.movebot/movebot.db", home)
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    18620
}
fn default_poll_interval_ms() -> u64 {
    200
}
fn default_lease_horizon_secs() -> u64 {
    300
}
fn default_enabled_bots() -> Vec<String> {
    vec!["moving_bot_v1".to_string()]
}
fn default_operator_lang() -> Language {
    Language::Ru
}
fn default_max_inline_media() -> usize {
    5
}
fn default_media_ttl_days() -> u32 {
    30
}
fn default_media_secret() -> String {
    "change-me".to_string()
}
fn default_credentials_key() -> String {
    "change-me-too".to_string()
}
fn default_media_root() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.movebot/media", home)
}
fn default_currency() -> String {
    "ILS".to_string()
}
fn default_base_small() -> i64 {
    900
}
fn default_base_medium() -> i64 {
    1900
}
fn default_base_large() -> i64 {
    3400
}
fn default_base_xl() -> i64 {
    5200
}
fn default_volume_small_max() -> i64 {
    1500
}
fn default_volume_medium_max() -> i64 {
    3500
}
fn default_volume_large_max() -> i64 {
    6500
}
fn default_heavy_xl_count() -> usize {
    2
}
fn default_per_floor_rate() -> i64 {
    120
}
fn default_fee_same_metro() -> i64 {
    250
}
fn default_fee_inter_region_short() -> i64 {
    450
}
fn default_fee_inter_region_long() -> i64 {
    900
}
fn default_fee_cross_country() -> i64 {
    1600
}
fn default_min_same_city() -> i64 {
    600
}
fn default_min_same_metro() -> i64 {
    800
}
fn default_min_inter_region_short() -> i64 {
    1200
}
fn default_min_inter_region_long() -> i64 {
    2000
}
fn default_min_cross_country() -> i64 {
    3200
}
fn default_extra_movers() -> i64 {
    400
}
fn default_extra_assembly() -> i64 {
    350
}
fn default_extra_packing() -> i64 {
    500
}
fn default_complex_multiplier() -> f64 {
    1.18
}
fn default_risk_buffer() -> f64 {
    1.08
}
fn default_complex_min_floor() -> i64 {
    7800
}

impl MovebotConfig {
    /// Load config from a TOML file with MOVEBOT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.movebot/movebot.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MovebotConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MOVEBOT_").split("_"))
            .extract()
            .map_err(|e| crate::error::MovebotError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.movebot/movebot.toml", home)
}
