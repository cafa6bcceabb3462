use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use movebot_core::types::{
    Estimate, Extra, Language, LeadItem, RouteClassification, Stop, TimeWindow, VolumeCategory,
};

use crate::error::SessionError;

/// Default bot flavour driving the intake dialogue.
pub const DEFAULT_BOT_TYPE: &str = "moving_bot_v1";

/// The conversation step vocabulary.
///
/// Transition rules live in the engine; this enum only names the states and
/// round-trips them through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Welcome,
    ConfirmAddresses,
    Cargo,
    Volume,
    PickupCount,
    AddrFrom,
    FloorFrom,
    AddrFrom2,
    FloorFrom2,
    AddrFrom3,
    FloorFrom3,
    AddrTo,
    FloorTo,
    Date,
    SpecificDate,
    TimeSlot,
    ExactTime,
    PhotoMenu,
    PhotoWait,
    Extras,
    Estimate,
    Done,
}

impl Step {
    /// Every step, in canonical flow order. Used by reachability checks.
    pub const ALL: [Step; 22] = [
        Step::Welcome,
        Step::ConfirmAddresses,
        Step::Cargo,
        Step::Volume,
        Step::PickupCount,
        Step::AddrFrom,
        Step::FloorFrom,
        Step::AddrFrom2,
        Step::FloorFrom2,
        Step::AddrFrom3,
        Step::FloorFrom3,
        Step::AddrTo,
        Step::FloorTo,
        Step::Date,
        Step::SpecificDate,
        Step::TimeSlot,
        Step::ExactTime,
        Step::PhotoMenu,
        Step::PhotoWait,
        Step::Extras,
        Step::Estimate,
        Step::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::ConfirmAddresses => "confirm_addresses",
            Step::Cargo => "cargo",
            Step::Volume => "volume",
            Step::PickupCount => "pickup_count",
            Step::AddrFrom => "addr_from",
            Step::FloorFrom => "floor_from",
            Step::AddrFrom2 => "addr_from_2",
            Step::FloorFrom2 => "floor_from_2",
            Step::AddrFrom3 => "addr_from_3",
            Step::FloorFrom3 => "floor_from_3",
            Step::AddrTo => "addr_to",
            Step::FloorTo => "floor_to",
            Step::Date => "date",
            Step::SpecificDate => "specific_date",
            Step::TimeSlot => "time_slot",
            Step::ExactTime => "exact_time",
            Step::PhotoMenu => "photo_menu",
            Step::PhotoWait => "photo_wait",
            Step::Extras => "extras",
            Step::Estimate => "estimate",
            Step::Done => "done",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = SessionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Step::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| SessionError::UnknownStep(s.to_string()))
    }
}

/// Everything collected from the user over the course of the dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadData {
    /// Raw cargo description exactly as typed.
    #[serde(default)]
    pub cargo_raw: String,
    #[serde(default)]
    pub items: Vec<LeadItem>,
    #[serde(default)]
    pub volume_category: Option<VolumeCategory>,
    #[serde(default = "default_pickup_count")]
    pub pickup_count: u8,
    #[serde(default)]
    pub pickups: Vec<Stop>,
    #[serde(default)]
    pub destination: Option<Stop>,
    /// ISO date or a relative token such as `this_week`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    /// Only set when `time_window == Exact`, format `HH:MM`.
    #[serde(default)]
    pub exact_time: Option<String>,
    #[serde(default)]
    pub extras: Vec<Extra>,
    /// Ingested media asset ids.
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub estimate: Option<Estimate>,
    #[serde(default)]
    pub route_classification: Option<RouteClassification>,
    /// Optional per-field translations: field → language code → value.
    #[serde(default)]
    pub translations: Option<HashMap<String, HashMap<String, String>>>,
    /// Engine scratch space. Only the typed accessors below may read it.
    #[serde(default)]
    pub custom: Map<String, Value>,
}

fn default_pickup_count() -> u8 {
    1
}

impl Default for LeadData {
    fn default() -> Self {
        Self {
            cargo_raw: String::new(),
            items: Vec::new(),
            volume_category: None,
            pickup_count: default_pickup_count(),
            pickups: Vec::new(),
            destination: None,
            date: None,
            time_window: None,
            exact_time: None,
            extras: Vec::new(),
            photos: Vec::new(),
            estimate: None,
            route_classification: None,
            translations: None,
            custom: Map::new(),
        }
    }
}

impl LeadData {
    /// Marks the session as seeded from a landing-page prefill payload.
    pub fn set_prefilled(&mut self, prefilled: bool) {
        self.custom
            .insert("prefilled".to_string(), Value::Bool(prefilled));
    }

    pub fn is_prefilled(&self) -> bool {
        self.custom
            .get("prefilled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Assigned at finalization from the lead sequence.
    pub fn set_lead_number(&mut self, n: i64) {
        self.custom
            .insert("lead_number".to_string(), Value::from(n));
    }

    pub fn lead_number(&self) -> Option<i64> {
        self.custom.get("lead_number").and_then(Value::as_i64)
    }
}

/// One mutable conversation state per `(tenant_id, chat_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub tenant_id: String,
    pub chat_id: String,
    /// 12-hex opaque id generated at session creation; becomes the lead id.
    pub lead_id: String,
    pub bot_type: String,
    pub step: Step,
    pub language: Language,
    pub data: LeadData,
    /// RFC3339; also the optimistic-concurrency token for upserts.
    pub created_at: String,
    pub updated_at: String,
}

impl SessionState {
    pub fn new(tenant_id: impl Into<String>, chat_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            tenant_id: tenant_id.into(),
            chat_id: chat_id.into(),
            lead_id: new_lead_id(),
            bot_type: DEFAULT_BOT_TYPE.to_string(),
            step: Step::Welcome,
            language: Language::default(),
            data: LeadData::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// A fresh session preserving only identity and language, per the
    /// `reset` intent contract. A new lead id is generated.
    pub fn reset(&self) -> Self {
        let mut fresh = SessionState::new(self.tenant_id.clone(), self.chat_id.clone());
        fresh.language = self.language;
        fresh.bot_type = self.bot_type.clone();
        fresh
    }
}

/// 12 lowercase hex chars, opaque to users and providers.
fn new_lead_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}
