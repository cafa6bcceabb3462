use serde::{Deserialize, Serialize};

use movebot_core::types::{Estimate, Language};
use movebot_sessions::types::LeadData;

use crate::error::LeadError;

/// Operator-side lifecycle of a finalized lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    InProgress,
    Done,
    Rejected,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::InProgress => "in_progress",
            LeadStatus::Done => "done",
            LeadStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = LeadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "in_progress" => Ok(LeadStatus::InProgress),
            "done" => Ok(LeadStatus::Done),
            "rejected" => Ok(LeadStatus::Rejected),
            other => Err(LeadError::UnknownStatus(other.to_string())),
        }
    }
}

/// Frozen snapshot persisted with the lead at finalization.
///
/// Everything the operator and crew views need is in here — the session row
/// is gone by the time they render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadPayload {
    /// Human-facing sequential number (mirrors `lead_seq`).
    pub lead_number: i64,
    pub language: Language,
    pub data: LeadData,
    pub estimate: Option<Estimate>,
}

/// A persisted, finalized lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub tenant_id: String,
    pub lead_id: String,
    pub chat_id: String,
    /// Globally monotonic across tenants; assigned exactly once at insert.
    pub lead_seq: i64,
    pub status: LeadStatus,
    pub payload: LeadPayload,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}
