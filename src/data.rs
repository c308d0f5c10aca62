use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifies a room within one catalog snapshot.
pub type RoomId = String;

/// A physical room with a capacity and a set of features.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub capacity: u32,
    #[serde(default, deserialize_with = "features_field")]
    pub features: Vec<String>,
}

impl Room {
    /// The haystack for required-feature matching: the feature list joined
    /// with ", " followed by the category. Matching is a case-insensitive
    /// substring test against this text, not an exact set lookup.
    pub fn feature_text(&self) -> String {
        format!("{} {}", self.features.join(", "), self.category)
    }
}

/// Splits the spreadsheet form of a feature list ("Projetor, Quadro") into
/// trimmed, non-empty tokens.
pub fn split_features(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect()
}

// Catalogs arrive either as a JSON list of features or as the raw
// comma-separated cell text exported from a spreadsheet.
fn features_field<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => split_features(&text),
        Raw::List(list) => list,
    })
}

/// One class-session row as imported from the session batch.
///
/// `start`/`end` stay textual here; the allocator parses them and records a
/// per-session failure if neither accepted format applies. `days` is the raw
/// multi-day field ("Segunda e Quarta", "Terça / Quinta", ...).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub size: u32,
    pub start: String,
    pub end: String,
    pub days: String,
    #[serde(default)]
    pub required_feature: Option<String>,
}

/// The complete input for one allocation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInput {
    pub rooms: Vec<Room>,
    pub sessions: Vec<ClassSession>,
}

/// Terminal outcome of one (session, day) demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationStatus {
    Success,
    NoCompatibleRoom,
    InvalidTime,
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStatus::Success => write!(f, "success"),
            AllocationStatus::NoCompatibleRoom => write!(f, "no-compatible-room"),
            AllocationStatus::InvalidTime => write!(f, "invalid-time"),
        }
    }
}

/// One row of the allocation report, covering a single (session, day) demand.
///
/// `assigned_room_id`, `capacity`, and `occupancy` are `None` whenever the
/// demand was not placed; `occupancy` is the session size over the room
/// capacity as a whole percentage ("67%").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub size: u32,
    pub assigned_room_id: Option<RoomId>,
    pub capacity: Option<u32>,
    pub occupancy: Option<String>,
    pub day: String,
    pub time_window: String,
    pub status: AllocationStatus,
}

/// The ordered output of one allocation run, one result per demand, plus the
/// per-status counts the presentation layer shows above the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReport {
    pub results: Vec<AllocationResult>,
    pub assigned: usize,
    pub unassigned: usize,
    pub invalid: usize,
}
