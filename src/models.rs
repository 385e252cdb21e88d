//! Domain types shared by the remote service layer and the controllers.
//!
//! Field names follow the backend's JSON (camelCase) so the same structs are
//! used for decoding responses and encoding request bodies.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Number of empty slots a track starts with when no schedule exists yet.
pub const DEFAULT_SLOT_COUNT: usize = 7;

/// Identifier of a talk proposal.
///
/// The backend is not consistent about sending ids as strings or numbers, so
/// both are accepted and normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TalkId(pub String);

impl TalkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TalkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TalkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for TalkId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for TalkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(TalkId)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// An approved talk proposal. Everything besides the id is opaque metadata
/// and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: TalkId,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Talk {
    pub fn new(id: impl Into<TalkId>) -> Self {
        Self {
            id: id.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Human-readable title, if the backend sent one.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(|v| v.as_str())
    }
}

/// A schedulable container for talks within a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub proposals: Vec<Talk>,
    #[serde(default)]
    pub stadium: bool,
}

impl Slot {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            proposals: Vec::new(),
            stadium: false,
        }
    }

    /// The initial layout for a track with no saved schedule: ids "1" to "7".
    pub fn default_layout() -> Vec<Slot> {
        (1..=DEFAULT_SLOT_COUNT)
            .map(|n| Slot::empty(n.to_string()))
            .collect()
    }

    pub fn contains(&self, talk_id: &TalkId) -> bool {
        self.proposals.iter().any(|t| &t.id == talk_id)
    }
}

/// Server-side aggregate for a track: its slots plus the blocked flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub blocked: bool,
}

/// A conference track as listed on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub blocked: bool,
}

/// Body of the status update PUT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStatus<'a> {
    pub id: &'a str,
    pub blocked: bool,
}

impl<'a> From<&'a Track> for TrackStatus<'a> {
    fn from(track: &'a Track) -> Self {
        Self {
            id: &track.id,
            blocked: track.blocked,
        }
    }
}

/// Persisted form of a slot: talk metadata is dropped, only ids are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAllocation {
    pub id: String,
    pub proposals: Vec<TalkId>,
    pub stadium: bool,
}

impl From<&Slot> for SlotAllocation {
    fn from(slot: &Slot) -> Self {
        Self {
            id: slot.id.clone(),
            proposals: slot.proposals.iter().map(|t| t.id.clone()).collect(),
            stadium: slot.stadium,
        }
    }
}

/// Body of the publication and notification workflow requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest<'a> {
    pub track_id: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TalkList {
    #[serde(default)]
    pub talks: Vec<Talk>,
}

/// Response of the approved talks endpoint for one track.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedTalksResponse {
    #[serde(default)]
    pub approved_talks: TalkList,
    #[serde(default)]
    pub full_schedule: Option<Schedule>,
}

/// The schedules listing comes back either as a bare array or wrapped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TrackListing {
    Bare(Vec<Track>),
    Wrapped { tracks: Vec<Track> },
}

impl From<TrackListing> for Vec<Track> {
    fn from(listing: TrackListing) -> Self {
        match listing {
            TrackListing::Bare(tracks) | TrackListing::Wrapped { tracks } => tracks,
        }
    }
}
