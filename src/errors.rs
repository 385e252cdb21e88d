//! Typed error hierarchy for the scheduling client.
//!
//! - `ClientError`: failures talking to the backend REST services
//! - `ControllerError`: controller operations that could not be applied

use thiserror::Error;

/// Errors from the remote service layer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized ({status}) calling {url}")]
    Unauthorized { status: u16, url: String },

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Whether this is an authentication failure (401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status, .. } | ClientError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Errors from the track list and slot editor controllers.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Slot {slot_id} not found")]
    SlotNotFound { slot_id: String },

    #[error("Track {track_id} not found")]
    TrackNotFound { track_id: String },

    #[error("No talk at position {position} in slot {slot_id}")]
    PositionOutOfRange { slot_id: String, position: usize },

    #[error("Schedule is not loaded")]
    NotLoaded,

    #[error("Editing actions are disabled")]
    ActionsDisabled,

    #[error("Track {track_id} is blocked; request unlocking before editing")]
    Blocked { track_id: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}
