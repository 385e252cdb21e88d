//! Remote service layer.
//!
//! One typed async operation per backend endpoint. No retries, no caching;
//! failures surface as [`ClientError`] to the caller unchanged.
//!
//! | Operation              | Verb   | Path                                                  |
//! |------------------------|--------|-------------------------------------------------------|
//! | `exchange_id_token`    | POST   | `/gtokensignin`                                       |
//! | `approved_talks`       | GET    | `/cfpadmin/scheduling/approvedTalks?trackId=`         |
//! | `list_schedules`       | GET    | `/cfpadmin/scheduling/schedules`                      |
//! | `get_schedule`         | GET    | `/cfpadmin/scheduling/schedules/:id`                  |
//! | `save_schedule`        | POST   | `/cfpadmin/scheduling/schedules/:id`                  |
//! | `delete_schedule`      | DELETE | `/cfpadmin/scheduling/schedules/:id`                  |
//! | `update_status`        | PUT    | `/cfpadmin/scheduling/schedules/:id`                  |
//! | `request_publication`  | POST   | `/cfpadmin/scheduling/schedules/publicationRequest/`  |
//! | `request_notification` | POST   | `/cfpadmin/scheduling/schedules/notificationRequest/` |

pub mod client;

use async_trait::async_trait;

use crate::errors::ClientError;
use crate::models::{ApprovedTalksResponse, Schedule, SlotAllocation, Track};

pub use client::CfpClient;

pub const TOKEN_SIGNIN_PATH: &str = "/gtokensignin";
pub const APPROVED_TALKS_PATH: &str = "/cfpadmin/scheduling/approvedTalks";
pub const SCHEDULES_PATH: &str = "/cfpadmin/scheduling/schedules";
pub const PUBLICATION_REQUEST_PATH: &str = "/cfpadmin/scheduling/schedules/publicationRequest/";
pub const NOTIFICATION_REQUEST_PATH: &str = "/cfpadmin/scheduling/schedules/notificationRequest/";

/// Outcome of posting an identity token to the backend.
///
/// Non-200 answers are not errors here: the auth bridge decides what a
/// rejection means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchange {
    pub status: u16,
    pub session_cookie: Option<String>,
}

impl TokenExchange {
    pub fn accepted(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait CfpApi: Send + Sync {
    async fn exchange_id_token(&self, id_token: &str) -> Result<TokenExchange, ClientError>;

    async fn approved_talks(&self, track_id: &str) -> Result<ApprovedTalksResponse, ClientError>;

    async fn list_schedules(&self) -> Result<Vec<Track>, ClientError>;

    async fn get_schedule(&self, track_id: &str) -> Result<Schedule, ClientError>;

    async fn save_schedule(
        &self,
        track_id: &str,
        slots: &[SlotAllocation],
    ) -> Result<(), ClientError>;

    /// Deletes the track's schedule. The track itself is left alone.
    async fn delete_schedule(&self, track_id: &str) -> Result<(), ClientError>;

    async fn update_status(&self, track: &Track) -> Result<(), ClientError>;

    async fn request_publication(&self, track_id: &str) -> Result<(), ClientError>;

    async fn request_notification(&self, track_id: &str) -> Result<(), ClientError>;
}
