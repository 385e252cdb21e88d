//! Admin dashboard: tracks that have a schedule.

use std::sync::Arc;

use crate::api::CfpApi;
use crate::errors::ControllerError;
use crate::flash::Flash;
use crate::models::Track;

pub struct TrackList {
    api: Arc<dyn CfpApi>,
    tracks: Vec<Track>,
    flash: Flash,
}

impl TrackList {
    pub fn new(api: Arc<dyn CfpApi>) -> Self {
        Self {
            api,
            tracks: Vec::new(),
            flash: Flash::new(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut Flash {
        &mut self.flash
    }

    pub async fn load(&mut self) -> Result<(), ControllerError> {
        self.tracks = self.api.list_schedules().await?;
        tracing::debug!(count = self.tracks.len(), "Loaded scheduled tracks");
        Ok(())
    }

    /// Delete the track's schedule (the track itself stays), then re-fetch.
    ///
    /// The confirmation is flashed whatever the server said. A delete failure
    /// is logged and returned after the list has been refreshed, ahead of any
    /// error from the refresh itself.
    pub async fn delete_schedule(&mut self, track_id: &str) -> Result<(), ControllerError> {
        let label = self
            .track(track_id)
            .map(|t| t.label.clone())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| track_id.to_string());

        let deleted = self.api.delete_schedule(track_id).await;
        if let Err(err) = &deleted {
            tracing::warn!(track = track_id, error = %err, "Failed to delete schedule");
        }
        self.flash.info(format!("Deleted schedule for {}", label));
        let reloaded = self.load().await;
        deleted?;
        reloaded
    }

    /// Flip the blocked flag locally and push it. No rollback on failure.
    pub async fn toggle_blocked_status(&mut self, track_id: &str) -> Result<bool, ControllerError> {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) else {
            tracing::warn!(track = track_id, "Track not found");
            return Err(ControllerError::TrackNotFound {
                track_id: track_id.to_string(),
            });
        };
        track.blocked = !track.blocked;
        let blocked = track.blocked;
        let track = track.clone();

        if let Err(err) = self.api.update_status(&track).await {
            tracing::warn!(track = track_id, blocked, error = %err, "Failed to update track status");
            return Err(err.into());
        }
        Ok(blocked)
    }
}
