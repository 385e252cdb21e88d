//! Slot editor for a single track.
//!
//! Holds two lists that together partition the track's approved talks:
//! `approved_talks` (not yet placed) and `slots` (placed). Drops, manual
//! deallocation and the stadium toggle move talks between them in memory;
//! nothing reaches the server until [`SlotEditor::save_allocation`].
//!
//! Server failures on save, publication and unlock requests do not change
//! what the user is told: the confirmation is flashed regardless and the
//! error is logged and handed back to the caller. Only a failed load changes
//! state, by disabling every mutating action.
//!
//! A blocked schedule can be viewed but not edited or saved. Publication and
//! unlock requests stay available.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::api::CfpApi;
use crate::errors::{ClientError, ControllerError};
use crate::events::DropEvent;
use crate::flash::Flash;
use crate::models::{ApprovedTalksResponse, Slot, SlotAllocation, Talk, TalkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Idle,
    Loading,
    /// The load was refused; editing stays disabled.
    Unauthorized,
    Editing,
}

/// Identifies one load request. Only the most recent ticket may apply its
/// response, so a slow reply cannot overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

pub struct SlotEditor {
    api: Arc<dyn CfpApi>,
    track_id: String,
    approved_talks: Option<Vec<Talk>>,
    slots: Option<Vec<Slot>>,
    blocked: bool,
    disable_buttons: bool,
    phase: EditorPhase,
    latest_ticket: u64,
    flash: Flash,
}

impl SlotEditor {
    pub fn new(api: Arc<dyn CfpApi>, track_id: impl Into<String>) -> Self {
        Self {
            api,
            track_id: track_id.into(),
            approved_talks: None,
            slots: None,
            blocked: false,
            disable_buttons: false,
            phase: EditorPhase::Idle,
            latest_ticket: 0,
            flash: Flash::new(),
        }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn approved_talks(&self) -> Option<&[Talk]> {
        self.approved_talks.as_deref()
    }

    pub fn slots(&self) -> Option<&[Slot]> {
        self.slots.as_deref()
    }

    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots.as_ref()?.iter().find(|s| s.id == slot_id)
    }

    pub fn blocked(&self) -> bool {
        self.blocked
    }

    pub fn buttons_disabled(&self) -> bool {
        self.disable_buttons
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut Flash {
        &mut self.flash
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Fetch approved talks and the saved schedule, then adopt them.
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        let ticket = self.begin_load();
        let result = self.api.approved_talks(&self.track_id).await;
        self.finish_load(ticket, result).map(|_| ())
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        self.phase = EditorPhase::Loading;
        LoadTicket(self.latest_ticket)
    }

    /// Apply a load response. Returns `Ok(false)` when the ticket is stale
    /// and the response was discarded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<ApprovedTalksResponse, ClientError>,
    ) -> Result<bool, ControllerError> {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(
                track = %self.track_id,
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding stale load response"
            );
            return Ok(false);
        }

        match result {
            Ok(response) => {
                self.adopt(response);
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(track = %self.track_id, error = %err, "Failed to load schedule");
                self.approved_talks = None;
                self.slots = None;
                self.disable_buttons = true;
                self.phase = EditorPhase::Unauthorized;
                if err.is_unauthorized() {
                    self.flash.error("Unauthorized");
                } else {
                    self.flash.error(format!("Failed to load schedule: {}", err));
                }
                Err(err.into())
            }
        }
    }

    fn adopt(&mut self, response: ApprovedTalksResponse) {
        let mut talks = response.approved_talks.talks;
        match response.full_schedule {
            Some(schedule) => {
                let assigned: HashSet<&TalkId> = schedule
                    .slots
                    .iter()
                    .flat_map(|s| s.proposals.iter().map(|t| &t.id))
                    .collect();
                talks.retain(|t| !assigned.contains(&t.id));
                self.blocked = schedule.blocked;
                self.slots = Some(schedule.slots);
            }
            None => {
                tracing::debug!(track = %self.track_id, "No saved schedule, using default slots");
                self.blocked = false;
                self.slots = Some(Slot::default_layout());
            }
        }
        self.approved_talks = Some(talks);
        self.disable_buttons = false;
        self.phase = EditorPhase::Editing;
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Place `dragged` at the end of slot `slot_id`.
    ///
    /// The talk is taken out of the unassigned list and out of any other slot
    /// it was in, so it always ends up in exactly one place.
    pub fn drop_talk(&mut self, dragged: Talk, slot_id: &str) -> Result<(), ControllerError> {
        self.check_editable()?;
        let Some(slots) = self.slots.as_mut() else {
            tracing::warn!(slot = slot_id, "Drop received before schedule was loaded");
            return Err(ControllerError::NotLoaded);
        };
        let Some(target) = slots.iter().position(|s| s.id == slot_id) else {
            tracing::warn!(slot = slot_id, talk = %dragged.id, "Drop target slot not found");
            return Err(ControllerError::SlotNotFound {
                slot_id: slot_id.to_string(),
            });
        };

        for slot in slots.iter_mut() {
            slot.proposals.retain(|t| t.id != dragged.id);
        }
        if let Some(approved) = self.approved_talks.as_mut() {
            approved.retain(|t| t.id != dragged.id);
        }
        slots[target].proposals.push(dragged);
        Ok(())
    }

    pub fn handle_drop(&mut self, event: &DropEvent) -> Result<(), ControllerError> {
        self.drop_talk(event.dragged.clone(), &event.target_slot_id)
    }

    /// Apply every drop event waiting on `rx`. Returns how many were applied.
    pub fn apply_pending_drops(&mut self, rx: &mut broadcast::Receiver<DropEvent>) -> usize {
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if self.handle_drop(&event).is_ok() {
                        applied += 1;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Drop events were lost");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        applied
    }

    /// Take the talk at `position` out of slot `slot_id` and put it back at
    /// the end of the unassigned list.
    pub fn deallocate(&mut self, slot_id: &str, position: usize) -> Result<Talk, ControllerError> {
        self.check_editable()?;
        let slot = self.slot_mut(slot_id)?;
        if position >= slot.proposals.len() {
            tracing::warn!(slot = slot_id, position, "No talk at position");
            return Err(ControllerError::PositionOutOfRange {
                slot_id: slot_id.to_string(),
                position,
            });
        }
        let talk = slot.proposals.remove(position);
        if let Some(approved) = self.approved_talks.as_mut() {
            approved.push(talk.clone());
        }
        Ok(talk)
    }

    /// Make `slot_id` the track's stadium slot, or clear it if it already is.
    pub fn toggle_stadium(&mut self, slot_id: &str) -> Result<(), ControllerError> {
        self.check_editable()?;
        let slots = self.slots.as_mut().ok_or(ControllerError::NotLoaded)?;
        let Some(target) = slots.iter().position(|s| s.id == slot_id) else {
            tracing::warn!(slot = slot_id, "Stadium slot not found");
            return Err(ControllerError::SlotNotFound {
                slot_id: slot_id.to_string(),
            });
        };
        let enable = !slots[target].stadium;
        for (i, slot) in slots.iter_mut().enumerate() {
            slot.stadium = enable && i == target;
        }
        Ok(())
    }

    fn slot_mut(&mut self, slot_id: &str) -> Result<&mut Slot, ControllerError> {
        let slots = self.slots.as_mut().ok_or(ControllerError::NotLoaded)?;
        match slots.iter_mut().find(|s| s.id == slot_id) {
            Some(slot) => Ok(slot),
            None => {
                tracing::warn!(slot = slot_id, "Slot not found");
                Err(ControllerError::SlotNotFound {
                    slot_id: slot_id.to_string(),
                })
            }
        }
    }

    fn ensure_enabled(&self) -> Result<(), ControllerError> {
        if self.disable_buttons {
            return Err(ControllerError::ActionsDisabled);
        }
        Ok(())
    }

    /// Whether the slot layout may be changed: editing is enabled and the
    /// track is not blocked.
    pub fn check_editable(&self) -> Result<(), ControllerError> {
        self.ensure_enabled()?;
        if self.blocked {
            tracing::warn!(track = %self.track_id, "Track is blocked");
            return Err(ControllerError::Blocked {
                track_id: self.track_id.clone(),
            });
        }
        Ok(())
    }

    // ── Server actions ───────────────────────────────────────────────

    /// What `save_allocation` sends: slots with talk ids only.
    pub fn allocation_payload(&self) -> Vec<SlotAllocation> {
        self.slots
            .iter()
            .flatten()
            .map(SlotAllocation::from)
            .collect()
    }

    pub async fn save_allocation(&mut self) -> Result<(), ControllerError> {
        self.check_editable()?;
        if self.slots.is_none() {
            return Err(ControllerError::NotLoaded);
        }
        let payload = self.allocation_payload();
        let result = self.api.save_schedule(&self.track_id, &payload).await;
        self.flash
            .info(format!("Allocation for track {} saved", self.track_id));
        self.report("save allocation", result)
    }

    pub async fn request_publication(&mut self) -> Result<(), ControllerError> {
        self.ensure_enabled()?;
        let result = self.api.request_publication(&self.track_id).await;
        self.flash.info("Publication requested");
        self.report("request publication", result)
    }

    /// Ask for the track to be unblocked (the notification workflow).
    pub async fn request_unlocking(&mut self) -> Result<(), ControllerError> {
        self.ensure_enabled()?;
        let result = self.api.request_notification(&self.track_id).await;
        self.flash.info("Unlock requested");
        self.report("request unlocking", result)
    }

    fn report(&self, action: &str, result: Result<(), ClientError>) -> Result<(), ControllerError> {
        if let Err(err) = &result {
            tracing::warn!(track = %self.track_id, action, error = %err, "Server rejected request");
        }
        result.map_err(ControllerError::from)
    }
}
