//! Makeup request approval.
//!
//! ```text
//!            approve + room chosen from offer
//!   Pending ───────────────────────────────────▶ Approved  (+ makeup ScheduleEntry)
//!      │
//!      ├── disapprove ──────────────────────────▶ Disapproved
//!      ├── approve, no room free ───────────────▶ Disapproved
//!      └── approve, room not among offers ──────▶ Disapproved
//! ```
//!
//! Approved and Disapproved are terminal; acting on them again fails with
//! [`RuleViolation::RequestNotPending`].

use tracing::{info, warn};

use crate::error::{LabError, LabResult, RuleViolation};
use crate::id::{RequestId, RoomId, ScheduleId};
use crate::makeup::{MakeupRequest, RequestStatus};
use crate::repository::Repository;
use crate::venue::Room;

/// What the officer wants to do with a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeupDecision {
    Approve,
    Disapprove,
}

/// How a processed request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeupOutcome {
    /// Approved and booked as a makeup session.
    Approved {
        schedule_id: ScheduleId,
        room_id: RoomId,
    },
    /// Disapproved on request.
    Disapproved,
    /// Approval was attempted but every room was busy; the request was
    /// disapproved instead.
    NoRoomAvailable,
    /// Approval was attempted with a room that was not offered (or none at
    /// all); the request was disapproved.
    RoomNotOffered { room_id: Option<RoomId> },
}

impl MakeupOutcome {
    /// Status the request holds after this outcome.
    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        match self {
            Self::Approved { .. } => RequestStatus::Approved,
            _ => RequestStatus::Disapproved,
        }
    }
}

/// Drives pending makeup requests to a terminal state.
pub struct MakeupWorkflow<'a> {
    repo: &'a mut Repository,
}

impl<'a> MakeupWorkflow<'a> {
    pub fn new(repo: &'a mut Repository) -> Self {
        Self { repo }
    }

    /// Requests still awaiting a decision, in filing order.
    #[must_use]
    pub fn pending(&self) -> Vec<&MakeupRequest> {
        self.repo.pending_requests()
    }

    /// Rooms free for the request's window, across every building.
    ///
    /// The offer is not narrowed by section or by the room the section
    /// normally uses.
    pub fn candidate_rooms(&self, request_id: RequestId) -> LabResult<Vec<Room>> {
        let request = self.pending_request(request_id)?;
        Ok(self.offer_for(&request))
    }

    /// Attempts to approve a pending request.
    ///
    /// `select` sees the rooms on offer and picks one. With nothing on offer
    /// `select` is not called and the request is disapproved. A pick outside
    /// the offer also disapproves the request.
    pub fn approve<F>(&mut self, request_id: RequestId, select: F) -> LabResult<MakeupOutcome>
    where
        F: FnOnce(&[Room]) -> Option<RoomId>,
    {
        let request = self.pending_request(request_id)?;
        let offer = self.offer_for(&request);

        if offer.is_empty() {
            self.repo
                .update_makeup_request_status(request_id, RequestStatus::Disapproved)?;
            warn!(%request_id, date = %request.requested_date, "no room free for makeup; disapproved");
            return Ok(MakeupOutcome::NoRoomAvailable);
        }

        let chosen = select(&offer);
        let Some(room_id) = chosen.filter(|id| offer.iter().any(|room| room.id == *id)) else {
            self.repo
                .update_makeup_request_status(request_id, RequestStatus::Disapproved)?;
            warn!(%request_id, room = ?chosen.map(RoomId::get), "room not among offers; disapproved");
            return Ok(MakeupOutcome::RoomNotOffered { room_id: chosen });
        };

        // A storage failure still leaves the entry in memory, so the status
        // follows it before either error is surfaced.
        let booked = match self.repo.add_schedule_entry(
            request.section_id,
            room_id,
            request.requested_date,
            request.requested_start,
            request.requested_end,
            true,
        ) {
            Err(err) if !err.is_storage() => return Err(err),
            booked => booked,
        };
        let marked = self
            .repo
            .update_makeup_request_status(request_id, RequestStatus::Approved);
        let schedule_id = booked?;
        marked?;
        info!(%request_id, %room_id, %schedule_id, "makeup approved");
        Ok(MakeupOutcome::Approved { schedule_id, room_id })
    }

    /// Disapproves a pending request. Nothing else changes.
    pub fn disapprove(&mut self, request_id: RequestId) -> LabResult<MakeupOutcome> {
        self.pending_request(request_id)?;
        self.repo
            .update_makeup_request_status(request_id, RequestStatus::Disapproved)?;
        info!(%request_id, "makeup disapproved");
        Ok(MakeupOutcome::Disapproved)
    }

    pub fn process<F>(
        &mut self,
        request_id: RequestId,
        decision: MakeupDecision,
        select: F,
    ) -> LabResult<MakeupOutcome>
    where
        F: FnOnce(&[Room]) -> Option<RoomId>,
    {
        match decision {
            MakeupDecision::Approve => self.approve(request_id, select),
            MakeupDecision::Disapprove => self.disapprove(request_id),
        }
    }

    fn pending_request(&self, request_id: RequestId) -> LabResult<MakeupRequest> {
        let request = self
            .repo
            .makeup_request(request_id)
            .ok_or_else(|| LabError::not_found("MakeupRequest", request_id))?;
        if !request.is_pending() {
            return Err(RuleViolation::RequestNotPending {
                request_id: request_id.get(),
            }
            .into());
        }
        Ok(request.clone())
    }

    fn offer_for(&self, request: &MakeupRequest) -> Vec<Room> {
        self.repo
            .available_rooms(
                request.requested_date,
                request.requested_start,
                request.requested_end,
            )
            .into_iter()
            .cloned()
            .collect()
    }
}
