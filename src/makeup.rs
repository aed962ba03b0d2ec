//! Makeup lab requests filed by instructors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{PersonId, RequestId, SectionId};
use crate::time::{Date, Time};

/// Approval state of a makeup request.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Disapproved,
}

impl RequestStatus {
    /// Numeric code used on disk.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Disapproved => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Disapproved),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Disapproved => "Disapproved",
        })
    }
}

/// A request to run an extra session for a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeupRequest {
    pub id: RequestId,
    pub section_id: SectionId,
    pub instructor_id: PersonId,
    pub requested_date: Date,
    pub requested_start: Time,
    pub requested_end: Time,
    pub reason: String,
    pub status: RequestStatus,
}

impl MakeupRequest {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }
}
