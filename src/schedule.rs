//! Scheduled lab sessions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{RoomId, ScheduleId, SectionId};
use crate::time::{Date, Time};

/// Lifecycle of a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleStatus {
    /// Booked, timesheet not yet filled.
    Scheduled,
    /// Actual times recorded by an attendant.
    Filled,
    /// Called off; never blocks a room.
    Canceled,
}

impl ScheduleStatus {
    /// Numeric code used on disk.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::Scheduled => 0,
            Self::Filled => 1,
            Self::Canceled => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Scheduled),
            1 => Some(Self::Filled),
            2 => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scheduled => "Scheduled",
            Self::Filled => "Filled",
            Self::Canceled => "Canceled",
        })
    }
}

/// One lab session booked in a room.
///
/// `actual_start`/`actual_end` stay at [`Time::ZERO`] unless the entry is
/// [`ScheduleStatus::Filled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ScheduleId,
    pub section_id: SectionId,
    pub room_id: RoomId,
    pub date: Date,
    pub expected_start: Time,
    pub expected_end: Time,
    pub actual_start: Time,
    pub actual_end: Time,
    pub is_makeup: bool,
    pub is_canceled: bool,
    pub status: ScheduleStatus,
}

impl ScheduleEntry {
    /// Creates a fresh, unfilled entry.
    #[must_use]
    pub fn new(
        id: ScheduleId,
        section_id: SectionId,
        room_id: RoomId,
        date: Date,
        expected_start: Time,
        expected_end: Time,
        is_makeup: bool,
    ) -> Self {
        Self {
            id,
            section_id,
            room_id,
            date,
            expected_start,
            expected_end,
            actual_start: Time::ZERO,
            actual_end: Time::ZERO,
            is_makeup,
            is_canceled: false,
            status: ScheduleStatus::Scheduled,
        }
    }

    /// Whether this entry still occupies its room.
    #[must_use]
    pub const fn occupies_room(&self) -> bool {
        !self.is_canceled
    }

    /// Hours actually taught; zero unless the timesheet was filled.
    #[must_use]
    pub fn contact_hours(&self) -> f64 {
        if self.status != ScheduleStatus::Filled {
            return 0.0;
        }
        self.actual_start.hours_until(self.actual_end)
    }

    /// Records actual times and marks the entry filled.
    pub(crate) fn fill(&mut self, actual_start: Time, actual_end: Time) {
        self.actual_start = actual_start;
        self.actual_end = actual_end;
        self.status = ScheduleStatus::Filled;
    }

    /// Marks the entry canceled and clears any actual times.
    pub(crate) fn cancel(&mut self) {
        self.actual_start = Time::ZERO;
        self.actual_end = Time::ZERO;
        self.is_canceled = true;
        self.status = ScheduleStatus::Canceled;
    }
}
