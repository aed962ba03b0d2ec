//! Error types for labdesk.
//!
//! All errors are strongly typed using thiserror so callers can match on the
//! exact failure and decide whether to retry, report, or give up.

use thiserror::Error;

use crate::allocator::IdKind;
use crate::makeup::RequestStatus;
use crate::person::Role;
use crate::storage::StorageError;
use crate::time::Time;

/// Validation errors for values supplied by the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        year: u64,
        month: u64,
        day: u64,
    },

    #[error("Invalid time {hour:02}:{minute:02}")]
    InvalidTime {
        hour: u64,
        minute: u64,
    },

    #[error("Invalid time window: start ({start}) must be before end ({end})")]
    InvertedWindow {
        start: Time,
        end: Time,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField {
        field: &'static str,
    },

    #[error("Unknown role '{name}'")]
    UnknownRole {
        name: String,
    },

    #[error("Invalid report name '{stem}'")]
    InvalidReportName {
        stem: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Domain rules that an otherwise well-formed request can break.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Section {section_id} already has the maximum of {capacity} TAs")]
    TaCapacityExceeded {
        section_id: u64,
        capacity: usize,
    },

    #[error("Person {person_id} is a {actual}, expected {expected}")]
    RoleMismatch {
        person_id: u64,
        expected: Role,
        actual: Role,
    },

    #[error("Room {room_id} is not available for the requested window")]
    RoomUnavailable {
        room_id: u64,
    },

    #[error("Makeup request {request_id} is not pending")]
    RequestNotPending {
        request_id: u64,
    },

    #[error("Makeup request {request_id} cannot move from {from} to {to}")]
    InvalidTransition {
        request_id: u64,
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("Section {section_name} of course {course_code} already exists as {section_id}")]
    DuplicateSection {
        course_code: String,
        section_name: String,
        section_id: u64,
    },

    #[error("Schedule entry {schedule_id} is not open for this operation")]
    ScheduleNotOpen {
        schedule_id: u64,
    },

    #[error("Schedule entry {schedule_id} is not in a room managed by attendant {attendant_id}")]
    RoomNotManaged {
        schedule_id: u64,
        attendant_id: u64,
    },

    #[error("No {kind} identifiers left to allocate")]
    IdSpaceExhausted {
        kind: IdKind,
    },

    #[error("Section {section_id} is not taught by instructor {instructor_id}")]
    SectionNotTaught {
        section_id: u64,
        instructor_id: u64,
    },
}

/// Top-level error type for labdesk.
#[derive(Debug, Error)]
pub enum LabError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rule violation: {0}")]
    Rule(#[from] RuleViolation),

    #[error("{kind} not found: {id}")]
    NotFound {
        kind: &'static str,
        id: u64,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LabError {
    /// Creates a not-found error for the given record kind.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub const fn is_rule(&self) -> bool {
        matches!(self, Self::Rule(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if repeating the operation could succeed.
    ///
    /// Only persistence failures qualify: the in-memory change has already
    /// been applied and a later rewrite may make it durable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for labdesk operations.
pub type LabResult<T> = Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validation_error_date() {
        let err = ValidationError::InvalidDate { year: 2024, month: 2, day: 30 };
        let msg = format!("{err}");
        assert!(msg.contains("2024-02-30"));
    }

    #[test]
    fn test_inverted_window_message() {
        let err = ValidationError::InvertedWindow {
            start: Time::new(10, 0).unwrap(),
            end: Time::new(9, 0).unwrap(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("10:00"));
        assert!(msg.contains("09:00"));
    }

    #[test]
    fn test_rule_violation_role_mismatch() {
        let err = RuleViolation::RoleMismatch {
            person_id: 1002,
            expected: Role::Attendant,
            actual: Role::Instructor,
        };
        let msg = format!("{err}");
        assert!(msg.contains("1002"));
        assert!(msg.contains("Attendant"));
        assert!(msg.contains("Instructor"));
    }

    #[test]
    fn test_lab_error_from_rule() {
        let err: LabError = RuleViolation::TaCapacityExceeded { section_id: 2001, capacity: 5 }.into();
        assert!(err.is_rule());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = RuleViolation::InvalidTransition {
            request_id: 5001,
            from: RequestStatus::Approved,
            to: RequestStatus::Disapproved,
        };
        assert_eq!(
            format!("{err}"),
            "Makeup request 5001 cannot move from Approved to Disapproved"
        );
    }

    #[test]
    fn test_lab_error_not_found() {
        let err = LabError::not_found("Room", 3001u64);
        assert!(err.is_not_found());
        assert_eq!(format!("{err}"), "Room not found: 3001");
    }

    #[test]
    fn test_storage_error_retryable() {
        let err: LabError = StorageError::Io {
            path: PathBuf::from("rooms.dat"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(err.is_storage());
        assert!(err.is_retryable());
    }
}
