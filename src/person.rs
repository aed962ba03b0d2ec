//! People and their roles.
//!
//! The five roles differ only by tag, so a person is one record with a
//! [`Role`] field rather than a family of types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::PersonId;

/// What a person is allowed to do in the department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Schedules labs, manages venues and decides makeup requests.
    AcademicOfficer,
    /// Teaches lab sections and files makeup requests.
    Instructor,
    /// Teaching assistant; a section lists at most five.
    #[serde(rename = "TA")]
    Ta,
    /// Head of department; consumes reports.
    #[serde(rename = "HoD")]
    Hod,
    /// Manages a building and fills timesheets for its rooms.
    Attendant,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::AcademicOfficer,
        Self::Instructor,
        Self::Ta,
        Self::Hod,
        Self::Attendant,
    ];

    /// Canonical name, also used as the on-disk tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AcademicOfficer => "AcademicOfficer",
            Self::Instructor => "Instructor",
            Self::Ta => "TA",
            Self::Hod => "HoD",
            Self::Attendant => "Attendant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownRole { name: s.to_string() })
    }
}

/// A registered user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Fixed at creation.
    pub role: Role,
    /// Compared verbatim on login.
    pub password: String,
}

impl Person {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert!("ta".parse::<Role>().is_err());
        let err = "Janitor".parse::<Role>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownRole { name: "Janitor".to_string() });
    }
}
