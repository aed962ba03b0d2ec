//! Record identifiers.
//!
//! Every entity type has its own identifier newtype so a room id can never be
//! passed where a section id is expected. All of them wrap the positive
//! integer handed out by [`IdAllocator`](crate::allocator::IdAllocator).

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier value.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id!(
    /// Identifies a [`Person`](crate::person::Person).
    PersonId
);
record_id!(
    /// Identifies a [`Building`](crate::venue::Building).
    BuildingId
);
record_id!(
    /// Identifies a [`Room`](crate::venue::Room).
    RoomId
);
record_id!(
    /// Identifies a course; shared by every section with the same course code.
    CourseId
);
record_id!(
    /// Identifies a [`LabSection`](crate::section::LabSection).
    SectionId
);
record_id!(
    /// Identifies a [`ScheduleEntry`](crate::schedule::ScheduleEntry).
    ScheduleId
);
record_id!(
    /// Identifies a [`MakeupRequest`](crate::makeup::MakeupRequest).
    RequestId
);
