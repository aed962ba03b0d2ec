//! # labdesk - Lab Records for an Academic Department
//!
//! labdesk keeps the people, buildings, rooms, lab sections, scheduled
//! sessions and makeup requests of a department in durable, append-friendly
//! files, and enforces the rules that connect them.
//!
//! ## Core Concepts
//!
//! - **Repository**: In-memory mirror of every collection, persisted on each mutation
//! - **Collection**: One backing file per entity type, encoded field by field
//! - **Availability**: Half-open overlap test over non-canceled sessions
//! - **Makeup workflow**: Pending requests become Approved (with a booked session) or Disapproved
//!
//! ## Usage
//!
//! ```rust,no_run
//! use labdesk::{Date, MakeupWorkflow, Repository, Role, Time};
//!
//! # fn main() -> labdesk::LabResult<()> {
//! let mut repo = Repository::open_dir("./lab_data")?;
//! let attendant = repo.add_person("Bo", Role::Attendant, "secret")?;
//! let building = repo.register_building("Science", "1 Campus Rd", attendant)?;
//! let room = repo.add_room_to_building("R1", building)?;
//! let section = repo.add_lab_section("CS101", "Programming Lab", "A")?;
//!
//! let day = Date::new(2024, 3, 10)?;
//! repo.schedule_lab(section, room, day, Time::new(9, 0)?, Time::new(10, 0)?)?;
//!
//! let mut workflow = MakeupWorkflow::new(&mut repo);
//! for request in workflow.pending() {
//!     println!("{} wants a makeup on {}", request.instructor_id, request.requested_date);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Core types
pub mod error;
pub mod id;
pub mod makeup;
pub mod person;
pub mod schedule;
pub mod section;
pub mod time;
pub mod venue;

// Persistence and rules
pub mod allocator;
pub mod availability;
pub mod config;
pub mod repository;
pub mod storage;

// Front-office surface
pub mod office;
pub mod report;
pub mod workflow;

// Re-export primary types at crate root for convenience
pub use allocator::{IdAllocator, IdKind};
pub use config::LabConfig;
pub use error::{LabError, LabResult, RuleViolation, ValidationError};
pub use id::{BuildingId, CourseId, PersonId, RequestId, RoomId, ScheduleId, SectionId};
pub use makeup::{MakeupRequest, RequestStatus};
pub use person::{Person, Role};
pub use repository::Repository;
pub use schedule::{ScheduleEntry, ScheduleStatus};
pub use section::{LabSection, MAX_TAS};
pub use time::{Date, Time};
pub use venue::{Building, Room};

pub use report::{write_report, ReportGenerator};
pub use storage::{Collection, Record, StorageError};
pub use workflow::{MakeupDecision, MakeupOutcome, MakeupWorkflow};
