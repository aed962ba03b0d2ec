//! Checked operations for the people who run the department.
//!
//! The plain [`Repository`] mutations trust their caller. The methods here are
//! what an interactive front end calls on behalf of a logged-in user: they
//! verify roles, references and room availability before delegating.

use tracing::{info, warn};

use crate::error::{LabError, LabResult, RuleViolation, ValidationError};
use crate::id::{BuildingId, PersonId, RequestId, RoomId, ScheduleId, SectionId};
use crate::person::{Person, Role};
use crate::repository::Repository;
use crate::schedule::ScheduleStatus;
use crate::time::{validate_window, Date, Time};

/// Name given to the officer created on first start.
pub const DEFAULT_OFFICER_NAME: &str = "Default Academic Officer";
/// Password given to the officer created on first start.
pub const DEFAULT_OFFICER_PASSWORD: &str = "123";

impl Repository {
    /// Returns the person if `password` matches exactly.
    #[must_use]
    pub fn authenticate(&self, id: PersonId, password: &str) -> Option<&Person> {
        let person = self.person(id).filter(|p| p.password == password);
        if person.is_none() {
            warn!(%id, "login failed");
        }
        person
    }

    /// Creates the default academic officer when nobody is registered yet.
    pub fn ensure_default_officer(&mut self) -> LabResult<Option<PersonId>> {
        if !self.persons().is_empty() {
            return Ok(None);
        }
        let id = self.add_person(
            DEFAULT_OFFICER_NAME,
            Role::AcademicOfficer,
            DEFAULT_OFFICER_PASSWORD,
        )?;
        info!(%id, "created default academic officer");
        Ok(Some(id))
    }

    /// Registers a person from a role name such as `"TA"` or `"HoD"`.
    pub fn register_person(
        &mut self,
        name: &str,
        role: &str,
        password: &str,
    ) -> LabResult<PersonId> {
        let role: Role = role.parse()?;
        self.add_person(name, role, password)
    }

    /// Looks up `id` and checks that it holds `role`.
    pub fn require_role(&self, id: PersonId, role: Role) -> LabResult<&Person> {
        let person = self
            .person(id)
            .ok_or_else(|| LabError::not_found("Person", id))?;
        if !person.has_role(role) {
            return Err(RuleViolation::RoleMismatch {
                person_id: id.get(),
                expected: role,
                actual: person.role,
            }
            .into());
        }
        Ok(person)
    }

    /// Adds a building whose attendant must be a registered Attendant.
    pub fn register_building(
        &mut self,
        name: &str,
        address: &str,
        attendant_id: PersonId,
    ) -> LabResult<BuildingId> {
        self.require_role(attendant_id, Role::Attendant)?;
        self.add_building(name, address, attendant_id)
    }

    pub fn add_room_to_building(&mut self, name: &str, building_id: BuildingId) -> LabResult<RoomId> {
        if self.building(building_id).is_none() {
            return Err(LabError::not_found("Building", building_id));
        }
        self.add_room(name, building_id)
    }

    pub fn assign_instructor_checked(
        &mut self,
        section_id: SectionId,
        instructor_id: PersonId,
    ) -> LabResult<()> {
        self.require_role(instructor_id, Role::Instructor)?;
        self.assign_instructor(section_id, instructor_id)
    }

    pub fn assign_ta_checked(&mut self, section_id: SectionId, ta_id: PersonId) -> LabResult<()> {
        self.require_role(ta_id, Role::Ta)?;
        self.assign_ta(section_id, ta_id)
    }

    /// Books a regular session in a room that is free for the window.
    pub fn schedule_lab(
        &mut self,
        section_id: SectionId,
        room_id: RoomId,
        date: Date,
        start: Time,
        end: Time,
    ) -> LabResult<ScheduleId> {
        validate_window(start, end)?;
        if self.section(section_id).is_none() {
            return Err(LabError::not_found("LabSection", section_id));
        }
        if self.room(room_id).is_none() {
            return Err(LabError::not_found("Room", room_id));
        }
        if !self.is_room_available(room_id, date, start, end) {
            return Err(RuleViolation::RoomUnavailable {
                room_id: room_id.get(),
            }
            .into());
        }
        self.add_schedule_entry(section_id, room_id, date, start, end, false)
    }

    /// Files a makeup request for a section the instructor teaches.
    pub fn request_makeup(
        &mut self,
        instructor_id: PersonId,
        section_id: SectionId,
        date: Date,
        start: Time,
        end: Time,
        reason: &str,
    ) -> LabResult<RequestId> {
        validate_window(start, end)?;
        self.require_role(instructor_id, Role::Instructor)?;
        let section = self
            .section(section_id)
            .ok_or_else(|| LabError::not_found("LabSection", section_id))?;
        if !section.is_taught_by(instructor_id) {
            return Err(RuleViolation::SectionNotTaught {
                section_id: section_id.get(),
                instructor_id: instructor_id.get(),
            }
            .into());
        }
        let id = self.add_makeup_request(section_id, instructor_id, date, start, end, reason)?;
        info!(%id, %section_id, %instructor_id, "makeup requested");
        Ok(id)
    }

    /// Records the actual times of a session held in one of the attendant's
    /// rooms. Only Scheduled entries can be filled this way.
    pub fn fill_timesheet(
        &mut self,
        attendant_id: PersonId,
        schedule_id: ScheduleId,
        actual_start: Time,
        actual_end: Time,
    ) -> LabResult<()> {
        if actual_start > actual_end {
            return Err(ValidationError::InvertedWindow {
                start: actual_start,
                end: actual_end,
            }
            .into());
        }
        self.require_role(attendant_id, Role::Attendant)?;
        let entry = self
            .schedule_entry(schedule_id)
            .ok_or_else(|| LabError::not_found("ScheduleEntry", schedule_id))?;
        let (room_id, status) = (entry.room_id, entry.status);

        if !self.rooms_managed_by(attendant_id).iter().any(|r| r.id == room_id) {
            return Err(RuleViolation::RoomNotManaged {
                schedule_id: schedule_id.get(),
                attendant_id: attendant_id.get(),
            }
            .into());
        }
        if status != ScheduleStatus::Scheduled {
            return Err(RuleViolation::ScheduleNotOpen {
                schedule_id: schedule_id.get(),
            }
            .into());
        }
        self.update_schedule_actual_time(schedule_id, actual_start, actual_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn t(h: u64, m: u64) -> Time {
        Time::new(h, m).unwrap()
    }

    #[test]
    fn test_default_officer_only_on_empty_store() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();

        let id = repo.ensure_default_officer().unwrap().unwrap();
        assert_eq!(id.get(), 1001);
        assert_eq!(repo.ensure_default_officer().unwrap(), None);

        let officer = repo.authenticate(id, DEFAULT_OFFICER_PASSWORD).unwrap();
        assert_eq!(officer.name, DEFAULT_OFFICER_NAME);
        assert_eq!(officer.role, Role::AcademicOfficer);
        assert!(repo.authenticate(id, "1234").is_none());
        assert!(repo.authenticate(PersonId::new(1999), "123").is_none());
    }

    #[test]
    fn test_register_person_parses_role() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let hod = repo.register_person("Hana", "HoD", "pw").unwrap();
        assert_eq!(repo.person(hod).unwrap().role, Role::Hod);

        let err = repo.register_person("Nobody", "Dean", "pw").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.persons().len(), 1);
    }

    #[test]
    fn test_building_needs_attendant() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let instructor = repo.add_person("Ines", Role::Instructor, "pw").unwrap();

        let err = repo.register_building("Science", "1 Campus Rd", instructor).unwrap_err();
        assert!(matches!(
            err,
            LabError::Rule(RuleViolation::RoleMismatch {
                expected: Role::Attendant,
                actual: Role::Instructor,
                ..
            })
        ));
        assert!(repo.buildings().is_empty());

        let err = repo.add_room_to_building("R1", BuildingId::new(6001)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_schedule_lab_refuses_busy_room() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let att = repo.add_person("Bo", Role::Attendant, "pw").unwrap();
        let building = repo.register_building("Science", "1 Campus Rd", att).unwrap();
        let room = repo.add_room_to_building("R1", building).unwrap();
        let section = repo.add_lab_section("CS101", "Programming Lab", "A").unwrap();
        let date = Date::new(2024, 3, 10).unwrap();

        repo.schedule_lab(section, room, date, t(9, 0), t(10, 0)).unwrap();
        let err = repo.schedule_lab(section, room, date, t(9, 30), t(10, 30)).unwrap_err();
        assert!(matches!(err, LabError::Rule(RuleViolation::RoomUnavailable { .. })));

        let err = repo.schedule_lab(section, room, date, t(11, 0), t(11, 0)).unwrap_err();
        assert!(err.is_validation());
        assert!(repo.schedule_lab(section, room, date, t(10, 0), t(11, 0)).is_ok());
    }

    #[test]
    fn test_makeup_only_for_own_section() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let ines = repo.add_person("Ines", Role::Instructor, "pw").unwrap();
        let ivo = repo.add_person("Ivo", Role::Instructor, "pw").unwrap();
        let section = repo.add_lab_section("CS101", "Programming Lab", "A").unwrap();
        repo.assign_instructor_checked(section, ines).unwrap();
        let date = Date::new(2024, 3, 10).unwrap();

        let err = repo
            .request_makeup(ivo, section, date, t(9, 0), t(10, 0), "conference")
            .unwrap_err();
        assert!(matches!(err, LabError::Rule(RuleViolation::SectionNotTaught { .. })));

        let req = repo
            .request_makeup(ines, section, date, t(9, 0), t(10, 0), "conference")
            .unwrap();
        assert!(repo.makeup_request(req).unwrap().is_pending());
    }

    #[test]
    fn test_fill_timesheet_checks_attendant_and_status() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let bo = repo.add_person("Bo", Role::Attendant, "pw").unwrap();
        let cy = repo.add_person("Cy", Role::Attendant, "pw").unwrap();
        let building = repo.register_building("Science", "1 Campus Rd", bo).unwrap();
        let room = repo.add_room_to_building("R1", building).unwrap();
        let section = repo.add_lab_section("CS101", "Programming Lab", "A").unwrap();
        let date = Date::new(2024, 3, 10).unwrap();
        let entry = repo.schedule_lab(section, room, date, t(9, 0), t(10, 0)).unwrap();

        let err = repo.fill_timesheet(cy, entry, t(9, 0), t(10, 0)).unwrap_err();
        assert!(matches!(err, LabError::Rule(RuleViolation::RoomNotManaged { .. })));

        let err = repo.fill_timesheet(bo, entry, t(10, 0), t(9, 0)).unwrap_err();
        assert!(err.is_validation());

        repo.fill_timesheet(bo, entry, t(9, 5), t(10, 0)).unwrap();
        assert_eq!(repo.schedule_entry(entry).unwrap().status, ScheduleStatus::Filled);
        assert!(repo.open_entries_for_attendant(bo).is_empty());

        let err = repo.fill_timesheet(bo, entry, t(9, 5), t(10, 0)).unwrap_err();
        assert!(matches!(err, LabError::Rule(RuleViolation::ScheduleNotOpen { .. })));
    }

    #[test]
    fn test_ta_role_is_checked() {
        let dir = tempdir().unwrap();
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let hod = repo.add_person("Hana", Role::Hod, "pw").unwrap();
        let ta = repo.add_person("Tim", Role::Ta, "pw").unwrap();
        let section = repo.add_lab_section("CS101", "Programming Lab", "A").unwrap();

        assert!(repo.assign_ta_checked(section, hod).is_err());
        repo.assign_ta_checked(section, ta).unwrap();
        assert_eq!(repo.sections_assisted_by(ta).len(), 1);
    }
}
