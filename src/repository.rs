//! In-memory mirror of every collection plus the operations that mutate it.
//!
//! Creation appends one record to the backing file; any update to an existing
//! record rewrites the whole collection. Either way the in-memory change is
//! applied first, so a storage error leaves memory ahead of disk until the
//! next successful write (see [`Repository::persist_all`]).

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::allocator::{IdAllocator, IdKind};
use crate::availability;
use crate::config::LabConfig;
use crate::error::{LabError, LabResult, RuleViolation, ValidationError};
use crate::id::{BuildingId, CourseId, PersonId, RequestId, RoomId, ScheduleId, SectionId};
use crate::makeup::{MakeupRequest, RequestStatus};
use crate::person::{Person, Role};
use crate::schedule::{ScheduleEntry, ScheduleStatus};
use crate::section::{LabSection, MAX_TAS};
use crate::storage::table::Table;
use crate::storage::{
    Collection, DirLock, BUILDINGS_FILE, LABS_FILE, MAKEUP_FILE, PERSONS_FILE,
    ROOMS_FILE, SCHEDULES_FILE,
};
use crate::time::{Date, Time};
use crate::venue::{Building, Room};

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// The department's records, loaded from a locked data directory.
#[derive(Debug)]
pub struct Repository {
    dir: PathBuf,
    _lock: DirLock,
    ids: IdAllocator,
    persons: Table<Person>,
    buildings: Table<Building>,
    rooms: Table<Room>,
    sections: Table<LabSection>,
    schedules: Table<ScheduleEntry>,
    requests: Table<MakeupRequest>,
}

impl Repository {
    /// Locks `config.data_dir` (creating it if needed) and loads every
    /// collection, advancing the identifier counters past every stored id.
    pub fn open(config: &LabConfig) -> LabResult<Self> {
        let dir = config.data_dir.clone();
        let lock = DirLock::acquire(&dir)?;

        let sync = config.sync_on_write;
        let persons = Table::load(Collection::new(dir.join(PERSONS_FILE), sync))?;
        let buildings = Table::load(Collection::new(dir.join(BUILDINGS_FILE), sync))?;
        let rooms = Table::load(Collection::new(dir.join(ROOMS_FILE), sync))?;
        let sections = Table::load(Collection::new(dir.join(LABS_FILE), sync))?;
        let schedules = Table::load(Collection::new(dir.join(SCHEDULES_FILE), sync))?;
        let requests = Table::load(Collection::new(dir.join(MAKEUP_FILE), sync))?;

        let mut repo = Self {
            dir,
            _lock: lock,
            ids: IdAllocator::new(),
            persons,
            buildings,
            rooms,
            sections,
            schedules,
            requests,
        };
        repo.observe_loaded_ids();

        info!(
            dir = %repo.dir.display(),
            persons = repo.persons.rows().len(),
            buildings = repo.buildings.rows().len(),
            rooms = repo.rooms.rows().len(),
            sections = repo.sections.rows().len(),
            schedules = repo.schedules.rows().len(),
            requests = repo.requests.rows().len(),
            "opened lab repository"
        );
        Ok(repo)
    }

    /// Opens `dir` with otherwise default configuration.
    pub fn open_dir(dir: impl Into<PathBuf>) -> LabResult<Self> {
        Self::open(&LabConfig::with_data_dir(dir))
    }

    fn observe_loaded_ids(&mut self) {
        for p in self.persons.rows() {
            self.ids.observe(IdKind::Person, p.id.get());
        }
        for b in self.buildings.rows() {
            self.ids.observe(IdKind::Building, b.id.get());
        }
        for r in self.rooms.rows() {
            self.ids.observe(IdKind::Room, r.id.get());
        }
        for s in self.sections.rows() {
            self.ids.observe(IdKind::Section, s.id.get());
            self.ids.observe(IdKind::Course, s.course_id.get());
        }
        for e in self.schedules.rows() {
            self.ids.observe(IdKind::Schedule, e.id.get());
        }
        for m in self.requests.rows() {
            self.ids.observe(IdKind::Makeup, m.id.get());
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Rewrites every collection from memory.
    ///
    /// Brings disk back in line after a failed append or rewrite.
    pub fn persist_all(&self) -> LabResult<()> {
        self.persons.persist()?;
        self.buildings.persist()?;
        self.rooms.persist()?;
        self.sections.persist()?;
        self.schedules.persist()?;
        self.requests.persist()?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    pub fn add_person(&mut self, name: &str, role: Role, password: &str) -> LabResult<PersonId> {
        require_text("name", name)?;
        let id = PersonId::new(self.ids.allocate(IdKind::Person)?);
        self.persons.insert(Person {
            id,
            name: name.to_string(),
            role,
            password: password.to_string(),
        })?;
        debug!(%id, %role, "added person");
        Ok(id)
    }

    /// Adds a building. The attendant's role is not checked here; see
    /// [`Repository::register_building`] for the checked variant.
    pub fn add_building(
        &mut self,
        name: &str,
        address: &str,
        attendant_id: PersonId,
    ) -> LabResult<BuildingId> {
        require_text("name", name)?;
        let id = BuildingId::new(self.ids.allocate(IdKind::Building)?);
        self.buildings.insert(Building {
            id,
            name: name.to_string(),
            address: address.to_string(),
            attendant_id,
        })?;
        debug!(%id, "added building");
        Ok(id)
    }

    pub fn add_room(&mut self, name: &str, building_id: BuildingId) -> LabResult<RoomId> {
        require_text("name", name)?;
        let id = RoomId::new(self.ids.allocate(IdKind::Room)?);
        self.rooms.insert(Room {
            id,
            name: name.to_string(),
            building_id,
        })?;
        debug!(%id, %building_id, "added room");
        Ok(id)
    }

    /// Adds a section of the course identified by `course_code`.
    ///
    /// The first section of a code mints a course id; later sections reuse
    /// it along with the course name already on record. A second section
    /// with the same code and section name is rejected.
    pub fn add_lab_section(
        &mut self,
        course_code: &str,
        course_name: &str,
        section_name: &str,
    ) -> LabResult<SectionId> {
        require_text("course_code", course_code)?;
        require_text("section_name", section_name)?;

        if let Some(existing) = self
            .sections
            .rows()
            .iter()
            .find(|s| s.course_code == course_code && s.section_name == section_name)
        {
            return Err(RuleViolation::DuplicateSection {
                course_code: course_code.to_string(),
                section_name: section_name.to_string(),
                section_id: existing.id.get(),
            }
            .into());
        }

        let known = self
            .course_for_code(course_code)
            .map(|(id, name)| (id, name.to_string()));
        let (course_id, course_name) = match known {
            Some(course) => course,
            None => {
                require_text("course_name", course_name)?;
                (CourseId::new(self.ids.allocate(IdKind::Course)?), course_name.to_string())
            }
        };

        let id = SectionId::new(self.ids.allocate(IdKind::Section)?);
        self.sections
            .insert(LabSection::new(course_id, course_code, course_name, id, section_name))?;
        debug!(%id, %course_id, course_code, section_name, "added lab section");
        Ok(id)
    }

    /// Books a session. Availability is the caller's concern; use
    /// [`Repository::schedule_lab`] for the checked variant.
    pub fn add_schedule_entry(
        &mut self,
        section_id: SectionId,
        room_id: RoomId,
        date: Date,
        start: Time,
        end: Time,
        is_makeup: bool,
    ) -> LabResult<ScheduleId> {
        let id = ScheduleId::new(self.ids.allocate(IdKind::Schedule)?);
        self.schedules.insert(ScheduleEntry::new(
            id, section_id, room_id, date, start, end, is_makeup,
        ))?;
        debug!(%id, %section_id, %room_id, %date, %start, %end, is_makeup, "added schedule entry");
        Ok(id)
    }

    /// Files a new pending makeup request.
    pub fn add_makeup_request(
        &mut self,
        section_id: SectionId,
        instructor_id: PersonId,
        date: Date,
        start: Time,
        end: Time,
        reason: &str,
    ) -> LabResult<RequestId> {
        let id = RequestId::new(self.ids.allocate(IdKind::Makeup)?);
        self.requests.insert(MakeupRequest {
            id,
            section_id,
            instructor_id,
            requested_date: date,
            requested_start: start,
            requested_end: end,
            reason: reason.to_string(),
            status: RequestStatus::Pending,
        })?;
        debug!(%id, %section_id, %instructor_id, "added makeup request");
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Updates
    // ---------------------------------------------------------------------

    /// Sets (or replaces) the section's instructor.
    pub fn assign_instructor(
        &mut self,
        section_id: SectionId,
        instructor_id: PersonId,
    ) -> LabResult<()> {
        let section = self
            .sections
            .find_mut(|s| s.id == section_id)
            .ok_or_else(|| LabError::not_found("LabSection", section_id))?;
        section.instructor_id = Some(instructor_id);
        self.sections.persist()?;
        debug!(%section_id, %instructor_id, "assigned instructor");
        Ok(())
    }

    /// Appends a TA to the section.
    ///
    /// A full section is left unchanged and reported as
    /// [`RuleViolation::TaCapacityExceeded`].
    pub fn assign_ta(&mut self, section_id: SectionId, ta_id: PersonId) -> LabResult<()> {
        let section = self
            .sections
            .find_mut(|s| s.id == section_id)
            .ok_or_else(|| LabError::not_found("LabSection", section_id))?;
        if !section.add_ta(ta_id) {
            return Err(RuleViolation::TaCapacityExceeded {
                section_id: section_id.get(),
                capacity: MAX_TAS,
            }
            .into());
        }
        self.sections.persist()?;
        debug!(%section_id, %ta_id, "assigned TA");
        Ok(())
    }

    /// Records actual times and marks the entry Filled.
    ///
    /// A filled entry may be filled again; a canceled one may not.
    pub fn update_schedule_actual_time(
        &mut self,
        schedule_id: ScheduleId,
        actual_start: Time,
        actual_end: Time,
    ) -> LabResult<()> {
        let entry = self
            .schedules
            .find_mut(|e| e.id == schedule_id)
            .ok_or_else(|| LabError::not_found("ScheduleEntry", schedule_id))?;
        if entry.status == ScheduleStatus::Canceled {
            return Err(RuleViolation::ScheduleNotOpen {
                schedule_id: schedule_id.get(),
            }
            .into());
        }
        entry.fill(actual_start, actual_end);
        self.schedules.persist()?;
        debug!(%schedule_id, %actual_start, %actual_end, "filled timesheet");
        Ok(())
    }

    /// Cancels a Scheduled entry, freeing its room.
    pub fn cancel_schedule_entry(&mut self, schedule_id: ScheduleId) -> LabResult<()> {
        let entry = self
            .schedules
            .find_mut(|e| e.id == schedule_id)
            .ok_or_else(|| LabError::not_found("ScheduleEntry", schedule_id))?;
        if entry.status != ScheduleStatus::Scheduled {
            return Err(RuleViolation::ScheduleNotOpen {
                schedule_id: schedule_id.get(),
            }
            .into());
        }
        entry.cancel();
        self.schedules.persist()?;
        info!(%schedule_id, "canceled schedule entry");
        Ok(())
    }

    /// Moves a pending request to a terminal status.
    ///
    /// Terminal requests never change again, and nothing moves back to
    /// Pending.
    pub fn update_makeup_request_status(
        &mut self,
        request_id: RequestId,
        status: RequestStatus,
    ) -> LabResult<()> {
        let request = self
            .requests
            .find_mut(|m| m.id == request_id)
            .ok_or_else(|| LabError::not_found("MakeupRequest", request_id))?;
        if request.status.is_terminal() || !status.is_terminal() {
            return Err(RuleViolation::InvalidTransition {
                request_id: request_id.get(),
                from: request.status,
                to: status,
            }
            .into());
        }
        request.status = status;
        self.requests.persist()?;
        debug!(%request_id, %status, "updated makeup request");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.rows().iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.rows().iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.rows().iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&LabSection> {
        self.sections.rows().iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn schedule_entry(&self, id: ScheduleId) -> Option<&ScheduleEntry> {
        self.schedules.rows().iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn makeup_request(&self, id: RequestId) -> Option<&MakeupRequest> {
        self.requests.rows().iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn persons(&self) -> &[Person] {
        self.persons.rows()
    }

    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        self.buildings.rows()
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        self.rooms.rows()
    }

    #[must_use]
    pub fn sections(&self) -> &[LabSection] {
        self.sections.rows()
    }

    #[must_use]
    pub fn schedule_entries(&self) -> &[ScheduleEntry] {
        self.schedules.rows()
    }

    #[must_use]
    pub fn makeup_requests(&self) -> &[MakeupRequest] {
        self.requests.rows()
    }

    /// Course id and name already recorded for `course_code`, if any.
    #[must_use]
    pub fn course_for_code(&self, course_code: &str) -> Option<(CourseId, &str)> {
        self.sections
            .rows()
            .iter()
            .find(|s| s.course_code == course_code)
            .map(|s| (s.course_id, s.course_name.as_str()))
    }

    // ---------------------------------------------------------------------
    // Filtered views
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn sections_taught_by(&self, instructor: PersonId) -> Vec<&LabSection> {
        self.sections
            .rows()
            .iter()
            .filter(|s| s.is_taught_by(instructor))
            .collect()
    }

    #[must_use]
    pub fn sections_assisted_by(&self, ta: PersonId) -> Vec<&LabSection> {
        self.sections.rows().iter().filter(|s| s.has_ta(ta)).collect()
    }

    #[must_use]
    pub fn entries_for_section(&self, section: SectionId) -> Vec<&ScheduleEntry> {
        self.schedules
            .rows()
            .iter()
            .filter(|e| e.section_id == section)
            .collect()
    }

    #[must_use]
    pub fn entries_for_instructor(&self, instructor: PersonId) -> Vec<&ScheduleEntry> {
        let taught: Vec<SectionId> = self
            .sections_taught_by(instructor)
            .into_iter()
            .map(|s| s.id)
            .collect();
        self.schedules
            .rows()
            .iter()
            .filter(|e| taught.contains(&e.section_id))
            .collect()
    }

    #[must_use]
    pub fn entries_for_ta(&self, ta: PersonId) -> Vec<&ScheduleEntry> {
        let assisted: Vec<SectionId> = self
            .sections_assisted_by(ta)
            .into_iter()
            .map(|s| s.id)
            .collect();
        self.schedules
            .rows()
            .iter()
            .filter(|e| assisted.contains(&e.section_id))
            .collect()
    }

    #[must_use]
    pub fn rooms_in_building(&self, building: BuildingId) -> Vec<&Room> {
        self.rooms
            .rows()
            .iter()
            .filter(|r| r.building_id == building)
            .collect()
    }

    /// Rooms in every building whose attendant is `attendant`.
    #[must_use]
    pub fn rooms_managed_by(&self, attendant: PersonId) -> Vec<&Room> {
        let managed: Vec<BuildingId> = self
            .buildings
            .rows()
            .iter()
            .filter(|b| b.attendant_id == attendant)
            .map(|b| b.id)
            .collect();
        self.rooms
            .rows()
            .iter()
            .filter(|r| managed.contains(&r.building_id))
            .collect()
    }

    /// Scheduled (unfilled, not canceled) entries in the attendant's rooms.
    #[must_use]
    pub fn open_entries_for_attendant(&self, attendant: PersonId) -> Vec<&ScheduleEntry> {
        let rooms: Vec<RoomId> = self
            .rooms_managed_by(attendant)
            .into_iter()
            .map(|r| r.id)
            .collect();
        self.schedules
            .rows()
            .iter()
            .filter(|e| e.status == ScheduleStatus::Scheduled && rooms.contains(&e.room_id))
            .collect()
    }

    #[must_use]
    pub fn pending_requests(&self) -> Vec<&MakeupRequest> {
        self.requests.rows().iter().filter(|m| m.is_pending()).collect()
    }

    #[must_use]
    pub fn is_room_available(&self, room: RoomId, date: Date, start: Time, end: Time) -> bool {
        availability::is_room_available(self.schedules.rows(), room, date, start, end)
    }

    #[must_use]
    pub fn available_rooms(&self, date: Date, start: Time, end: Time) -> Vec<&Room> {
        availability::available_rooms(self.rooms.rows(), self.schedules.rows(), date, start, end)
    }
}
